use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::info;
use twox_hash::XxHash64;

use docrag_core::config::Settings;
use docrag_core::error::{Error, Result};
use docrag_core::traits::{Embedder, LanguageModel};

pub mod gemini;

use gemini::GeminiClient;

/// Width of the vectors produced by `embedding-001`.
pub const GEMINI_EMBEDDING_DIM: usize = 768;

pub struct GeminiEmbedder {
    client: GeminiClient,
    model: String,
    id: String,
}

impl GeminiEmbedder {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = GeminiClient::new(settings).map_err(Error::embedding)?;
        let model = settings.embedding_model.clone();
        Ok(Self { client, id: format!("gemini:{model}"), model })
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    fn model_id(&self) -> &str { &self.id }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed_content(&self.model, text).await.map_err(Error::embedding)
    }
}

pub struct GeminiLanguageModel {
    client: GeminiClient,
    model: String,
    id: String,
}

impl GeminiLanguageModel {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = GeminiClient::new(settings).map_err(Error::generation)?;
        let model = settings.generation_model.clone();
        Ok(Self { client, id: format!("gemini:{model}"), model })
    }
}

#[async_trait]
impl LanguageModel for GeminiLanguageModel {
    fn model_id(&self) -> &str { &self.id }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.client.generate_content(&self.model, prompt).await.map_err(Error::generation)
    }
}

/// Offline embedder: hashes lowercase word tokens into buckets, then L2-normalizes.
/// Identical texts always get identical vectors.
pub struct FakeEmbedder {
    dim: usize,
    id: String,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim: dim.max(1), id: format!("fake:{dim}") } }

    pub fn dim(&self) -> usize { self.dim }

    fn bucket(token: &str) -> u64 {
        let mut hasher = XxHash64::with_seed(0);
        token.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for FakeEmbedder {
    fn default() -> Self { Self::new(GEMINI_EMBEDDING_DIM) }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    fn model_id(&self) -> &str { &self.id }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0f32; self.dim];
        let lowered = text.to_lowercase();
        let mut tokens: Vec<&str> = lowered.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()).collect();
        if tokens.is_empty() { tokens.push(lowered.as_str()); }
        for (i, token) in tokens.iter().enumerate() {
            let h = Self::bucket(token);
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += 0.5 + val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        Ok(v)
    }
}

/// Offline language model. Returns a fixed reply (or a short echo of the
/// prompt) and records every prompt it was given.
#[derive(Default)]
pub struct FakeLanguageModel {
    reply: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl FakeLanguageModel {
    pub fn new() -> Self { Self::default() }

    pub fn with_reply(reply: impl Into<String>) -> Self { Self { reply: Some(reply.into()), ..Self::default() } }

    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

    pub fn last_prompt(&self) -> Option<String> { self.prompts.lock().ok().and_then(|p| p.last().cloned()) }
}

#[async_trait]
impl LanguageModel for FakeLanguageModel {
    fn model_id(&self) -> &str { "fake:llm" }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() { prompts.push(prompt.to_string()); }
        Ok(match &self.reply {
            Some(r) => r.clone(),
            None => format!("[fake answer] prompt had {} characters", prompt.chars().count()),
        })
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// Gemini embedder, or `FakeEmbedder` when `APP_USE_FAKE_EMBEDDINGS=1`.
pub fn get_default_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    if env_flag("APP_USE_FAKE_EMBEDDINGS") {
        info!("Using FakeEmbedder");
        return Ok(Arc::new(FakeEmbedder::default()));
    }
    Ok(Arc::new(GeminiEmbedder::new(settings)?))
}

/// Gemini generator, or `FakeLanguageModel` when `APP_USE_FAKE_LLM=1`.
pub fn get_default_language_model(settings: &Settings) -> Result<Arc<dyn LanguageModel>> {
    if env_flag("APP_USE_FAKE_LLM") {
        info!("Using FakeLanguageModel");
        return Ok(Arc::new(FakeLanguageModel::new()));
    }
    Ok(Arc::new(GeminiLanguageModel::new(settings)?))
}
