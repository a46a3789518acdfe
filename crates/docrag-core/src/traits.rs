use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Chunk, MetadataFilter, SearchResult};

/// Maps text to a fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `gemini:embedding-001`).
    fn model_id(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// One vector per input, in input order. Calls are issued one at a time.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// A generative model that turns a prompt into free text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn model_id(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// A named, persistent collection of embedded chunks.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    fn name(&self) -> &str;

    /// Embed and persist `chunks`, overwriting rows that share an id.
    async fn upsert(&self, chunks: &[Chunk]) -> Result<usize>;

    /// Up to `k` nearest chunks, closest first.
    async fn query(&self, text: &str, k: usize, filter: Option<&MetadataFilter>) -> Result<Vec<SearchResult>>;

    /// Drop every chunk and the collection itself.
    async fn delete_collection(&self) -> Result<()>;

    /// Vector width fixed by the first write, if anything was written.
    async fn dimension(&self) -> Result<Option<usize>>;

    async fn count(&self) -> Result<usize>;
}
