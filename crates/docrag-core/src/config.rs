//! Configuration loader and typed settings.
//!
//! Figment merges `config.toml` + `config.<env>.toml` + `APP_*` env vars +
//! the plain variables (`GOOGLE_API_KEY`, `PERSIST_DIRECTORY`, ...). The
//! result is extracted once into [`Settings`].

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{IdScheme, MetadataPolicy};

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Plain (unprefixed) environment variables honoured in addition to `APP_*`.
const PLAIN_ENV_KEYS: [&str; 5] = ["GOOGLE_API_KEY", "PERSIST_DIRECTORY", "CHUNK_SIZE", "CHUNK_OVERLAP", "MAX_RETRIEVAL_DOCS"];

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment
            .merge(Env::prefixed("APP_"))
            .merge(Env::raw().only(&["CHROMA_PERSIST_DIRECTORY"]).map(|_| "persist_directory".into()))
            .merge(Env::raw().only(&PLAIN_ENV_KEYS));
        Ok(Self { figment })
    }

    pub fn from_figment(figment: Figment) -> Self { Self { figment } }

    /// Extract and validate the typed settings. A missing API key is fatal.
    pub fn settings(&self) -> Result<Settings> {
        let api_key: Option<String> = self.figment.extract_inner("google_api_key").ok();
        if api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(Error::ConfigMissing("GOOGLE_API_KEY".to_string()));
        }
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Everything the pipeline needs, built once at startup and passed down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub google_api_key: String,
    #[serde(default = "default_persist_directory")]
    pub persist_directory: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_max_retrieval_docs")]
    pub max_retrieval_docs: usize,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_generation_model")]
    pub generation_model: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub metadata_policy: MetadataPolicy,
    #[serde(default)]
    pub id_strategy: IdScheme,
}

fn default_persist_directory() -> String { ".chroma".to_string() }
fn default_chunk_size() -> usize { 1000 }
fn default_chunk_overlap() -> usize { 200 }
fn default_max_retrieval_docs() -> usize { 5 }
fn default_embedding_model() -> String { "embedding-001".to_string() }
fn default_generation_model() -> String { "gemini-1.5-pro".to_string() }
fn default_api_base_url() -> String { DEFAULT_API_BASE_URL.to_string() }
fn default_request_timeout_secs() -> u64 { 120 }
fn default_connect_timeout_secs() -> u64 { 10 }

impl Settings {
    /// Defaults for every field except the API key.
    pub fn new(google_api_key: impl Into<String>) -> Self {
        Self {
            google_api_key: google_api_key.into(),
            persist_directory: default_persist_directory(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            max_retrieval_docs: default_max_retrieval_docs(),
            embedding_model: default_embedding_model(),
            generation_model: default_generation_model(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            metadata_policy: MetadataPolicy::default(),
            id_strategy: IdScheme::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be greater than 0".to_string()));
        }
        if self.chunk_overlap > self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({}) is larger than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.max_retrieval_docs == 0 {
            return Err(Error::InvalidConfig("max_retrieval_docs must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Persistence directory with `~` and env vars expanded.
    pub fn persist_path(&self) -> PathBuf { expand_path(&self.persist_directory) }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
