use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use docrag_core::config::Settings;
use docrag_core::error::Result;
use docrag_core::types::{MetadataFilter, SearchResult};

use crate::store::DocumentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub default_k: usize,
    pub max_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self { Self { default_k: 5, max_k: 5 } }
}

impl RetrievalConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self { default_k: settings.max_retrieval_docs, max_k: settings.max_retrieval_docs }
    }

    pub fn effective_k(&self, requested: Option<usize>) -> usize { requested.unwrap_or(self.default_k).min(self.max_k) }
}

pub struct Retriever {
    store: Arc<DocumentStore>,
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(store: Arc<DocumentStore>, config: RetrievalConfig) -> Self { Self { store, config } }

    pub fn config(&self) -> RetrievalConfig { self.config }

    pub async fn retrieve(&self, query: &str, k: Option<usize>, filter: Option<&MetadataFilter>) -> Result<Vec<SearchResult>> {
        let k = self.config.effective_k(k);
        debug!(k, "retrieving");
        self.store.search(query, k, filter).await
    }
}

/// `Document i:` header, the text and a blank line per result, 1-indexed.
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .flat_map(|(i, r)| [format!("Document {}:", i + 1), r.text.clone(), String::new()])
        .collect::<Vec<_>>()
        .join("\n")
}
