use std::sync::Arc;

use tracing::info;

use docrag_core::error::Result;
use docrag_core::splitter::TextSplitter;
use docrag_core::traits::VectorIndex;
use docrag_core::types::{Chunk, ContentHashIds, IdStrategy, Metadata, MetadataFilter, MetadataPolicy, SearchResult};

/// Splits source texts into chunks and keeps them in a vector index.
pub struct DocumentStore {
    splitter: TextSplitter,
    index: Arc<dyn VectorIndex>,
    policy: MetadataPolicy,
    ids: Box<dyn IdStrategy>,
}

impl DocumentStore {
    pub fn new(splitter: TextSplitter, index: Arc<dyn VectorIndex>) -> Self {
        Self { splitter, index, policy: MetadataPolicy::default(), ids: Box::new(ContentHashIds) }
    }

    pub fn with_metadata_policy(mut self, policy: MetadataPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_id_strategy(mut self, ids: Box<dyn IdStrategy>) -> Self {
        self.ids = ids;
        self
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> { &self.index }

    /// Split `texts` and attach metadata and ids. Positions count over the
    /// flattened chunk list, not per source text.
    ///
    /// Ids see only the caller's metadata, never the positional defaults, so
    /// a chunk keeps its id when other documents are added in front of it.
    pub fn prepare_chunks(&self, texts: &[String], metadata: Option<&Metadata>) -> Vec<Chunk> {
        let caller = metadata.cloned().unwrap_or_default();
        self.splitter
            .split_many(texts)
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let id = self.ids.chunk_id(i, &text, &caller);
                Chunk { id, text, metadata: self.policy.resolve(metadata, i) }
            })
            .collect()
    }

    pub async fn ingest(&self, texts: &[String], metadata: Option<&Metadata>) -> Result<usize> {
        let chunks = self.prepare_chunks(texts, metadata);
        if chunks.is_empty() {
            info!(collection = self.index.name(), "nothing to ingest");
            return Ok(0);
        }
        info!(collection = self.index.name(), texts = texts.len(), chunks = chunks.len(), "ingesting");
        self.index.upsert(&chunks).await
    }

    pub async fn search(&self, query: &str, k: usize, filter: Option<&MetadataFilter>) -> Result<Vec<SearchResult>> {
        self.index.query(query, k, filter).await
    }

    pub async fn clear(&self) -> Result<()> { self.index.delete_collection().await }
}
