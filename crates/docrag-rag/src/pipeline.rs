use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use docrag_core::config::Settings;
use docrag_core::error::{Error, Result};
use docrag_core::loader::{DocumentLoader, SkippedDocument};
use docrag_core::splitter::TextSplitter;
use docrag_core::traits::{LanguageModel, VectorIndex};
use docrag_core::types::Metadata;
use docrag_models::{get_default_embedder, get_default_language_model};
use docrag_vector::LanceCollection;

use crate::generator::{Answer, Generator};
use crate::retriever::{RetrievalConfig, Retriever};
use crate::store::DocumentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Uninitialized,
    Initialized,
    Cleared,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InitReport {
    pub loaded: Vec<PathBuf>,
    pub skipped: Vec<SkippedDocument>,
    pub chunks: usize,
}

/// Load, index, answer, clear.
///
/// `Uninitialized -> Initialized -> Cleared`. Nothing is allowed after
/// `Cleared`; answering before `initialize` is fine since the collection may
/// already hold data from an earlier run.
pub struct Pipeline {
    docs_dir: PathBuf,
    loader: DocumentLoader,
    store: Arc<DocumentStore>,
    generator: Generator,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(docs_dir: impl Into<PathBuf>, store: Arc<DocumentStore>, model: Arc<dyn LanguageModel>, retrieval: RetrievalConfig) -> Self {
        let retriever = Retriever::new(store.clone(), retrieval);
        Self { docs_dir: docs_dir.into(), loader: DocumentLoader::new(), store, generator: Generator::new(retriever, model), state: PipelineState::Uninitialized }
    }

    /// Wire the default components: LanceDB under `persist_directory`, Gemini (or fakes) for models.
    pub async fn from_settings(settings: &Settings, docs_dir: &Path, collection_name: &str) -> Result<Self> {
        let embedder = get_default_embedder(settings)?;
        let index: Arc<dyn VectorIndex> = Arc::new(LanceCollection::open(&settings.persist_path(), collection_name, embedder).await?);
        let store = DocumentStore::new(TextSplitter::from_settings(settings)?, index)
            .with_metadata_policy(settings.metadata_policy)
            .with_id_strategy(settings.id_strategy.strategy());
        let model = get_default_language_model(settings)?;
        Ok(Self::new(docs_dir, Arc::new(store), model, RetrievalConfig::from_settings(settings)))
    }

    pub fn state(&self) -> PipelineState { self.state }

    pub fn docs_dir(&self) -> &Path { &self.docs_dir }

    pub fn store(&self) -> &Arc<DocumentStore> { &self.store }

    fn ensure_not_cleared(&self) -> Result<()> {
        if self.state == PipelineState::Cleared {
            return Err(Error::AlreadyCleared(self.store.index().name().to_string()));
        }
        Ok(())
    }

    pub async fn initialize(&mut self, metadata: Option<&Metadata>) -> Result<InitReport> {
        self.ensure_not_cleared()?;
        let report = self.loader.load_documents(&self.docs_dir)?;
        let chunks = self.store.ingest(&report.texts(), metadata).await?;
        self.state = PipelineState::Initialized;
        info!(docs = report.loaded.len(), skipped = report.skipped.len(), chunks, "pipeline initialized");
        Ok(InitReport { loaded: report.loaded.into_iter().map(|d| d.path).collect(), skipped: report.skipped, chunks })
    }

    pub async fn answer(&self, query: &str) -> Result<Answer> {
        self.ensure_not_cleared()?;
        self.generator.answer(query).await
    }

    pub async fn clear(&mut self) -> Result<()> {
        self.ensure_not_cleared()?;
        self.store.clear().await?;
        self.state = PipelineState::Cleared;
        Ok(())
    }
}
