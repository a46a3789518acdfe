use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use lancedb::{Connection, Table};
use tracing::info;

use docrag_core::error::{Error, Result};
use docrag_core::traits::{Embedder, VectorIndex};
use docrag_core::types::{Chunk, MetadataFilter, SearchResult};

use crate::schema::vector_dimension;
use crate::search::nearest;
use crate::table::{open_db, table_exists, validate_table_name};
use crate::writer::{check_dimension, dedup_last_wins, embed_all, rows_to_record_batch, write_batch};

/// A named collection stored as one LanceDB table under a directory.
///
/// The table is created on the first write; its vector width is fixed then.
/// Once [`VectorIndex::delete_collection`] has run, this handle refuses every
/// further operation.
pub struct LanceCollection {
    conn: Connection,
    dir: PathBuf,
    name: String,
    embedder: Arc<dyn Embedder>,
    dropped: AtomicBool,
}

impl LanceCollection {
    pub async fn open(dir: &Path, name: &str, embedder: Arc<dyn Embedder>) -> Result<Self> {
        validate_table_name(name)?;
        let conn = open_db(dir).await?;
        info!(dir = %dir.display(), collection = name, embedder = embedder.model_id(), "opened collection");
        Ok(Self { conn, dir: dir.to_path_buf(), name: name.to_string(), embedder, dropped: AtomicBool::new(false) })
    }

    pub fn dir(&self) -> &Path { &self.dir }

    pub fn embedder(&self) -> &Arc<dyn Embedder> { &self.embedder }

    fn ensure_live(&self) -> Result<()> {
        if self.dropped.load(Ordering::SeqCst) {
            return Err(Error::AlreadyCleared(self.name.clone()));
        }
        Ok(())
    }

    async fn table(&self) -> Result<Option<Table>> {
        if !table_exists(&self.conn, &self.name).await? {
            return Ok(None);
        }
        let table = self.conn.open_table(&self.name).execute().await.map_err(Error::storage)?;
        Ok(Some(table))
    }

    async fn table_dimension(&self, table: &Table) -> Result<Option<usize>> {
        let schema = table.schema().await.map_err(Error::storage)?;
        Ok(vector_dimension(&schema))
    }
}

#[async_trait]
impl VectorIndex for LanceCollection {
    fn name(&self) -> &str { &self.name }

    async fn upsert(&self, chunks: &[Chunk]) -> Result<usize> {
        self.ensure_live()?;
        if chunks.is_empty() {
            return Ok(0);
        }
        let unique = dedup_last_wins(chunks);
        info!(collection = self.name.as_str(), chunks = unique.len(), "embedding chunks");
        let rows = embed_all(self.embedder.as_ref(), &unique).await?;

        let expected = match self.table().await? {
            Some(t) => self.table_dimension(&t).await?,
            None => None,
        };
        let dim = check_dimension(&rows, expected)?;
        let batch = rows_to_record_batch(&rows, dim)?;
        write_batch(&self.conn, &self.name, batch).await?;
        info!(collection = self.name.as_str(), rows = rows.len(), dim, "upserted chunks");
        Ok(rows.len())
    }

    async fn query(&self, text: &str, k: usize, filter: Option<&MetadataFilter>) -> Result<Vec<SearchResult>> {
        self.ensure_live()?;
        if k == 0 {
            return Ok(vec![]);
        }
        let Some(table) = self.table().await? else {
            return Ok(vec![]);
        };
        let vector = self.embedder.embed(text).await?;
        if let Some(expected) = self.table_dimension(&table).await? {
            if vector.len() != expected {
                return Err(Error::DimensionMismatch { expected, got: vector.len() });
            }
        }
        let results = nearest(&table, vector, k, filter).await?;
        info!(collection = self.name.as_str(), k, hits = results.len(), "query finished");
        Ok(results)
    }

    async fn delete_collection(&self) -> Result<()> {
        self.ensure_live()?;
        if table_exists(&self.conn, &self.name).await? {
            self.conn.drop_table(&self.name, &[]).await.map_err(Error::storage)?;
        }
        // Only a finished drop marks the handle dead; a failed one may be retried.
        self.dropped.store(true, Ordering::SeqCst);
        info!(collection = self.name.as_str(), "collection deleted");
        Ok(())
    }

    async fn dimension(&self) -> Result<Option<usize>> {
        self.ensure_live()?;
        match self.table().await? {
            Some(t) => self.table_dimension(&t).await,
            None => Ok(None),
        }
    }

    async fn count(&self) -> Result<usize> {
        self.ensure_live()?;
        match self.table().await? {
            Some(t) => t.count_rows(None).await.map_err(Error::storage),
            None => Ok(0),
        }
    }
}
