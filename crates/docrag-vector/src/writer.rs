use std::collections::HashSet;
use std::sync::Arc;

use arrow_array::types::Float32Type;
use arrow_array::{FixedSizeListArray, RecordBatch, RecordBatchIterator, StringArray};
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::Connection;
use tracing::debug;

use docrag_core::error::{Error, Result};
use docrag_core::traits::Embedder;
use docrag_core::types::Chunk;

use crate::schema::{build_chunk_schema, ID_COLUMN};
use crate::table::table_exists;

/// A chunk paired with the vector computed for its text.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk<'a> {
    pub chunk: &'a Chunk,
    pub vector: Vec<f32>,
}

/// Drop earlier duplicates of an id so that the last occurrence in the batch wins.
pub fn dedup_last_wins(chunks: &[Chunk]) -> Vec<&Chunk> {
    let mut seen = HashSet::new();
    let mut out: Vec<&Chunk> = chunks.iter().rev().filter(|c| seen.insert(c.id.as_str())).collect();
    out.reverse();
    out
}

/// Embed every chunk, one call at a time. The first failure aborts the batch.
pub async fn embed_all<'a>(embedder: &dyn Embedder, chunks: &[&'a Chunk]) -> Result<Vec<EmbeddedChunk<'a>>> {
    let pb = ProgressBar::new(chunks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
            .map(|s| s.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let mut out = Vec::with_capacity(chunks.len());
    for &chunk in chunks {
        let vector = match embedder.embed(&chunk.text).await {
            Ok(v) => v,
            Err(e) => {
                pb.abandon_with_message("embedding failed");
                return Err(e);
            }
        };
        out.push(EmbeddedChunk { chunk, vector });
        pb.inc(1);
    }
    pb.finish_with_message("embedded");
    Ok(out)
}

/// Common width of all vectors, checked against `expected` when the table already exists.
pub fn check_dimension(rows: &[EmbeddedChunk<'_>], expected: Option<usize>) -> Result<usize> {
    let dim = match expected.or_else(|| rows.first().map(|r| r.vector.len())) {
        Some(d) => d,
        None => return Ok(0),
    };
    if let Some(bad) = rows.iter().find(|r| r.vector.len() != dim) {
        return Err(Error::DimensionMismatch { expected: dim, got: bad.vector.len() });
    }
    Ok(dim)
}

pub fn rows_to_record_batch(rows: &[EmbeddedChunk<'_>], dim: usize) -> Result<RecordBatch> {
    let dim = i32::try_from(dim).map_err(|_| Error::InvalidConfig(format!("vector dimension {dim} is too large")))?;
    let schema = build_chunk_schema(dim);
    let mut ids = Vec::with_capacity(rows.len());
    let mut texts = Vec::with_capacity(rows.len());
    let mut metadata = Vec::with_capacity(rows.len());
    let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(rows.len());
    for row in rows {
        ids.push(row.chunk.id.clone());
        texts.push(row.chunk.text.clone());
        metadata.push(serde_json::to_string(&row.chunk.metadata)?);
        vectors.push(Some(row.vector.iter().map(|&x| Some(x)).collect()));
    }
    RecordBatch::try_new(schema, vec![
        Arc::new(StringArray::from(ids)),
        Arc::new(StringArray::from(texts)),
        Arc::new(StringArray::from(metadata)),
        Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(vectors, dim)),
    ])
    .map_err(Error::storage)
}

/// Single commit: create the table on first write, otherwise merge-insert keyed on `id`.
pub async fn write_batch(conn: &Connection, name: &str, batch: RecordBatch) -> Result<()> {
    let schema = batch.schema();
    let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
    if table_exists(conn, name).await? {
        let table = conn.open_table(name).execute().await.map_err(Error::storage)?;
        let mut mi = table.merge_insert(&[ID_COLUMN]);
        mi.when_matched_update_all(None).when_not_matched_insert_all();
        mi.execute(reader).await.map_err(Error::storage)?;
        debug!(table = name, "merged rows into existing table");
    } else {
        conn.create_table(name, reader).execute().await.map_err(Error::storage)?;
        debug!(table = name, "created table");
    }
    Ok(())
}
