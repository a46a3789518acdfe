use arrow_array::{Array, Float32Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};

use docrag_core::error::{Error, Result};
use docrag_core::types::{matches_filter, Metadata, MetadataFilter, SearchResult};

use crate::schema::{DISTANCE_COLUMN, ID_COLUMN, METADATA_COLUMN, TEXT_COLUMN};

/// Cosine nearest neighbours of `vector`, closest first.
///
/// With a filter, every row is scanned by distance and the filter is applied
/// before truncating to `k`.
pub async fn nearest(table: &Table, vector: Vec<f32>, k: usize, filter: Option<&MetadataFilter>) -> Result<Vec<SearchResult>> {
    let fetch = match filter {
        Some(f) if !f.is_empty() => table.count_rows(None).await.map_err(Error::storage)?.max(k),
        _ => k,
    };
    if fetch == 0 {
        return Ok(vec![]);
    }
    let mut stream = table
        .vector_search(vector)
        .map_err(Error::storage)?
        .distance_type(DistanceType::Cosine)
        .limit(fetch)
        .execute()
        .await
        .map_err(Error::storage)?;

    let mut results = Vec::new();
    while let Some(batch) = stream.try_next().await.map_err(Error::storage)? {
        results.extend(batch_to_results(&batch)?);
    }
    if let Some(f) = filter {
        results.retain(|r| matches_filter(&r.metadata, f));
    }
    results.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(k);
    Ok(results)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| Error::storage(format!("column '{name}' missing or not utf8")))
}

pub fn batch_to_results(batch: &RecordBatch) -> Result<Vec<SearchResult>> {
    let ids = string_column(batch, ID_COLUMN)?;
    let texts = string_column(batch, TEXT_COLUMN)?;
    let metadata = string_column(batch, METADATA_COLUMN)?;
    let distances = batch.column_by_name(DISTANCE_COLUMN).and_then(|c| c.as_any().downcast_ref::<Float32Array>());

    let mut out = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let meta: Metadata = serde_json::from_str(metadata.value(i))?;
        let distance = match distances {
            Some(d) if !d.is_null(i) => d.value(i),
            _ => f32::NAN,
        };
        out.push(SearchResult { id: ids.value(i).to_string(), text: texts.value(i).to_string(), metadata: meta, distance });
    }
    Ok(out)
}
