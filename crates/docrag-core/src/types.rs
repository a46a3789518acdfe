//! Domain types shared by the store, index and generator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ChunkId = String;
pub type Metadata = BTreeMap<String, String>;

/// Equality-only filter: every pair must be present in a chunk's metadata.
pub type MetadataFilter = Metadata;

/// A bounded segment of source text as stored in a collection.
///
/// - `id`: unique within the collection; re-using an id overwrites the row
/// - `text`: the payload that was embedded
/// - `metadata`: free-form string pairs (`source`, `type`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub metadata: Metadata,
}

/// Read-only projection of a stored chunk returned by a query.
///
/// `distance` is the cosine distance to the query embedding; lower is closer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: ChunkId,
    pub text: String,
    pub metadata: Metadata,
    pub distance: f32,
}

impl SearchResult {
    pub fn source(&self) -> Option<&str> { self.metadata.get("source").map(String::as_str) }
}

pub fn matches_filter(metadata: &Metadata, filter: &MetadataFilter) -> bool {
    filter.iter().all(|(k, v)| metadata.get(k) == Some(v))
}

/// Metadata assigned to the chunk at batch `position` when the caller gives none.
pub fn default_metadata(position: usize) -> Metadata {
    let mut m = Metadata::new();
    m.insert("source".to_string(), format!("document_{position}"));
    m.insert("type".to_string(), "markdown".to_string());
    m
}

/// How caller-supplied metadata combines with the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataPolicy {
    /// Empty or absent metadata becomes the defaults; anything else is used verbatim.
    #[default]
    Replace,
    /// Defaults overlaid key by key with the caller's pairs.
    Merge,
}

impl MetadataPolicy {
    pub fn resolve(self, supplied: Option<&Metadata>, position: usize) -> Metadata {
        match (self, supplied) {
            (_, None) => default_metadata(position),
            (Self::Replace, Some(m)) if m.is_empty() => default_metadata(position),
            (Self::Replace, Some(m)) => m.clone(),
            (Self::Merge, Some(m)) => {
                let mut merged = default_metadata(position);
                merged.extend(m.iter().map(|(k, v)| (k.clone(), v.clone())));
                merged
            }
        }
    }
}

/// Assigns ids to chunks before they are written.
pub trait IdStrategy: Send + Sync {
    fn chunk_id(&self, position: usize, text: &str, metadata: &Metadata) -> ChunkId;
}

/// `doc_0, doc_1, ...` by position in the ingestion batch.
///
/// Repeated ingestions into one collection reuse the same ids and overwrite
/// each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalIds;

impl IdStrategy for PositionalIds {
    fn chunk_id(&self, position: usize, _text: &str, _metadata: &Metadata) -> ChunkId { format!("doc_{position}") }
}

/// Hash of metadata and text, so identical content maps to the same row.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHashIds;

impl IdStrategy for ContentHashIds {
    fn chunk_id(&self, _position: usize, text: &str, metadata: &Metadata) -> ChunkId {
        let mut hasher = blake3::Hasher::new();
        for (k, v) in metadata {
            hasher.update(k.as_bytes());
            hasher.update(b"=");
            hasher.update(v.as_bytes());
            hasher.update(b"\n");
        }
        hasher.update(&[0u8]);
        hasher.update(text.as_bytes());
        format!("chunk_{}", hasher.finalize().to_hex())
    }
}

/// Config-facing selector for the built-in id strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdScheme {
    Positional,
    #[default]
    ContentHash,
}

impl IdScheme {
    pub fn strategy(self) -> Box<dyn IdStrategy> {
        match self {
            Self::Positional => Box::new(PositionalIds),
            Self::ContentHash => Box::new(ContentHashIds),
        }
    }
}
