//! Recursive character splitter.
//!
//! Tries separators in priority order (paragraph, line, `。`, `、`, space,
//! single character). Pieces shorter than `chunk_size` are greedily packed
//! into chunks; longer pieces are split again with the next separator.
//! Separators stay attached to the start of the piece that follows them,
//! so every chunk is a verbatim (trimmed) slice of the input. Lengths are
//! counted in characters, not bytes.

use crate::config::Settings;
use crate::error::{Error, Result};

pub const DEFAULT_SEPARATORS: [&str; 6] = ["\n\n", "\n", "。", "、", " ", ""];

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self { chunk_size: 1000, chunk_overlap: 200, separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect() }
    }
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be greater than 0".to_string()));
        }
        if chunk_overlap > chunk_size {
            return Err(Error::InvalidConfig(format!("chunk_overlap ({chunk_overlap}) is larger than chunk_size ({chunk_size})")));
        }
        Ok(Self { chunk_size, chunk_overlap, ..Self::default() })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> { Self::new(settings.chunk_size, settings.chunk_overlap) }

    pub fn chunk_size(&self) -> usize { self.chunk_size }
    pub fn chunk_overlap(&self) -> usize { self.chunk_overlap }

    pub fn split(&self, text: &str) -> Vec<String> { self.split_recursive(text, &self.separators) }

    /// Split each text and flatten, preserving input order.
    pub fn split_many<S: AsRef<str>>(&self, texts: &[S]) -> Vec<String> {
        texts.iter().flat_map(|t| self.split(t.as_ref())).collect()
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate.as_str();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut good: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                good.push(piece);
                continue;
            }
            if !good.is_empty() {
                chunks.extend(self.merge(&good));
                good.clear();
            }
            if remaining.is_empty() {
                chunks.extend(trimmed(piece));
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }
        if !good.is_empty() {
            chunks.extend(self.merge(&good));
        }
        chunks
    }

    /// Pack consecutive pieces into chunks of at most `chunk_size`, carrying
    /// up to `chunk_overlap` trailing characters into the next chunk.
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut window: std::collections::VecDeque<&str> = std::collections::VecDeque::new();
        let mut total = 0usize;
        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                if let Some(doc) = join_trimmed(&window) { docs.push(doc); }
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }
            window.push_back(piece);
            total += len;
        }
        if let Some(doc) = join_trimmed(&window) { docs.push(doc); }
        docs
    }
}

fn char_len(s: &str) -> usize { s.chars().count() }

fn join_trimmed(window: &std::collections::VecDeque<&str>) -> Option<String> {
    let joined: String = window.iter().copied().collect();
    trimmed(&joined)
}

fn trimmed(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

/// Split on `separator`, keeping each occurrence at the start of the piece after it.
/// Empty pieces are dropped; an empty separator yields single characters.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]).collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}
