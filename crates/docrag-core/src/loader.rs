use std::fs;
use std::io;
use std::panic;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};

pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "md", "markdown"];

#[derive(Debug, Clone, Serialize)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a bulk load. Files that failed are listed, never silently dropped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub loaded: Vec<LoadedDocument>,
    pub skipped: Vec<SkippedDocument>,
}

impl LoadReport {
    pub fn texts(&self) -> Vec<String> { self.loaded.iter().map(|d| d.text.clone()).collect() }
}

/// Reads PDF and Markdown files into plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self { Self }

    pub fn load_document(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let extension = path.extension().map(|e| e.to_string_lossy().to_lowercase()).unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(Error::FormatUnsupported { path: path.to_path_buf(), extension });
        }
        if extension == "pdf" { self.load_pdf(path) } else { self.read_file_content(path) }
    }

    /// Load every file under `dir` (recursively, sorted by path).
    pub fn load_documents(&self, dir: &Path) -> Result<LoadReport> {
        if !dir.is_dir() {
            return Err(Error::NotFound(dir.to_path_buf()));
        }
        let mut report = LoadReport::default();
        for path in self.list_files(dir) {
            match self.load_document(&path) {
                Ok(text) => {
                    debug!(path = %path.display(), chars = text.chars().count(), "loaded document");
                    report.loaded.push(LoadedDocument { path, text });
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping document");
                    report.skipped.push(SkippedDocument { path, reason: e.to_string() });
                }
            }
        }
        info!(dir = %dir.display(), loaded = report.loaded.len(), skipped = report.skipped.len(), "finished loading documents");
        Ok(report)
    }

    fn list_files(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();
        files.sort();
        files
    }

    /// pdf-extract panics on some malformed files; that is reported as a read error.
    fn load_pdf(&self, path: &Path) -> Result<String> {
        let invalid = |msg: String| Error::Io(io::Error::new(io::ErrorKind::InvalidData, msg));
        match panic::catch_unwind(|| pdf_extract::extract_text(path)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(invalid(format!("PDF extraction failed: {e}"))),
            Err(_) => Err(invalid("PDF extraction panicked".to_string())),
        }
    }

    fn read_file_content(&self, path: &Path) -> Result<String> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(content),
            Err(_) => Ok(String::from_utf8_lossy(&fs::read(path)?).to_string()),
        }
    }
}
