pub mod config;
pub mod error;
pub mod loader;
pub mod splitter;
pub mod traits;
pub mod types;

pub use config::{Config, Settings};
pub use error::{Error, Result};
pub use loader::{DocumentLoader, LoadReport, LoadedDocument, SkippedDocument};
pub use splitter::TextSplitter;
pub use traits::{Embedder, LanguageModel, VectorIndex};
pub use types::*;
