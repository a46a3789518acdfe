pub mod generator;
pub mod pipeline;
pub mod prompt;
pub mod retriever;
pub mod store;

pub use generator::{Answer, Generator};
pub use pipeline::{InitReport, Pipeline, PipelineState};
pub use retriever::{format_context, RetrievalConfig, Retriever};
pub use store::DocumentStore;
