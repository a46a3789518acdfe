use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use docrag_core::error::Result;
use docrag_core::traits::LanguageModel;

use crate::prompt::{build_prompt, format_sources};
use crate::retriever::Retriever;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub answer: String,
    pub sources: String,
}

pub struct Generator {
    retriever: Retriever,
    model: Arc<dyn LanguageModel>,
}

impl Generator {
    pub fn new(retriever: Retriever, model: Arc<dyn LanguageModel>) -> Self { Self { retriever, model } }

    pub fn retriever(&self) -> &Retriever { &self.retriever }

    /// Retrieve, prompt, generate. The model is called even when nothing was retrieved.
    pub async fn answer(&self, query: &str) -> Result<Answer> {
        let results = self.retriever.retrieve(query, None, None).await?;
        let context = results.iter().map(|r| r.text.as_str()).collect::<Vec<_>>().join("\n");
        let prompt = build_prompt(query, &context);
        info!(model = self.model.model_id(), documents = results.len(), "generating answer");
        let answer = self.model.generate(&prompt).await?;
        Ok(Answer { answer, sources: format_sources(&results) })
    }
}
