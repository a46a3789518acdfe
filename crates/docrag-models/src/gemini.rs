//! Minimal client for the Gemini REST API (`embedContent`, `generateContent`).

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use docrag_core::config::Settings;

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("Request to Gemini API failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} from Gemini API: {body}")]
    Http { status: u16, body: String },

    #[error("Unexpected Gemini response: {0}")]
    Parse(String),
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(settings: &Settings) -> Result<Self, GeminiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            api_key: settings.google_api_key.clone(),
        })
    }

    pub async fn embed_content(&self, model: &str, text: &str) -> Result<Vec<f32>, GeminiError> {
        let body = json!({
            "model": format!("models/{}", model_path(model)),
            "content": { "parts": [{ "text": text }] },
        });
        let response = self.post(model, "embedContent", &body).await?;
        parse_embedding(&response)
    }

    pub async fn generate_content(&self, model: &str, prompt: &str) -> Result<String, GeminiError> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });
        let response = self.post(model, "generateContent", &body).await?;
        parse_generation(&response)
    }

    async fn post(&self, model: &str, method: &str, body: &Value) -> Result<Value, GeminiError> {
        let url = format!("{}/models/{}:{}", self.base_url, model_path(model), method);
        debug!(url = url.as_str(), "Sending Gemini request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GeminiError::Http { status: status.as_u16(), body: text });
        }
        serde_json::from_str(&text).map_err(|e| GeminiError::Parse(format!("Invalid JSON in response: {e}")))
    }
}

/// Accepts both `embedding-001` and `models/embedding-001`.
fn model_path(model: &str) -> &str { model.strip_prefix("models/").unwrap_or(model) }

pub fn parse_embedding(body: &Value) -> Result<Vec<f32>, GeminiError> {
    let values = body["embedding"]["values"]
        .as_array()
        .ok_or_else(|| GeminiError::Parse("Missing 'embedding.values' array".to_string()))?;
    if values.is_empty() {
        return Err(GeminiError::Parse("Empty embedding".to_string()));
    }
    values
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32).ok_or_else(|| GeminiError::Parse(format!("Non-numeric embedding value: {v}"))))
        .collect()
}

/// Concatenate the text parts of the first candidate.
pub fn parse_generation(body: &Value) -> Result<String, GeminiError> {
    let candidates = body["candidates"]
        .as_array()
        .ok_or_else(|| GeminiError::Parse("Missing 'candidates' array in response".to_string()))?;
    let candidate = candidates
        .first()
        .ok_or_else(|| GeminiError::Parse("Empty 'candidates' array in response".to_string()))?;
    let parts = candidate["content"]["parts"]
        .as_array()
        .ok_or_else(|| GeminiError::Parse("Missing 'parts' array in candidate content".to_string()))?;
    Ok(parts.iter().filter_map(|p| p.get("text").and_then(Value::as_str)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_embedding_values() {
        let body = json!({ "embedding": { "values": [0.25, -1.0, 0.5] } });
        assert_eq!(parse_embedding(&body).unwrap(), vec![0.25, -1.0, 0.5]);
    }

    #[test]
    fn parse_embedding_rejects_malformed() {
        assert!(parse_embedding(&json!({})).is_err());
        assert!(parse_embedding(&json!({ "embedding": { "values": [] } })).is_err());
        assert!(parse_embedding(&json!({ "embedding": { "values": ["x"] } })).is_err());
    }

    #[test]
    fn parse_generation_joins_parts() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "1. Summary." }, { "text": "\n2. Details." }], "role": "model" },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(parse_generation(&body).unwrap(), "1. Summary.\n2. Details.");
    }

    #[test]
    fn parse_generation_missing_candidates() {
        assert!(parse_generation(&json!({ "promptFeedback": {} })).is_err());
        assert!(parse_generation(&json!({ "candidates": [] })).is_err());
    }

    #[test]
    fn model_path_strips_prefix() {
        assert_eq!(model_path("models/embedding-001"), "embedding-001");
        assert_eq!(model_path("gemini-1.5-pro"), "gemini-1.5-pro");
    }
}
