use docrag_core::config::Settings;
use docrag_core::error::Error;
use docrag_core::traits::{Embedder, LanguageModel};
use docrag_models::{FakeEmbedder, FakeLanguageModel, GeminiEmbedder, GeminiLanguageModel};

fn unreachable_settings() -> Settings {
    let mut s = Settings::new("test-key");
    s.api_base_url = "http://127.0.0.1:9/v1beta".to_string();
    s.connect_timeout_secs = 1;
    s.request_timeout_secs = 2;
    s
}

#[tokio::test]
async fn fake_embedder_is_deterministic_and_normalized() {
    let e = FakeEmbedder::new(64);
    let a = e.embed("The quick brown fox").await.unwrap();
    let b = e.embed("The quick brown fox").await.unwrap();
    let c = e.embed("something else entirely").await.unwrap();
    assert_eq!(a.len(), 64);
    assert_eq!(a, b);
    assert_ne!(a, c);
    let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-4);
}

#[tokio::test]
async fn fake_embedder_handles_text_without_words() {
    let e = FakeEmbedder::default();
    let v = e.embed("。。。").await.unwrap();
    assert_eq!(v.len(), docrag_models::GEMINI_EMBEDDING_DIM);
    assert!(v.iter().any(|x| *x != 0.0));
}

#[tokio::test]
async fn embed_batch_keeps_input_order() {
    let e = FakeEmbedder::new(32);
    let texts = vec!["alpha".to_string(), "bravo".to_string()];
    let batch = e.embed_batch(&texts).await.unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0], e.embed("alpha").await.unwrap());
    assert_eq!(batch[1], e.embed("bravo").await.unwrap());
}

#[tokio::test]
async fn gemini_embedder_transport_error_is_embedding_failure() {
    let e = GeminiEmbedder::new(&unreachable_settings()).unwrap();
    assert_eq!(e.model_id(), "gemini:embedding-001");
    let err = e.embed("hello").await.unwrap_err();
    assert!(matches!(err, Error::EmbeddingFailure(_)), "got {err:?}");
}

#[tokio::test]
async fn gemini_generator_transport_error_is_generation_failure() {
    let g = GeminiLanguageModel::new(&unreachable_settings()).unwrap();
    let err = g.generate("hello").await.unwrap_err();
    assert!(matches!(err, Error::GenerationFailure(_)), "got {err:?}");
}

#[tokio::test]
async fn fake_language_model_records_prompts() {
    let llm = FakeLanguageModel::with_reply("canned");
    assert_eq!(llm.generate("first").await.unwrap(), "canned");
    assert_eq!(llm.generate("second").await.unwrap(), "canned");
    assert_eq!(llm.calls(), 2);
    assert_eq!(llm.last_prompt().as_deref(), Some("second"));
}

#[tokio::test]
async fn default_embedder_honours_fake_flag() {
    // Force fake embedder to avoid network calls
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");
    let embedder = docrag_models::get_default_embedder(&Settings::new("unused")).expect("embedder");
    assert!(embedder.model_id().starts_with("fake:"));
    let v = embedder.embed("hello world").await.unwrap();
    assert_eq!(v.len(), docrag_models::GEMINI_EMBEDDING_DIM);
}
