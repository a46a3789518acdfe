use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use docrag_core::config::{Config, Settings};
use docrag_core::types::Metadata;

/// `.env`, then tracing (`RUST_LOG`, default `info`), then validated settings.
pub fn bootstrap() -> Result<Settings> {
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .try_init();
    let settings = Config::load().and_then(|c| c.settings()).context("Error loading config")?;
    Ok(settings)
}

/// Parse `key=value` for repeated metadata/filter flags.
pub fn parse_key_val(s: &str) -> Result<(String, String)> {
    let (k, v) = s.split_once('=').ok_or_else(|| anyhow!("expected key=value, got '{s}'"))?;
    if k.trim().is_empty() {
        return Err(anyhow!("empty key in '{s}'"));
    }
    Ok((k.trim().to_string(), v.to_string()))
}

pub fn pairs_to_metadata(pairs: Vec<(String, String)>) -> Option<Metadata> {
    if pairs.is_empty() { None } else { Some(pairs.into_iter().collect()) }
}
