//! LanceDB connection helpers.

use std::fs;
use std::path::Path;

use lancedb::{connect, Connection};

use docrag_core::error::{Error, Result};

/// Open (creating the directory if needed) the database rooted at `dir`.
pub async fn open_db(dir: &Path) -> Result<Connection> {
    fs::create_dir_all(dir)?;
    connect(dir.to_string_lossy().as_ref()).execute().await.map_err(Error::storage)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let names = conn.table_names().execute().await.map_err(Error::storage)?;
    Ok(names.iter().any(|n| n == name))
}

/// LanceDB table names: non-empty, alphanumerics plus `_`, `-` and `.`.
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')) {
        return Err(Error::InvalidConfig(format!("invalid collection name '{name}'")));
    }
    Ok(())
}
