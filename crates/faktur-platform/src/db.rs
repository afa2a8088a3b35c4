use anyhow::{Context, Result};
use faktur_store::JsonFileStore;
use tracing::info;

use crate::config::AppConfig;

/// Opens the JSON store under the configured data directory, creating the
/// directory when it does not exist yet.
pub async fn open_store(config: &AppConfig) -> Result<JsonFileStore> {
    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("failed to create data dir {}", config.data_dir.display()))?;

    info!(data_dir = %config.data_dir.display(), "invoice store opened");
    Ok(JsonFileStore::new(&config.data_dir))
}
