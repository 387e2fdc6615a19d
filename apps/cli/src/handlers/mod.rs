pub mod check;
pub mod register;
pub mod status;

use anyhow::{Context, Result};
use trip_kernel::domain::config::AppConfig;
use trip_storage::FileStore;

/// Opens the file store under `storage.data_dir`, creating the directory on first use.
async fn open_store(config: &AppConfig) -> Result<FileStore> {
    let root = &config.storage.data_dir;
    FileStore::builder()
        .root(root)
        .connect()
        .await
        .with_context(|| format!("Opening registration data in {}", root.display()))
}
