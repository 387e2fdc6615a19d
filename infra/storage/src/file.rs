//! Filesystem-backed [`KeyValueStore`]: one file per key under a root directory.

use crate::error::{StorageError, StorageErrorExt};
use crate::key::StoreKey;
use crate::maintenance::{self, TMP_MARKER};
use crate::store::KeyValueStore;
use async_trait::async_trait;
use private::Sealed;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct FileStoreInner {
    /// Canonical root directory; every key resolves to a direct child of it.
    root: PathBuf,
    tmp_counter: AtomicU64,
}

/// A durable key-value store where each key is a file holding its UTF-8 value.
///
/// Writes use an atomic swap (unique temp file, `fsync`, `rename`), so a crash never
/// leaves a key half-written. Separate keys are written independently: there is no
/// transaction spanning two `set` calls.
///
/// Cloning is cheap; clones share the same root.
///
/// # Example
///
/// ```rust
/// use trip_storage::{FileStore, KeyValueStore, StoreKey, StorageError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), StorageError> {
/// # let tmp = tempfile::tempdir().unwrap();
/// let store = FileStore::builder().root(tmp.path().join("data")).connect().await?;
/// let key = StoreKey::try_from("registrationCounter")?;
///
/// store.set(&key, "4").await?;
/// assert_eq!(store.get(&key).await?.as_deref(), Some("4"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    inner: Arc<FileStoreInner>,
}

impl FileStore {
    #[must_use = "The store is not opened until you call .connect()"]
    pub fn builder() -> FileStoreBuilder {
        FileStoreBuilder::default()
    }

    /// The canonical directory holding the key files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    fn path_of(&self, key: &StoreKey) -> PathBuf {
        self.inner.root.join(key.as_str())
    }

    fn tmp_path_of(&self, key: &StoreKey) -> PathBuf {
        let n = self.inner.tmp_counter.fetch_add(1, Ordering::Relaxed);
        self.inner.root.join(format!("{key}{TMP_MARKER}{}.{n}", std::process::id()))
    }

    async fn sync_root(&self) {
        match fs::File::open(&self.inner.root).await {
            Ok(dir) => {
                if let Err(err) = dir.sync_all().await {
                    warn!(path = %self.inner.root.display(), error = %err, "Directory sync failed");
                }
            },
            Err(err) => {
                warn!(path = %self.inner.root.display(), error = %err, "Directory open failed");
            },
        }
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &StoreKey) -> Result<Option<String>, StorageError> {
        let path = self.path_of(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", path.display()).into()),
                });
            },
        };

        String::from_utf8(bytes).map(Some).map_err(|e| StorageError::Encoding {
            message: e.to_string().into(),
            context: Some(format!("Key {key}").into()),
        })
    }

    async fn set(&self, key: &StoreKey, value: &str) -> Result<(), StorageError> {
        let target = self.path_of(key);
        let temp = self.tmp_path_of(key);

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(value.as_bytes()).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, &target).await {
            // Platforms without atomic replace refuse to rename over an existing file.
            if err.kind() != ErrorKind::AlreadyExists {
                let _ = fs::remove_file(&temp).await;
                return Err(StorageError::Io {
                    source: err,
                    context: Some(
                        format!("Atomic swap failed: {} -> {}", temp.display(), target.display())
                            .into(),
                    ),
                });
            }
            fs::remove_file(&target)
                .await
                .context(format!("Failed to replace {}", target.display()))?;
            fs::rename(&temp, &target)
                .await
                .context(format!("Atomic swap failed: {}", target.display()))?;
        }

        self.sync_root().await;
        debug!(key = %key, bytes = value.len(), "Value stored");
        Ok(())
    }

    async fn remove(&self, key: &StoreKey) -> Result<bool, StorageError> {
        let path = self.path_of(key);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key = %key, "Value removed");
                Ok(true)
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to delete: {}", path.display()).into()),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct BuilderOptions {
    create: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self { create: true }
    }
}

/// Builder state without a root directory.
#[derive(Debug, Default)]
pub struct NoRoot;

/// Builder state with a root directory.
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

/// Opens a [`FileStore`]; the root directory is mandatory.
#[derive(Debug, Default)]
pub struct FileStoreBuilder<S: Sealed = NoRoot> {
    state: S,
    options: BuilderOptions,
}

impl<S: Sealed> FileStoreBuilder<S> {
    /// Whether a missing root directory is created on connect (default `true`).
    #[must_use = "The store is not opened until you call .connect()"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.options.create = enable;
        self
    }
}

impl FileStoreBuilder<NoRoot> {
    #[must_use = "The store is not opened until you call .connect()"]
    pub fn root(self, path: impl Into<PathBuf>) -> FileStoreBuilder<WithRoot> {
        FileStoreBuilder { state: WithRoot(path.into()), options: self.options }
    }
}

impl FileStoreBuilder<WithRoot> {
    /// Opens the store.
    ///
    /// Creates the root when `create(true)`, resolves it to a canonical path, then removes
    /// temp files orphaned by earlier crashes. Cleanup failures are logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] when the root is missing (and `create` is off) or
    /// cannot be created or resolved.
    pub async fn connect(self) -> Result<FileStore, StorageError> {
        let root = self.state.0;

        if self.options.create {
            fs::create_dir_all(&root)
                .await
                .context(format!("Failed to create store root: {}", root.display()))?;
        }

        let canonical = fs::canonicalize(&root)
            .await
            .context(format!("Failed to resolve store root: {}", root.display()))?;

        maintenance::purge_tmp(&canonical).await;
        info!(path = %canonical.display(), "Opened file store");

        Ok(FileStore {
            inner: Arc::new(FileStoreInner { root: canonical, tmp_counter: AtomicU64::new(1) }),
        })
    }
}
