//! Persisted key-value storage for registration state.
//!
//! The crate offers one abstraction, [`KeyValueStore`], and two implementations:
//!
//! - **[`FileStore`]**: durable, one file per key, atomic swap on every write, orphaned
//!   temp files purged when the store is opened.
//! - **[`MemoryStore`]**: volatile and shareable, for tests and embedders that bring their
//!   own persistence.
//!
//! Keys are validated through [`StoreKey`] before they ever touch the filesystem.
//!
//! # Example
//!
//! ```rust
//! use trip_storage::{KeyValueStore, MemoryStore, StoreKey, StorageError};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), StorageError> {
//! let store = MemoryStore::new();
//! let key = StoreKey::try_from("registeredEmailList")?;
//!
//! assert_eq!(store.get(&key).await?, None);
//! store.set(&key, r#"["ana@example.com"]"#).await?;
//! assert!(store.get(&key).await?.is_some());
//! # Ok(())
//! # }
//! ```

mod error;
mod file;
mod key;
mod maintenance;
mod memory;
mod store;

pub use error::{StorageError, StorageErrorExt};
pub use file::{FileStore, FileStoreBuilder, NoRoot, WithRoot};
pub use key::StoreKey;
pub use memory::MemoryStore;
pub use store::KeyValueStore;
