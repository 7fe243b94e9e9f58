//! Key-value persistence for cart snapshots.
//!
//! # Backends
//!
//! - [`MemoryStorage`] - Process-local map, used by tests and `memory` mode
//! - [`FileStorage`] - One file per key inside a data directory
//! - `SqliteStorage` - `kv_store` table in a SQLite database (`sqlite` feature)
//!
//! Every backend stores whole values: `set` replaces the previous value for
//! the key, it never appends.

mod file;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{CartConfig, StorageBackend};

pub use file::FileStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite operation failed.
    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Backend-specific failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Async key-value persistence API.
///
/// Implementations must be safe to share between tasks; the cart store
/// holds them behind an `Arc<dyn Storage>`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Open the backend selected by `config`.
///
/// # Errors
///
/// Returns `StorageError` if the data directory or database cannot be
/// opened, or if the SQLite backend is requested without the `sqlite`
/// feature.
pub async fn open(config: &CartConfig) -> Result<Arc<dyn Storage>, StorageError> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),
        StorageBackend::File => Ok(Arc::new(FileStorage::open(&config.data_dir).await?)),
        #[cfg(feature = "sqlite")]
        StorageBackend::Sqlite => Ok(Arc::new(
            SqliteStorage::connect(&config.database_url).await?,
        )),
        #[cfg(not(feature = "sqlite"))]
        StorageBackend::Sqlite => Err(StorageError::Backend(
            "sqlite backend requires the `sqlite` feature".to_string(),
        )),
    }
}
