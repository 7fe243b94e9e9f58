//! Cart store error type.

use go_marketplace_core::ProductId;
use thiserror::Error;

use crate::snapshot::SnapshotError;
use crate::storage::StorageError;

/// Errors returned by [`CartStore`](crate::CartStore) operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The store was used before `initialize()` finished hydrating it.
    #[error("cart store used before initialization completed")]
    StoreNotInitialized,

    /// No cart line exists for the product.
    #[error("no cart line for product {0}")]
    ItemNotFound(ProductId),

    /// Incrementing would exceed the maximum quantity.
    #[error("quantity overflow for product {0}")]
    QuantityOverflow(ProductId),

    /// Writing the snapshot failed. In-memory state already reflects the
    /// mutation.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Encoding the snapshot failed.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
