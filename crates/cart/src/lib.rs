//! Go Marketplace Cart - Persistent shopping cart store.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the ordered cart lines and rewrites the whole
//!   snapshot to [`Storage`] after every mutation
//! - [`PresentationGate`] switches a [`RenderTarget`] from a placeholder to
//!   the main view once the store has hydrated
//! - [`storage`] provides memory, file and (with the `sqlite` feature)
//!   SQLite backends
//!
//! # Example
//!
//! ```rust,ignore
//! use go_marketplace_cart::{CartConfig, CartStore};
//!
//! let store = CartStore::open(&CartConfig::from_env()?).await?;
//! store.initialize().await;
//!
//! store.add_to_cart(product).await?;
//! store.increment(&product_id).await?;
//! store.decrement(&product_id).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod gate;
pub mod snapshot;
pub mod storage;
pub mod store;
pub mod view;

pub use config::{CartConfig, ConfigError, StorageBackend};
pub use error::CartError;
pub use gate::{PresentationGate, RenderTarget, Selection};
pub use snapshot::{DEFAULT_CART_KEY, SnapshotError};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
#[cfg(feature = "sqlite")]
pub use storage::SqliteStorage;
pub use store::{CartStore, LoadState};
pub use view::CartView;
