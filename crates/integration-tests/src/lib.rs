//! Integration tests for Go Marketplace.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p go-marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart mutation protocol and snapshot persistence
//! - `presentation_gate` - Loading to ready screen selection
//! - `storage_backends` - The same cart scenarios against every backend
//!
//! This library holds shared fixtures for those test files.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use go_marketplace_cart::{CartStore, DEFAULT_CART_KEY, MemoryStorage, Storage, StorageError};
use go_marketplace_core::{NewCartItem, Price, ProductId};

/// Build a product offer.
///
/// # Panics
///
/// Panics if `id` is empty or `price` is not a non-negative decimal.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn product(id: &str, price: &str) -> NewCartItem {
    NewCartItem {
        id: ProductId::parse(id).unwrap(),
        title: format!("Product {id}"),
        image_url: format!("https://cdn.example/{id}.png"),
        price: Price::parse(price).unwrap(),
    }
}

/// Parse a product ID.
///
/// # Panics
///
/// Panics if `id` is empty.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn pid(id: &str) -> ProductId {
    ProductId::parse(id).unwrap()
}

/// Storage that records every write and can be told to fail.
///
/// Writes that succeed are forwarded to an inner [`MemoryStorage`].
#[derive(Debug, Default)]
pub struct RecordingStorage {
    inner: MemoryStorage,
    writes: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
    yield_on_write: AtomicBool,
}

impl RecordingStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a snapshot already stored under the default key.
    #[must_use]
    pub fn with_snapshot(raw: &str) -> Self {
        Self {
            inner: MemoryStorage::with_value(DEFAULT_CART_KEY, raw),
            ..Self::default()
        }
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Yield to the scheduler inside every write, so concurrent callers
    /// interleave as much as the store allows.
    pub fn set_yield_on_write(&self, enabled: bool) {
        self.yield_on_write.store(enabled, Ordering::SeqCst);
    }

    /// Every value successfully written, in order.
    ///
    /// # Panics
    ///
    /// Panics if the write log lock is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.yield_on_write.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("injected write failure".to_string()));
        }
        self.inner.set(key, value).await?;
        self.writes
            .lock()
            .map_err(|_| StorageError::Backend("write log poisoned".to_string()))?
            .push(value.to_owned());
        Ok(())
    }
}

/// A hydrated store over a fresh [`RecordingStorage`].
pub async fn recording_store() -> (CartStore, Arc<RecordingStorage>) {
    let storage = Arc::new(RecordingStorage::new());
    let store = CartStore::new(storage.clone(), DEFAULT_CART_KEY);
    store.initialize().await;
    (store, storage)
}
