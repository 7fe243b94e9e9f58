//! The cart store.
//!
//! Owns the ordered list of cart lines and keeps the persisted snapshot in
//! step with it. Construct one [`CartStore`] at startup, call
//! [`CartStore::initialize`] once, and hand clones of it to whatever needs
//! the cart.
//!
//! # Write ordering
//!
//! Every mutation holds the item lock from the read through the snapshot
//! write, so writes reach storage in the order the mutations were applied
//! and the last persisted snapshot always matches memory.

use std::sync::Arc;

use go_marketplace_core::{CartItem, NewCartItem, ProductId};
use tokio::sync::{Mutex, MutexGuard, watch};
use tracing::{debug, error, info, instrument, warn};

use crate::config::CartConfig;
use crate::error::{CartError, Result};
use crate::snapshot;
use crate::storage::{self, Storage};
use crate::view::CartView;

/// Hydration state of a [`CartStore`].
///
/// Moves from `Loading` to `Ready` exactly once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
}

/// Shared handle to the cart.
///
/// Cheaply cloneable via `Arc`; all clones see the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    storage: Arc<dyn Storage>,
    key: String,
    items: Mutex<Vec<CartItem>>,
    load_state: watch::Sender<LoadState>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.inner.key)
            .field("load_state", &*self.inner.load_state.borrow())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create a store persisting under `key`. The store starts in
    /// [`LoadState::Loading`] with no items.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        let (load_state, _) = watch::channel(LoadState::Loading);
        Self {
            inner: Arc::new(CartStoreInner {
                storage,
                key: key.into(),
                items: Mutex::new(Vec::new()),
                load_state,
            }),
        }
    }

    /// Open the configured storage backend and create a store on it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the backend cannot be opened.
    pub async fn open(config: &CartConfig) -> Result<Self> {
        let storage = storage::open(config).await?;
        info!(backend = %config.backend, key = %config.cart_key, "Opened cart storage");
        Ok(Self::new(storage, config.cart_key.clone()))
    }

    /// The storage key of the snapshot.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Hydrate the cart from the persisted snapshot.
    ///
    /// An absent, unreadable or undecodable snapshot leaves the cart empty.
    /// Either way the store becomes [`LoadState::Ready`] when this returns.
    /// Later calls do nothing.
    #[instrument(skip(self), fields(key = %self.inner.key))]
    pub async fn initialize(&self) {
        let mut items = self.inner.items.lock().await;
        if self.is_ready() {
            debug!("Cart already initialized");
            return;
        }

        *items = self.load_snapshot().await;
        self.inner.load_state.send_replace(LoadState::Ready);
        info!(lines = items.len(), "Cart hydrated");
    }

    async fn load_snapshot(&self) -> Vec<CartItem> {
        match self.inner.storage.get(&self.inner.key).await {
            Ok(Some(raw)) => snapshot::decode(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding undecodable cart snapshot");
                Vec::new()
            }),
            Ok(None) => {
                debug!("No persisted cart snapshot");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read cart snapshot, starting empty");
                Vec::new()
            }
        }
    }

    /// Current hydration state.
    #[must_use]
    pub fn load_state(&self) -> LoadState {
        *self.inner.load_state.borrow()
    }

    /// True until [`initialize`](Self::initialize) has completed.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.load_state() == LoadState::Loading
    }

    fn is_ready(&self) -> bool {
        self.load_state() == LoadState::Ready
    }

    /// Watch hydration state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.inner.load_state.subscribe()
    }

    /// Lock the item list, failing if hydration has not finished.
    async fn lock_ready(&self) -> Result<MutexGuard<'_, Vec<CartItem>>> {
        if !self.is_ready() {
            return Err(CartError::StoreNotInitialized);
        }
        Ok(self.inner.items.lock().await)
    }

    /// Snapshot of the cart for rendering.
    ///
    /// Never fails: while loading it reports an empty, loading view.
    pub async fn view(&self) -> CartView {
        if !self.is_ready() {
            return CartView::loading();
        }
        CartView {
            items: self.inner.items.lock().await.clone(),
            loading: false,
        }
    }

    /// All cart lines in order.
    ///
    /// # Errors
    ///
    /// Returns `CartError::StoreNotInitialized` before hydration completes.
    pub async fn items(&self) -> Result<Vec<CartItem>> {
        Ok(self.lock_ready().await?.clone())
    }

    /// The cart line for `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns `CartError::StoreNotInitialized` before hydration completes.
    pub async fn get(&self, id: &ProductId) -> Result<Option<CartItem>> {
        let items = self.lock_ready().await?;
        Ok(items.iter().find(|item| &item.id == id).cloned())
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart is incremented instead of duplicated.
    /// Returns the resulting cart line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::StoreNotInitialized` before hydration,
    /// `CartError::QuantityOverflow` at the quantity limit, and
    /// `CartError::Storage` if the snapshot write fails (the line is still
    /// added in memory).
    #[instrument(skip(self, item), fields(key = %self.inner.key, id = %item.id))]
    pub async fn add_to_cart(&self, item: NewCartItem) -> Result<CartItem> {
        let mut items = self.lock_ready().await?;

        let line = if items.iter().any(|existing| existing.id == item.id) {
            increment_line(&mut items, &item.id)?
        } else {
            let line = item.into_cart_item();
            items.push(line.clone());
            line
        };

        self.persist(&items).await?;
        debug!(quantity = line.quantity, "Added to cart");
        Ok(line)
    }

    /// Increase the quantity of a cart line by one.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the product is not in the cart
    /// (nothing is written), plus the errors of
    /// [`add_to_cart`](Self::add_to_cart).
    #[instrument(skip(self), fields(key = %self.inner.key))]
    pub async fn increment(&self, id: &ProductId) -> Result<CartItem> {
        let mut items = self.lock_ready().await?;
        let line = increment_line(&mut items, id)?;
        self.persist(&items).await?;
        debug!(quantity = line.quantity, "Incremented cart line");
        Ok(line)
    }

    /// Decrease the quantity of a cart line by one, removing the line when
    /// it would drop to zero.
    ///
    /// Returns the updated line, or `None` if the line was removed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the product is not in the cart
    /// (nothing is written), `CartError::StoreNotInitialized` before
    /// hydration, and `CartError::Storage` if the snapshot write fails.
    #[instrument(skip(self), fields(key = %self.inner.key))]
    pub async fn decrement(&self, id: &ProductId) -> Result<Option<CartItem>> {
        let mut items = self.lock_ready().await?;

        let line = items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| CartError::ItemNotFound(id.clone()))?;

        let remaining = if line.quantity > 1 {
            line.quantity -= 1;
            Some(line.clone())
        } else {
            None
        };
        if remaining.is_none() {
            items.retain(|item| &item.id != id);
        }

        self.persist(&items).await?;
        debug!(
            quantity = remaining.as_ref().map_or(0, |line| line.quantity),
            "Decremented cart line"
        );
        Ok(remaining)
    }

    /// Overwrite the persisted snapshot with `items`.
    async fn persist(&self, items: &[CartItem]) -> Result<()> {
        let raw = snapshot::encode(items)?;
        if let Err(e) = self.inner.storage.set(&self.inner.key, &raw).await {
            error!(error = %e, lines = items.len(), "Failed to persist cart snapshot");
            return Err(e.into());
        }
        debug!(lines = items.len(), bytes = raw.len(), "Persisted cart snapshot");
        Ok(())
    }
}

fn increment_line(items: &mut [CartItem], id: &ProductId) -> Result<CartItem> {
    let line = items
        .iter_mut()
        .find(|item| &item.id == id)
        .ok_or_else(|| CartError::ItemNotFound(id.clone()))?;
    line.quantity = line
        .quantity
        .checked_add(1)
        .ok_or_else(|| CartError::QuantityOverflow(id.clone()))?;
    Ok(line.clone())
}
