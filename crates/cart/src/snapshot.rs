//! Cart snapshot encoding.
//!
//! A snapshot is the whole cart serialized as a JSON array, in cart order:
//!
//! ```json
//! [{"id":"1","title":"Mug","image_url":"https://...","price":19.99,"quantity":2}]
//! ```
//!
//! Decoding enforces the cart invariants, so a snapshot written by a buggy
//! client (duplicate IDs, zero quantities) is rejected as a whole rather
//! than partially loaded.

use std::collections::HashSet;

use go_marketplace_core::{CartItem, ProductId};
use thiserror::Error;

/// Storage key the cart snapshot lives under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "@GoMarketplace:products";

/// Errors raised while encoding or decoding a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot is not a JSON array of cart items.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The same product appears on more than one line.
    #[error("duplicate cart line for product {0}")]
    DuplicateId(ProductId),

    /// A line has quantity zero.
    #[error("cart line for product {0} has zero quantity")]
    ZeroQuantity(ProductId),
}

/// Serialize the full item sequence.
///
/// # Errors
///
/// Returns `SnapshotError::Json` if serialization fails.
pub fn encode(items: &[CartItem]) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(items)?)
}

/// Parse and validate a persisted snapshot.
///
/// # Errors
///
/// Returns `SnapshotError` if the input is not valid JSON, does not match the
/// item shape, or breaks a cart invariant.
pub fn decode(raw: &str) -> Result<Vec<CartItem>, SnapshotError> {
    let items: Vec<CartItem> = serde_json::from_str(raw)?;

    let mut seen = HashSet::with_capacity(items.len());
    for item in &items {
        if item.quantity == 0 {
            return Err(SnapshotError::ZeroQuantity(item.id.clone()));
        }
        if !seen.insert(&item.id) {
            return Err(SnapshotError::DuplicateId(item.id.clone()));
        }
    }

    Ok(items)
}
