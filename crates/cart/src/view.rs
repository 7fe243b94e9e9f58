//! Read-only cart state handed to render targets.

use go_marketplace_core::{CartItem, Price};

/// A point-in-time copy of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartView {
    /// Cart lines in insertion order. Empty while loading.
    pub items: Vec<CartItem>,
    /// True until the initial hydration attempt has finished.
    pub loading: bool,
}

impl CartView {
    /// The view reported while hydration is still in flight.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            items: Vec::new(),
            loading: true,
        }
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of line totals, for display.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
