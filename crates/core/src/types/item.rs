//! Cart line items.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// A product as offered to the cart, before it has a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    pub price: Price,
}

impl NewCartItem {
    /// Turn the product into a cart line holding a single unit.
    #[must_use]
    pub fn into_cart_item(self) -> CartItem {
        CartItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity: 1,
        }
    }
}

/// One line of the cart.
///
/// The field names double as the persisted snapshot keys, so renaming a
/// field changes the on-disk format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    pub price: Price,
    /// Always at least 1 while the item is in a cart.
    pub quantity: u32,
}

impl CartItem {
    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.line_total(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> NewCartItem {
        NewCartItem {
            id: ProductId::parse("a").unwrap(),
            title: "T".to_string(),
            image_url: "u".to_string(),
            price: Price::parse("10").unwrap(),
        }
    }

    #[test]
    fn test_into_cart_item_starts_at_one() {
        let item = sample().into_cart_item();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.id.as_str(), "a");
        assert_eq!(item.title, "T");
    }

    #[test]
    fn test_snapshot_field_names() {
        let json = serde_json::to_value(sample().into_cart_item()).unwrap();
        let obj = json.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["id", "image_url", "price", "quantity", "title"]);
        assert_eq!(obj["quantity"], 1);
    }

    #[test]
    fn test_line_total() {
        let mut item = sample().into_cart_item();
        item.quantity = 3;
        assert_eq!(item.line_total(), Price::parse("30").unwrap());
    }
}
