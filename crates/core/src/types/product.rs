//! Product, cart line item, and wishlist entry records.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Customer rating summary attached to a catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Average rating (0-5).
    pub rate: f64,
    /// Number of ratings.
    pub count: u64,
}

/// A catalog product, read-only once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub category: String,
    pub description: String,
    /// Image URL.
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

/// A cart entry pairing a product with a quantity of at least one.
///
/// The quantity is private so that the floor can only be crossed through
/// [`CartLineItem::decremented`], which refuses to go below one.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem {
    pub product: Product,
    quantity: u32,
}

impl CartLineItem {
    /// A new line item with quantity one.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    /// The product id this line belongs to.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// How many units of the product are in the cart.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// A copy of this line with one more unit.
    #[must_use]
    pub fn incremented(&self) -> Self {
        Self {
            product: self.product.clone(),
            quantity: self.quantity.saturating_add(1),
        }
    }

    /// A copy of this line with one fewer unit, never below one.
    #[must_use]
    pub fn decremented(&self) -> Self {
        Self {
            product: self.product.clone(),
            quantity: self.quantity.saturating_sub(1).max(1),
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// A wishlist entry. Carries the product but no quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct WishlistEntry {
    pub product: Product,
}

impl WishlistEntry {
    /// The product id this entry refers to.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }
}

impl From<Product> for WishlistEntry {
    fn from(product: Product) -> Self {
        Self { product }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: u64, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::parse(price).unwrap(),
            category: "electronics".to_string(),
            description: String::new(),
            image: String::new(),
            rating: None,
        }
    }

    #[test]
    fn test_new_line_has_quantity_one() {
        let line = CartLineItem::new(product(1, "9.99"));
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.id(), ProductId::new(1));
    }

    #[test]
    fn test_decrement_floors_at_one() {
        let line = CartLineItem::new(product(1, "9.99"));
        assert_eq!(line.decremented().quantity(), 1);
        assert_eq!(line.incremented().incremented().decremented().quantity(), 2);
    }

    #[test]
    fn test_line_total() {
        let line = CartLineItem::new(product(1, "10.00")).incremented();
        assert_eq!(line.line_total().to_string(), "20.00");
    }

    #[test]
    fn test_product_json_shape() {
        let json = r#"{
            "id": 3,
            "title": "Mens Cotton Jacket",
            "price": 55.99,
            "category": "men's clothing",
            "description": "great outerwear",
            "image": "https://example.com/jacket.jpg",
            "rating": {"rate": 4.7, "count": 500}
        }"#;
        let parsed: Product = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id, ProductId::new(3));
        assert_eq!(parsed.price.to_string(), "55.99");
        assert_eq!(parsed.rating.map(|r| r.count), Some(500));
    }
}
