//! The cart and wishlist store.
//!
//! Every mutation is computed by a pure reducer in [`reducers`] that takes the
//! current collection and returns a freshly built one. [`Store`] swaps the
//! result in and advances its revision only when the value actually changed,
//! so views can detect updates by comparing [`Store::revision`].
//!
//! # Example
//!
//! ```rust
//! use pocketcart_core::{Price, Product, ProductId, Store};
//!
//! let product = Product {
//!     id: ProductId::new(1),
//!     title: "Backpack".to_string(),
//!     price: Price::parse("100").unwrap(),
//!     category: "bags".to_string(),
//!     description: String::new(),
//!     image: String::new(),
//!     rating: None,
//! };
//!
//! let mut store = Store::new();
//! store.add_to_cart(&product);
//! store.add_to_cart(&product);
//! assert_eq!(store.cart().len(), 1);
//! assert_eq!(store.total_items(), 2);
//! assert_eq!(store.total_price().to_string(), "200.00");
//! ```

use crate::types::{CartLineItem, Price, Product, ProductId, WishlistEntry};

/// A single store mutation, as dispatched by a view.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    AddToCart(Product),
    RemoveFromCart(ProductId),
    IncreaseQuantity(ProductId),
    DecreaseQuantity(ProductId),
    ClearCart,
    AddToWishlist(Product),
    RemoveFromWishlist(ProductId),
}

impl StoreAction {
    /// Short machine-readable name, used for logs and breadcrumbs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddToCart(_) => "add_to_cart",
            Self::RemoveFromCart(_) => "remove_from_cart",
            Self::IncreaseQuantity(_) => "increase_quantity",
            Self::DecreaseQuantity(_) => "decrease_quantity",
            Self::ClearCart => "clear_cart",
            Self::AddToWishlist(_) => "add_to_wishlist",
            Self::RemoveFromWishlist(_) => "remove_from_wishlist",
        }
    }

    /// The product the action targets, if any.
    #[must_use]
    pub const fn product_id(&self) -> Option<ProductId> {
        match self {
            Self::AddToCart(p) | Self::AddToWishlist(p) => Some(p.id),
            Self::RemoveFromCart(id)
            | Self::IncreaseQuantity(id)
            | Self::DecreaseQuantity(id)
            | Self::RemoveFromWishlist(id) => Some(*id),
            Self::ClearCart => None,
        }
    }
}

/// Holder of the cart line items and wishlist entries.
///
/// Both collections keep insertion order and are only changed through the
/// methods below.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    cart: Vec<CartLineItem>,
    wishlist: Vec<WishlistEntry>,
    revision: u64,
}

impl Store {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cart line items in insertion order.
    #[must_use]
    pub fn cart(&self) -> &[CartLineItem] {
        &self.cart
    }

    /// Wishlist entries in insertion order.
    #[must_use]
    pub fn wishlist(&self) -> &[WishlistEntry] {
        &self.wishlist
    }

    /// Number of value-changing mutations applied so far.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply an action, returning whether anything changed.
    pub fn dispatch(&mut self, action: &StoreAction) -> bool {
        match action {
            StoreAction::AddToCart(product) => {
                self.replace_cart(reducers::add_to_cart(&self.cart, product))
            }
            StoreAction::RemoveFromCart(id) => {
                self.replace_cart(reducers::remove_from_cart(&self.cart, *id))
            }
            StoreAction::IncreaseQuantity(id) => {
                self.replace_cart(reducers::increase_quantity(&self.cart, *id))
            }
            StoreAction::DecreaseQuantity(id) => {
                self.replace_cart(reducers::decrease_quantity(&self.cart, *id))
            }
            StoreAction::ClearCart => self.replace_cart(Vec::new()),
            StoreAction::AddToWishlist(product) => {
                self.replace_wishlist(reducers::add_to_wishlist(&self.wishlist, product))
            }
            StoreAction::RemoveFromWishlist(id) => {
                self.replace_wishlist(reducers::remove_from_wishlist(&self.wishlist, *id))
            }
        }
    }

    /// Add one unit of `product`, appending a new line if it is not in the cart.
    pub fn add_to_cart(&mut self, product: &Product) {
        self.replace_cart(reducers::add_to_cart(&self.cart, product));
    }

    /// Remove the line for `id`. Absent ids are ignored.
    pub fn remove_from_cart(&mut self, id: ProductId) {
        self.replace_cart(reducers::remove_from_cart(&self.cart, id));
    }

    /// Add one unit to the line for `id`, if present.
    pub fn increase_quantity(&mut self, id: ProductId) {
        self.replace_cart(reducers::increase_quantity(&self.cart, id));
    }

    /// Take one unit from the line for `id`, stopping at one.
    pub fn decrease_quantity(&mut self, id: ProductId) {
        self.replace_cart(reducers::decrease_quantity(&self.cart, id));
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.replace_cart(Vec::new());
    }

    /// Append `product` to the wishlist. Does not check for an existing entry.
    pub fn add_to_wishlist(&mut self, product: &Product) {
        self.replace_wishlist(reducers::add_to_wishlist(&self.wishlist, product));
    }

    /// Remove every wishlist entry for `id`.
    pub fn remove_from_wishlist(&mut self, id: ProductId) {
        self.replace_wishlist(reducers::remove_from_wishlist(&self.wishlist, id));
    }

    // =========================================================================
    // Derived queries
    // =========================================================================

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.cart.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// Sum of price times quantity across all lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.cart.iter().map(CartLineItem::line_total).sum()
    }

    /// Whether the cart has a line for `id`.
    #[must_use]
    pub fn is_in_cart(&self, id: ProductId) -> bool {
        self.cart.iter().any(|line| line.id() == id)
    }

    /// Whether the wishlist has at least one entry for `id`.
    #[must_use]
    pub fn is_in_wishlist(&self, id: ProductId) -> bool {
        self.wishlist.iter().any(|entry| entry.id() == id)
    }

    /// The cart line for `id`, if any.
    #[must_use]
    pub fn cart_line(&self, id: ProductId) -> Option<&CartLineItem> {
        self.cart.iter().find(|line| line.id() == id)
    }

    /// Counts shown on the header badges: cart lines and wishlist entries.
    #[must_use]
    pub fn badge_counts(&self) -> (usize, usize) {
        (self.cart.len(), self.wishlist.len())
    }

    fn replace_cart(&mut self, next: Vec<CartLineItem>) -> bool {
        if next == self.cart {
            return false;
        }
        self.cart = next;
        self.revision += 1;
        true
    }

    fn replace_wishlist(&mut self, next: Vec<WishlistEntry>) -> bool {
        if next == self.wishlist {
            return false;
        }
        self.wishlist = next;
        self.revision += 1;
        true
    }
}

/// Pure list transformations behind the store operations.
///
/// Each function leaves its input untouched and returns a new collection.
pub mod reducers {
    use crate::types::{CartLineItem, Product, ProductId, WishlistEntry};

    /// Increment the line for `product.id`, or append a new line with quantity 1.
    #[must_use]
    pub fn add_to_cart(items: &[CartLineItem], product: &Product) -> Vec<CartLineItem> {
        if items.iter().any(|line| line.id() == product.id) {
            return increase_quantity(items, product.id);
        }
        let mut next = items.to_vec();
        next.push(CartLineItem::new(product.clone()));
        next
    }

    /// Drop the line for `id`.
    #[must_use]
    pub fn remove_from_cart(items: &[CartLineItem], id: ProductId) -> Vec<CartLineItem> {
        items.iter().filter(|line| line.id() != id).cloned().collect()
    }

    /// Add one unit to the line for `id`.
    #[must_use]
    pub fn increase_quantity(items: &[CartLineItem], id: ProductId) -> Vec<CartLineItem> {
        items
            .iter()
            .map(|line| {
                if line.id() == id {
                    line.incremented()
                } else {
                    line.clone()
                }
            })
            .collect()
    }

    /// Take one unit from the line for `id`, floored at one.
    #[must_use]
    pub fn decrease_quantity(items: &[CartLineItem], id: ProductId) -> Vec<CartLineItem> {
        items
            .iter()
            .map(|line| {
                if line.id() == id {
                    line.decremented()
                } else {
                    line.clone()
                }
            })
            .collect()
    }

    /// Append `product` unconditionally.
    #[must_use]
    pub fn add_to_wishlist(items: &[WishlistEntry], product: &Product) -> Vec<WishlistEntry> {
        let mut next = items.to_vec();
        next.push(WishlistEntry::from(product.clone()));
        next
    }

    /// Drop every entry for `id`.
    #[must_use]
    pub fn remove_from_wishlist(items: &[WishlistEntry], id: ProductId) -> Vec<WishlistEntry> {
        items.iter().filter(|entry| entry.id() != id).cloned().collect()
    }
}
