//! Product browsing: the local catalog copy and its filters.

use std::fmt;
use std::str::FromStr;

use pocketcart_core::{Price, Product, ProductId};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;

use crate::api::FakeStoreClient;

/// Label of the catch-all category and price range.
pub const ALL: &str = "All";

/// Message shown when the product list cannot be loaded.
pub const PRODUCTS_ERROR: &str = "Failed to fetch products";

/// Message shown when the category list cannot be loaded.
pub const CATEGORIES_ERROR: &str = "Failed to fetch categories";

/// A filter selector received an unknown label.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value} (expected one of: {expected})")]
pub struct UnknownOption {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

// =============================================================================
// Filter Selectors
// =============================================================================

/// Category selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => product.category == *name,
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        if value == ALL {
            Self::All
        } else {
            Self::Named(value.to_string())
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Price bucket selector. Bounds are inclusive at the top of each bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceRange {
    #[default]
    All,
    /// price <= 100
    UpTo100,
    /// 100 < price <= 500
    From100To500,
    /// price > 500
    Over500,
}

impl PriceRange {
    /// Every selector in display order.
    pub const OPTIONS: [Self; 4] = [Self::All, Self::UpTo100, Self::From100To500, Self::Over500];

    /// The label the selector is shown with.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::All => ALL,
            Self::UpTo100 => "0-100",
            Self::From100To500 => "100-500",
            Self::Over500 => "500+",
        }
    }

    /// Whether `price` falls in this bucket.
    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        let amount = price.amount();
        let hundred = Decimal::ONE_HUNDRED;
        let five_hundred = Decimal::from(500);
        match self {
            Self::All => true,
            Self::UpTo100 => amount <= hundred,
            Self::From100To500 => amount > hundred && amount <= five_hundred,
            Self::Over500 => amount > five_hundred,
        }
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PriceRange {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::OPTIONS
            .into_iter()
            .find(|option| option.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownOption {
                kind: "price range",
                value: s.to_string(),
                expected: "All, 0-100, 100-500, 500+",
            })
    }
}

/// Sort selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Keep API order.
    #[default]
    None,
    PriceLowToHigh,
    PriceHighToLow,
}

impl SortOrder {
    /// Every selector in display order.
    pub const OPTIONS: [Self; 3] = [Self::None, Self::PriceLowToHigh, Self::PriceHighToLow];

    /// The label the selector is shown with.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::PriceLowToHigh => "Price Low to High",
            Self::PriceHighToLow => "Price High to Low",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortOrder {
    type Err = UnknownOption;

    /// Accepts the display labels plus the short forms `asc` and `desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "asc" | "low" => return Ok(Self::PriceLowToHigh),
            "desc" | "high" => return Ok(Self::PriceHighToLow),
            _ => {}
        }
        Self::OPTIONS
            .into_iter()
            .find(|option| option.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOption {
                kind: "sort order",
                value: s.to_string(),
                expected: "None, Price Low to High (asc), Price High to Low (desc)",
            })
    }
}

// =============================================================================
// ProductFilter
// =============================================================================

/// The combined selectors of the product list screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive title substring; empty matches everything.
    pub search: String,
    pub category: CategoryFilter,
    pub price_range: PriceRange,
    pub sort: SortOrder,
}

impl ProductFilter {
    /// Whether `product` passes the search, category, and price selectors.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let needle = self.search.to_lowercase();
        product.title.to_lowercase().contains(&needle)
            && self.category.matches(product)
            && self.price_range.contains(product.price)
    }

    /// Filter then sort. The sort is stable, so equal prices keep API order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let mut visible: Vec<&Product> = products.iter().filter(|p| self.matches(p)).collect();
        match self.sort {
            SortOrder::None => {}
            SortOrder::PriceLowToHigh => visible.sort_by_key(|p| p.price),
            SortOrder::PriceHighToLow => visible.sort_by(|a, b| b.price.cmp(&a.price)),
        }
        visible
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Locally held copy of the catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<String>,
    error: Option<&'static str>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            categories: vec![ALL.to_string()],
            error: None,
        }
    }
}

impl Catalog {
    /// An empty catalog with only the `All` category.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog preloaded with products and category names.
    #[must_use]
    pub fn with_data(products: Vec<Product>, categories: Vec<String>) -> Self {
        let mut catalog = Self::default();
        catalog.set_products(products);
        catalog.set_categories(categories);
        catalog
    }

    /// Products in API order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Category names with `All` first.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// The last load failure, as shown to the user.
    #[must_use]
    pub const fn error(&self) -> Option<&'static str> {
        self.error
    }

    /// Find a product by id.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn set_products(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    fn set_categories(&mut self, categories: Vec<String>) {
        self.categories = std::iter::once(ALL.to_string())
            .chain(categories.into_iter().filter(|c| c != ALL))
            .collect();
    }

    /// Fetch products and categories.
    ///
    /// Each list is replaced only when its fetch succeeds; a failure records a
    /// user-facing message and keeps whatever was loaded before. When both
    /// fail, the products message wins. Returns whether both fetches
    /// succeeded.
    #[instrument(skip_all)]
    pub async fn refresh(&mut self, client: &FakeStoreClient) -> bool {
        self.error = None;

        match client.get_products().await {
            Ok(products) => self.set_products(products),
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch products");
                self.error = Some(PRODUCTS_ERROR);
            }
        }

        match client.get_categories().await {
            Ok(categories) => self.set_categories(categories),
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch categories");
                self.error.get_or_insert(CATEGORIES_ERROR);
            }
        }

        self.error.is_none()
    }
}
