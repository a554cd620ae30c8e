//! Pocketcart Core - Domain types and the cart/wishlist store.
//!
//! This crate provides the pieces shared by every Pocketcart component:
//! - `app` - Catalog client, forms, and the shopping session
//! - `cli` - Terminal front end
//!
//! # Architecture
//!
//! The core crate contains no I/O: no HTTP clients, no terminal access, no
//! clocks. Everything here is a plain value or a pure transformation of one,
//! which keeps the store trivially testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, phone numbers, and
//!   the product/cart/wishlist records
//! - [`store`] - The cart and wishlist container and its reducers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod store;
pub mod types;

pub use store::{Store, StoreAction};
pub use types::*;
