//! Pocketcart App - The storefront behind every Pocketcart front end.
//!
//! This crate connects the pure cart/wishlist store from `pocketcart-core` to
//! the Fake Store API and wraps both in a [`session::ShopSession`].
//!
//! # Modules
//!
//! - [`api`] - HTTP client and wire-format conversion
//! - [`catalog`] - Local product list and its filters
//! - [`config`] - Environment configuration
//! - [`error`] - Session errors, user-facing messages, and Sentry helpers
//! - [`forms`] - Login, signup, and checkout validation
//! - [`session`] - One shopper's session
//! - [`state`] - Shared configuration and client

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod forms;
pub mod session;
pub mod state;
