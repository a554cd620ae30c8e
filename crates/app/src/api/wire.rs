//! Wire shapes for API responses and their conversion to core types.
//!
//! The API is loosely typed: ids and prices may arrive as numbers or strings,
//! and optional fields may be missing. Everything is checked here, once.

use std::str::FromStr;

use pocketcart_core::{Price, Product, ProductId, Rating, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ApiError;

/// A product as the API sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProduct {
    pub id: Option<Value>,
    pub title: Option<String>,
    pub price: Option<Value>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub rating: Option<Value>,
}

/// Body of a successful login.
#[derive(Debug, Deserialize)]
pub struct RawToken {
    pub token: Option<String>,
}

/// Body of a successful account creation.
#[derive(Debug, Deserialize)]
pub struct RawCreated {
    pub id: Option<Value>,
}

/// Login request body.
#[derive(Debug, Serialize)]
pub struct LoginBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Account creation request body.
#[derive(Debug, Serialize)]
pub struct SignupBody<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub name: SignupName<'a>,
    pub phone: &'a str,
}

/// Nested name object of [`SignupBody`].
#[derive(Debug, Serialize)]
pub struct SignupName<'a> {
    pub firstname: &'a str,
    pub lastname: &'a str,
}

// =============================================================================
// Conversions
// =============================================================================

/// Convert a raw product into a validated [`Product`].
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] if the id, title, or price is
/// missing or unusable.
pub fn convert_product(raw: RawProduct) -> Result<Product, ApiError> {
    let id = raw
        .id
        .as_ref()
        .and_then(value_as_u64)
        .map(ProductId::new)
        .ok_or_else(|| malformed("product id is missing or not a non-negative integer"))?;

    let title = raw
        .title
        .ok_or_else(|| malformed(format!("product {id} has no title")))?;

    let price = raw
        .price
        .as_ref()
        .and_then(value_as_decimal)
        .ok_or_else(|| malformed(format!("product {id} has no numeric price")))
        .and_then(|amount| {
            Price::new(amount).map_err(|e| malformed(format!("product {id}: {e}")))
        })?;

    Ok(Product {
        id,
        title,
        price,
        category: raw.category.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        image: raw.image.unwrap_or_default(),
        rating: raw.rating.as_ref().and_then(convert_rating),
    })
}

/// Convert a product list payload.
///
/// Individual products that fail conversion are skipped and logged; a payload
/// that is not an array is an error.
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] if the payload is not an array.
pub fn convert_product_list(payload: Value) -> Result<Vec<Product>, ApiError> {
    let Value::Array(items) = payload else {
        return Err(malformed("expected an array of products"));
    };

    let total = items.len();
    let products: Vec<Product> = items
        .into_iter()
        .filter_map(|item| {
            let converted = serde_json::from_value::<RawProduct>(item)
                .map_err(ApiError::from)
                .and_then(convert_product);
            match converted {
                Ok(product) => Some(product),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed product");
                    None
                }
            }
        })
        .collect();

    if products.len() < total {
        tracing::warn!(
            skipped = total - products.len(),
            total,
            "Product list contained malformed entries"
        );
    }

    Ok(products)
}

/// Convert a category list payload.
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] unless the payload is an array of
/// strings.
pub fn convert_categories(payload: Value) -> Result<Vec<String>, ApiError> {
    let Value::Array(items) = payload else {
        return Err(malformed("expected an array of categories"));
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            other => Err(malformed(format!("category is not a string: {other}"))),
        })
        .collect()
}

/// Extract the bearer token from a login response.
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] if the token is missing or empty.
pub fn convert_token(raw: RawToken) -> Result<String, ApiError> {
    raw.token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| malformed("login response has no token"))
}

/// Extract the new user's id from an account creation response.
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] if the id is missing or zero.
pub fn convert_created(raw: RawCreated) -> Result<UserId, ApiError> {
    raw.id
        .as_ref()
        .and_then(value_as_u64)
        .filter(|id| *id != 0)
        .map(UserId::new)
        .ok_or_else(|| malformed("signup response has no user id"))
}

fn convert_rating(value: &Value) -> Option<Rating> {
    let rate = value.get("rate").and_then(Value::as_f64)?;
    let count = value.get("count").and_then(value_as_u64)?;
    Some(Rating { rate, count })
}

fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        // The number's shortest text form keeps 109.95 as exactly 109.95.
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn malformed(message: impl Into<String>) -> ApiError {
    ApiError::MalformedResponse(message.into())
}
