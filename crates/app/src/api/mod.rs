//! Client for the Fake Store REST API.
//!
//! # Architecture
//!
//! - Plain JSON over `reqwest`; one request per call, no retries
//! - The API is the source of truth for products and accounts; nothing is
//!   cached locally
//! - Responses are decoded into loose wire shapes ([`wire`]) and converted to
//!   core types exactly once, so the rest of the app never re-checks them
//!
//! # Endpoints
//!
//! - `GET /products`, `GET /products/{id}`, `GET /products/categories`
//! - `POST /auth/login` returns a bearer token
//! - `POST /users` creates an account
//!
//! # Example
//!
//! ```rust,ignore
//! use pocketcart_app::api::{Credentials, FakeStoreClient};
//!
//! let client = FakeStoreClient::new(&config.api)?;
//! let products = client.get_products().await?;
//! let token = client.login(&Credentials::new("mor_2314", "83r5^_")).await?;
//! ```

mod client;
pub mod wire;

pub use client::{AuthToken, Credentials, FakeStoreClient, NewUser};

use thiserror::Error;

/// Errors that can occur when talking to the store API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not valid JSON for the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Login was rejected with 401.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// The JSON parsed but is missing or has unusable fields.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Whether the failure happened in transport or decoding rather than in
    /// the API's answer. These are the failures worth reporting to Sentry.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Parse(_) | Self::Url(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - unavailable");

        let err = ApiError::MalformedResponse("missing token".to_string());
        assert_eq!(err.to_string(), "Malformed response: missing token");
    }

    #[test]
    fn test_is_transport() {
        assert!(!ApiError::InvalidCredentials.is_transport());
        assert!(!ApiError::MalformedResponse(String::new()).is_transport());
        let parse = serde_json::from_str::<u8>("x").unwrap_err();
        assert!(ApiError::Parse(parse).is_transport());
    }
}
