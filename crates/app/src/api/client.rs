//! Fake Store API client implementation.

use std::sync::Arc;

use pocketcart_core::{Email, PhoneNumber, Product, ProductId, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::ApiError;
use super::wire::{
    LoginBody, RawCreated, RawProduct, RawToken, SignupBody, SignupName, convert_categories,
    convert_created, convert_product, convert_product_list, convert_token,
};
use crate::config::ApiConfig;

/// Username and password for `POST /auth/login`.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    /// Build credentials from plain strings.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Account details for `POST /users`. The email doubles as the username.
#[derive(Clone)]
pub struct NewUser {
    pub email: Email,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
    pub phone: PhoneNumber,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("phone", &self.phone)
            .finish()
    }
}

/// Bearer token returned by a successful login.
#[derive(Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for attaching to requests.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

// =============================================================================
// FakeStoreClient
// =============================================================================

/// Client for the Fake Store REST API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct FakeStoreClient {
    inner: Arc<FakeStoreClientInner>,
}

struct FakeStoreClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl FakeStoreClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pocketcart/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(FakeStoreClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// The base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a request and decode a successful JSON body.
    ///
    /// Non-success statuses become [`ApiError::Status`] carrying a truncated
    /// body for diagnostics.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Store API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: response_text.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse store API response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is not a list.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>, ApiError> {
        let url = self.endpoint("products")?;
        let payload = self.send_json(self.inner.client.get(url)).await?;
        let products = convert_product_list(payload)?;
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the product is malformed. The
    /// Fake Store API answers unknown ids with an empty body, which surfaces
    /// as [`ApiError::Parse`].
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let url = self.endpoint(&format!("products/{id}"))?;
        let raw: RawProduct = self.send_json(self.inner.client.get(url)).await?;
        convert_product(raw)
    }

    /// Get the category names.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is not a list of
    /// strings.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint("products/categories")?;
        let payload = self.send_json(self.inner.client.get(url)).await?;
        let categories = convert_categories(payload)?;
        debug!(count = categories.len(), "Fetched categories");
        Ok(categories)
    }

    // =========================================================================
    // Account Methods
    // =========================================================================

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidCredentials`] on 401, [`ApiError::Status`]
    /// on other failures, and [`ApiError::MalformedResponse`] when the body
    /// has no token.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ApiError> {
        let url = self.endpoint("auth/login")?;
        let body = LoginBody {
            username: &credentials.username,
            password: credentials.password.expose_secret(),
        };

        let result = self
            .send_json::<RawToken>(self.inner.client.post(url).json(&body))
            .await;

        match result {
            Ok(raw) => {
                let token = convert_token(raw)?;
                debug!("Login succeeded");
                Ok(AuthToken::new(token))
            }
            Err(ApiError::Status { status: 401, .. }) => Err(ApiError::InvalidCredentials),
            Err(e) => Err(e),
        }
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] if the API rejects the account and
    /// [`ApiError::MalformedResponse`] when the body has no id.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn register(&self, user: &NewUser) -> Result<UserId, ApiError> {
        let url = self.endpoint("users")?;
        let body = SignupBody {
            email: user.email.as_str(),
            username: user.email.as_str(),
            password: user.password.expose_secret(),
            name: SignupName {
                firstname: &user.first_name,
                lastname: &user.last_name,
            },
            phone: user.phone.as_str(),
        };

        let raw: RawCreated = self
            .send_json(self.inner.client.post(url).json(&body))
            .await?;
        let id = convert_created(raw)?;
        debug!(user_id = %id, "Account created");
        Ok(id)
    }
}
