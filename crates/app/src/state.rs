//! Application state shared across sessions.

use std::sync::Arc;

use crate::api::{ApiError, FakeStoreClient};
use crate::config::AppConfig;

/// Application state shared by every session.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the store API client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    client: FakeStoreClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: AppConfig) -> Result<Self, ApiError> {
        let client = FakeStoreClient::new(&config.api)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, client }),
        })
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the store API client.
    #[must_use]
    pub fn client(&self) -> &FakeStoreClient {
        &self.inner.client
    }
}
