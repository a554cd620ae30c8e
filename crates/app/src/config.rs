//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `POCKETCART_API_URL` - Base URL of the store API (default: <https://fakestoreapi.com>)
//! - `POCKETCART_CURRENCY` - Display currency code (default: INR)
//! - `POCKETCART_DEMO_USERNAME` - Username pre-filled on the login form
//! - `POCKETCART_DEMO_PASSWORD` - Password pre-filled on the login form
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use pocketcart_core::CurrencyCode;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default store API.
pub const DEFAULT_API_URL: &str = "https://fakestoreapi.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Store API settings
    pub api: ApiConfig,
    /// Currency used when rendering prices
    pub currency: CurrencyCode,
    /// Credentials pre-filled on the login form
    pub demo_login: Option<DemoLogin>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Store API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto
    pub base_url: Url,
}

/// Demo credentials for the login form.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct DemoLogin {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for DemoLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoLogin")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value, or if
    /// only one half of the demo login is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api = ApiConfig::from_env()?;
        let currency = get_env_or_default("POCKETCART_CURRENCY", CurrencyCode::default().code())
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("POCKETCART_CURRENCY".to_string(), e))?;
        let demo_login = DemoLogin::from_env()?;

        Ok(Self {
            api,
            currency,
            demo_login,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at `base_url` with everything else defaulted.
    ///
    /// Used by tests and tools that talk to a local API.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid absolute URL.
    pub fn for_api_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api: ApiConfig {
                base_url: parse_base_url("POCKETCART_API_URL", base_url)?,
            },
            currency: CurrencyCode::default(),
            demo_login: None,
            sentry_dsn: None,
            sentry_environment: None,
        })
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_env_or_default("POCKETCART_API_URL", DEFAULT_API_URL);
        Ok(Self {
            base_url: parse_base_url("POCKETCART_API_URL", &raw)?,
        })
    }
}

impl DemoLogin {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        match (
            get_optional_env("POCKETCART_DEMO_USERNAME"),
            get_optional_env("POCKETCART_DEMO_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Ok(Some(Self {
                username,
                password: SecretString::from(password),
            })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(
                "POCKETCART_DEMO_PASSWORD".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar(
                "POCKETCART_DEMO_USERNAME".to_string(),
            )),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a base URL, normalising it to end with a slash so joins append.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}
