//! Unified error handling with Sentry integration.
//!
//! Session operations return [`AppError`]. Views never show its `Display`
//! text; they show [`AppError::user_message`], which hides internal details.

use pocketcart_core::ProductId;
use thiserror::Error;

use crate::api::ApiError;
use crate::forms::ValidationErrors;

/// Which request an API failure came from. Selects the user-facing wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Signup,
    ProductDetail,
}

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store API call failed.
    #[error("{operation:?} request failed: {source}")]
    Api {
        operation: Operation,
        #[source]
        source: ApiError,
    },

    /// Form input was rejected.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Checkout was attempted with nothing in the cart. Checked before the
    /// delivery form, so no order is ever confirmed without items.
    #[error("Cart is empty")]
    EmptyCart,

    /// The product is not in the loaded catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),
}

impl AppError {
    /// Wrap an API failure with the operation it belongs to.
    #[must_use]
    pub const fn api(operation: Operation, source: ApiError) -> Self {
        Self::Api { operation, source }
    }

    /// The message to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { operation, source } => api_message(*operation, source).to_string(),
            Self::Validation(errors) => errors.to_string(),
            Self::EmptyCart => "Your cart is empty".to_string(),
            Self::ProductNotFound(_) => "Product not found".to_string(),
        }
    }

    /// Whether the error points at a fault worth tracking rather than at user
    /// input.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        match self {
            Self::Api {
                operation: Operation::ProductDetail,
                ..
            } => true,
            Self::Api { source, .. } => {
                source.is_transport() || matches!(source, ApiError::MalformedResponse(_))
            }
            Self::Validation(_) | Self::EmptyCart | Self::ProductNotFound(_) => false,
        }
    }

    /// Send reportable errors to Sentry and log them. Returns `self` so call
    /// sites can write `Err(err.capture())`.
    #[must_use]
    pub fn capture(self) -> Self {
        if self.is_reportable() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Session error"
            );
        } else {
            tracing::debug!(error = %self, "Rejected user action");
        }
        self
    }
}

fn api_message(operation: Operation, source: &ApiError) -> &'static str {
    match (operation, source) {
        (_, ApiError::Http(_) | ApiError::Parse(_) | ApiError::Url(_)) => {
            "An error occurred. Please try again."
        }
        (Operation::Login | Operation::Signup, ApiError::MalformedResponse(_)) => {
            "Unexpected response format"
        }
        (Operation::Login, ApiError::InvalidCredentials) => "Invalid username or password",
        (Operation::Login, _) => "An unexpected error occurred",
        (Operation::Signup, _) => "Sign-up failed",
        (Operation::ProductDetail, _) => "An error occurred. Please try again.",
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "add_to_cart", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
