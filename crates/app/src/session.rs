//! One shopper's session: account, catalog, filters, cart, and wishlist.
//!
//! [`ShopSession`] is the only owner of a [`Store`]. Every cart or wishlist
//! change goes through [`Store::dispatch`], so each one is logged and leaves a
//! Sentry breadcrumb.

use chrono::{DateTime, Utc};
use pocketcart_core::{Price, Product, ProductId, Store, StoreAction, UserId};
use tracing::instrument;
use uuid::Uuid;

use crate::api::{ApiError, AuthToken};
use crate::catalog::{Catalog, ProductFilter};
use crate::error::{
    AppError, Operation, Result, add_breadcrumb, clear_sentry_user, set_sentry_user,
};
use crate::forms::{CheckoutForm, LoginForm, ShippingDetails, SignupForm};
use crate::state::AppState;

/// The only payment method offered at checkout.
pub const PAYMENT_METHOD: &str = "Cash on Delivery";

/// One row of the cart screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub title: String,
    pub unit_price: Price,
    pub quantity: u32,
    pub line_total: Price,
}

/// The cart screen: rows plus footer totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub total_items: u64,
    pub total_price: Price,
}

impl CartSummary {
    /// Whether the cart has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Receipt for a placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_id: Uuid,
    pub placed_at: DateTime<Utc>,
    pub shipping: ShippingDetails,
    pub item_count: u64,
    pub total: Price,
    pub payment_method: &'static str,
}

/// Signed-in account.
#[derive(Debug, Clone)]
struct Account {
    username: String,
    token: AuthToken,
}

/// A shopper's session.
pub struct ShopSession {
    state: AppState,
    store: Store,
    catalog: Catalog,
    filter: ProductFilter,
    account: Option<Account>,
    registered: Option<UserId>,
}

impl ShopSession {
    /// Start a session with an empty catalog.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self::with_catalog(state, Catalog::new())
    }

    /// Start a session over an already loaded catalog.
    #[must_use]
    pub fn with_catalog(state: AppState, catalog: Catalog) -> Self {
        Self {
            state,
            store: Store::new(),
            catalog,
            filter: ProductFilter::default(),
            account: None,
            registered: None,
        }
    }

    /// Shared application state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// The cart and wishlist.
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// The loaded catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The active product filter.
    #[must_use]
    pub const fn filter(&self) -> &ProductFilter {
        &self.filter
    }

    /// Mutable access to the product filter.
    pub fn filter_mut(&mut self) -> &mut ProductFilter {
        &mut self.filter
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// A login form, pre-filled with the demo credentials when configured.
    #[must_use]
    pub fn login_form(&self) -> LoginForm {
        self.state.config().demo_login.as_ref().map_or_else(
            || LoginForm::new("", ""),
            |demo| LoginForm {
                username: demo.username.clone(),
                password: demo.password.clone(),
            },
        )
    }

    /// The signed-in username, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.account.as_ref().map(|a| a.username.as_str())
    }

    /// The signed-in bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<&AuthToken> {
        self.account.as_ref().map(|a| &a.token)
    }

    /// Whether someone is signed in.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.account.is_some()
    }

    /// The id of the account created by the last successful signup.
    #[must_use]
    pub const fn registered_user(&self) -> Option<UserId> {
        self.registered
    }

    /// Validate the form and sign in.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for bad input and [`AppError::Api`]
    /// when the API rejects the login or cannot be reached.
    #[instrument(skip_all, fields(username = %form.username))]
    pub async fn login(&mut self, form: &LoginForm) -> Result<()> {
        let credentials = form.validate().map_err(|e| AppError::from(e).capture())?;

        let token = self
            .state
            .client()
            .login(&credentials)
            .await
            .map_err(|e| AppError::api(Operation::Login, e).capture())?;

        set_sentry_user(&credentials.username);
        add_breadcrumb("auth", "login", Some(&[("username", credentials.username.as_str())]));
        tracing::info!("Signed in");

        self.account = Some(Account {
            username: credentials.username,
            token,
        });
        Ok(())
    }

    /// Validate the form and create an account.
    ///
    /// Does not sign in; the shopper logs in afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for bad input and [`AppError::Api`]
    /// when the API rejects the account or cannot be reached.
    #[instrument(skip_all, fields(email = %form.email))]
    pub async fn signup(&mut self, form: &SignupForm) -> Result<UserId> {
        let user = form.validate().map_err(|e| AppError::from(e).capture())?;

        let id = self
            .state
            .client()
            .register(&user)
            .await
            .map_err(|e| AppError::api(Operation::Signup, e).capture())?;

        let user_id = id.to_string();
        add_breadcrumb("auth", "signup", Some(&[("user_id", user_id.as_str())]));
        tracing::info!(user_id = %id, "Account created");

        self.registered = Some(id);
        Ok(id)
    }

    /// Forget the signed-in account. The cart and wishlist are kept.
    pub fn logout(&mut self) {
        if self.account.take().is_some() {
            clear_sentry_user();
            add_breadcrumb("auth", "logout", None);
            tracing::info!("Signed out");
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Reload products and categories. Returns whether both loads succeeded;
    /// on failure [`Catalog::error`] holds the message to show.
    pub async fn refresh_catalog(&mut self) -> bool {
        self.catalog.refresh(self.state.client()).await
    }

    /// Products passing the active filter, in display order.
    #[must_use]
    pub fn visible_products(&self) -> Vec<&Product> {
        self.filter.apply(self.catalog.products())
    }

    /// A product's details, from the catalog or else from the API.
    ///
    /// The API answers an unknown id with an empty body, which decodes as a
    /// parse or shape error; those and a 404 mean the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ProductNotFound`] if the API has no such product and
    /// [`AppError::Api`] when the API cannot be reached or fails.
    pub async fn product_detail(&self, id: ProductId) -> Result<Product> {
        if let Some(product) = self.catalog.product(id) {
            return Ok(product.clone());
        }
        match self.state.client().get_product(id).await {
            Ok(product) => Ok(product),
            Err(
                e @ (ApiError::Parse(_)
                | ApiError::MalformedResponse(_)
                | ApiError::Status { status: 404, .. }),
            ) => {
                tracing::debug!(error = %e, product_id = %id, "No such product");
                Err(AppError::ProductNotFound(id).capture())
            }
            Err(e) => Err(AppError::api(Operation::ProductDetail, e).capture()),
        }
    }

    fn catalog_product(&self, id: ProductId) -> Result<Product> {
        self.catalog
            .product(id)
            .cloned()
            .ok_or_else(|| AppError::ProductNotFound(id).capture())
    }

    // =========================================================================
    // Cart & Wishlist
    // =========================================================================

    fn dispatch(&mut self, action: &StoreAction) -> bool {
        let changed = self.store.dispatch(action);
        let product_id = action.product_id().map(|id| id.to_string());

        tracing::debug!(
            action = action.name(),
            product_id = product_id.as_deref(),
            changed,
            revision = self.store.revision(),
            "Store action"
        );
        match &product_id {
            Some(id) => add_breadcrumb("store", action.name(), Some(&[("product_id", id.as_str())])),
            None => add_breadcrumb("store", action.name(), None),
        }
        changed
    }

    /// The product list's cart button. Returns whether the product is in the
    /// cart afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ProductNotFound`] when adding an id the catalog
    /// does not hold.
    pub fn toggle_cart(&mut self, id: ProductId) -> Result<bool> {
        if self.store.is_in_cart(id) {
            self.dispatch(&StoreAction::RemoveFromCart(id));
            Ok(false)
        } else {
            let product = self.catalog_product(id)?;
            self.dispatch(&StoreAction::AddToCart(product));
            Ok(true)
        }
    }

    /// The product list's heart button. Returns whether the product is in the
    /// wishlist afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ProductNotFound`] when adding an id the catalog
    /// does not hold.
    pub fn toggle_wishlist(&mut self, id: ProductId) -> Result<bool> {
        if self.store.is_in_wishlist(id) {
            self.dispatch(&StoreAction::RemoveFromWishlist(id));
            Ok(false)
        } else {
            let product = self.catalog_product(id)?;
            self.dispatch(&StoreAction::AddToWishlist(product));
            Ok(true)
        }
    }

    /// Add a product to the cart, or bump its quantity if already there.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ProductNotFound`] for ids the catalog does not hold.
    pub fn add_to_cart(&mut self, id: ProductId) -> Result<()> {
        let product = self.catalog_product(id)?;
        self.dispatch(&StoreAction::AddToCart(product));
        Ok(())
    }

    /// Add a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ProductNotFound`] for ids the catalog does not hold.
    pub fn add_to_wishlist(&mut self, id: ProductId) -> Result<()> {
        let product = self.catalog_product(id)?;
        self.dispatch(&StoreAction::AddToWishlist(product));
        Ok(())
    }

    /// The wishlist's "Add to Cart" button: add to the cart, then drop the
    /// wishlist entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ProductNotFound`] if the product is not on the
    /// wishlist.
    pub fn move_to_cart(&mut self, id: ProductId) -> Result<()> {
        let product = self
            .store
            .wishlist()
            .iter()
            .find(|entry| entry.id() == id)
            .map(|entry| entry.product.clone())
            .ok_or_else(|| AppError::ProductNotFound(id).capture())?;

        self.dispatch(&StoreAction::AddToCart(product));
        self.dispatch(&StoreAction::RemoveFromWishlist(id));
        Ok(())
    }

    /// Remove a product from the wishlist. Unknown ids are ignored.
    pub fn remove_from_wishlist(&mut self, id: ProductId) -> bool {
        self.dispatch(&StoreAction::RemoveFromWishlist(id))
    }

    /// Cart "+" button. Unknown ids are ignored.
    pub fn increase(&mut self, id: ProductId) -> bool {
        self.dispatch(&StoreAction::IncreaseQuantity(id))
    }

    /// Cart "-" button. Quantity never drops below one.
    pub fn decrease(&mut self, id: ProductId) -> bool {
        self.dispatch(&StoreAction::DecreaseQuantity(id))
    }

    /// Cart "Remove" button. Unknown ids are ignored.
    pub fn remove(&mut self, id: ProductId) -> bool {
        self.dispatch(&StoreAction::RemoveFromCart(id))
    }

    /// The cart screen's rows and totals.
    #[must_use]
    pub fn cart_summary(&self) -> CartSummary {
        let lines = self
            .store
            .cart()
            .iter()
            .map(|item| CartLine {
                product_id: item.id(),
                title: item.product.title.clone(),
                unit_price: item.product.price,
                quantity: item.quantity(),
                line_total: item.line_total(),
            })
            .collect();

        CartSummary {
            lines,
            total_items: self.store.total_items(),
            total_price: self.store.total_price(),
        }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Place a cash-on-delivery order for the whole cart and empty it.
    ///
    /// An empty cart is refused up front, even when the form is valid.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EmptyCart`] when there is nothing to order and
    /// [`AppError::Validation`] when the delivery details are incomplete. The
    /// cart is left untouched on error.
    #[instrument(skip_all)]
    pub fn checkout(&mut self, form: &CheckoutForm) -> Result<OrderConfirmation> {
        if self.store.cart().is_empty() {
            return Err(AppError::EmptyCart.capture());
        }
        let shipping = form.validate().map_err(|e| AppError::from(e).capture())?;

        let confirmation = OrderConfirmation {
            order_id: Uuid::new_v4(),
            placed_at: Utc::now(),
            shipping,
            item_count: self.store.total_items(),
            total: self.store.total_price(),
            payment_method: PAYMENT_METHOD,
        };
        self.dispatch(&StoreAction::ClearCart);

        tracing::info!(
            order_id = %confirmation.order_id,
            items = confirmation.item_count,
            total = %confirmation.total,
            "Order placed"
        );
        Ok(confirmation)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::forms::Field;

    fn product(id: u64, title: &str, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price: Price::parse(price).unwrap(),
            category: "electronics".to_string(),
            description: String::new(),
            image: String::new(),
            rating: None,
        }
    }

    fn session() -> ShopSession {
        // Nothing in these tests reaches the network.
        let config = AppConfig::for_api_url("http://127.0.0.1:9").unwrap();
        let catalog = Catalog::with_data(
            vec![
                product(1, "Backpack", "109.95"),
                product(2, "T-Shirt", "22.30"),
                product(3, "Monitor", "999.99"),
            ],
            vec!["electronics".to_string()],
        );
        ShopSession::with_catalog(AppState::new(config).unwrap(), catalog)
    }

    fn shipping() -> CheckoutForm {
        CheckoutForm {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "9876543210".to_string(),
            address: "12 MG Road".to_string(),
        }
    }

    #[test]
    fn test_toggle_cart() {
        let mut session = session();
        let id = ProductId::new(1);

        assert!(session.toggle_cart(id).unwrap());
        assert!(session.store().is_in_cart(id));
        assert!(!session.toggle_cart(id).unwrap());
        assert!(session.store().cart().is_empty());
    }

    #[test]
    fn test_toggle_unknown_product() {
        let mut session = session();
        let err = session.toggle_cart(ProductId::new(42)).unwrap_err();
        assert!(matches!(err, AppError::ProductNotFound(_)));
        assert_eq!(err.user_message(), "Product not found");
        assert_eq!(session.store().revision(), 0);
    }

    #[test]
    fn test_move_to_cart() {
        let mut session = session();
        let id = ProductId::new(2);

        assert!(session.toggle_wishlist(id).unwrap());
        session.move_to_cart(id).unwrap();

        assert!(session.store().wishlist().is_empty());
        assert_eq!(session.store().cart_line(id).unwrap().quantity(), 1);
        assert!(session.move_to_cart(id).is_err());
    }

    #[test]
    fn test_cart_summary() {
        let mut session = session();
        session.add_to_cart(ProductId::new(1)).unwrap();
        session.add_to_cart(ProductId::new(2)).unwrap();
        session.increase(ProductId::new(2));
        session.increase(ProductId::new(2));
        session.decrease(ProductId::new(1));

        let summary = session.cart_summary();
        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.lines[0].quantity, 1);
        assert_eq!(summary.lines[1].line_total.to_string(), "66.90");
        assert_eq!(summary.total_items, 4);
        assert_eq!(summary.total_price.to_string(), "176.85");
    }

    #[test]
    fn test_checkout_empty_cart() {
        let mut session = session();
        let err = session.checkout(&shipping()).unwrap_err();
        assert_eq!(err.user_message(), "Your cart is empty");
    }

    #[test]
    fn test_checkout_invalid_form_keeps_cart() {
        let mut session = session();
        session.add_to_cart(ProductId::new(3)).unwrap();

        let form = CheckoutForm {
            address: String::new(),
            ..shipping()
        };
        let err = session.checkout(&form).unwrap_err();

        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.get(Field::Address), Some("Address is required"));
        assert_eq!(session.store().total_items(), 1);
    }

    #[test]
    fn test_checkout_clears_cart() {
        let mut session = session();
        session.add_to_cart(ProductId::new(1)).unwrap();
        session.add_to_cart(ProductId::new(1)).unwrap();

        let confirmation = session.checkout(&shipping()).unwrap();

        assert_eq!(confirmation.item_count, 2);
        assert_eq!(confirmation.total.to_string(), "219.90");
        assert_eq!(confirmation.payment_method, "Cash on Delivery");
        assert_eq!(confirmation.shipping.name, "Jane Doe");
        assert!(session.store().cart().is_empty());
    }

    #[test]
    fn test_visible_products_follow_filter() {
        let mut session = session();
        session.filter_mut().search = "shirt".to_string();

        let visible: Vec<_> = session.visible_products().iter().map(|p| p.id).collect();
        assert_eq!(visible, vec![ProductId::new(2)]);
    }

    #[test]
    fn test_logout_without_login_is_noop() {
        let mut session = session();
        session.logout();
        assert!(!session.is_logged_in());
        assert!(session.username().is_none());
    }

    #[test]
    fn test_login_form_empty_without_demo() {
        let form = session().login_form();
        assert!(form.username.is_empty());
    }
}
