//! A whole shopping session: login, browse, cart, wishlist, checkout.

use pocketcart_app::error::AppError;
use pocketcart_app::forms::{CheckoutForm, LoginForm};
use pocketcart_core::ProductId;
use pocketcart_integration_tests::{FakeStore, Scenario};

fn shipping() -> CheckoutForm {
    CheckoutForm {
        name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        phone: "9876543210".to_string(),
        address: "12 MG Road, Bengaluru".to_string(),
    }
}

#[tokio::test]
async fn test_login_browse_and_checkout() {
    let store = FakeStore::start(Scenario::default()).await;
    let mut session = store.session();

    session
        .login(&LoginForm::new("mor_2314", "83r5^_"))
        .await
        .expect("login");
    assert!(session.refresh_catalog().await);

    let backpack = ProductId::new(1);
    let tshirt = ProductId::new(2);
    let drive = ProductId::new(9);

    // Product list buttons
    assert!(session.toggle_cart(backpack).expect("add backpack"));
    assert!(session.toggle_cart(tshirt).expect("add t-shirt"));
    assert!(session.toggle_wishlist(drive).expect("wish drive"));
    assert_eq!(session.store().badge_counts(), (2, 1));

    // Cart screen
    session.increase(tshirt);
    session.increase(tshirt);
    session.decrease(backpack);
    let summary = session.cart_summary();
    assert_eq!(summary.total_items, 4);
    assert_eq!(summary.total_price.to_string(), "176.85");

    // Wishlist screen
    session.move_to_cart(drive).expect("move drive");
    assert!(session.store().wishlist().is_empty());
    assert_eq!(session.cart_summary().total_price.to_string(), "240.85");

    // Checkout
    let order = session.checkout(&shipping()).expect("checkout");
    assert_eq!(order.item_count, 5);
    assert_eq!(order.total.to_string(), "240.85");
    assert_eq!(order.payment_method, "Cash on Delivery");
    assert_eq!(order.shipping.address, "12 MG Road, Bengaluru");

    assert!(session.store().cart().is_empty());
    assert!(session.cart_summary().is_empty());

    let err = session.checkout(&shipping()).expect_err("cart is empty");
    assert!(matches!(err, AppError::EmptyCart));
}

#[tokio::test]
async fn test_toggle_removes_and_cart_survives_logout() {
    let store = FakeStore::start(Scenario::default()).await;
    let mut session = store.session();
    assert!(session.refresh_catalog().await);
    session
        .login(&LoginForm::new("mor_2314", "83r5^_"))
        .await
        .expect("login");

    let bracelet = ProductId::new(5);
    session.add_to_cart(bracelet).expect("add");
    session.add_to_cart(bracelet).expect("add again");
    assert_eq!(
        session.store().cart_line(bracelet).map(|l| l.quantity()),
        Some(2)
    );

    session.logout();
    assert_eq!(session.store().total_items(), 2);

    assert!(!session.toggle_cart(bracelet).expect("toggle off"));
    assert!(session.store().cart().is_empty());
}

#[tokio::test]
async fn test_cart_actions_before_catalog_load() {
    let store = FakeStore::start(Scenario::default()).await;
    let mut session = store.session();

    let err = session
        .toggle_cart(ProductId::new(1))
        .expect_err("catalog not loaded");
    assert_eq!(err.user_message(), "Product not found");

    assert!(!session.increase(ProductId::new(1)));
    assert!(!session.remove(ProductId::new(1)));
    assert_eq!(session.store().revision(), 0);
}
