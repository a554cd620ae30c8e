//! Login and signup against the fake store API.

use pocketcart_app::api::{ApiError, Credentials, FakeStoreClient};
use pocketcart_app::config::AppConfig;
use pocketcart_app::error::AppError;
use pocketcart_app::forms::{Field, LoginForm, SignupForm};
use pocketcart_app::session::ShopSession;
use pocketcart_app::state::AppState;
use pocketcart_core::UserId;
use pocketcart_integration_tests::{FakeStore, LoginReply, Scenario, SignupReply, unreachable_url};

async fn login_with(reply: LoginReply) -> (FakeStore, ShopSession, Result<(), AppError>) {
    let store = FakeStore::start(Scenario {
        login: reply,
        ..Scenario::default()
    })
    .await;
    let mut session = store.session();
    let result = session.login(&LoginForm::new("mor_2314", "83r5^_")).await;
    (store, session, result)
}

fn signup_form() -> SignupForm {
    SignupForm {
        email: "jane@example.com".to_string(),
        password: "hunter22".to_string().into(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        phone: "9876543210".to_string(),
    }
}

#[tokio::test]
async fn test_login_success() {
    let (store, session, result) = login_with(LoginReply::Token("abc123".to_string())).await;

    assert!(result.is_ok());
    assert!(session.is_logged_in());
    assert_eq!(session.username(), Some("mor_2314"));
    assert_eq!(session.token().map(|t| t.expose()), Some("abc123"));

    let requests = store.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/auth/login");
    assert_eq!(requests[0].body["username"], "mor_2314");
    assert_eq!(requests[0].body["password"], "83r5^_");
}

#[tokio::test]
async fn test_login_unauthorized() {
    let (_store, session, result) = login_with(LoginReply::Unauthorized).await;

    let err = result.expect_err("login should fail");
    assert_eq!(err.user_message(), "Invalid username or password");
    assert!(!session.is_logged_in());
}

#[tokio::test]
async fn test_login_other_status() {
    let (_store, _session, result) = login_with(LoginReply::ServerError).await;

    let err = result.expect_err("login should fail");
    assert_eq!(err.user_message(), "An unexpected error occurred");
}

#[tokio::test]
async fn test_login_missing_token() {
    let (_store, session, result) = login_with(LoginReply::MissingToken).await;

    let err = result.expect_err("login should fail");
    assert_eq!(err.user_message(), "Unexpected response format");
    assert!(!session.is_logged_in());
}

#[tokio::test]
async fn test_client_maps_401() {
    let store = FakeStore::start(Scenario {
        login: LoginReply::Unauthorized,
        ..Scenario::default()
    })
    .await;
    let client = FakeStoreClient::new(&store.config().api).expect("client");

    let result = client.login(&Credentials::new("mor_2314", "wrong!")).await;
    assert!(matches!(result, Err(ApiError::InvalidCredentials)));
}

#[tokio::test]
async fn test_login_validation_skips_request() {
    let store = FakeStore::start(Scenario::default()).await;
    let mut session = store.session();

    let err = session
        .login(&LoginForm::new("", "short"))
        .await
        .expect_err("invalid form");

    let AppError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(errors.get(Field::Username), Some("Username is required"));
    assert!(errors.get(Field::Password).is_some());
    assert!(store.requests().is_empty());
}

#[tokio::test]
async fn test_login_unreachable_server() {
    let config = AppConfig::for_api_url(&unreachable_url().await).expect("config");
    let mut session = ShopSession::new(AppState::new(config).expect("state"));

    let err = session
        .login(&LoginForm::new("mor_2314", "83r5^_"))
        .await
        .expect_err("no server");

    assert_eq!(err.user_message(), "An error occurred. Please try again.");
    assert!(err.is_reportable());
}

#[tokio::test]
async fn test_logout_forgets_token() {
    let (_store, mut session, result) = login_with(LoginReply::Token("abc".to_string())).await;
    assert!(result.is_ok());

    session.logout();
    assert!(!session.is_logged_in());
    assert!(session.token().is_none());
}

#[tokio::test]
async fn test_signup_success() {
    let store = FakeStore::start(Scenario {
        signup: SignupReply::Created(42),
        ..Scenario::default()
    })
    .await;
    let mut session = store.session();

    let id = session.signup(&signup_form()).await.expect("signup");

    assert_eq!(id, UserId::new(42));
    assert_eq!(session.registered_user(), Some(UserId::new(42)));
    assert!(!session.is_logged_in());

    let requests = store.requests();
    assert_eq!(requests[0].path, "/users");
    let body = &requests[0].body;
    assert_eq!(body["email"], "jane@example.com");
    assert_eq!(body["username"], "jane@example.com");
    assert_eq!(body["name"]["firstname"], "Jane");
    assert_eq!(body["name"]["lastname"], "Doe");
    assert_eq!(body["phone"], "9876543210");
}

#[tokio::test]
async fn test_signup_rejected() {
    let store = FakeStore::start(Scenario {
        signup: SignupReply::Rejected,
        ..Scenario::default()
    })
    .await;
    let mut session = store.session();

    let err = session.signup(&signup_form()).await.expect_err("rejected");
    assert_eq!(err.user_message(), "Sign-up failed");
    assert!(session.registered_user().is_none());
}

#[tokio::test]
async fn test_signup_missing_id() {
    let store = FakeStore::start(Scenario {
        signup: SignupReply::MissingId,
        ..Scenario::default()
    })
    .await;
    let mut session = store.session();

    let err = session.signup(&signup_form()).await.expect_err("no id");
    assert_eq!(err.user_message(), "Unexpected response format");
}

#[tokio::test]
async fn test_signup_validation_skips_request() {
    let store = FakeStore::start(Scenario::default()).await;
    let mut session = store.session();

    let form = SignupForm {
        phone: "12345".to_string(),
        ..signup_form()
    };
    let err = session.signup(&form).await.expect_err("invalid phone");

    assert_eq!(
        err.user_message(),
        "phone: Phone number must be 10 digits"
    );
    assert!(store.requests().is_empty());
}
