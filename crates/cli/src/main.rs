//! Pocketcart CLI - A terminal storefront for the Fake Store API.
//!
//! # Usage
//!
//! ```bash
//! # List products, optionally filtered and sorted
//! pocketcart products --category electronics --price-range 100-500 --sort asc
//!
//! # List categories
//! pocketcart categories
//!
//! # Show one product
//! pocketcart product 3
//!
//! # Check credentials
//! pocketcart login --username mor_2314
//!
//! # Interactive shopping session
//! pocketcart shop
//! ```
//!
//! # Commands
//!
//! - `products` - Browse the catalog
//! - `categories` - List category names
//! - `product` - Product details
//! - `login` - Sign in and report the result
//! - `shop` - Interactive cart, wishlist, and checkout

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pocketcart_app::api::ApiError;
use pocketcart_app::catalog::{CategoryFilter, PriceRange, ProductFilter, SortOrder};
use pocketcart_app::config::{AppConfig, ConfigError};
use pocketcart_app::error::AppError;
use pocketcart_app::session::ShopSession;
use pocketcart_app::state::AppState;
use pocketcart_core::ProductId;
use secrecy::{ExposeSecret, SecretString};
use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;
mod shop;

#[derive(Parser)]
#[command(name = "pocketcart")]
#[command(author, version, about = "Pocketcart terminal storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Case-insensitive title search
        #[arg(short, long, default_value = "")]
        search: String,

        /// Category name, or `All`
        #[arg(short, long, default_value = "All")]
        category: String,

        /// Price range (`All`, `0-100`, `100-500`, `500+`)
        #[arg(short, long, default_value = "All")]
        price_range: PriceRange,

        /// Sort order (`None`, `asc`, `desc`)
        #[arg(long, default_value = "None")]
        sort: SortOrder,
    },
    /// List product categories
    Categories,
    /// Show one product
    Product {
        /// Product id
        id: ProductId,
    },
    /// Sign in with a username and password
    Login {
        /// Account username
        #[arg(short, long)]
        username: String,

        /// Account password (prompted for when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Start an interactive shopping session
    Shop,
}

/// Errors that end a command.
#[derive(Debug, Error)]
enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not start the API client: {0}")]
    Client(#[from] ApiError),

    #[error("{}", .0.user_message())]
    App(#[from] AppError),

    #[error("{0}")]
    Catalog(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AppConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let _ = writeln!(io::stderr(), "{}", CliError::from(e));
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr; stdout carries the screens
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pocketcart=info,pocketcart_app=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            let _ = writeln!(io::stderr(), "{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), CliError> {
    let state = AppState::new(config)?;
    let currency = state.config().currency;
    let mut session = ShopSession::new(state);
    let mut out = io::stdout();

    match cli.command {
        Commands::Products {
            search,
            category,
            price_range,
            sort,
        } => {
            load_catalog(&mut session).await?;
            *session.filter_mut() = ProductFilter {
                search,
                category: CategoryFilter::from(category.as_str()),
                price_range,
                sort,
            };
            render::product_list(&mut out, &session.visible_products(), None, currency)?;
        }
        Commands::Categories => {
            load_catalog(&mut session).await?;
            render::categories(&mut out, session.catalog().categories())?;
        }
        Commands::Product { id } => {
            let product = session.product_detail(id).await?;
            render::product_detail(&mut out, &product, currency)?;
        }
        Commands::Login { username, password } => {
            let mut form = session.login_form();
            let demo_user = username == form.username;
            form.username = username;
            match password {
                Some(password) => form.password = SecretString::from(password),
                None if demo_user && !form.password.expose_secret().is_empty() => {}
                None => form.password = SecretString::from(read_password(&mut out).await?),
            }
            session.login(&form).await?;
            writeln!(out, "Signed in as {}.", form.username)?;
        }
        Commands::Shop => {
            session.refresh_catalog().await;
            shop::show_catalog_status(&session, &mut out)?;
            let input = BufReader::new(tokio::io::stdin());
            shop::run(&mut session, input, &mut out).await?;
        }
    }
    Ok(())
}

/// Fetch the catalog, failing if the product list could not be loaded.
async fn load_catalog(session: &mut ShopSession) -> Result<(), CliError> {
    if session.refresh_catalog().await {
        return Ok(());
    }
    match session.catalog().error() {
        Some(message) => Err(CliError::Catalog(message)),
        None => Ok(()),
    }
}

async fn read_password(out: &mut impl Write) -> io::Result<String> {
    write!(out, "Password: ")?;
    out.flush()?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    Ok(lines.next_line().await?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_products_arguments() {
        let cli = Cli::try_parse_from([
            "pocketcart",
            "products",
            "--price-range",
            "500+",
            "--sort",
            "desc",
        ]);
        let Ok(Cli {
            command:
                Commands::Products {
                    price_range, sort, ..
                },
        }) = cli
        else {
            panic!("expected products command");
        };
        assert_eq!(price_range, PriceRange::Over500);
        assert_eq!(sort, SortOrder::PriceHighToLow);
    }

    #[test]
    fn test_rejects_unknown_price_range() {
        assert!(Cli::try_parse_from(["pocketcart", "products", "-p", "cheap"]).is_err());
    }

    #[test]
    fn test_app_error_shows_user_message() {
        let err = CliError::from(AppError::EmptyCart);
        assert_eq!(err.to_string(), "Your cart is empty");
    }
}
