//! Interactive shopping loop.
//!
//! Reads one command per line and drives a [`ShopSession`], printing each
//! screen after the action that changes it.

use std::io::{self, Write};
use std::str::FromStr;

use pocketcart_app::catalog::{CategoryFilter, PriceRange, SortOrder, UnknownOption};
use pocketcart_app::error::AppError;
use pocketcart_app::forms::{CheckoutForm, SignupForm};
use pocketcart_app::session::ShopSession;
use pocketcart_core::ProductId;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::render;

const HELP: &str = "\
Commands:
  login [username]      sign in
  signup                create an account
  logout                sign out
  refresh               reload products and categories
  list                  show products matching the filters
  show <id>             product details
  search [text]         filter by title (no text clears)
  category [name]       filter by category (no name lists categories)
  price <range>         All, 0-100, 100-500, 500+
  sort <order>          None, asc, desc
  add <id>              add to cart
  remove <id>           remove from cart
  inc <id> / dec <id>   change cart quantity
  wish <id>             toggle wishlist
  unwish <id>           remove from wishlist
  wishlist              show wishlist
  move <id>             move from wishlist to cart
  cart                  show cart
  checkout              place a cash-on-delivery order
  help                  this text
  quit                  leave";

/// A parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopCommand {
    Login(Option<String>),
    Signup,
    Logout,
    Refresh,
    List,
    Show(ProductId),
    Search(String),
    Category(Option<String>),
    Price(PriceRange),
    Sort(SortOrder),
    Add(ProductId),
    Remove(ProductId),
    Increase(ProductId),
    Decrease(ProductId),
    Wish(ProductId),
    Unwish(ProductId),
    Wishlist,
    Move(ProductId),
    Cart,
    Checkout,
    Help,
    Quit,
}

/// A line that is not a command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0} (type `help` for a list)")]
    Unknown(String),
    #[error("`{0}` needs a product id")]
    MissingId(&'static str),
    #[error("invalid product id: {0}")]
    InvalidId(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error(transparent)]
    Option(#[from] UnknownOption),
}

impl FromStr for ShopCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        let command = match word.to_ascii_lowercase().as_str() {
            "" => return Err(ParseError::Empty),
            "login" => Self::Login(arg),
            "signup" => Self::Signup,
            "logout" => Self::Logout,
            "refresh" => Self::Refresh,
            "list" | "ls" => Self::List,
            "show" => Self::Show(product_id("show", rest)?),
            "search" => Self::Search(rest.to_string()),
            "category" => Self::Category(arg),
            "price" => Self::Price(required("price", rest)?.parse()?),
            "sort" => Self::Sort(required("sort", rest)?.parse()?),
            "add" => Self::Add(product_id("add", rest)?),
            "remove" | "rm" => Self::Remove(product_id("remove", rest)?),
            "inc" => Self::Increase(product_id("inc", rest)?),
            "dec" => Self::Decrease(product_id("dec", rest)?),
            "wish" => Self::Wish(product_id("wish", rest)?),
            "unwish" => Self::Unwish(product_id("unwish", rest)?),
            "wishlist" => Self::Wishlist,
            "move" => Self::Move(product_id("move", rest)?),
            "cart" => Self::Cart,
            "checkout" => Self::Checkout,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn required<'a>(command: &'static str, rest: &'a str) -> Result<&'a str, ParseError> {
    if rest.is_empty() {
        Err(ParseError::MissingArgument(command))
    } else {
        Ok(rest)
    }
}

fn product_id(command: &'static str, rest: &str) -> Result<ProductId, ParseError> {
    if rest.is_empty() {
        return Err(ParseError::MissingId(command));
    }
    rest.parse()
        .map_err(|_| ParseError::InvalidId(rest.to_string()))
}

/// Whether the loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Line-oriented input with prompts.
struct Console<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> Console<R> {
    /// Print `label` and read one line as typed. `None` at end of input.
    async fn read_raw(&mut self, out: &mut impl Write, label: &str) -> io::Result<Option<String>> {
        write!(out, "{label}")?;
        out.flush()?;
        self.lines.next_line().await
    }

    /// Print `label` and read one trimmed line. `None` at end of input.
    async fn prompt(&mut self, out: &mut impl Write, label: &str) -> io::Result<Option<String>> {
        Ok(self
            .read_raw(out, label)
            .await?
            .map(|line| line.trim().to_string()))
    }

    /// Like [`Self::prompt`], but end of input yields an empty string.
    async fn field(&mut self, out: &mut impl Write, label: &str) -> io::Result<String> {
        Ok(self.prompt(out, label).await?.unwrap_or_default())
    }

    /// A password field. Surrounding spaces are part of the secret.
    async fn password(&mut self, out: &mut impl Write, label: &str) -> io::Result<SecretString> {
        Ok(SecretString::from(
            self.read_raw(out, label).await?.unwrap_or_default(),
        ))
    }
}

/// Run the loop until `quit` or end of input.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails; command
/// failures are printed and the loop continues.
pub async fn run<R: AsyncBufRead + Unpin>(
    session: &mut ShopSession,
    input: R,
    out: &mut impl Write,
) -> io::Result<()> {
    let mut console = Console {
        lines: input.lines(),
    };
    writeln!(out, "Welcome to Pocketcart. Type `help` for commands.")?;

    loop {
        let (cart, wishlist) = session.store().badge_counts();
        let label = format!("[cart {cart} | wishlist {wishlist}]> ");
        let Some(line) = console.prompt(out, &label).await? else {
            writeln!(out)?;
            return Ok(());
        };

        match line.parse::<ShopCommand>() {
            Ok(command) => {
                if execute(session, &mut console, out, command).await? == Flow::Quit {
                    return Ok(());
                }
            }
            Err(ParseError::Empty) => {}
            Err(e) => writeln!(out, "{e}")?,
        }
    }
}

async fn execute<R: AsyncBufRead + Unpin>(
    session: &mut ShopSession,
    console: &mut Console<R>,
    out: &mut impl Write,
    command: ShopCommand,
) -> io::Result<Flow> {
    let currency = session.state().config().currency;

    match command {
        ShopCommand::Login(username) => login(session, console, out, username).await?,
        ShopCommand::Signup => signup(session, console, out).await?,
        ShopCommand::Logout => {
            session.logout();
            writeln!(out, "Signed out.")?;
        }
        ShopCommand::Refresh => {
            session.refresh_catalog().await;
            show_catalog_status(session, out)?;
        }
        ShopCommand::List => list(session, out)?,
        ShopCommand::Show(id) => match session.product_detail(id).await {
            Ok(product) => render::product_detail(out, &product, currency)?,
            Err(e) => report(out, &e)?,
        },
        ShopCommand::Search(text) => {
            session.filter_mut().search = text;
            list(session, out)?;
        }
        ShopCommand::Category(None) => render::categories(out, session.catalog().categories())?,
        ShopCommand::Category(Some(name)) => {
            session.filter_mut().category = CategoryFilter::from(name.as_str());
            list(session, out)?;
        }
        ShopCommand::Price(range) => {
            session.filter_mut().price_range = range;
            list(session, out)?;
        }
        ShopCommand::Sort(order) => {
            session.filter_mut().sort = order;
            list(session, out)?;
        }
        ShopCommand::Add(id) => match session.add_to_cart(id) {
            Ok(()) => writeln!(out, "Added to cart.")?,
            Err(e) => report(out, &e)?,
        },
        ShopCommand::Remove(id) => {
            session.remove(id);
            render::cart(out, &session.cart_summary(), currency)?;
        }
        ShopCommand::Increase(id) => {
            session.increase(id);
            render::cart(out, &session.cart_summary(), currency)?;
        }
        ShopCommand::Decrease(id) => {
            session.decrease(id);
            render::cart(out, &session.cart_summary(), currency)?;
        }
        ShopCommand::Wish(id) => match session.toggle_wishlist(id) {
            Ok(true) => writeln!(out, "Added to wishlist.")?,
            Ok(false) => writeln!(out, "Removed from wishlist.")?,
            Err(e) => report(out, &e)?,
        },
        ShopCommand::Unwish(id) => {
            session.remove_from_wishlist(id);
            render::wishlist(out, session.store().wishlist(), currency)?;
        }
        ShopCommand::Wishlist => render::wishlist(out, session.store().wishlist(), currency)?,
        ShopCommand::Move(id) => match session.move_to_cart(id) {
            Ok(()) => writeln!(out, "Moved to cart.")?,
            Err(e) => report(out, &e)?,
        },
        ShopCommand::Cart => render::cart(out, &session.cart_summary(), currency)?,
        ShopCommand::Checkout => checkout(session, console, out).await?,
        ShopCommand::Help => writeln!(out, "{HELP}")?,
        ShopCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn list(session: &ShopSession, out: &mut impl Write) -> io::Result<()> {
    let currency = session.state().config().currency;
    render::product_list(
        out,
        &session.visible_products(),
        Some(session.store()),
        currency,
    )
}

/// Print the catalog's load failure, if any.
pub fn show_catalog_status(session: &ShopSession, out: &mut impl Write) -> io::Result<()> {
    match session.catalog().error() {
        Some(message) => writeln!(out, "{message}"),
        None => writeln!(
            out,
            "Loaded {} products.",
            session.catalog().products().len()
        ),
    }
}

/// Print an error the way the screens show it.
pub fn report(out: &mut impl Write, err: &AppError) -> io::Result<()> {
    match err {
        AppError::Validation(errors) => {
            writeln!(out, "Please fix the following:")?;
            render::validation_errors(out, errors)
        }
        other => writeln!(out, "{}", other.user_message()),
    }
}

async fn login<R: AsyncBufRead + Unpin>(
    session: &mut ShopSession,
    console: &mut Console<R>,
    out: &mut impl Write,
    username: Option<String>,
) -> io::Result<()> {
    let mut form = session.login_form();
    let username = match username {
        Some(username) => username,
        None if form.username.is_empty() => console.field(out, "Username: ").await?,
        None => {
            let typed = console
                .field(out, &format!("Username [{}]: ", form.username))
                .await?;
            if typed.is_empty() { form.username.clone() } else { typed }
        }
    };

    // Demo password is only reused for the demo user.
    let demo_user = !form.password.expose_secret().is_empty() && username == form.username;
    let password = console.password(out, "Password: ").await?;
    if !(password.expose_secret().is_empty() && demo_user) {
        form.password = password;
    }
    form.username = username;

    match session.login(&form).await {
        Ok(()) => writeln!(out, "Signed in as {}.", form.username),
        Err(e) => report(out, &e),
    }
}

async fn signup<R: AsyncBufRead + Unpin>(
    session: &mut ShopSession,
    console: &mut Console<R>,
    out: &mut impl Write,
) -> io::Result<()> {
    let form = SignupForm {
        email: console.field(out, "Email: ").await?,
        password: console.password(out, "Password: ").await?,
        first_name: console.field(out, "First name: ").await?,
        last_name: console.field(out, "Last name: ").await?,
        phone: console.field(out, "Phone: ").await?,
    };

    match session.signup(&form).await {
        Ok(id) => writeln!(out, "Account {id} created. You can now log in."),
        Err(e) => report(out, &e),
    }
}

async fn checkout<R: AsyncBufRead + Unpin>(
    session: &mut ShopSession,
    console: &mut Console<R>,
    out: &mut impl Write,
) -> io::Result<()> {
    // Same refusal as the session, without prompting for details first.
    if session.store().cart().is_empty() {
        return report(out, &AppError::EmptyCart);
    }

    let currency = session.state().config().currency;
    render::cart(out, &session.cart_summary(), currency)?;

    let form = CheckoutForm {
        name: console.field(out, "Name: ").await?,
        email: console.field(out, "Email: ").await?,
        phone: console.field(out, "Phone: ").await?,
        address: console.field(out, "Address: ").await?,
    };

    match session.checkout(&form) {
        Ok(order) => render::confirmation(out, &order, currency),
        Err(e) => report(out, &e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pocketcart_app::catalog::Catalog;
    use pocketcart_app::config::AppConfig;
    use pocketcart_app::state::AppState;
    use pocketcart_core::{Price, Product};

    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("list".parse::<ShopCommand>(), Ok(ShopCommand::List));
        assert_eq!("  ADD 3 ".parse::<ShopCommand>(), Ok(ShopCommand::Add(ProductId::new(3))));
        assert_eq!(
            "search gold  ring".parse::<ShopCommand>(),
            Ok(ShopCommand::Search("gold  ring".to_string()))
        );
        assert_eq!("search".parse::<ShopCommand>(), Ok(ShopCommand::Search(String::new())));
        assert_eq!(
            "category men's clothing".parse::<ShopCommand>(),
            Ok(ShopCommand::Category(Some("men's clothing".to_string())))
        );
        assert_eq!("category".parse::<ShopCommand>(), Ok(ShopCommand::Category(None)));
        assert_eq!(
            "price 100-500".parse::<ShopCommand>(),
            Ok(ShopCommand::Price(PriceRange::From100To500))
        );
        assert_eq!(
            "sort price high to low".parse::<ShopCommand>(),
            Ok(ShopCommand::Sort(SortOrder::PriceHighToLow))
        );
        assert_eq!("login mor_2314".parse::<ShopCommand>(), Ok(ShopCommand::Login(Some("mor_2314".to_string()))));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<ShopCommand>(), Err(ParseError::Empty));
        assert_eq!("add".parse::<ShopCommand>(), Err(ParseError::MissingId("add")));
        assert_eq!(
            "inc seven".parse::<ShopCommand>(),
            Err(ParseError::InvalidId("seven".to_string()))
        );
        assert!(matches!(
            "price cheap".parse::<ShopCommand>(),
            Err(ParseError::Option(_))
        ));
        assert_eq!(
            "dance".parse::<ShopCommand>(),
            Err(ParseError::Unknown("dance".to_string()))
        );
    }

    #[tokio::test]
    async fn test_password_keeps_surrounding_spaces() {
        let mut console = Console {
            lines: "  Jane  \n  s3cret pass  \n".as_bytes().lines(),
        };
        let mut out = Vec::new();

        let name = console.field(&mut out, "Name: ").await.unwrap();
        let password = console.password(&mut out, "Password: ").await.unwrap();

        assert_eq!(name, "Jane");
        assert_eq!(password.expose_secret(), "  s3cret pass  ");
        assert!(console.password(&mut out, "Password: ").await.unwrap().expose_secret().is_empty());
    }

    fn session() -> ShopSession {
        let product = |id: u64, title: &str, price: &str| Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price: Price::parse(price).unwrap(),
            category: "jewelery".to_string(),
            description: String::new(),
            image: String::new(),
            rating: None,
        };
        let catalog = Catalog::with_data(
            vec![product(1, "Silver Ring", "10.00"), product(2, "Gold Chain", "5.50")],
            vec!["jewelery".to_string()],
        );
        let config = AppConfig::for_api_url("http://127.0.0.1:9").unwrap();
        ShopSession::with_catalog(AppState::new(config).unwrap(), catalog)
    }

    async fn script(session: &mut ShopSession, input: &str) -> String {
        let mut out = Vec::new();
        run(session, input.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_script_cart_and_checkout() {
        let mut session = session();
        let output = script(
            &mut session,
            "add 1\nadd 1\nadd 2\ncart\ncheckout\nJane Doe\njane@example.com\n9876543210\n12 MG Road\nquit\n",
        )
        .await;

        assert!(output.contains("Total price: ₹25.50"));
        assert!(output.contains("Order placed!"));
        assert!(output.contains("payment:  Cash on Delivery"));
        assert!(session.store().cart().is_empty());
    }

    #[tokio::test]
    async fn test_script_reports_errors_and_continues() {
        let mut session = session();
        let output = script(&mut session, "checkout\nadd 99\nfly\nwish 2\nmove 2\n").await;

        assert!(output.contains("Your cart is empty"));
        assert!(output.contains("Product not found"));
        assert!(output.contains("unknown command: fly"));
        assert!(output.contains("Moved to cart."));
        assert_eq!(session.store().badge_counts(), (1, 0));
    }

    #[tokio::test]
    async fn test_script_checkout_validation() {
        let mut session = session();
        let output = script(&mut session, "add 1\ncheckout\n\nnope\n123\n\n").await;

        assert!(output.contains("name: Name is required"));
        assert!(output.contains("email: Valid email is required"));
        assert!(output.contains("phone: Valid phone number is required"));
        assert!(output.contains("address: Address is required"));
        assert_eq!(session.store().total_items(), 1);
    }

    #[tokio::test]
    async fn test_script_filters() {
        let mut session = session();
        let output = script(&mut session, "sort asc\nsearch ring\n").await;

        let chain = output.find("Gold Chain").unwrap();
        let ring = output.find("Silver Ring").unwrap();
        assert!(chain < ring);
        assert_eq!(session.visible_products().len(), 1);
    }
}
