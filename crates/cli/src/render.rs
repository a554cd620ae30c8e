//! Plain-text views of the storefront screens.
//!
//! Every function writes to any `io::Write` so tests can render into a buffer.

use std::io::{self, Write};

use pocketcart_app::forms::ValidationErrors;
use pocketcart_app::session::{CartSummary, OrderConfirmation};
use pocketcart_core::{CurrencyCode, Product, Store, WishlistEntry};

/// The product list screen. Products already in the cart or wishlist are
/// marked.
pub fn product_list(
    out: &mut impl Write,
    products: &[&Product],
    store: Option<&Store>,
    currency: CurrencyCode,
) -> io::Result<()> {
    if products.is_empty() {
        return writeln!(out, "No products match the current filters.");
    }

    for product in products {
        let mut marks = String::new();
        if let Some(store) = store {
            if store.is_in_cart(product.id) {
                marks.push_str(" [in cart]");
            }
            if store.is_in_wishlist(product.id) {
                marks.push_str(" [wishlisted]");
            }
        }
        writeln!(
            out,
            "{:>4}  {:>12}  {}{}",
            product.id,
            product.price.display(currency),
            product.title,
            marks
        )?;
    }
    Ok(())
}

/// Category names, one per line.
pub fn categories(out: &mut impl Write, categories: &[String]) -> io::Result<()> {
    for category in categories {
        writeln!(out, "{category}")?;
    }
    Ok(())
}

/// The product detail screen.
pub fn product_detail(
    out: &mut impl Write,
    product: &Product,
    currency: CurrencyCode,
) -> io::Result<()> {
    writeln!(out, "{}", product.title)?;
    writeln!(out, "  id:       {}", product.id)?;
    writeln!(out, "  price:    {}", product.price.display(currency))?;
    if !product.category.is_empty() {
        writeln!(out, "  category: {}", product.category)?;
    }
    if let Some(rating) = &product.rating {
        writeln!(out, "  rating:   {:.1} ({} reviews)", rating.rate, rating.count)?;
    }
    if !product.description.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", product.description)?;
    }
    Ok(())
}

/// The cart screen.
pub fn cart(out: &mut impl Write, summary: &CartSummary, currency: CurrencyCode) -> io::Result<()> {
    if summary.is_empty() {
        return writeln!(out, "Your cart is empty");
    }

    for line in &summary.lines {
        writeln!(
            out,
            "{:>4}  {} x{}  @ {}  = {}",
            line.product_id,
            line.title,
            line.quantity,
            line.unit_price.display(currency),
            line.line_total.display(currency)
        )?;
    }
    writeln!(out, "Total items: {}", summary.total_items)?;
    writeln!(out, "Total price: {}", summary.total_price.display(currency))
}

/// The wishlist screen.
pub fn wishlist(
    out: &mut impl Write,
    entries: &[WishlistEntry],
    currency: CurrencyCode,
) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "Your wishlist is empty");
    }

    for entry in entries {
        writeln!(
            out,
            "{:>4}  {:>12}  {}",
            entry.id(),
            entry.product.price.display(currency),
            entry.product.title
        )?;
    }
    Ok(())
}

/// The order placed screen.
pub fn confirmation(
    out: &mut impl Write,
    order: &OrderConfirmation,
    currency: CurrencyCode,
) -> io::Result<()> {
    writeln!(out, "Order placed!")?;
    writeln!(out, "  order:    {}", order.order_id)?;
    writeln!(out, "  placed:   {}", order.placed_at.format("%Y-%m-%d %H:%M UTC"))?;
    writeln!(out, "  items:    {}", order.item_count)?;
    writeln!(out, "  total:    {}", order.total.display(currency))?;
    writeln!(out, "  payment:  {}", order.payment_method)?;
    writeln!(out, "  ship to:  {}, {}", order.shipping.name, order.shipping.address)
}

/// One line per failing form field.
pub fn validation_errors(out: &mut impl Write, errors: &ValidationErrors) -> io::Result<()> {
    for (field, message) in errors.iter() {
        writeln!(out, "  {field}: {message}")?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pocketcart_app::session::CartLine;
    use pocketcart_core::{Price, ProductId};

    use super::*;

    fn product(id: u64, title: &str, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price: Price::parse(price).unwrap(),
            category: "jewelery".to_string(),
            description: String::new(),
            image: String::new(),
            rating: None,
        }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_product_list_marks_cart_and_wishlist() {
        let ring = product(5, "Silver Ring", "10.99");
        let chain = product(6, "Gold Chain", "168");
        let mut store = Store::new();
        store.add_to_cart(&ring);
        store.add_to_wishlist(&chain);

        let output = render(|out| {
            product_list(out, &[&ring, &chain], Some(&store), CurrencyCode::INR)
        });

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("₹10.99"));
        assert!(lines[0].ends_with("Silver Ring [in cart]"));
        assert!(lines[1].ends_with("Gold Chain [wishlisted]"));
    }

    #[test]
    fn test_product_list_empty() {
        let output = render(|out| product_list(out, &[], None, CurrencyCode::INR));
        assert_eq!(output, "No products match the current filters.\n");
    }

    #[test]
    fn test_cart_totals() {
        let summary = CartSummary {
            lines: vec![CartLine {
                product_id: ProductId::new(5),
                title: "Silver Ring".to_string(),
                unit_price: Price::parse("10.99").unwrap(),
                quantity: 2,
                line_total: Price::parse("21.98").unwrap(),
            }],
            total_items: 2,
            total_price: Price::parse("21.98").unwrap(),
        };

        let output = render(|out| cart(out, &summary, CurrencyCode::USD));
        assert!(output.contains("Silver Ring x2  @ $10.99  = $21.98"));
        assert!(output.contains("Total items: 2"));
        assert!(output.ends_with("Total price: $21.98\n"));
    }

    #[test]
    fn test_empty_screens() {
        let summary = CartSummary {
            lines: Vec::new(),
            total_items: 0,
            total_price: Price::ZERO,
        };
        assert_eq!(
            render(|out| cart(out, &summary, CurrencyCode::INR)),
            "Your cart is empty\n"
        );
        assert_eq!(
            render(|out| wishlist(out, &[], CurrencyCode::INR)),
            "Your wishlist is empty\n"
        );
    }
}
