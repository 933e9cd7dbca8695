//! HTML fragments for the product grid, cart panel and search box.
//!
//! Rendered markup carries no inline handlers. Interactive elements expose
//! `data-action` and `data-product-id` attributes which the page's delegated
//! listener turns into [`UiAction`](crate::controller::UiAction)s.

use askama::Template;
use tiffin_core::{Price, Product};

use crate::cart::Cart;
use crate::controller::CartSummary;

/// One product card.
struct CardView<'a> {
    id: String,
    name: &'a str,
    category: &'a str,
    description: &'a str,
    price: Price,
    /// Empty when the product has no image.
    image_url: String,
    in_cart: bool,
}

#[derive(Template)]
#[template(path = "partials/product_grid.html")]
struct ProductGridTemplate<'a> {
    cards: Vec<CardView<'a>>,
}

struct LineView<'a> {
    id: String,
    name: &'a str,
    quantity: u32,
    line_total: Price,
}

#[derive(Template)]
#[template(path = "partials/cart_panel.html")]
struct CartPanelTemplate<'a> {
    /// No entries at all, as opposed to entries the catalog does not know.
    cart_empty: bool,
    lines: Vec<LineView<'a>>,
    total: Price,
}

#[derive(Template)]
#[template(path = "partials/cart_count.html")]
struct CartCountTemplate {
    count: u64,
}

#[derive(Template)]
#[template(path = "partials/suggestions.html")]
struct SuggestionsTemplate<'a> {
    names: &'a [&'a str],
}

/// Render product cards for `items`, marking those already in `cart`.
///
/// Image filenames are joined onto `image_base`.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_product_grid(
    items: &[&Product],
    cart: &Cart,
    image_base: &str,
) -> Result<String, askama::Error> {
    let cards = items
        .iter()
        .map(|product| {
            let id = product.id.cart_key();
            CardView {
                in_cart: cart.contains(&id),
                id,
                name: &product.name,
                category: product.category.as_str(),
                description: product.description.as_deref().unwrap_or_default(),
                price: product.price,
                image_url: product
                    .image
                    .as_deref()
                    .map(|image| format!("{image_base}{image}"))
                    .unwrap_or_default(),
            }
        })
        .collect();

    ProductGridTemplate { cards }.render()
}

/// Render the cart panel.
///
/// "Cart is empty." only shows when the cart has no entries; a cart holding
/// only unknown ids renders no lines. The total is always shown.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_cart_panel(summary: &CartSummary<'_>) -> Result<String, askama::Error> {
    let lines = summary
        .lines
        .iter()
        .map(|line| LineView {
            id: line.product.id.cart_key(),
            name: &line.product.name,
            quantity: line.quantity,
            line_total: line.line_total,
        })
        .collect();

    CartPanelTemplate {
        cart_empty: summary.item_count == 0,
        lines,
        total: summary.total,
    }
    .render()
}

/// Render the header badge showing how many items are in the cart.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_cart_count(count: u64) -> Result<String, askama::Error> {
    CartCountTemplate { count }.render()
}

/// Render the suggestion dropdown entries.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_suggestions(names: &[&str]) -> Result<String, askama::Error> {
    SuggestionsTemplate { names }.render()
}
