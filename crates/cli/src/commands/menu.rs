//! Menu listing and search.

use std::io::Write;

use tiffin_core::{CategoryFilter, Product};
use tiffin_storefront::search;
use tiffin_storefront::{KeyValueStore, SearchOutcome};

use super::{CliError, Context};

/// Print the menu, narrowed to `category` when given.
pub async fn list<W: Write, S: KeyValueStore>(
    ctx: &mut Context<W, S>,
    category: Option<&str>,
) -> Result<(), CliError> {
    ctx.load_catalog().await?;
    if let Some(category) = category {
        ctx.shop.filter_by(CategoryFilter::parse(category));
    }

    let categories: Vec<&str> = std::iter::once(CategoryFilter::ALL_LABEL)
        .chain(ctx.shop.category_names().into_iter().map(|c| c.as_str()))
        .collect();
    writeln!(ctx.out, "Categories: {}", categories.join(", "))?;

    let items = ctx.shop.visible_items(None);
    if items.is_empty() {
        writeln!(ctx.out, "No dishes in {}", ctx.shop.filter().label())?;
        return Ok(());
    }

    let cart = ctx.shop.cart().load();
    for product in items {
        writeln!(
            ctx.out,
            "{}",
            menu_line(product, cart.quantity(&product.id.cart_key()))
        )?;
    }
    Ok(())
}

/// Print dishes ranked against `query`.
pub async fn search<W: Write, S: KeyValueStore>(
    ctx: &mut Context<W, S>,
    query: &str,
) -> Result<(), CliError> {
    ctx.load_catalog().await?;

    match ctx.shop.search(query) {
        SearchOutcome::NoQuery(items) => {
            for product in items {
                writeln!(ctx.out, "{}", menu_line(product, 0))?;
            }
        }
        SearchOutcome::Matches(items) if items.is_empty() => {
            writeln!(ctx.out, "No matches found")?;
        }
        SearchOutcome::Matches(items) => {
            for product in items {
                writeln!(
                    ctx.out,
                    "{:.2}  {}",
                    search::score(&product.name, query.trim()),
                    menu_line(product, 0)
                )?;
            }
        }
    }
    Ok(())
}

/// One menu row: id, name, category, price and how many are in the cart.
fn menu_line(product: &Product, in_cart: u32) -> String {
    let mut line = format!(
        "{:>4}  {:<28} {:<10} {:>8}",
        product.id.to_string(),
        product.name,
        product.category.as_str(),
        product.price.to_string()
    );
    if in_cart > 0 {
        line.push_str(&format!("  (in cart: {in_cart})"));
    }
    line
}
