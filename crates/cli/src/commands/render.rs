//! Print the HTML fragments the web page swaps in.

use std::io::Write;

use tiffin_core::CategoryFilter;
use tiffin_storefront::search::{self, SearchQuery};
use tiffin_storefront::{KeyValueStore, Storefront, views};

use super::{CliError, Context};

pub async fn menu<W: Write, S: KeyValueStore>(
    ctx: &mut Context<W, S>,
    category: Option<&str>,
) -> Result<(), CliError> {
    ctx.load_catalog().await?;
    if let Some(category) = category {
        ctx.shop.filter_by(CategoryFilter::parse(category));
    }

    let cart = ctx.shop.cart().load();
    let html = views::render_product_grid(&ctx.shop.visible_items(None), &cart, &ctx.image_base)?;
    writeln!(ctx.out, "{html}")?;
    Ok(())
}

pub async fn cart<W: Write, S: KeyValueStore>(ctx: &mut Context<W, S>) -> Result<(), CliError> {
    ctx.load_catalog().await?;
    let html = views::render_cart_panel(&ctx.shop.cart_summary())?;
    writeln!(ctx.out, "{html}")?;
    Ok(())
}

/// The badge needs no catalog: unknown ids still count.
pub fn count<W: Write, S: KeyValueStore>(ctx: &mut Context<W, S>) -> Result<(), CliError> {
    let total = ctx.shop.cart().load().total_quantity();
    writeln!(ctx.out, "{}", views::render_cart_count(total)?)?;
    Ok(())
}

/// Blank queries close the dropdown, so nothing is printed.
pub async fn suggestions<W: Write, S: KeyValueStore>(
    ctx: &mut Context<W, S>,
    query: &str,
) -> Result<(), CliError> {
    ctx.load_catalog().await?;
    if let Some(html) = suggestion_html(&ctx.shop, query)? {
        writeln!(ctx.out, "{html}")?;
    }
    Ok(())
}

fn suggestion_html<S: KeyValueStore>(
    shop: &Storefront<S>,
    query: &str,
) -> Result<Option<String>, CliError> {
    let Some(query) = SearchQuery::parse(query) else {
        return Ok(None);
    };
    let names = search::suggestions(shop.catalog(), query.as_str());
    Ok(Some(views::render_suggestions(&names)?))
}
