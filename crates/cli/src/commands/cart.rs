//! Cart commands and checkout.

use std::io::Write;

use tiffin_storefront::cart::Cart;
use tiffin_storefront::forms::order_submission;
use tiffin_storefront::{AppError, KeyValueStore, UiAction};

use super::{CliError, Context, cart_key};

/// Print cart lines and the total.
pub async fn show<W: Write, S: KeyValueStore>(ctx: &mut Context<W, S>) -> Result<(), CliError> {
    ctx.load_catalog().await?;
    let summary = ctx.shop.cart_summary();

    if summary.is_empty() {
        writeln!(ctx.out, "Cart is empty.")?;
    } else {
        for line in &summary.lines {
            writeln!(
                ctx.out,
                "{:<28} x{:<3} {:>8}",
                line.product.name,
                line.quantity,
                line.line_total.to_string()
            )?;
        }
        writeln!(ctx.out, "Total: {}", summary.total)?;
    }

    let listed: u64 = summary.lines.iter().map(|l| u64::from(l.quantity)).sum();
    if summary.item_count > listed {
        writeln!(
            ctx.out,
            "({} item(s) no longer on the menu)",
            summary.item_count - listed
        )?;
    }
    Ok(())
}

/// Add one unit of a dish on the menu.
pub async fn add<W: Write, S: KeyValueStore>(
    ctx: &mut Context<W, S>,
    raw_id: &str,
) -> Result<(), CliError> {
    let (id, name) = menu_item(ctx, raw_id).await?;
    let cart = ctx.shop.dispatch(&UiAction::Increment(id.clone()));
    writeln!(ctx.out, "{name}: {} in cart", cart.quantity(&id))?;
    Ok(())
}

/// Add a dish at quantity 1, or drop it if already in the cart.
pub async fn toggle<W: Write, S: KeyValueStore>(
    ctx: &mut Context<W, S>,
    raw_id: &str,
) -> Result<(), CliError> {
    let (id, name) = menu_item(ctx, raw_id).await?;
    let cart = ctx.shop.dispatch(&UiAction::Toggle(id.clone()));
    if cart.contains(&id) {
        writeln!(ctx.out, "Added {name} to cart")?;
    } else {
        writeln!(ctx.out, "Removed {name} from cart")?;
    }
    Ok(())
}

/// Take one unit away.
pub fn reduce<W: Write, S: KeyValueStore>(
    ctx: &mut Context<W, S>,
    raw_id: &str,
) -> Result<(), CliError> {
    let id = cart_key(raw_id)?;
    if !ctx.shop.cart().load().contains(&id) {
        return Err(AppError::NotFound(format!("product {id} in cart")).into());
    }
    let cart = ctx.shop.dispatch(&UiAction::Decrement(id.clone()));
    report_quantity(&mut ctx.out, &cart, &id)
}

/// Drop a dish entirely.
pub fn remove<W: Write, S: KeyValueStore>(
    ctx: &mut Context<W, S>,
    raw_id: &str,
) -> Result<(), CliError> {
    let id = cart_key(raw_id)?;
    let cart = ctx.shop.dispatch(&UiAction::Remove(id.clone()));
    report_quantity(&mut ctx.out, &cart, &id)
}

pub fn clear<W: Write, S: KeyValueStore>(ctx: &mut Context<W, S>) -> Result<(), CliError> {
    ctx.shop.dispatch(&UiAction::Clear);
    writeln!(ctx.out, "Cart cleared.")?;
    Ok(())
}

/// Submit the order and empty the cart once the kitchen accepts it.
pub async fn checkout<W: Write, S: KeyValueStore>(
    ctx: &mut Context<W, S>,
    address: &str,
) -> Result<(), CliError> {
    ctx.load_catalog().await?;
    if !ctx.shop.checkout_ready() {
        return Err(AppError::EmptyCart.into());
    }

    let order = order_submission(address)?;
    let total = ctx.shop.cart_summary().total;
    let reply = ctx.api.submit_order(&order).await?;
    if !reply.ok {
        return Err(AppError::Rejected(reply.error.unwrap_or_default()).into());
    }

    ctx.shop.dispatch(&UiAction::Clear);
    tracing::info!(%total, "Order placed");
    writeln!(ctx.out, "Order confirmed! Total: {total}")?;
    Ok(())
}

/// Resolve a typed id against the menu, returning its cart key and name.
async fn menu_item<W, S: KeyValueStore>(
    ctx: &mut Context<W, S>,
    raw_id: &str,
) -> Result<(String, String), CliError> {
    let id = cart_key(raw_id)?;
    ctx.load_catalog().await?;
    let name = ctx
        .shop
        .find(&id)
        .map(|p| p.name.clone())
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok((id, name))
}

fn report_quantity(out: &mut impl Write, cart: &Cart, id: &str) -> Result<(), CliError> {
    match cart.quantity(id) {
        0 => writeln!(out, "Product {id} removed from cart")?,
        quantity => writeln!(out, "Product {id}: {quantity} in cart")?,
    }
    Ok(())
}
