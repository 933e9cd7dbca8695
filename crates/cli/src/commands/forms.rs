//! Reviews, contact messages and bulk-order enquiries.

use std::io::Write;

use tiffin_core::{ProductId, Reply, Review};
use tiffin_storefront::forms::{BulkForm, ContactForm, ReviewForm, review_status};
use tiffin_storefront::AppError;

use super::{CliError, Context};

/// Print reviews, newest first as served.
pub async fn reviews<W: Write, S>(
    ctx: &mut Context<W, S>,
    food: Option<i64>,
) -> Result<(), CliError> {
    let reviews = ctx.api.fetch_reviews(food.map(ProductId::new)).await?;
    if reviews.is_empty() {
        writeln!(ctx.out, "No reviews yet.")?;
    }
    for review in &reviews {
        writeln!(ctx.out, "{}", review_line(review))?;
    }
    Ok(())
}

/// Validate and submit a review, printing the status line.
pub async fn review<W: Write, S>(
    ctx: &mut Context<W, S>,
    form: &ReviewForm,
) -> Result<(), CliError> {
    let submission = form.validate()?;
    let outcome = ctx.api.submit_review(&submission).await;
    writeln!(ctx.out, "{}", review_status(&outcome))?;
    accepted(outcome?)?;
    Ok(())
}

pub async fn contact<W: Write, S>(
    ctx: &mut Context<W, S>,
    form: &ContactForm,
) -> Result<(), CliError> {
    let message = form.validate()?;
    let reply = ctx.api.submit_contact(&message).await?;
    accepted(reply)?;
    writeln!(ctx.out, "Message sent!")?;
    Ok(())
}

pub async fn bulk<W: Write, S>(ctx: &mut Context<W, S>, form: &BulkForm) -> Result<(), CliError> {
    let request = form.validate()?;
    let reply = ctx.api.submit_bulk_request(&request).await?;
    accepted(reply)?;
    writeln!(ctx.out, "Request sent! We'll be in touch.")?;
    Ok(())
}

fn accepted(reply: Reply) -> Result<(), AppError> {
    if reply.ok {
        Ok(())
    } else {
        Err(AppError::Rejected(reply.error.unwrap_or_default()))
    }
}

fn review_line(review: &Review) -> String {
    let stars = usize::from(review.rating.stars());
    format!(
        "{}{} {} ({}): {}",
        "★".repeat(stars),
        "☆".repeat(5 - stars),
        review.display_name(),
        review.created_at.format("%Y-%m-%d"),
        review.comment
    )
}
