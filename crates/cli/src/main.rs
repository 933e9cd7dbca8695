//! Tiffin CLI - the storefront from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the menu, optionally by category
//! tiffin menu
//! tiffin menu --category Veg
//!
//! # Fuzzy-search dish names
//! tiffin search biryani
//!
//! # Manage the cart (persisted in TIFFIN_STORAGE_PATH)
//! tiffin cart add 3
//! tiffin cart reduce 3
//! tiffin cart show
//!
//! # Reviews and enquiries
//! tiffin reviews --food 3
//! tiffin review -r 5 -c "Best biryani in town" -f 3
//! tiffin contact -n Ravi -e ravi@example.com -m "Do you deliver on Sundays?"
//!
//! # Place the order
//! tiffin checkout --address "12 MG Road"
//!
//! # Print the HTML fragments the web page uses
//! tiffin render cart
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tiffin_storefront::{ApiClient, FileStorage, Storefront, StorefrontConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{CliError, Context};

#[derive(Parser)]
#[command(name = "tiffin")]
#[command(author, version, about = "Tiffin storefront from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the menu
    Menu {
        /// Only show this category (`All` for everything)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Fuzzy-search dish names
    Search {
        /// Search text; blank lists the whole menu
        query: String,
    },
    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Show customer reviews
    Reviews {
        /// Only reviews of this dish id
        #[arg(short, long)]
        food: Option<i64>,
    },
    /// Leave a review
    Review {
        /// Stars, 1 to 5
        #[arg(short, long)]
        rating: Option<i64>,

        /// What you thought
        #[arg(short, long)]
        comment: String,

        /// Your name (optional)
        #[arg(short, long, default_value = "")]
        name: String,

        /// Dish id, omit for general feedback
        #[arg(short, long)]
        food: Option<String>,
    },
    /// Send a message to the kitchen
    Contact {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        message: String,
    },
    /// Ask about catering or bulk orders
    Bulk {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        /// Occasion and head count
        #[arg(short, long)]
        purpose: String,
    },
    /// Place an order for the current cart
    Checkout {
        /// Delivery address
        #[arg(short, long)]
        address: String,
    },
    /// Print an HTML fragment
    Render {
        #[command(subcommand)]
        view: RenderView,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart lines and the total
    Show,
    /// Add one of a dish
    Add { id: String },
    /// Take one of a dish away
    Reduce { id: String },
    /// Drop a dish entirely
    Remove { id: String },
    /// Add a dish if absent, otherwise drop it
    Toggle { id: String },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum RenderView {
    /// Product grid
    Menu {
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Cart panel
    Cart,
    /// Cart count badge
    Count,
    /// Search suggestion list
    Suggestions { query: String },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
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
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let _ = writeln!(std::io::stderr(), "tiffin: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output can be piped
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tiffin_cli=info,tiffin_storefront=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let api = match ApiClient::new(&config.api) {
        Ok(api) => api,
        Err(e) => {
            CliError::from(e).report();
            return ExitCode::FAILURE;
        }
    };

    let mut shop = Storefront::new(FileStorage::new(&config.storage_path));
    shop.cart_mut().subscribe(|change| {
        tracing::info!(total_quantity = change.total_quantity, "Cart updated");
    });

    let mut ctx = Context {
        image_base: config.image_base,
        api,
        shop,
        out: std::io::stdout().lock(),
    };

    match run(cli, &mut ctx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            ExitCode::FAILURE
        }
    }
}

async fn run<W: Write>(cli: Cli, ctx: &mut Context<W, FileStorage>) -> Result<(), CliError> {
    match cli.command {
        Commands::Menu { category } => commands::menu::list(ctx, category.as_deref()).await?,
        Commands::Search { query } => commands::menu::search(ctx, &query).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(ctx).await?,
            CartAction::Add { id } => commands::cart::add(ctx, &id).await?,
            CartAction::Reduce { id } => commands::cart::reduce(ctx, &id)?,
            CartAction::Remove { id } => commands::cart::remove(ctx, &id)?,
            CartAction::Toggle { id } => commands::cart::toggle(ctx, &id).await?,
            CartAction::Clear => commands::cart::clear(ctx)?,
        },
        Commands::Reviews { food } => commands::forms::reviews(ctx, food).await?,
        Commands::Review {
            rating,
            comment,
            name,
            food,
        } => {
            let form = tiffin_storefront::forms::ReviewForm {
                name,
                rating,
                comment,
                food_id: food,
            };
            commands::forms::review(ctx, &form).await?;
        }
        Commands::Contact {
            name,
            email,
            message,
        } => {
            let form = tiffin_storefront::forms::ContactForm {
                name,
                email,
                message,
            };
            commands::forms::contact(ctx, &form).await?;
        }
        Commands::Bulk {
            name,
            email,
            purpose,
        } => {
            let form = tiffin_storefront::forms::BulkForm {
                name,
                email,
                purpose,
            };
            commands::forms::bulk(ctx, &form).await?;
        }
        Commands::Checkout { address } => commands::cart::checkout(ctx, &address).await?,
        Commands::Render { view } => match view {
            RenderView::Menu { category } => {
                commands::render::menu(ctx, category.as_deref()).await?;
            }
            RenderView::Cart => commands::render::cart(ctx).await?,
            RenderView::Count => commands::render::count(ctx)?,
            RenderView::Suggestions { query } => {
                commands::render::suggestions(ctx, &query).await?;
            }
        },
    }
    Ok(())
}
