//! Order Desk CLI - cart, checkout and order tools for the store API.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog and fill the cart
//! order-desk catalog --category Snacks
//! order-desk cart add 12 --quantity 2
//! order-desk cart show
//!
//! # Place the order
//! order-desk checkout --name "Priya Rao" --phone "98765 43210" --city Mumbai --area Andheri
//!
//! # Review orders
//! order-desk orders list --status unpaid --export unpaid.csv
//!
//! # Enter a phone order from the dashboard
//! order-desk orders create --phone 9820012345 --item 12:2 --item SW-4:1:300
//!
//! # Save the statistics report
//! order-desk stats --export stats_report.txt
//! ```
//!
//! # Commands
//!
//! - `cart` - Inspect and edit the locally persisted cart
//! - `catalog`, `cities`, `areas` - Browse store data
//! - `checkout` - Validate the cart and place an order
//! - `orders` - List, filter, export, inspect and enter orders
//! - `stats` - Dashboard figures and the text report
//! - `health` - API connection status

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use order_desk_core::PaymentStatus;
use order_desk_core::checkout::CheckoutForm;
use order_desk_core::entry::{EntryItem, OrderEntry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "order-desk")]
#[command(author, version, about = "Order Desk CLI tools")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// List products grouped by category
    Catalog {
        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List delivery cities
    Cities,
    /// List known areas of a city
    Areas {
        /// City name
        city: String,
    },
    /// Place an order for the current cart
    Checkout(CheckoutArgs),
    /// Review orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Show dashboard statistics
    Stats {
        /// Also write the statistics report to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Check the API connection
    Health,
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a catalog product
    Add {
        /// Product ID
        product_id: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    /// Remove one unit of a product
    Remove {
        /// Product ID
        product_id: String,

        /// Drop the whole line instead of one unit
        #[arg(long)]
        all: bool,
    },
    /// Set the quantity of a product already in the cart (0 removes it)
    Set {
        /// Product ID
        product_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Print the cart
    Show,
    /// Empty the cart
    Clear,
}

#[derive(Args)]
struct CheckoutArgs {
    /// Customer name
    #[arg(short, long)]
    name: String,

    /// Customer phone number (at least 10 digits)
    #[arg(short, long)]
    phone: String,

    /// Delivery city
    #[arg(short, long)]
    city: String,

    /// Delivery area
    #[arg(short, long)]
    area: String,

    /// Payment status (`paid`, `unpaid`, `cod`)
    #[arg(long, default_value = "unpaid")]
    payment_status: PaymentStatus,

    /// Who received the payment (required when paid)
    #[arg(long)]
    paid_to: Option<String>,

    /// Order notes
    #[arg(long, default_value = "")]
    notes: String,

    /// Delivery date as YYYY-MM-DD (default: tomorrow)
    #[arg(long)]
    delivery_date: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders
    List(ListArgs),
    /// Show one order
    Show {
        /// Order ID
        order_id: String,
    },
    /// Enter an order on behalf of a customer
    Create(CreateArgs),
}

#[derive(Args)]
struct CreateArgs {
    /// Customer phone number
    #[arg(short, long)]
    phone: String,

    /// Customer name (default: Unknown)
    #[arg(short, long, default_value = "")]
    name: String,

    /// Delivery city
    #[arg(short, long, default_value = "")]
    city: String,

    /// Delivery area
    #[arg(short, long, default_value = "")]
    area: String,

    /// Item as <product id>:<quantity>[:<unit price>], repeatable
    #[arg(short, long = "item")]
    items: Vec<EntryItem>,

    /// Payment status (`paid`, `unpaid`, `cod`)
    #[arg(long, default_value = "unpaid")]
    payment_status: PaymentStatus,

    /// Order notes
    #[arg(long, default_value = "")]
    notes: String,

    /// Delivery date as YYYY-MM-DD (default: tomorrow)
    #[arg(long)]
    delivery_date: Option<NaiveDate>,
}

#[derive(Args)]
struct ListArgs {
    /// Match order ID, customer, phone, city or area
    #[arg(short, long)]
    search: Option<String>,

    /// Payment status (`paid`, `unpaid`, `cod`)
    #[arg(long)]
    status: Option<PaymentStatus>,

    /// Order date as YYYY-MM-DD
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Ask the API for orders of this phone number only
    #[arg(long)]
    phone: Option<String>,

    /// Maximum number of orders to fetch
    #[arg(long)]
    limit: Option<u32>,

    /// Write the listed orders to a CSV file
    #[arg(long)]
    export: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "order_desk=info,order_desk_client=info,order_desk_core=warn".into());
    let json_layer = cli
        .json
        .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!cli.json).then(|| tracing_subscriber::fmt::layer().with_target(false));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli.command).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env()?;

    match command {
        Commands::Cart { action } => match action {
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&ctx, &product_id, quantity).await?,
            CartAction::Remove { product_id, all } => commands::cart::remove(&ctx, &product_id, all)?,
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart::set(&ctx, &product_id, quantity).await?,
            CartAction::Show => commands::cart::show(&ctx),
            CartAction::Clear => commands::cart::clear(&ctx),
        },
        Commands::Catalog { category } => {
            commands::catalog::products(&ctx, category.as_deref()).await?;
        }
        Commands::Cities => commands::catalog::cities(&ctx).await,
        Commands::Areas { city } => commands::catalog::areas(&ctx, &city).await,
        Commands::Checkout(args) => {
            let form = CheckoutForm {
                name: args.name,
                phone: args.phone,
                city: args.city,
                area: args.area,
                payment_status: args.payment_status,
                paid_to: args.paid_to,
                notes: args.notes,
                delivery_date: args.delivery_date,
            };
            commands::checkout::place_order(&ctx, &form).await?;
        }
        Commands::Orders { action } => match action {
            OrdersAction::List(args) => {
                let options = commands::orders::ListOptions {
                    search: args.search,
                    status: args.status,
                    date: args.date,
                    phone: args.phone,
                    limit: args.limit,
                    export: args.export,
                };
                commands::orders::list(&ctx, options).await?;
            }
            OrdersAction::Show { order_id } => commands::orders::show(&ctx, &order_id).await?,
            OrdersAction::Create(args) => {
                let entry = OrderEntry {
                    phone: args.phone,
                    name: args.name,
                    city: args.city,
                    area: args.area,
                    payment_status: args.payment_status,
                    notes: args.notes,
                    items: args.items,
                    delivery_date: args.delivery_date,
                };
                commands::orders::create(&ctx, &entry).await?;
            }
        },
        Commands::Stats { export } => commands::stats::show(&ctx, export.as_deref()).await?,
        Commands::Health => commands::stats::health(&ctx).await,
    }
    Ok(())
}
