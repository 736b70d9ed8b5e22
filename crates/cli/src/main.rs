//! B2B Cart CLI - Inspect and edit a file-backed cart.
//!
//! # Usage
//!
//! ```bash
//! # Add a chair from Acme (asks before discarding another seller's items)
//! cart-cli add --id chair --title Chair --price 50000 --seller-id acme --seller-name Acme
//!
//! # Show the cart, or dump the raw record
//! cart-cli show
//! cart-cli show --json
//!
//! # Change or remove lines
//! cart-cli update chair 3
//! cart-cli remove chair
//!
//! # Print the message to send to the seller
//! cart-cli share
//! ```
//!
//! # Commands
//!
//! - `show` - Print the cart
//! - `add` - Add one unit of an item
//! - `remove` / `update` - Edit a line
//! - `clear` - Empty the cart
//! - `total` / `count` - Derived values
//! - `share` - Message summarizing the cart for the seller
//! - `belongs` - Whether the cart is bound to a seller

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io;
use std::path::PathBuf;

use b2b_cart_store::{AlwaysConfirm, CartStore, Confirm, FileStorage};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod prompt;

use commands::cart::AddArgs;
use config::CliConfig;
use prompt::StdinConfirm;

#[derive(Parser)]
#[command(name = "cart-cli")]
#[command(author, version, about = "B2B cart tools")]
struct Cli {
    /// Directory holding the cart file (default: `$CART_STORAGE_DIR` or `.cart`)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart
    Show {
        /// Print the stored JSON record instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Add one unit of an item
    Add {
        /// Item identifier
        #[arg(long)]
        id: String,

        /// Product title
        #[arg(long)]
        title: Option<String>,

        /// Unit price
        #[arg(long)]
        price: Option<Decimal>,

        /// ISO 4217 currency code
        #[arg(long)]
        currency: Option<String>,

        /// Seller identifier
        #[arg(long)]
        seller_id: String,

        /// Seller display name
        #[arg(long)]
        seller_name: String,

        /// Seller contact phone
        #[arg(long)]
        seller_phone: Option<String>,

        /// Discard another seller's items without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Remove an item
    Remove {
        /// Item identifier
        id: String,
    },
    /// Set an item's quantity (below 1 removes it)
    Update {
        /// Item identifier
        id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
    /// Print the cart total
    Total,
    /// Print the number of units in the cart
    Count,
    /// Print the message to send to the seller
    Share,
    /// Check whether the cart is bound to a seller
    Belongs {
        /// Seller identifier
        seller_id: Option<String>,
    },
}

fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr so command output stays pipeable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "b2b_cart_cli=info,b2b_cart_store=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::from_env(cli.dir)?;
    tracing::debug!(dir = %config.storage_dir.display(), key = %config.cart.storage_key, "Opening cart");

    let store = CartStore::with_config(FileStorage::new(&config.storage_dir), &config.cart);
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Show { json } => commands::cart::show(&store, &mut out, json)?,
        Commands::Add {
            id,
            title,
            price,
            currency,
            seller_id,
            seller_name,
            seller_phone,
            yes,
        } => {
            let args = AddArgs {
                id,
                title,
                price,
                currency,
                seller_id,
                seller_name,
                seller_phone,
            };
            let confirm: &dyn Confirm = if yes { &AlwaysConfirm } else { &StdinConfirm };
            commands::cart::add(&store, &mut out, args, confirm)?;
        }
        Commands::Remove { id } => commands::cart::remove(&store, &mut out, &id)?,
        Commands::Update { id, quantity } => {
            commands::cart::update(&store, &mut out, &id, quantity)?;
        }
        Commands::Clear => commands::cart::clear(&store, &mut out)?,
        Commands::Total => commands::cart::total(&store, &mut out)?,
        Commands::Count => commands::cart::count(&store, &mut out)?,
        Commands::Share => commands::cart::share(&store, &mut out)?,
        Commands::Belongs { seller_id } => {
            commands::cart::belongs(&store, &mut out, seller_id.as_deref())?;
        }
    }
    Ok(())
}
