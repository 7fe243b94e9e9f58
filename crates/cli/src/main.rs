//! Go Marketplace CLI - Cart inspection and editing.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! gm-cli cart list
//!
//! # Add a product (or bump its quantity if already present)
//! gm-cli cart add --id 1 --title "Backpack" --image-url https://img/1.png --price 150
//!
//! # Change quantities
//! gm-cli cart increment 1
//! gm-cli cart decrement 1
//!
//! # Use a different backend for one invocation
//! gm-cli --storage sqlite cart list
//! ```
//!
//! # Commands
//!
//! - `cart list` - Print the cart
//! - `cart add` - Add one unit of a product
//! - `cart increment` / `cart decrement` - Adjust a line's quantity
//!
//! Storage is configured through `GO_MARKETPLACE_*` environment variables
//! (see `go_marketplace_cart::config`); flags override them.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use go_marketplace_cart::{CartConfig, StorageBackend};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "gm-cli")]
#[command(author, version, about = "Go Marketplace CLI tools")]
struct Cli {
    /// Storage backend (`memory`, `file`, `sqlite`)
    #[arg(long, global = true)]
    storage: Option<StorageBackend>,

    /// Data directory for the file backend
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// SQLite URL for the sqlite backend
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and modify the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print every cart line
    List,
    /// Add one unit of a product
    Add {
        /// Product ID
        #[arg(long)]
        id: String,

        /// Product title
        #[arg(long)]
        title: String,

        /// Product image URL
        #[arg(long, default_value = "")]
        image_url: String,

        /// Unit price (e.g. 19.99)
        #[arg(long)]
        price: String,
    },
    /// Increase a line's quantity by one
    Increment {
        /// Product ID
        id: String,
    },
    /// Decrease a line's quantity by one, removing it at zero
    Decrement {
        /// Product ID
        id: String,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout carries only the cart
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "go_marketplace_cli=info,go_marketplace_cart=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CartConfig::from_env()?;
    if let Some(storage) = cli.storage {
        config.backend = storage;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::List => commands::cart::list(&config).await?,
            CartAction::Add {
                id,
                title,
                image_url,
                price,
            } => commands::cart::add(&config, &id, &title, &image_url, &price).await?,
            CartAction::Increment { id } => commands::cart::increment(&config, &id).await?,
            CartAction::Decrement { id } => commands::cart::decrement(&config, &id).await?,
        },
    }
    Ok(())
}
