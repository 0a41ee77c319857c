//! # gomarket CLI
//!
//! Command-line display layer for the GoMarketplace cart.
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         gomarket (binary)                               │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  main.rs                                                         │  │
//! │  │  init_tracing() ─► Cli::parse() ─► run(cli) ─► print JSON        │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │  ┌────────────────────────────▼─────────────────────────────────────┐  │
//! │  │  run()                                                           │  │
//! │  │  1. CartConfig::load(--config)                                   │  │
//! │  │  2. Database::new(--db | config | platform data dir)             │  │
//! │  │  3. CartProvider::mount ─► use_cart()                            │  │
//! │  │  4. commands::cart::<subcommand>                                 │  │
//! │  │  5. unmount (flush) ─► close database                            │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Output
//! stdout carries exactly one JSON document: the cart on success, an
//! [`ApiError`] on failure. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use gomarket_cart::{CartConfig, CartProvider, CartStore};
use gomarket_core::ProductCandidate;
use gomarket_db::{Database, DbConfig};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;

pub use commands::cart::CartResponse;
pub use error::{ApiError, ErrorCode};

// =============================================================================
// Command Line
// =============================================================================

/// GoMarketplace shopping cart.
#[derive(Debug, Parser)]
#[command(name = "gomarket", version, about)]
pub struct Cli {
    /// Config file (default: platform config dir / cart.toml)
    #[arg(long, global = true, env = "GOMARKET_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database file (overrides config)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Cart subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the cart
    List,

    /// Add a product (or one more of it)
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        image_url: String,
        #[arg(long)]
        price: f64,
    },

    /// Increase a product's quantity by one
    Increment { id: String },

    /// Decrease a product's quantity by one, removing it at zero
    Decrement { id: String },

    /// Remove every product
    Clear,
}

// =============================================================================
// Entry Points
// =============================================================================

/// Runs one command against the persisted cart.
pub async fn run(cli: Cli) -> Result<CartResponse, ApiError> {
    let config = CartConfig::load(cli.config)?;

    let db_path = cli
        .db
        .or_else(|| config.database_path())
        .ok_or_else(|| ApiError::internal("Could not determine app data directory"))?;

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ApiError::internal(format!("Failed to create data directory: {}", e))
            })?;
        }
    }

    info!(path = %db_path.display(), "Opening cart database");
    let db = Database::new(DbConfig::new(&db_path)).await?;

    let provider = CartProvider::new();
    provider.mount(Arc::new(db.clone()), &config).await?;

    let result = match provider.use_cart() {
        Ok(cart) => dispatch(&cart, cli.command).await,
        Err(e) => Err(e.into()),
    };

    provider.unmount().await;
    db.close().await;

    result
}

async fn dispatch(cart: &CartStore, command: Command) -> Result<CartResponse, ApiError> {
    use commands::cart;

    match command {
        Command::List => Ok(cart::get_cart(cart)),
        Command::Add {
            id,
            title,
            image_url,
            price,
        } => cart::add_to_cart(cart, ProductCandidate::new(id, title, image_url, price)).await,
        Command::Increment { id } => cart::increment(cart, &id).await,
        Command::Decrement { id } => cart::decrement(cart, &id).await,
        Command::Clear => cart::clear_cart(cart).await,
    }
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - Default: `warn,gomarket=info,sqlx=warn`
/// - Override with `RUST_LOG`
///
/// Logs are written to stderr so stdout stays machine-readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,gomarket=info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Renders a value as pretty JSON for stdout.
pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        format!(
            r#"{{"code":"INTERNAL","message":"Failed to render output: {}"}}"#,
            e
        )
    })
}
