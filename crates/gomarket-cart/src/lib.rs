//! # gomarket-cart: Cart Store Service
//!
//! Holds the live cart, applies the display layer's operations to it, and
//! keeps storage in step.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         gomarket-cart                                   │
//! │                                                                         │
//! │  Display layer                                                         │
//! │       │  provider.use_cart()?                                          │
//! │       ▼                                                                 │
//! │  ┌──────────────┐   owns    ┌──────────────────────────────────────┐   │
//! │  │ CartProvider │ ────────► │ CartStore                            │   │
//! │  │  (provider)  │           │  Arc<Mutex<Cart>>  (gomarket-core)   │   │
//! │  └──────────────┘           │  add_to_cart / increment / decrement │   │
//! │                             └──────┬─────────────────────┬─────────┘   │
//! │                                    │ snapshot            │ CartEvent   │
//! │                                    ▼                     ▼             │
//! │                           ┌────────────────┐   ┌──────────────────┐    │
//! │                           │ PersistWriter  │   │ broadcast channel│    │
//! │                           │ (persist.rs)   │   │ (events.rs)      │    │
//! │                           └───────┬────────┘   └──────────────────┘    │
//! │                                   │ set(key, json)                     │
//! │                                   ▼                                    │
//! │                           StorageBackend (gomarket-db)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`store`] - The cart store and its operations
//! - [`provider`] - Mount/unmount scope with the `use_cart` accessor
//! - [`events`] - Change notifications
//! - [`config`] - `cart.toml` + environment configuration
//! - [`error`] - Service error types
//!
//! ## Usage
//! ```rust,ignore
//! let provider = CartProvider::new();
//! provider.mount(Arc::new(db), &CartConfig::load_or_default(None)).await?;
//!
//! let cart = provider.use_cart()?;
//! cart.add_to_cart(ProductCandidate::new("A", "Tee", "a.png", 10.0))?;
//! cart.flush().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod events;
mod persist;
pub mod provider;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::CartConfig;
pub use error::{CartError, CartResult};
pub use events::{CartEvent, CartEventKind};
pub use provider::CartProvider;
pub use store::CartStore;
