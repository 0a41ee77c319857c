//! # gomarket-core: Pure Cart Logic for GoMarketplace
//!
//! This crate is the **heart** of the GoMarketplace cart. It contains the cart
//! state machine and the persisted snapshot format as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      GoMarketplace Cart Architecture                    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Display Layer (CLI / UI)                     │   │
//! │  │      list ──► add_to_cart ──► increment ──► decrement          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              gomarket-cart (CartStore / CartProvider)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gomarket-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   cart    │  │ snapshot  │  │ validation│  │   │
//! │  │   │ LineItem  │  │   Cart    │  │  encode   │  │ quantity  │  │   │
//! │  │   │ Candidate │  │CartChange │  │  decode   │  │ unique id │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO ASYNC • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              gomarket-db (Key-Value Storage Backends)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (LineItem, ProductCandidate, CartTotals)
//! - [`cart`] - The cart state machine (add / increment / decrement)
//! - [`snapshot`] - Persisted snapshot format
//! - [`error`] - Domain error types
//! - [`validation`] - Cart invariant validation
//!
//! ## Example Usage
//!
//! ```rust
//! use gomarket_core::{Cart, CartChange, ProductCandidate};
//!
//! let mut cart = Cart::new();
//! let candidate = ProductCandidate::new("A", "Tee", "https://img/a.png", 10.0);
//!
//! assert_eq!(cart.add(candidate.clone()), CartChange::Added { id: "A".into() });
//! assert_eq!(
//!     cart.add(candidate),
//!     CartChange::Incremented { id: "A".into(), quantity: 2 }
//! );
//! assert_eq!(cart.total_quantity(), 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod snapshot;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartChange};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key under which the cart snapshot is persisted.
///
/// ## Why a constant?
/// There is exactly one cart per installation. The key is namespaced with the
/// application name so it can share a key-value store with other data.
pub const STORAGE_KEY: &str = "@GoMarketplace:products";
