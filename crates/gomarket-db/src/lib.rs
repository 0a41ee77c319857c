//! # gomarket-db: Storage Layer for the GoMarketplace Cart
//!
//! This crate provides the key-value persistence the cart store writes its
//! snapshot to. It uses SQLite for local storage with sqlx for async
//! operations, and offers an in-memory backend for tests.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Persistence Flow                            │
//! │                                                                         │
//! │  CartStore persist writer (gomarket-cart)                              │
//! │       │                                                                 │
//! │       │  storage.set("@GoMarketplace:products", "[...]")               │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    gomarket-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │StorageBackend │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │ (storage.rs)  │    │   (kv.rs)     │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ MemoryStorage │    │ KeyValueRepo  │    │ 001_kv.sql   │  │   │
//! │  │   │ Database ─────┼───►│ get/set/remove│    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/cart/gomarket.db                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`storage`] - The `StorageBackend` trait and the in-memory backend
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (key-value)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gomarket_db::{Database, DbConfig, StorageBackend};
//!
//! let db = Database::new(DbConfig::new("path/to/gomarket.db")).await?;
//!
//! db.set("@GoMarketplace:products", "[]").await?;
//! let snapshot = db.get("@GoMarketplace:products").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod storage;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::kv::KeyValueRepository;
pub use storage::{MemoryStorage, StorageBackend};
