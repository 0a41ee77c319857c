//! # Repository Module
//!
//! Database repository implementations for the cart storage.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  StorageBackend for Database                                           │
//! │       │                                                                 │
//! │       │  db.kv().set("@GoMarketplace:products", "[...]")               │
//! │       ▼                                                                 │
//! │  KeyValueRepository                                                    │
//! │  ├── get(&self, key)                                                   │
//! │  ├── set(&self, key, value)                                            │
//! │  └── remove(&self, key)                                                │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database (key_value table)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`kv::KeyValueRepository`] - Namespaced string values

pub mod kv;
