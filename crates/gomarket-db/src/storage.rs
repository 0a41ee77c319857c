//! # Storage Backends
//!
//! The key-value interface the cart persists its snapshot through.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     StorageBackend implementations                      │
//! │                                                                         │
//! │   Arc<dyn StorageBackend>                                              │
//! │        │                                                                │
//! │        ├──► Database       SQLite key_value table (durable)            │
//! │        └──► MemoryStorage  HashMap behind an RwLock (tests, demos)     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values are opaque strings. Interpreting them is the caller's job.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::DbResult;
use crate::pool::Database;

/// Async key-value storage.
///
/// A `set` that returns `Ok` is visible to every later `get` on the same
/// backend, including from a new instance opened on the same location.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> DbResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> DbResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> DbResult<()>;
}

// =============================================================================
// SQLite
// =============================================================================

#[async_trait]
impl StorageBackend for Database {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        self.kv().get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        self.kv().set(key, value).await
    }

    async fn remove(&self, key: &str) -> DbResult<()> {
        self.kv().remove(key).await?;
        Ok(())
    }
}

// =============================================================================
// In-Memory
// =============================================================================

/// In-memory storage backend.
///
/// All data is lost when the backend is dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-seeded with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        MemoryStorage {
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use std::sync::Arc;

    const KEY: &str = "@GoMarketplace:products";

    async fn exercise(storage: Arc<dyn StorageBackend>) {
        assert_eq!(storage.get(KEY).await.unwrap(), None);

        storage.set(KEY, "[]").await.unwrap();
        assert_eq!(storage.get(KEY).await.unwrap().as_deref(), Some("[]"));

        storage.set(KEY, r#"[{"id":"1"}]"#).await.unwrap();
        assert_eq!(
            storage.get(KEY).await.unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );

        storage.remove(KEY).await.unwrap();
        storage.remove(KEY).await.unwrap();
        assert_eq!(storage.get(KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_storage() {
        exercise(Arc::new(MemoryStorage::new())).await;
    }

    #[tokio::test]
    async fn test_database_storage() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        exercise(Arc::new(db)).await;
    }

    #[tokio::test]
    async fn test_memory_storage_seeded() {
        let storage = MemoryStorage::with_entry(KEY, "[]");
        assert_eq!(storage.get(KEY).await.unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.get("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gomarket.db");

        {
            let db = Database::new(DbConfig::new(&path)).await.unwrap();
            db.set(KEY, r#"[{"id":"7"}]"#).await.unwrap();
            db.close().await;
        }

        let reopened = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(
            reopened.get(KEY).await.unwrap().as_deref(),
            Some(r#"[{"id":"7"}]"#)
        );
    }
}
