//! # Cart Provider
//!
//! The scope a cart lives in. Code that needs the cart asks the provider for
//! it; asking before the provider is mounted is a usage error.
//!
//! ```text
//!   CartProvider::new()          unmounted
//!        │
//!        │ mount(storage, config).await   ── loads snapshot, starts writer
//!        ▼
//!   mounted ──► use_cart() -> Ok(CartStore)
//!        │
//!        │ unmount().await                ── flushes, stops writer
//!        ▼
//!   unmounted ──► use_cart() -> Err(CartError::OutsideProvider)
//! ```

use std::sync::{Arc, RwLock};

use gomarket_db::StorageBackend;
use tokio::sync::broadcast;
use tracing::info;

use crate::config::{CartConfig, EventSettings};
use crate::error::{CartError, CartResult};
use crate::events::{CartEvent, EventBus};
use crate::store::CartStore;

/// Owns the mounted [`CartStore`].
///
/// Subscribers taken from the provider outlive mounts, so they also see the
/// `Loaded` event of every mount.
#[derive(Debug)]
pub struct CartProvider {
    store: RwLock<Option<CartStore>>,
    events: EventBus,
}

impl Default for CartProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CartProvider {
    /// Creates an unmounted provider.
    pub fn new() -> Self {
        Self::with_event_capacity(EventSettings::default().capacity)
    }

    /// Creates an unmounted provider whose event buffer holds `capacity`
    /// events.
    pub fn with_event_capacity(capacity: usize) -> Self {
        CartProvider {
            store: RwLock::new(None),
            events: EventBus::new(capacity),
        }
    }

    /// Loads the cart and makes it available through [`CartProvider::use_cart`].
    ///
    /// Mounting an already mounted provider shuts the previous store down
    /// first. An invalid config fails before the previous store is touched.
    pub async fn mount(
        &self,
        storage: Arc<dyn StorageBackend>,
        config: &CartConfig,
    ) -> CartResult<CartStore> {
        config.validate()?;

        if let Some(previous) = self.take() {
            info!("Replacing mounted cart store");
            Self::stop(previous).await;
        }

        let store = CartStore::load_with_events(storage, config, self.events.clone()).await?;
        *self.store.write().expect("Provider lock poisoned") = Some(store.clone());

        info!(key = %store.storage_key(), "Cart provider mounted");
        Ok(store)
    }

    /// Returns the mounted store.
    ///
    /// ## Errors
    /// `CartError::OutsideProvider` when nothing is mounted.
    pub fn use_cart(&self) -> CartResult<CartStore> {
        self.store
            .read()
            .expect("Provider lock poisoned")
            .clone()
            .ok_or(CartError::OutsideProvider)
    }

    /// Returns true while a store is mounted.
    pub fn is_mounted(&self) -> bool {
        self.store.read().expect("Provider lock poisoned").is_some()
    }

    /// Subscribes to events of the current and future mounts.
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Flushes and stops the mounted store, leaving the provider unmounted.
    ///
    /// Unmounting an unmounted provider is a no-op.
    pub async fn unmount(&self) {
        if let Some(store) = self.take() {
            Self::stop(store).await;
            info!("Cart provider unmounted");
        }
    }

    fn take(&self) -> Option<CartStore> {
        self.store.write().expect("Provider lock poisoned").take()
    }

    async fn stop(store: CartStore) {
        // Already stopped is fine here; the store is going away either way.
        if let Err(e) = store.shutdown().await {
            info!(error = %e, "Cart store was already shut down");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use gomarket_core::{CartChange, ProductCandidate};
    use gomarket_db::MemoryStorage;

    const KEY: &str = "@GoMarketplace:products";

    fn candidate(id: &str) -> ProductCandidate {
        ProductCandidate::new(id, "T", "u", 1.0)
    }

    #[test]
    fn test_use_cart_outside_provider() {
        let provider = CartProvider::new();
        assert!(!provider.is_mounted());

        let err = provider.use_cart().unwrap_err();
        assert!(matches!(err, CartError::OutsideProvider));
        assert!(err.is_usage_error());
    }

    #[tokio::test]
    async fn test_mount_then_use() {
        let provider = CartProvider::new();
        let storage = Arc::new(MemoryStorage::new());
        provider.mount(storage.clone(), &CartConfig::default()).await.unwrap();
        assert!(provider.is_mounted());

        let cart = provider.use_cart().unwrap();
        assert_eq!(
            cart.add_to_cart(candidate("A")).unwrap(),
            CartChange::Added { id: "A".into() }
        );

        // Every use_cart call sees the same cart.
        assert_eq!(provider.use_cart().unwrap().products().len(), 1);
    }

    #[tokio::test]
    async fn test_unmount_flushes_and_blocks_access() {
        let provider = CartProvider::new();
        let storage = Arc::new(MemoryStorage::new());
        let store = provider.mount(storage.clone(), &CartConfig::default()).await.unwrap();
        store.add_to_cart(candidate("A")).unwrap();

        provider.unmount().await;

        assert!(storage.get(KEY).await.unwrap().is_some());
        assert!(store.is_shut_down());
        assert!(matches!(provider.use_cart(), Err(CartError::OutsideProvider)));

        // Second unmount is harmless.
        provider.unmount().await;
    }

    #[tokio::test]
    async fn test_retained_store_rejects_operations_after_unmount() {
        let provider = CartProvider::new();
        let storage = Arc::new(MemoryStorage::new());
        let store = provider.mount(storage.clone(), &CartConfig::default()).await.unwrap();

        provider.unmount().await;

        let err = store.add_to_cart(candidate("A")).unwrap_err();
        assert!(err.is_usage_error());
        assert!(store.products().is_empty());
        assert_eq!(storage.get(KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_config_keeps_current_mount() {
        let provider = CartProvider::new();
        let storage = Arc::new(MemoryStorage::new());
        let store = provider.mount(storage.clone(), &CartConfig::default()).await.unwrap();

        let mut config = CartConfig::default();
        config.events.capacity = 0;
        let err = provider.mount(storage, &config).await.unwrap_err();

        assert!(err.is_config_error());
        assert!(!store.is_shut_down());
        assert!(provider.is_mounted());
    }

    #[tokio::test]
    async fn test_remount_restores_state() {
        let provider = CartProvider::new();
        let storage = Arc::new(MemoryStorage::new());

        let first = provider.mount(storage.clone(), &CartConfig::default()).await.unwrap();
        first.add_to_cart(candidate("A")).unwrap();
        first.add_to_cart(candidate("A")).unwrap();

        let second = provider.mount(storage.clone(), &CartConfig::default()).await.unwrap();
        assert!(first.is_shut_down());
        assert_eq!(second.products()[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_subscriber_sees_loaded_event() {
        let provider = CartProvider::new();
        let mut rx = provider.subscribe();

        let snapshot = r#"[{"id":"A","title":"T","imageUrl":"u","price":1,"quantity":3}]"#;
        let storage = Arc::new(MemoryStorage::with_entry(KEY, snapshot));
        let store = provider.mount(storage, &CartConfig::default()).await.unwrap();

        let loaded = rx.recv().await.unwrap();
        assert_eq!(loaded.change(), None);
        assert_eq!(loaded.products[0].quantity, 3);

        store.increment("A").unwrap();
        let changed = rx.recv().await.unwrap();
        assert_eq!(
            changed.change(),
            Some(&CartChange::Incremented { id: "A".into(), quantity: 4 })
        );
    }
}
