//! # Cart Store
//!
//! The authoritative cart for a running app: in-memory state, the mutation
//! operations the display layer calls, and the bridge to persistence and
//! change notification.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      CartStore::increment("A")                          │
//! │                                                                         │
//! │  lock cart ──► Cart::increment on a copy ──► snapshot = items.to_vec() │
//! │                                              │                          │
//! │                         ┌────────────────────┼──────────────────┐       │
//! │                         ▼                    ▼                  │       │
//! │              PersistHandle::enqueue   EventBus::publish         │       │
//! │              (always; commit copy)    (only if changed)         │       │
//! │                         │                                       │       │
//! │  unlock cart ◄──────────┴───────────────────────────────────────┘       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  return Ok(CartChange) (caller never waits on storage)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The cart sits behind `Arc<Mutex<Cart>>`. The lock is held only for the
//! pure update plus the enqueue/publish, never across an await.

use std::sync::{Arc, Mutex};

use gomarket_core::{snapshot, Cart, CartChange, CartTotals, LineItem, ProductCandidate};
use gomarket_db::StorageBackend;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::CartConfig;
use crate::error::CartResult;
use crate::events::{CartEvent, EventBus};
use crate::persist::{PersistHandle, PersistWriter};

/// Shared cart store. Cloning is cheap; clones operate on the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    cart: Mutex<Cart>,
    writer: PersistHandle,
    events: EventBus,
    key: String,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.inner.key)
            .field("items", &self.with_cart(|cart| cart.len()))
            .finish()
    }
}

impl CartStore {
    // =========================================================================
    // Startup
    // =========================================================================

    /// Loads the persisted cart and starts the persist writer.
    ///
    /// A missing, unreadable, or invalid snapshot is logged and the cart
    /// starts empty; that outcome is never an error. Only a bad config fails.
    pub async fn load(storage: Arc<dyn StorageBackend>, config: &CartConfig) -> CartResult<Self> {
        config.validate()?;
        let events = EventBus::new(config.event_capacity());
        Self::load_with_events(storage, config, events).await
    }

    /// Loads with an existing event bus. `config` must already be validated.
    pub(crate) async fn load_with_events(
        storage: Arc<dyn StorageBackend>,
        config: &CartConfig,
        events: EventBus,
    ) -> CartResult<Self> {
        let key = config.storage_key().to_string();

        let cart = Self::read_snapshot(storage.as_ref(), &key).await;
        info!(key = %key, items = cart.len(), "Cart loaded");

        let writer = PersistWriter::new(storage, key.clone()).start();
        events.publish(CartEvent::loaded(cart.items().to_vec()));

        Ok(CartStore {
            inner: Arc::new(StoreInner {
                cart: Mutex::new(cart),
                writer,
                events,
                key,
            }),
        })
    }

    async fn read_snapshot(storage: &dyn StorageBackend, key: &str) -> Cart {
        let text = match storage.get(key).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!(key = %key, "No persisted cart, starting empty");
                return Cart::new();
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read persisted cart, starting empty");
                return Cart::new();
            }
        };

        snapshot::decode(&text).unwrap_or_else(|e| {
            warn!(key = %key, error = %e, "Discarding invalid cart snapshot, starting empty");
            Cart::new()
        })
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Adds a product, or increments it when already in the cart.
    ///
    /// ## Errors
    /// `CartError::WriterClosed` once the store is shut down. The cart is
    /// left as it was.
    pub fn add_to_cart(&self, candidate: ProductCandidate) -> CartResult<CartChange> {
        self.apply("add_to_cart", |cart| cart.add(candidate))
    }

    /// Increments the product's quantity. Unknown ids are a no-op.
    pub fn increment(&self, id: &str) -> CartResult<CartChange> {
        self.apply("increment", |cart| cart.increment(id))
    }

    /// Decrements the product's quantity, removing it at zero. Unknown ids
    /// are a no-op.
    pub fn decrement(&self, id: &str) -> CartResult<CartChange> {
        self.apply("decrement", |cart| cart.decrement(id))
    }

    /// Removes every product.
    pub fn clear(&self) -> CartResult<CartChange> {
        self.apply("clear", |cart| cart.clear())
    }

    fn apply(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut Cart) -> CartChange,
    ) -> CartResult<CartChange> {
        let mut cart = self.inner.cart.lock().expect("Cart mutex poisoned");

        let mut next = cart.clone();
        let change = f(&mut next);
        let products = next.items().to_vec();

        // Enqueue under the lock so the writer sees mutations in order. Memory
        // only changes once the snapshot is queued.
        if let Err(e) = self.inner.writer.enqueue(products.clone()) {
            warn!(op, error = %e, "Cart operation rejected after shutdown");
            return Err(e);
        }
        *cart = next;

        if change.is_change() {
            self.inner.events.publish(CartEvent::changed(change.clone(), products));
        }
        drop(cart);

        debug!(op, ?change, "Cart operation applied");
        Ok(change)
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    /// Returns a copy of the cart contents in order.
    pub fn products(&self) -> Vec<LineItem> {
        self.with_products(|items| items.to_vec())
    }

    /// Runs `f` with read access to the cart contents.
    pub fn with_products<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[LineItem]) -> R,
    {
        self.with_cart(|cart| f(cart.items()))
    }

    /// Returns the count summary.
    pub fn totals(&self) -> CartTotals {
        self.with_cart(|cart| cart.totals())
    }

    fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.inner.cart.lock().expect("Cart mutex poisoned");
        f(&cart)
    }

    /// Subscribes to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.inner.events.subscribe()
    }

    /// Returns the key the cart persists under.
    pub fn storage_key(&self) -> &str {
        &self.inner.key
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Waits until every change made before this call is in storage.
    pub async fn flush(&self) -> CartResult<()> {
        self.inner.writer.flush().await
    }

    /// Writes out pending changes and stops the persist writer.
    ///
    /// Later operations fail with `CartError::WriterClosed`.
    pub async fn shutdown(&self) -> CartResult<()> {
        info!(key = %self.inner.key, "Shutting down cart store");
        self.inner.writer.shutdown().await
    }

    /// Returns true once the store has been shut down.
    pub fn is_shut_down(&self) -> bool {
        self.inner.writer.is_closed()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gomarket_db::{Database, DbConfig, DbError, DbResult, MemoryStorage};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    const KEY: &str = "@GoMarketplace:products";

    fn candidate(id: &str) -> ProductCandidate {
        ProductCandidate::new(id, format!("Product {}", id), format!("https://img/{}.png", id), 9.9)
    }

    fn ids_and_quantities(items: &[LineItem]) -> Vec<(String, u32)> {
        items.iter().map(|i| (i.id.clone(), i.quantity)).collect()
    }

    async fn stored(storage: &dyn StorageBackend) -> Vec<LineItem> {
        let text = storage.get(KEY).await.unwrap().expect("snapshot written");
        snapshot::decode(&text).unwrap().into_items()
    }

    async fn memory_store() -> (Arc<MemoryStorage>, CartStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::load(storage.clone(), &CartConfig::default())
            .await
            .unwrap();
        (storage, store)
    }

    /// Backend whose `set` calls get faster with every call, so an earlier
    /// write finishes after a later one unless writes are serialized.
    struct DelayedStorage {
        inner: MemoryStorage,
        calls: AtomicU64,
        history: Mutex<Vec<String>>,
    }

    impl DelayedStorage {
        fn new() -> Self {
            DelayedStorage {
                inner: MemoryStorage::new(),
                calls: AtomicU64::new(0),
                history: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl StorageBackend for DelayedStorage {
        async fn get(&self, key: &str) -> DbResult<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> DbResult<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = 60u64.saturating_sub(call * 10);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.history.lock().unwrap().push(value.to_string());
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> DbResult<()> {
            self.inner.remove(key).await
        }
    }

    /// Backend where every call fails.
    struct BrokenStorage;

    #[async_trait]
    impl StorageBackend for BrokenStorage {
        async fn get(&self, _key: &str) -> DbResult<Option<String>> {
            Err(DbError::ConnectionFailed("disk unplugged".into()))
        }

        async fn set(&self, _key: &str, _value: &str) -> DbResult<()> {
            Err(DbError::QueryFailed("disk unplugged".into()))
        }

        async fn remove(&self, _key: &str) -> DbResult<()> {
            Err(DbError::QueryFailed("disk unplugged".into()))
        }
    }

    // -------------------------------------------------------------------------
    // Startup load
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_load_empty_storage() {
        let (_, store) = memory_store().await;
        assert!(store.products().is_empty());
        assert_eq!(store.storage_key(), KEY);
    }

    #[tokio::test]
    async fn test_load_existing_snapshot() {
        let snapshot = r#"[
            {"id":"A","title":"Tee","imageUrl":"a.png","price":10,"quantity":2},
            {"id":"B","title":"Cap","image_url":"b.png","price":5.5,"quantity":1}
        ]"#;
        let storage = Arc::new(MemoryStorage::with_entry(KEY, snapshot));
        let store = CartStore::load(storage, &CartConfig::default()).await.unwrap();

        assert_eq!(
            ids_and_quantities(&store.products()),
            vec![("A".into(), 2), ("B".into(), 1)]
        );
        assert_eq!(store.products()[1].image_url, "b.png");
    }

    #[tokio::test]
    async fn test_load_malformed_snapshot_starts_empty() {
        for bad in ["not json", "{}", r#"[{"id":"A"}]"#] {
            let storage = Arc::new(MemoryStorage::with_entry(KEY, bad));
            let store = CartStore::load(storage, &CartConfig::default()).await.unwrap();
            assert!(store.products().is_empty(), "snapshot {:?}", bad);
        }
    }

    #[tokio::test]
    async fn test_load_invalid_snapshot_starts_empty() {
        let zero_quantity = r#"[{"id":"A","title":"T","imageUrl":"u","price":1,"quantity":0}]"#;
        let storage = Arc::new(MemoryStorage::with_entry(KEY, zero_quantity));
        let store = CartStore::load(storage, &CartConfig::default()).await.unwrap();
        assert!(store.products().is_empty());
    }

    #[tokio::test]
    async fn test_load_read_failure_starts_empty() {
        let store = CartStore::load(Arc::new(BrokenStorage), &CartConfig::default())
            .await
            .unwrap();
        assert!(store.products().is_empty());
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_config() {
        let mut config = CartConfig::default();
        config.events.capacity = 0;

        let result = CartStore::load(Arc::new(MemoryStorage::new()), &config).await;
        assert!(matches!(result, Err(crate::CartError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_custom_storage_key() {
        let storage = Arc::new(MemoryStorage::new());
        let mut config = CartConfig::default();
        config.storage.key = "@Test:cart".into();

        let store = CartStore::load(storage.clone(), &config).await.unwrap();
        store.add_to_cart(candidate("A")).unwrap();
        store.flush().await.unwrap();

        assert!(storage.get("@Test:cart").await.unwrap().is_some());
        assert!(storage.get(KEY).await.unwrap().is_none());
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_scenario_add_twice_then_drain() {
        let (storage, store) = memory_store().await;

        store.add_to_cart(candidate("A")).unwrap();
        assert_eq!(ids_and_quantities(&store.products()), vec![("A".into(), 1)]);

        store.add_to_cart(candidate("A")).unwrap();
        assert_eq!(ids_and_quantities(&store.products()), vec![("A".into(), 2)]);

        store.decrement("A").unwrap();
        assert_eq!(ids_and_quantities(&store.products()), vec![("A".into(), 1)]);

        assert_eq!(store.decrement("A").unwrap(), CartChange::Removed { id: "A".into() });
        assert!(store.products().is_empty());

        store.flush().await.unwrap();
        assert!(stored(&*storage).await.is_empty());
    }

    #[tokio::test]
    async fn test_scenario_remove_first_of_two() {
        let (storage, store) = memory_store().await;

        store.add_to_cart(candidate("A")).unwrap();
        store.add_to_cart(candidate("B")).unwrap();
        assert_eq!(
            ids_and_quantities(&store.products()),
            vec![("A".into(), 1), ("B".into(), 1)]
        );

        store.decrement("A").unwrap();
        assert_eq!(ids_and_quantities(&store.products()), vec![("B".into(), 1)]);

        store.flush().await.unwrap();
        assert_eq!(stored(&*storage).await, store.products());
    }

    #[tokio::test]
    async fn test_missing_id_is_noop_but_persists() {
        let (storage, store) = memory_store().await;

        assert_eq!(store.increment("ghost").unwrap(), CartChange::Unchanged);
        assert_eq!(store.decrement("ghost").unwrap(), CartChange::Unchanged);
        store.flush().await.unwrap();

        // The unchanged state is still written.
        assert_eq!(storage.get(KEY).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_clear() {
        let (storage, store) = memory_store().await;
        store.add_to_cart(candidate("A")).unwrap();
        store.add_to_cart(candidate("B")).unwrap();

        assert_eq!(store.clear().unwrap(), CartChange::Cleared);
        assert_eq!(store.clear().unwrap(), CartChange::Unchanged);
        store.flush().await.unwrap();

        assert!(stored(&*storage).await.is_empty());
        assert_eq!(store.totals(), CartTotals::default());
    }

    #[tokio::test]
    async fn test_totals_and_with_products() {
        let (_, store) = memory_store().await;
        store.add_to_cart(candidate("A")).unwrap();
        store.add_to_cart(candidate("A")).unwrap();
        store.add_to_cart(candidate("B")).unwrap();

        let totals = store.totals();
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.total_quantity, 3);

        let first = store.with_products(|items| items.first().map(|i| i.id.clone()));
        assert_eq!(first.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_write_failures_do_not_surface() {
        let store = CartStore::load(Arc::new(BrokenStorage), &CartConfig::default())
            .await
            .unwrap();

        assert_eq!(
            store.add_to_cart(candidate("A")).unwrap(),
            CartChange::Added { id: "A".into() }
        );
        store.flush().await.unwrap();
        assert_eq!(ids_and_quantities(&store.products()), vec![("A".into(), 1)]);
    }

    // -------------------------------------------------------------------------
    // Persistence ordering
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_slow_early_writes_never_overwrite_later_state() {
        let storage = Arc::new(DelayedStorage::new());
        let store = CartStore::load(storage.clone(), &CartConfig::default())
            .await
            .unwrap();

        store.add_to_cart(candidate("A")).unwrap();
        store.add_to_cart(candidate("B")).unwrap();
        store.increment("A").unwrap();
        store.decrement("B").unwrap();
        store.add_to_cart(candidate("C")).unwrap();
        store.flush().await.unwrap();

        assert_eq!(stored(&*storage).await, store.products());

        // Writes landed one per operation, in operation order.
        let history: Vec<Vec<(String, u32)>> = storage
            .history
            .lock()
            .unwrap()
            .iter()
            .map(|text| ids_and_quantities(snapshot::decode(text).unwrap().items()))
            .collect();
        assert_eq!(
            history,
            vec![
                vec![("A".into(), 1)],
                vec![("A".into(), 1), ("B".into(), 1)],
                vec![("A".into(), 2), ("B".into(), 1)],
                vec![("A".into(), 2)],
                vec![("A".into(), 2), ("C".into(), 1)],
            ]
        );
    }

    #[tokio::test]
    async fn test_concurrent_callers_end_consistent() {
        let storage = Arc::new(DelayedStorage::new());
        let store = CartStore::load(storage.clone(), &CartConfig::default())
            .await
            .unwrap();

        let mut tasks = Vec::new();
        for n in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let id = if n % 2 == 0 { "A" } else { "B" };
                store.add_to_cart(candidate(id)).unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        store.flush().await.unwrap();

        assert_eq!(store.totals().total_quantity, 8);
        assert_eq!(stored(&*storage).await, store.products());
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_events_follow_changes_only() {
        let (_, store) = memory_store().await;
        let mut rx = store.subscribe();

        store.add_to_cart(candidate("A")).unwrap();
        store.increment("ghost").unwrap();
        store.decrement("A").unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.change(), Some(&CartChange::Added { id: "A".into() }));
        assert_eq!(first.products.len(), 1);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.change(), Some(&CartChange::Removed { id: "A".into() }));
        assert!(second.products.is_empty());

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_operations_fail_after_shutdown() {
        let (storage, store) = memory_store().await;
        store.add_to_cart(candidate("A")).unwrap();
        store.shutdown().await.unwrap();
        assert!(store.is_shut_down());

        let mut rx = store.subscribe();
        let before = store.products();

        assert!(matches!(
            store.add_to_cart(candidate("B")),
            Err(crate::CartError::WriterClosed)
        ));
        assert!(store.increment("A").unwrap_err().is_usage_error());
        assert!(store.decrement("A").unwrap_err().is_usage_error());
        assert!(store.clear().unwrap_err().is_usage_error());

        // Nothing changed anywhere.
        assert_eq!(store.products(), before);
        assert_eq!(stored(&*storage).await, before);
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
        assert!(store.flush().await.is_err());
    }

    #[tokio::test]
    async fn test_extreme_prices_survive_restart() {
        let storage = Arc::new(MemoryStorage::new());
        let prices = [
            ("nan", f64::NAN),
            ("inf", f64::INFINITY),
            ("neg_inf", f64::NEG_INFINITY),
            ("max", f64::MAX),
            ("tiny", f64::MIN_POSITIVE),
            ("neg_zero", -0.0),
            ("plain", 10.0),
        ];

        let store = CartStore::load(storage.clone(), &CartConfig::default())
            .await
            .unwrap();
        for (id, price) in prices {
            store
                .add_to_cart(ProductCandidate::new(id, "T", "u", price))
                .unwrap();
        }
        store.shutdown().await.unwrap();

        let reloaded = CartStore::load(storage, &CartConfig::default())
            .await
            .unwrap();
        let items = reloaded.products();
        assert_eq!(items.len(), prices.len());
        for ((id, price), item) in prices.iter().zip(&items) {
            assert_eq!(&item.id, id);
            assert_eq!(item.price.to_bits(), price.to_bits(), "price of {}", id);
        }
    }

    #[tokio::test]
    async fn test_survives_restart_on_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gomarket.db");

        let expected = {
            let db = Database::new(DbConfig::new(&path)).await.unwrap();
            let store = CartStore::load(Arc::new(db.clone()), &CartConfig::default())
                .await
                .unwrap();
            store.add_to_cart(candidate("A")).unwrap();
            store.add_to_cart(candidate("B")).unwrap();
            store.add_to_cart(candidate("A")).unwrap();
            store.shutdown().await.unwrap();
            db.close().await;
            store.products()
        };

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let reloaded = CartStore::load(Arc::new(db), &CartConfig::default())
            .await
            .unwrap();
        assert_eq!(reloaded.products(), expected);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add(String),
            Increment(String),
            Decrement(String),
        }

        fn op() -> impl Strategy<Value = Op> {
            let id = || prop::sample::select(vec!["A", "B", "C"]).prop_map(String::from);
            prop_oneof![
                id().prop_map(Op::Add),
                id().prop_map(Op::Increment),
                id().prop_map(Op::Decrement),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn reload_matches_memory(ops in prop::collection::vec(op(), 0..24)) {
                let runtime = tokio::runtime::Runtime::new().unwrap();
                runtime.block_on(async {
                    let storage = Arc::new(MemoryStorage::new());
                    let store = CartStore::load(storage.clone(), &CartConfig::default())
                        .await
                        .unwrap();

                    for op in &ops {
                        match op {
                            Op::Add(id) => store.add_to_cart(candidate(id)).unwrap(),
                            Op::Increment(id) => store.increment(id).unwrap(),
                            Op::Decrement(id) => store.decrement(id).unwrap(),
                        };
                    }
                    store.shutdown().await.unwrap();

                    let reloaded = CartStore::load(storage, &CartConfig::default())
                        .await
                        .unwrap();
                    assert_eq!(reloaded.products(), store.products());
                });
            }
        }
    }
}
