//! Persistent cart service.
//!
//! [`CartStore`] owns one browser's [`Cart`] for the duration of a request.
//! It is loaded from the `"cart"` key and every mutation that changes the
//! cart is written back to that key before the call returns.
//!
//! Mutations are read-modify-write of the whole list: the next cart is built
//! on a copy, serialized and stored, and only then does the in-memory cart
//! advance. A failed write therefore leaves both the stored and the
//! in-memory cart at their previous value. A mutation that changes nothing
//! (a stale id, re-selecting a selected line) writes nothing, so a cart that
//! could not be read is never replaced by a no-op.

use rust_decimal::Decimal;
use tracing::instrument;

use teeshirt_core::{Cart, LineItem, LineItemId, NewLineItem};

use crate::models::session_keys;
use crate::storage::{KeyValueStore, StorageError};

/// A cart bound to the key-value store it persists to.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    cart: Cart,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Load the cart persisted in `storage`.
    ///
    /// Never fails: a missing key, an unreadable backend or malformed content
    /// all yield an empty cart. Malformed content is logged and will be
    /// overwritten by the next mutation.
    #[instrument(skip(storage))]
    pub async fn load(storage: S) -> Self {
        let cart = match storage.get(session_keys::CART).await {
            Ok(Some(raw)) => match Cart::from_json(&raw) {
                Ok((cart, repairs)) => {
                    if !repairs.is_clean() {
                        tracing::warn!(
                            clamped_quantities = repairs.clamped_quantities,
                            dropped_duplicates = repairs.dropped_duplicates,
                            dropped_negative_prices = repairs.dropped_negative_prices,
                            "Repaired persisted cart"
                        );
                    }
                    cart
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding malformed persisted cart");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted cart");
                Cart::new()
            }
        };

        Self { storage, cart }
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Snapshot lookup of one line.
    #[must_use]
    pub fn get(&self, id: &LineItemId) -> Option<&LineItem> {
        self.cart.get(id)
    }

    /// Sum of `price * quantity` over selected lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.cart.subtotal()
    }

    /// Checked state of the "select all" control.
    #[must_use]
    pub fn all_selected(&self) -> bool {
        self.cart.all_selected()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// The backing store.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Append a new line and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated cart cannot be persisted.
    #[instrument(skip(self, new), fields(name = %new.name, color = %new.color, size = %new.size))]
    pub async fn add(&mut self, new: NewLineItem) -> Result<LineItemId, StorageError> {
        self.mutate(|cart| cart.add(new)).await
    }

    /// Remove a line; a missing id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated cart cannot be persisted.
    #[instrument(skip(self), fields(cart_id = %id))]
    pub async fn remove(&mut self, id: &LineItemId) -> Result<bool, StorageError> {
        self.mutate(|cart| cart.remove(id)).await
    }

    /// Change a line's quantity by `delta`, clamped at 1.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated cart cannot be persisted.
    #[instrument(skip(self), fields(cart_id = %id))]
    pub async fn set_quantity(&mut self, id: &LineItemId, delta: i64) -> Result<bool, StorageError> {
        self.mutate(|cart| cart.set_quantity(id, delta)).await
    }

    /// Set one line's selection flag.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated cart cannot be persisted.
    #[instrument(skip(self), fields(cart_id = %id))]
    pub async fn set_selected(
        &mut self,
        id: &LineItemId,
        selected: bool,
    ) -> Result<bool, StorageError> {
        self.mutate(|cart| cart.set_selected(id, selected)).await
    }

    /// Set every line's selection flag.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated cart cannot be persisted.
    #[instrument(skip(self))]
    pub async fn set_all_selected(&mut self, selected: bool) -> Result<(), StorageError> {
        self.mutate(|cart| cart.set_all_selected(selected)).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the empty cart cannot be persisted.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) -> Result<(), StorageError> {
        self.mutate(Cart::clear).await
    }

    /// Replace a line wholesale; a missing id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated cart cannot be persisted.
    #[instrument(skip(self, patch), fields(cart_id = %id))]
    pub async fn apply_edit(
        &mut self,
        id: &LineItemId,
        patch: LineItem,
    ) -> Result<bool, StorageError> {
        self.mutate(|cart| cart.apply_edit(id, patch)).await
    }

    async fn mutate<F, R>(&mut self, op: F) -> Result<R, StorageError>
    where
        F: FnOnce(&mut Cart) -> R + Send,
        R: Send,
    {
        let mut next = self.cart.clone();
        let outcome = op(&mut next);
        if next == self.cart {
            return Ok(outcome);
        }
        let json = next.to_json()?;

        if let Err(e) = self.storage.set(session_keys::CART, json).await {
            tracing::error!(error = %e, "Failed to persist cart");
            return Err(e);
        }

        self.cart = next;
        Ok(outcome)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use proptest::prelude::*;
    use teeshirt_core::{Color, Size};

    use super::*;
    use crate::storage::MemoryStore;

    fn line(id: &str, price: i64, quantity: u32, selected: bool) -> LineItem {
        LineItem {
            cart_id: LineItemId::new(id),
            name: format!("Tee {id}"),
            image: String::new(),
            price: Decimal::from(price),
            color: Color::Black,
            size: Size::M,
            quantity,
            selected,
        }
    }

    async fn seeded(items: Vec<LineItem>) -> (MemoryStore, CartStore<MemoryStore>) {
        let storage = MemoryStore::new();
        let json = serde_json::to_string(&items).unwrap();
        storage.insert(session_keys::CART, json).await;
        let store = CartStore::load(storage.clone()).await;
        (storage, store)
    }

    async fn persisted(storage: &MemoryStore) -> Cart {
        let raw = storage.get(session_keys::CART).await.unwrap().unwrap();
        Cart::from_json(&raw).unwrap().0
    }

    /// Accepts reads, refuses writes.
    struct ReadOnlyStore(MemoryStore);

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key).await
        }

        async fn set(&self, _key: &str, _value: String) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("read-only".to_owned()))
        }
    }

    #[tokio::test]
    async fn test_load_missing_key_is_empty() {
        let store = CartStore::load(MemoryStore::new()).await;
        assert!(store.cart().is_empty());
        assert!(store.all_selected());
    }

    #[tokio::test]
    async fn test_load_malformed_is_empty() {
        let storage = MemoryStore::new();
        storage.insert(session_keys::CART, "[{\"cartId\": oops").await;
        let store = CartStore::load(storage).await;
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_subtotal_scenario() {
        let (_, store) = seeded(vec![line("a", 500, 1, true), line("b", 300, 2, false)]).await;
        assert_eq!(store.subtotal(), Decimal::from(500));
    }

    #[tokio::test]
    async fn test_set_quantity_clamps_and_persists() {
        let (storage, mut store) = seeded(vec![line("a", 500, 2, true)]).await;
        let id = LineItemId::new("a");
        assert!(store.set_quantity(&id, -5).await.unwrap());
        assert_eq!(store.get(&id).unwrap().quantity, 1);
        assert_eq!(&persisted(&storage).await, store.cart());
    }

    #[tokio::test]
    async fn test_remove_twice_is_noop() {
        let (storage, mut store) = seeded(vec![line("a", 500, 1, true)]).await;
        let id = LineItemId::new("a");
        assert!(store.remove(&id).await.unwrap());
        assert!(!store.remove(&id).await.unwrap());
        assert!(persisted(&storage).await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_persists_empty_list() {
        let (storage, mut store) = seeded(vec![line("a", 1, 1, true), line("b", 1, 1, true)]).await;
        store.clear().await.unwrap();
        assert!(store.cart().is_empty());
        assert_eq!(
            storage.get(session_keys::CART).await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_select_all_round_trip() {
        let (storage, mut store) = seeded(vec![line("a", 1, 1, false), line("b", 1, 1, true)]).await;
        assert!(!store.all_selected());
        store.set_all_selected(true).await.unwrap();
        assert!(store.all_selected());

        let reloaded = CartStore::load(storage).await;
        assert!(reloaded.all_selected());
    }

    #[tokio::test]
    async fn test_add_persists_new_line() {
        let storage = MemoryStore::new();
        let mut store = CartStore::load(storage.clone()).await;
        let id = store
            .add(NewLineItem {
                name: "Oversized Tee".to_owned(),
                image: "/static/img/oversized.png".to_owned(),
                price: Decimal::from(650),
                color: Color::Green,
                size: Size::L,
                quantity: 2,
            })
            .await
            .unwrap();

        let saved = persisted(&storage).await;
        assert_eq!(saved.get(&id).unwrap().quantity, 2);
        assert_eq!(store.item_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cart_unchanged() {
        let inner = MemoryStore::new();
        let json = serde_json::to_string(&vec![line("a", 100, 3, true)]).unwrap();
        inner.insert(session_keys::CART, json).await;
        let mut store = CartStore::load(ReadOnlyStore(inner.clone())).await;

        let result = store.set_quantity(&LineItemId::new("a"), 1).await;
        assert!(matches!(result, Err(StorageError::Unavailable(_))));
        assert_eq!(store.get(&LineItemId::new("a")).unwrap().quantity, 3);
        assert_eq!(&persisted(&inner).await, store.cart());
    }

    /// Fails the first read, then behaves like the inner store.
    struct FlakyReadStore {
        inner: MemoryStore,
        failed: AtomicBool,
    }

    #[async_trait]
    impl KeyValueStore for FlakyReadStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            if !self.failed.swap(true, Ordering::SeqCst) {
                return Err(StorageError::Unavailable("timeout".to_owned()));
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
            self.inner.set(key, value).await
        }
    }

    #[tokio::test]
    async fn test_noop_after_failed_read_keeps_stored_cart() {
        let inner = MemoryStore::new();
        let json = serde_json::to_string(&vec![line("a", 100, 2, true)]).unwrap();
        inner.insert(session_keys::CART, json.clone()).await;

        let mut store = CartStore::load(FlakyReadStore {
            inner: inner.clone(),
            failed: AtomicBool::new(false),
        })
        .await;
        assert!(store.cart().is_empty());

        let stale = LineItemId::new("a");
        assert!(!store.remove(&stale).await.unwrap());
        assert!(!store.set_quantity(&stale, 1).await.unwrap());
        assert!(!store.set_selected(&stale, false).await.unwrap());
        assert!(!store.apply_edit(&stale, line("a", 1, 1, true)).await.unwrap());
        store.set_all_selected(false).await.unwrap();

        assert_eq!(inner.get(session_keys::CART).await.unwrap(), Some(json));
    }

    #[tokio::test]
    async fn test_unchanged_cart_is_not_rewritten() {
        let (storage, mut store) = seeded(vec![line("a", 100, 1, true)]).await;
        storage.insert(session_keys::CART, "sentinel").await;

        assert!(store.set_selected(&LineItemId::new("a"), true).await.unwrap());
        assert!(store.set_quantity(&LineItemId::new("a"), -1).await.unwrap());
        assert!(!store.remove(&LineItemId::new("b")).await.unwrap());
        assert_eq!(
            storage.get(session_keys::CART).await.unwrap().as_deref(),
            Some("sentinel")
        );

        store.set_quantity(&LineItemId::new("a"), 1).await.unwrap();
        assert_eq!(persisted(&storage).await, *store.cart());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Remove(usize),
        Quantity(usize, i64),
        Select(usize, bool),
        SelectAll(bool),
        Clear,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..6).prop_map(Op::Remove),
            (0usize..6, any::<i64>()).prop_map(|(i, d)| Op::Quantity(i, d)),
            (0usize..6, any::<bool>()).prop_map(|(i, s)| Op::Select(i, s)),
            any::<bool>().prop_map(Op::SelectAll),
            Just(Op::Clear),
        ]
    }

    proptest! {
        #[test]
        fn prop_persisted_cart_tracks_memory(ops in prop::collection::vec(op(), 1..24)) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let items = (0..4).map(|i| line(&i.to_string(), 100, 1, true)).collect();
                let (storage, mut store) = seeded(items).await;

                for op in ops {
                    match op {
                        Op::Remove(i) => { store.remove(&LineItemId::new(i.to_string())).await.unwrap(); }
                        Op::Quantity(i, d) => { store.set_quantity(&LineItemId::new(i.to_string()), d).await.unwrap(); }
                        Op::Select(i, s) => { store.set_selected(&LineItemId::new(i.to_string()), s).await.unwrap(); }
                        Op::SelectAll(s) => store.set_all_selected(s).await.unwrap(),
                        Op::Clear => store.clear().await.unwrap(),
                    }
                    assert_eq!(&persisted(&storage).await, store.cart());
                    assert!(store.cart().items().iter().all(|item| item.quantity >= 1));
                }
            });
        }
    }
}
