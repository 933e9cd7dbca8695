//! Client-local shopping cart.
//!
//! The cart maps product-id strings to quantities and is persisted as a JSON
//! object in the `"cart"` slot of a [`KeyValueStore`]:
//!
//! ```json
//! {"1": 2, "7": 1}
//! ```
//!
//! An absent slot is an empty cart. Quantities are always at least 1; a key
//! that would drop to zero is removed instead.
//!
//! [`Cart`] is the pure reducer. [`CartStore`] wraps it with persistence: each
//! mutator reloads the slot, applies the reducer, saves, and notifies
//! subscribers, so two call sites holding stale snapshots never overwrite
//! each other's changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::add_breadcrumb;
use crate::storage::KeyValueStore;

/// Storage slot holding the serialized cart.
pub const CART_KEY: &str = "cart";

// =============================================================================
// Cart
// =============================================================================

/// Product-id string to quantity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, i64>", into = "BTreeMap<String, u32>")]
pub struct Cart {
    lines: BTreeMap<String, u32>,
}

/// What [`Cart::toggle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a persisted cart.
    ///
    /// Non-positive quantities are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not a JSON object of integers.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Serialize for persistence.
    ///
    /// # Errors
    ///
    /// Serializing a string-keyed map of integers does not fail in practice;
    /// the error is surfaced rather than unwrapped.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Quantity held for `id`, zero when absent.
    #[must_use]
    pub fn quantity(&self, id: &str) -> u32 {
        self.lines.get(id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.lines.contains_key(id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.values().map(|&q| u64::from(q)).sum()
    }

    /// Binary add/remove: drop `id` whatever its quantity, or add it at 1.
    pub fn toggle(&mut self, id: &str) -> Toggled {
        if self.lines.remove(id).is_some() {
            Toggled::Removed
        } else {
            self.lines.insert(id.to_owned(), 1);
            Toggled::Added
        }
    }

    /// Add one unit of `id`. Returns the new quantity.
    pub fn increment(&mut self, id: &str) -> u32 {
        let quantity = self.lines.entry(id.to_owned()).or_insert(0);
        *quantity = quantity.saturating_add(1);
        *quantity
    }

    /// Take one unit of `id` away, dropping the key at zero.
    ///
    /// Returns `false` (and changes nothing) if `id` is not in the cart.
    pub fn decrement(&mut self, id: &str) -> bool {
        let Some(quantity) = self.lines.get_mut(id) else {
            return false;
        };
        *quantity = quantity.saturating_sub(1);
        if *quantity == 0 {
            self.lines.remove(id);
        }
        true
    }

    /// Drop `id` entirely. Returns the quantity it held.
    pub fn remove(&mut self, id: &str) -> Option<u32> {
        self.lines.remove(id)
    }
}

impl From<BTreeMap<String, i64>> for Cart {
    fn from(raw: BTreeMap<String, i64>) -> Self {
        let lines = raw
            .into_iter()
            .filter_map(|(id, q)| {
                u32::try_from(q)
                    .ok()
                    .filter(|&q| q > 0)
                    .map(|q| (id, q))
            })
            .collect();
        Self { lines }
    }
}

impl From<Cart> for BTreeMap<String, u32> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

impl<'a> FromIterator<(&'a str, u32)> for Cart {
    fn from_iter<I: IntoIterator<Item = (&'a str, u32)>>(iter: I) -> Self {
        Self {
            lines: iter
                .into_iter()
                .filter(|&(_, q)| q > 0)
                .map(|(id, q)| (id.to_owned(), q))
                .collect(),
        }
    }
}

// =============================================================================
// CartStore
// =============================================================================

/// Notification sent after every save or clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartChanged {
    pub total_quantity: u64,
}

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&CartChanged)>;

/// The persisted cart plus its change subscribers.
///
/// No method returns an error: unreadable storage is treated as an empty
/// cart and failed writes are logged.
pub struct CartStore<S> {
    storage: S,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> CartStore<S> {
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// The backing storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Register a callback invoked with the new total after every save/clear.
    pub fn subscribe(&mut self, listener: impl Fn(&CartChanged) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Drop a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    /// Read the persisted cart. Absent or unreadable data is an empty cart.
    pub fn load(&self) -> Cart {
        let raw = match self.storage.get_item(CART_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read cart from storage");
                return Cart::new();
            }
        };

        Cart::from_json(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "Discarding unparsable cart");
            Cart::new()
        })
    }

    /// Persist `cart` and notify subscribers.
    pub fn save(&self, cart: &Cart) {
        match cart.to_json() {
            Ok(raw) => {
                if let Err(e) = self.storage.set_item(CART_KEY, &raw) {
                    error!(error = %e, "Failed to persist cart");
                }
            }
            Err(e) => error!(error = %e, "Failed to serialize cart"),
        }
        self.notify(cart.total_quantity());
    }

    /// Sum of quantities in `cart`.
    #[must_use]
    pub fn total_quantity(cart: &Cart) -> u64 {
        cart.total_quantity()
    }

    /// Add `id` at quantity 1, or drop it entirely if present.
    pub fn toggle(&self, id: &str) -> Cart {
        let mut cart = self.load();
        let outcome = cart.toggle(id);
        debug!(product_id = id, ?outcome, "Toggled cart item");
        add_breadcrumb("cart", "Toggled item", Some(&[("product_id", id)]));
        self.save(&cart);
        cart
    }

    pub fn increment(&self, id: &str) -> Cart {
        let mut cart = self.load();
        let quantity = cart.increment(id);
        debug!(product_id = id, quantity, "Incremented cart item");
        add_breadcrumb("cart", "Added item", Some(&[("product_id", id)]));
        self.save(&cart);
        cart
    }

    /// Take one unit away. Nothing is saved if `id` is not in the cart.
    pub fn decrement(&self, id: &str) -> Cart {
        let mut cart = self.load();
        if !cart.decrement(id) {
            return cart;
        }
        debug!(product_id = id, quantity = cart.quantity(id), "Decremented cart item");
        add_breadcrumb("cart", "Reduced item", Some(&[("product_id", id)]));
        self.save(&cart);
        cart
    }

    pub fn remove(&self, id: &str) -> Cart {
        let mut cart = self.load();
        cart.remove(id);
        debug!(product_id = id, "Removed cart item");
        add_breadcrumb("cart", "Removed item", Some(&[("product_id", id)]));
        self.save(&cart);
        cart
    }

    /// Delete the persisted cart. No empty object is left behind.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(CART_KEY) {
            error!(error = %e, "Failed to clear cart");
        }
        add_breadcrumb("cart", "Cleared cart", None);
        self.notify(0);
    }

    fn notify(&self, total_quantity: u64) {
        let event = CartChanged { total_quantity };
        for (_, listener) in &self.listeners {
            listener(&event);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::storage::{MemoryStorage, StorageError};

    fn cart(entries: &[(&str, u32)]) -> Cart {
        entries.iter().copied().collect()
    }

    fn store_with(entries: &[(&str, u32)]) -> CartStore<MemoryStorage> {
        let store = CartStore::new(MemoryStorage::new());
        store.save(&cart(entries));
        store
    }

    /// Storage whose every call fails.
    struct BrokenStorage;

    impl KeyValueStore for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Io {
                path: "broken".into(),
                source: std::io::Error::other("disk on fire"),
            })
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            self.get_item("").map(|_| ())
        }

        fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            self.get_item("").map(|_| ())
        }
    }

    // -------------------------------------------------------------------------
    // Reducer
    // -------------------------------------------------------------------------

    #[test]
    fn test_total_quantity() {
        assert_eq!(Cart::new().total_quantity(), 0);
        assert_eq!(cart(&[("1", 2), ("4", 3)]).total_quantity(), 5);
    }

    #[test]
    fn test_increment_then_decrement_roundtrips() {
        for start in [cart(&[]), cart(&[("1", 1)]), cart(&[("1", 4), ("2", 1)])] {
            let mut c = start.clone();
            c.increment("1");
            assert!(c.decrement("1"));
            assert_eq!(c, start);
        }
    }

    #[test]
    fn test_decrement_absent_is_noop() {
        let mut c = cart(&[("2", 1)]);
        assert!(!c.decrement("1"));
        assert_eq!(c, cart(&[("2", 1)]));
    }

    #[test]
    fn test_decrement_to_zero_removes_key() {
        let mut c = cart(&[("1", 1)]);
        assert!(c.decrement("1"));
        assert!(!c.contains("1"));
        assert!(c.is_empty());
    }

    #[test]
    fn test_toggle_is_involution() {
        for start in [cart(&[]), cart(&[("1", 3)]), cart(&[("2", 1)])] {
            let mut c = start.clone();
            c.toggle("1");
            c.toggle("1");
            if start.contains("1") {
                // Re-added at 1, the original quantity is not restored
                assert_eq!(c.quantity("1"), 1);
            } else {
                assert_eq!(c, start);
            }
        }
    }

    #[test]
    fn test_toggle_ignores_quantity() {
        let mut c = cart(&[("1", 3)]);
        assert_eq!(c.toggle("1"), Toggled::Removed);
        assert_eq!(c.quantity("1"), 0);
        assert_eq!(c.toggle("1"), Toggled::Added);
        assert_eq!(c.quantity("1"), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut once = cart(&[("1", 2), ("3", 1)]);
        once.remove("1");
        let mut twice = once.clone();
        assert_eq!(twice.remove("1"), None);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_from_json_drops_non_positive() {
        let c = Cart::from_json(r#"{"1": 2, "2": 0, "3": -4}"#).unwrap();
        assert_eq!(c, cart(&[("1", 2)]));
    }

    #[test]
    fn test_json_layout() {
        let c = cart(&[("10", 1), ("2", 3)]);
        let value: serde_json::Value = serde_json::from_str(&c.to_json().unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({"2": 3, "10": 1}));
    }

    // -------------------------------------------------------------------------
    // Store
    // -------------------------------------------------------------------------

    #[test]
    fn test_load_absent_is_empty() {
        let store = CartStore::new(MemoryStorage::new());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_corrupt_is_empty() {
        let storage = MemoryStorage::new();
        storage.set_item(CART_KEY, "not json").unwrap();
        let store = CartStore::new(storage);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_unreadable_is_empty() {
        let store = CartStore::new(BrokenStorage);
        assert!(store.load().is_empty());
        // Mutators do not panic either
        assert_eq!(store.increment("1").quantity("1"), 1);
        store.clear();
    }

    #[test]
    fn test_clear_removes_slot() {
        let store = store_with(&[("1", 2)]);
        store.clear();
        assert!(store.storage().get_item(CART_KEY).unwrap().is_none());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_mutators_persist() {
        let store = CartStore::new(MemoryStorage::new());
        store.increment("1");
        store.increment("1");
        store.toggle("2");
        assert_eq!(store.load(), cart(&[("1", 2), ("2", 1)]));

        store.decrement("1");
        store.remove("2");
        assert_eq!(store.load(), cart(&[("1", 1)]));

        store.decrement("1");
        assert_eq!(
            store.storage().get_item(CART_KEY).unwrap().as_deref(),
            Some("{}")
        );
    }

    #[test]
    fn test_mutators_reload_instead_of_trusting_snapshots() {
        let store = CartStore::new(MemoryStorage::new());
        let stale = store.load();

        store.increment("1");
        // A second call site still holding `stale` goes through the store too
        let fresh = store.increment("2");

        assert!(stale.is_empty());
        assert_eq!(fresh, cart(&[("1", 1), ("2", 1)]));
    }

    #[test]
    fn test_subscribers_receive_totals() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = CartStore::new(MemoryStorage::new());
        let sink = Rc::clone(&seen);
        let sub = store.subscribe(move |event| sink.borrow_mut().push(event.total_quantity));

        store.increment("1");
        store.increment("1");
        store.toggle("5");
        store.decrement("9"); // no-op, no event
        store.clear();

        assert_eq!(*seen.borrow(), vec![1, 2, 3, 0]);

        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.increment("1");
        assert_eq!(seen.borrow().len(), 4);
    }
}
