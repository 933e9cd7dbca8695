//! Cart state on disk, shared between store instances.

#![allow(clippy::unwrap_used)]

use std::cell::Cell;
use std::rc::Rc;

use tiffin_storefront::cart::{CART_KEY, CartStore};
use tiffin_storefront::{FileStorage, KeyValueStore};

fn storage_in(dir: &tempfile::TempDir) -> FileStorage {
    FileStorage::new(dir.path().join("state").join("storage.json"))
}

#[test]
fn test_cart_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = CartStore::new(storage_in(&dir));
        store.increment("1");
        store.increment("1");
        store.toggle("7");
    }

    let store = CartStore::new(storage_in(&dir));
    let cart = store.load();
    assert_eq!(cart.quantity("1"), 2);
    assert_eq!(cart.quantity("7"), 1);
    assert_eq!(cart.total_quantity(), 3);
}

#[test]
fn test_persisted_format_is_a_json_object() {
    let dir = tempfile::tempdir().unwrap();
    let store = CartStore::new(storage_in(&dir));
    store.increment("3");
    store.increment("10");

    let raw = store.storage().get_item(CART_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value, serde_json::json!({"3": 1, "10": 1}));
}

#[test]
fn test_two_stores_never_lose_updates() {
    let dir = tempfile::tempdir().unwrap();
    let tab_a = CartStore::new(storage_in(&dir));
    let tab_b = CartStore::new(storage_in(&dir));

    tab_a.increment("1");
    tab_b.increment("2");
    tab_a.increment("2");

    let cart = tab_b.load();
    assert_eq!(cart.quantity("1"), 1);
    assert_eq!(cart.quantity("2"), 2);
}

#[test]
fn test_clear_removes_the_slot() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = CartStore::new(storage_in(&dir));
    let last = Rc::new(Cell::new(u64::MAX));
    let seen = Rc::clone(&last);
    store.subscribe(move |change| seen.set(change.total_quantity));

    store.increment("5");
    assert_eq!(last.get(), 1);

    store.clear();
    assert_eq!(last.get(), 0);
    assert_eq!(store.storage().get_item(CART_KEY).unwrap(), None);
    assert!(store.load().is_empty());
}

#[test]
fn test_corrupt_file_reads_as_empty_and_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    std::fs::write(&path, "{not json").unwrap();

    let store = CartStore::new(FileStorage::new(&path));
    assert!(store.load().is_empty());

    store.increment("2");
    assert_eq!(CartStore::new(FileStorage::new(&path)).load().quantity("2"), 1);
}

#[test]
fn test_hand_edited_quantities_are_sanitized() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    storage
        .set_item(CART_KEY, r#"{"1": 3, "2": 0, "3": -4}"#)
        .unwrap();

    let store = CartStore::new(storage);
    let cart = store.load();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.quantity("1"), 3);

    // Decrementing an entry that was dropped on load is a no-op
    let cart = store.decrement("2");
    assert!(!cart.contains("2"));
}
