//! Several views of one cart kept in sync through storage change events.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use b2b_cart_core::{Cart, CartItem, ItemId, Seller};
use b2b_cart_store::{AlwaysConfirm, CartStore, FileStorage, KeyValueStorage, MemoryStorage};
use rust_decimal::Decimal;

fn chair() -> CartItem {
    CartItem::new("chair")
        .with_title("Chair")
        .with_price(Decimal::from(50_000))
}

/// Records every cart a subscriber is handed.
fn recorder() -> (Arc<Mutex<Vec<Cart>>>, impl Fn(Cart) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |cart| sink.lock().unwrap().push(cart))
}

#[test]
fn test_write_through_one_view_reaches_the_other() {
    let storage = Arc::new(MemoryStorage::new());
    let header = CartStore::new(Arc::clone(&storage));
    let product_page = CartStore::new(Arc::clone(&storage));

    let (seen, on_change) = recorder();
    let _subscription = header.subscribe(on_change);

    assert!(product_page.add_item(chair(), Seller::new("acme", "Acme"), &AlwaysConfirm));
    product_page.update_item_quantity(&ItemId::new("chair"), 5);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].item_count(), 1);
    assert_eq!(seen[1].item_count(), 5);
    assert_eq!(header.item_count(), 5);
}

#[test]
fn test_dropped_subscription_stops_events() {
    let storage = Arc::new(MemoryStorage::new());
    let store = CartStore::new(Arc::clone(&storage));

    let (seen, on_change) = recorder();
    let subscription = store.subscribe(on_change);
    store.add_item(chair(), Seller::new("acme", "Acme"), &AlwaysConfirm);
    drop(subscription);
    store.clear();

    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_other_keys_are_ignored() {
    let storage = Arc::new(MemoryStorage::new());
    let store = CartStore::new(Arc::clone(&storage));

    let (seen, on_change) = recorder();
    let _subscription = store.subscribe(on_change);
    storage.set("recentlyViewed", "[]").unwrap();

    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_removed_record_is_reported_as_empty_cart() {
    let storage = Arc::new(MemoryStorage::new());
    let store = CartStore::new(Arc::clone(&storage));
    store.add_item(chair(), Seller::new("acme", "Acme"), &AlwaysConfirm);

    let (seen, on_change) = recorder();
    let _subscription = store.subscribe(on_change);
    storage.remove(store.key()).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![Cart::empty()]);
    assert_eq!(store.load(), Cart::empty());
}

#[test]
fn test_quota_failure_keeps_previous_cart() {
    let storage = Arc::new(MemoryStorage::with_quota(200));
    let store = CartStore::new(Arc::clone(&storage));
    assert!(store.add_item(chair(), Seller::new("acme", "Acme"), &AlwaysConfirm));

    let (seen, on_change) = recorder();
    let _subscription = store.subscribe(on_change);
    let long_title = "x".repeat(500);
    let item = CartItem::new("desk").with_title(long_title);
    assert!(!store.add_item(item, Seller::new("acme", "Acme"), &AlwaysConfirm));

    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(store.load().items.len(), 1);
}

#[test]
fn test_file_views_share_events_through_one_handle() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path()));
    let first = CartStore::new(Arc::clone(&storage));
    let second = CartStore::new(Arc::clone(&storage));

    let (seen, on_change) = recorder();
    let _subscription = first.subscribe(on_change);
    second.add_item(chair(), Seller::new("acme", "Acme"), &AlwaysConfirm);

    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(first.load(), second.load());
}
