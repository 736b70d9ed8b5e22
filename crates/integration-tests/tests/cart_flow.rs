//! End-to-end cart flows against file-backed storage.
//!
//! Each test gets its own temporary directory, so the tests can run in
//! parallel without sharing a cart file.

#![allow(clippy::unwrap_used)]

use std::fs;

use b2b_cart_core::{Cart, CartItem, ItemId, Seller, SellerId};
use b2b_cart_store::{AlwaysConfirm, CartConfig, CartStore, FileStorage, NeverConfirm};
use rust_decimal::Decimal;
use tempfile::TempDir;

fn file_store(dir: &TempDir) -> CartStore<FileStorage> {
    CartStore::new(FileStorage::new(dir.path()))
}

fn acme() -> Seller {
    Seller::new("acme", "Acme").with_phone("+256700000000")
}

fn chair() -> CartItem {
    CartItem::new("chair")
        .with_title("Chair")
        .with_price(Decimal::from(50_000))
        .with_currency("UGX")
}

fn table() -> CartItem {
    CartItem::new("table")
        .with_title("Table")
        .with_price(Decimal::from(120_000))
        .with_currency("UGX")
}

#[test]
fn test_cart_survives_reopening() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = file_store(&dir);
        assert!(store.add_item(chair(), acme(), &NeverConfirm));
        assert!(store.add_item(chair(), acme(), &NeverConfirm));
    }

    let reopened = file_store(&dir);
    let cart = reopened.load();
    assert_eq!(cart.seller_id(), Some(&SellerId::new("acme")));
    assert_eq!(cart.seller_phone, "+256700000000");
    assert_eq!(cart.item_quantity(&ItemId::new("chair")), Some(2));
    assert!(dir.path().join("b2bCart.json").exists());
}

#[test]
fn test_stored_record_layout() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    assert!(store.add_item(chair(), acme(), &AlwaysConfirm));

    let raw = fs::read_to_string(dir.path().join("b2bCart.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["sellerId"], "acme");
    assert_eq!(value["sellerName"], "Acme");
    assert_eq!(value["sellerPhone"], "+256700000000");
    assert_eq!(value["items"][0]["id"], "chair");
    assert_eq!(value["items"][0]["price"], 50_000);
    assert_eq!(value["items"][0]["quantity"], 1);
}

#[test]
fn test_corrupt_record_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b2bCart.json"), "{not json").unwrap();

    let store = file_store(&dir);
    assert_eq!(store.load(), Cart::empty());
    assert_eq!(store.item_count(), 0);

    // The next write replaces the corrupt record
    assert!(store.add_item(chair(), acme(), &AlwaysConfirm));
    assert_eq!(file_store(&dir).item_count(), 1);
}

#[test]
fn test_record_written_elsewhere_is_read() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("b2bCart.json"),
        r#"{"sellerId":7,"sellerName":"Seven","sellerPhone":null,
            "items":[{"id":3,"title":"Desk","price":"99.5","quantity":2,"sku":"D-3"}]}"#,
    )
    .unwrap();

    let store = file_store(&dir);
    assert!(store.belongs_to_seller(Some(&SellerId::new("7"))));
    assert_eq!(store.total(), Decimal::new(199, 0));

    // Unknown item fields are kept across a rewrite
    store.update_item_quantity(&ItemId::new("3"), 3);
    let raw = fs::read_to_string(dir.path().join("b2bCart.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["items"][0]["sku"], "D-3");
    assert_eq!(value["items"][0]["quantity"], 3);

    // Integer ids keep their JSON form
    assert_eq!(value["sellerId"], 7);
    assert_eq!(value["items"][0]["id"], 3);
}

#[test]
fn test_odd_quantities_keep_the_rest_of_the_cart() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("b2bCart.json"),
        r#"{"sellerId":"acme","sellerName":"Acme","sellerPhone":"",
            "items":[{"id":"chair","price":50000,"quantity":2.0},
                     {"id":"table","price":120000,"quantity":-1},
                     {"id":"stool","price":1,"quantity":5000000000}]}"#,
    )
    .unwrap();

    let store = file_store(&dir);
    assert_eq!(store.load().items.len(), 3);
    assert!(store.add_item(chair(), acme(), &NeverConfirm));

    let cart = file_store(&dir).load();
    assert_eq!(cart.item_quantity(&ItemId::new("chair")), Some(3));
    assert_eq!(cart.item_quantity(&ItemId::new("table")), Some(1));
    assert_eq!(cart.item_quantity(&ItemId::new("stool")), Some(u32::MAX));
}

#[test]
fn test_declined_switch_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    assert!(store.add_item(chair(), acme(), &AlwaysConfirm));
    let before = fs::read(dir.path().join("b2bCart.json")).unwrap();

    let globex = Seller::new("globex", "Globex");
    assert!(!store.add_item(table(), globex, &NeverConfirm));

    let after = fs::read(dir.path().join("b2bCart.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_confirmed_switch_starts_new_cart() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    assert!(store.add_item(chair(), acme(), &AlwaysConfirm));
    assert!(store.add_item(chair(), acme(), &AlwaysConfirm));

    let globex = Seller::new("globex", "Globex");
    assert!(store.add_item(table(), globex, &AlwaysConfirm));

    let cart = store.load();
    assert_eq!(cart.seller_id(), Some(&SellerId::new("globex")));
    assert_eq!(cart.seller_name, "Globex");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.item_quantity(&ItemId::new("table")), Some(1));
}

#[test]
fn test_totals_and_counts() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    store.add_item(chair(), acme(), &AlwaysConfirm);
    store.add_item(table(), acme(), &AlwaysConfirm);
    store.update_item_quantity(&ItemId::new("chair"), 3);

    assert_eq!(store.item_count(), 4);
    assert_eq!(store.total(), Decimal::from(270_000));
}

#[test]
fn test_update_to_zero_matches_remove() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let updated = file_store(&first);
    let removed = file_store(&second);

    for store in [&updated, &removed] {
        store.add_item(chair(), acme(), &AlwaysConfirm);
        store.add_item(table(), acme(), &AlwaysConfirm);
    }

    let chair_id = ItemId::new("chair");
    assert_eq!(
        updated.update_item_quantity(&chair_id, 0),
        removed.remove_item(&chair_id)
    );
    assert_eq!(
        updated.update_item_quantity(&ItemId::new("table"), -2),
        removed.remove_item(&ItemId::new("table"))
    );
    assert_eq!(updated.load(), Cart::empty());
    assert!(!updated.belongs_to_seller(Some(&SellerId::new("acme"))));
}

#[test]
fn test_share_message() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    assert_eq!(store.format_for_sharing(), None);

    store.add_item(chair(), acme(), &AlwaysConfirm);
    store.add_item(chair(), acme(), &AlwaysConfirm);

    assert_eq!(
        store.format_for_sharing().unwrap(),
        "Hello *Acme*, I'm interested in the following items:\n\n\
         1. *Chair* - UGX 50,000 x 2\n\n\
         *Total: UGX 100,000*"
    );
}

#[test]
fn test_configured_key_and_locale() {
    let dir = tempfile::tempdir().unwrap();
    let config = CartConfig::from_lookup(|name| match name {
        "CART_STORAGE_KEY" => Some("shopCart".to_owned()),
        "CART_DEFAULT_CURRENCY" => Some("KES".to_owned()),
        "CART_LOCALE" => Some("de-DE".to_owned()),
        _ => None,
    })
    .unwrap();

    let store = CartStore::with_config(FileStorage::new(dir.path()), &config);
    store.add_item(
        CartItem::new("desk").with_title("Desk").with_price(Decimal::new(12_345_675, 2)),
        acme(),
        &AlwaysConfirm,
    );

    assert!(dir.path().join("shopCart.json").exists());
    assert!(!dir.path().join("b2bCart.json").exists());
    let message = store.format_for_sharing().unwrap();
    assert!(message.contains("1. *Desk* - KES 123.456,75 x 1"));
    assert!(message.ends_with("*Total: KES 123.456,75*"));
}

#[test]
fn test_clear_empties_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    store.add_item(chair(), acme(), &AlwaysConfirm);

    assert_eq!(store.clear(), Cart::empty());
    assert_eq!(file_store(&dir).load(), Cart::empty());
}
