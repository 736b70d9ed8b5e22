//! B2B Cart Store - Single-seller cart persisted in key-value storage.
//!
//! The store owns every read, write, and derivation of the cart record. Its
//! collaborators are injected:
//!
//! - a [`KeyValueStorage`] handle the record lives in, which also announces
//!   changes to other views sharing it
//! - a [`Confirm`] capability asked before another seller's items are discarded
//! - a [`NumberFormat`] used when rendering the share message
//!
//! # Example
//!
//! ```rust
//! use b2b_cart_core::{CartItem, Seller};
//! use b2b_cart_store::{AlwaysConfirm, CartStore, MemoryStorage};
//! use rust_decimal::Decimal;
//!
//! let store = CartStore::new(MemoryStorage::new());
//! let chair = CartItem::new("chair")
//!     .with_title("Chair")
//!     .with_price(Decimal::from(50_000));
//!
//! assert!(store.add_item(chair, Seller::new("acme", "Acme"), &AlwaysConfirm));
//! assert_eq!(store.item_count(), 1);
//! assert!(store.format_for_sharing().is_some_and(|m| m.contains("UGX 50,000")));
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod confirm;
pub mod format;
pub mod share;
pub mod storage;
pub mod store;

pub use config::{CartConfig, ConfigError};
pub use confirm::{AlwaysConfirm, Confirm, NeverConfirm, SWITCH_SELLER_PROMPT};
pub use format::{FormatError, GroupedFormat, NumberFormat};
pub use share::share_message;
pub use storage::{
    ChangeNotifier, FileStorage, KeyValueStorage, Listener, MemoryStorage, StorageError,
    StorageEvent, Subscription,
};
pub use store::CartStore;
