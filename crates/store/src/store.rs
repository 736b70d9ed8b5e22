//! The cart store.
//!
//! Every operation reloads the record from storage, applies its change, and
//! writes it back. Views sharing one storage therefore always act on the
//! latest persisted cart, but two views writing at once can still lose an
//! update: the last write wins.
//!
//! Failures never escape as errors. A missing or unreadable record loads as
//! the empty cart, a rejected write is reported as `false`.

use std::fmt;
use std::sync::Arc;

use b2b_cart_core::{Cart, CartItem, ItemId, Seller, SellerId};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::config::CartConfig;
use crate::confirm::{Confirm, SWITCH_SELLER_PROMPT};
use crate::format::NumberFormat;
use crate::share::share_message;
use crate::storage::{KeyValueStorage, StorageEvent, Subscription};

/// Reads, mutates, and derives from the single persisted cart.
pub struct CartStore<S> {
    storage: S,
    key: String,
    default_currency: String,
    numbers: Box<dyn NumberFormat>,
}

impl<S> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("default_currency", &self.default_currency)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStorage> CartStore<S> {
    /// Create a store with the default configuration.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, &CartConfig::default())
    }

    /// Create a store using `config`.
    #[must_use]
    pub fn with_config(storage: S, config: &CartConfig) -> Self {
        Self {
            storage,
            key: config.storage_key.clone(),
            default_currency: config.default_currency.clone(),
            numbers: Box::new(config.number_format),
        }
    }

    /// Create a store from environment configuration, falling back to
    /// defaults when a variable is invalid.
    pub fn from_env(storage: S) -> Self {
        let config = CartConfig::from_env().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Invalid cart configuration; using defaults");
            CartConfig::default()
        });
        Self::with_config(storage, &config)
    }

    /// Replace the number format used in share messages.
    #[must_use]
    pub fn with_number_format(mut self, numbers: impl NumberFormat + 'static) -> Self {
        self.numbers = Box::new(numbers);
        self
    }

    /// The underlying storage handle.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Key the cart record is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Currency used for items without one and for the total line.
    #[must_use]
    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    /// Render an amount with the configured number format.
    #[must_use]
    pub fn format_amount(&self, amount: Decimal) -> String {
        self.numbers.format(amount)
    }

    /// Read the persisted cart.
    ///
    /// A missing record, a storage read failure, or a record that does not
    /// parse all yield the empty cart. Nothing is written back.
    pub fn load(&self) -> Cart {
        match self.storage.get(&self.key) {
            Ok(raw) => parse_cart(&self.key, raw.as_deref()),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read cart; using empty cart");
                Cart::empty()
            }
        }
    }

    /// Persist `cart`. Subscribers of the storage are notified on success.
    ///
    /// Returns `false` if the cart could not be serialized or stored.
    pub fn save(&self, cart: &Cart) -> bool {
        let json = match serde_json::to_string(cart) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Failed to serialize cart");
                return false;
            }
        };

        match self.storage.set(&self.key, &json) {
            Ok(()) => {
                tracing::debug!(key = %self.key, items = cart.items.len(), "Saved cart");
                true
            }
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Failed to save cart");
                false
            }
        }
    }

    /// Persist and return the empty cart.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn clear(&self) -> Cart {
        let cart = Cart::empty();
        self.save(&cart);
        cart
    }

    /// Add one unit of `item` from `seller`.
    ///
    /// If the cart holds another seller's items, `confirm` is asked whether
    /// to discard them. Declining leaves the cart untouched and returns
    /// `false`. Otherwise returns whether the updated cart was saved.
    #[instrument(skip(self, item, seller, confirm), fields(key = %self.key, item_id = %item.id, seller_id = %seller.id))]
    pub fn add_item<C>(&self, item: CartItem, seller: Seller, confirm: &C) -> bool
    where
        C: Confirm + ?Sized,
    {
        let mut cart = self.load();

        if cart.conflicts_with(&seller.id) {
            if !confirm.confirm(SWITCH_SELLER_PROMPT) {
                tracing::info!(
                    current_seller = ?cart.seller_id(),
                    "Seller switch declined; cart unchanged"
                );
                return false;
            }

            tracing::info!(
                current_seller = ?cart.seller_id(),
                discarded = cart.items.len(),
                "Seller switch confirmed; discarding items"
            );
            cart.items.clear();
            cart.unbind();
        }

        if !cart.is_bound() {
            cart.bind(seller);
        }

        cart.add_one(item);
        self.save(&cart)
    }

    /// Remove an item and return the resulting cart.
    ///
    /// Removing the last item unbinds the cart from its seller.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn remove_item(&self, item_id: &ItemId) -> Cart {
        let mut cart = self.load();

        if !cart.remove(item_id) {
            tracing::debug!("Item not in cart");
        }

        self.save(&cart);
        cart
    }

    /// Set an item's quantity and return the resulting cart.
    ///
    /// A quantity below 1 removes the item. Setting the quantity of an item
    /// that is not in the cart changes nothing and writes nothing.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn update_item_quantity(&self, item_id: &ItemId, quantity: i64) -> Cart {
        if quantity < 1 {
            return self.remove_item(item_id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let mut cart = self.load();

        if cart.set_quantity(item_id, quantity) {
            self.save(&cart);
        } else {
            tracing::debug!("Item not in cart; quantity unchanged");
        }

        cart
    }

    /// Sum of `price * quantity` over the persisted cart.
    pub fn total(&self) -> Decimal {
        self.load().total()
    }

    /// Number of units in the persisted cart.
    pub fn item_count(&self) -> u64 {
        self.load().item_count()
    }

    /// Whether the persisted cart is bound to `seller_id`.
    ///
    /// An unbound cart belongs to nobody, including `None`.
    pub fn belongs_to_seller(&self, seller_id: Option<&SellerId>) -> bool {
        self.load().belongs_to(seller_id)
    }

    /// Message summarizing the persisted cart for the seller, or `None` when
    /// the cart is empty.
    pub fn format_for_sharing(&self) -> Option<String> {
        share_message(&self.load(), self.numbers.as_ref(), &self.default_currency)
    }

    /// Call `on_change` with the new cart whenever this store's record is
    /// written through the shared storage.
    pub fn subscribe<F>(&self, on_change: F) -> Subscription
    where
        F: Fn(Cart) + Send + Sync + 'static,
    {
        let key = self.key.clone();
        self.storage.subscribe(Arc::new(move |event: &StorageEvent| {
            if event.key == key {
                on_change(parse_cart(&key, event.new_value.as_deref()));
            }
        }))
    }
}

fn parse_cart(key: &str, raw: Option<&str>) -> Cart {
    let Some(raw) = raw else {
        return Cart::empty();
    };

    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(key = %key, error = %e, "Stored cart is corrupt; using empty cart");
        Cart::empty()
    })
}
