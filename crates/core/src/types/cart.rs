//! The cart record and its line items.
//!
//! A [`Cart`] is either empty (no seller, no items) or bound to exactly one
//! seller. Every mutation here keeps that invariant: the last item leaving
//! the cart also clears the seller binding.
//!
//! The serialized form matches the record persisted by the storefront:
//!
//! ```json
//! {
//!   "sellerId": "acme",
//!   "sellerName": "Acme Furniture",
//!   "sellerPhone": "+256700000000",
//!   "items": [{ "id": "chair", "title": "Chair", "price": 50000, "currency": "UGX", "quantity": 2 }]
//! }
//! ```

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::id::{ItemId, SellerId};
use super::price::{self, line_total, saturating_sum};

/// The seller a cart is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seller {
    /// Seller identifier.
    pub id: SellerId,
    /// Display name used in the share message.
    pub name: String,
    /// Contact phone; stored as an empty string when absent.
    pub phone: Option<String>,
}

impl Seller {
    /// Create a seller without a phone number.
    #[must_use]
    pub fn new(id: impl Into<SellerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: None,
        }
    }

    /// Attach a contact phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// A product reference plus quantity.
///
/// Fields other than the ones named here are kept in [`CartItem::extra`] and
/// written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Item identifier, unique within a cart.
    pub id: ItemId,
    /// Product title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Unit price in the currency's standard unit.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "price::number"
    )]
    pub price: Option<Decimal>,
    /// ISO 4217 currency code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Number of units; treated as 1 when missing.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_quantity"
    )]
    pub quantity: Option<u32>,
    /// Seller-supplied passthrough fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CartItem {
    /// Create an item with only an identifier.
    #[must_use]
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            price: None,
            currency: None,
            quantity: None,
            extra: Map::new(),
        }
    }

    /// Set the product title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the unit price.
    #[must_use]
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the currency code.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Set the quantity.
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Attach a passthrough field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Quantity, defaulting to 1.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }

    /// Unit price, defaulting to 0.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.price.unwrap_or(Decimal::ZERO)
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        line_total(self.unit_price(), self.quantity())
    }

    /// Currency code, or `fallback` when the item has none.
    #[must_use]
    pub fn currency_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.currency.as_deref().unwrap_or(fallback)
    }

    /// Title, or the item id when the item has none.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or_else(|| self.id.as_str())
    }
}

/// The persisted cart record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Bound seller, `None` while the cart is empty.
    #[serde(default)]
    pub seller_id: Option<SellerId>,
    /// Display name of the bound seller.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub seller_name: String,
    /// Contact phone of the bound seller.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub seller_phone: String,
    /// Line items in insertion order.
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Vec<CartItem>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads any JSON number (or numeric string) as a quantity of at least 1,
/// rounding fractions and clamping at `u32::MAX`. Anything else reads as
/// missing.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    Ok(raw.map(|quantity| {
        if quantity.is_nan() || quantity < 1.0 {
            return 1;
        }
        Decimal::from_f64(quantity.round())
            .and_then(|q| q.to_u32())
            .unwrap_or(u32::MAX)
    }))
}

/// Reads the item list one entry at a time, dropping entries that are not
/// items (no usable id) instead of rejecting the whole record.
fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<CartItem>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => Ok(entries
            .into_iter()
            .filter_map(|entry| CartItem::deserialize(entry).ok())
            .collect()),
        Some(other) => Err(D::Error::custom(format!(
            "expected a list of items, found {other}"
        ))),
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::empty()
    }
}

impl Cart {
    /// The canonical empty, unbound cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            seller_id: None,
            seller_name: String::new(),
            seller_phone: String::new(),
            items: Vec::new(),
        }
    }

    /// The bound seller id. An empty id counts as unbound.
    #[must_use]
    pub fn seller_id(&self) -> Option<&SellerId> {
        self.seller_id.as_ref().filter(|id| !id.is_empty())
    }

    /// Whether the cart is bound to a seller.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.seller_id().is_some()
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The bound seller, if any.
    #[must_use]
    pub fn seller(&self) -> Option<Seller> {
        self.seller_id().map(|id| Seller {
            id: id.clone(),
            name: self.seller_name.clone(),
            phone: Some(self.seller_phone.clone()).filter(|phone| !phone.is_empty()),
        })
    }

    /// Whether the cart is bound to `seller_id`.
    ///
    /// An unbound cart belongs to nobody, even when `seller_id` is `None`.
    #[must_use]
    pub fn belongs_to(&self, seller_id: Option<&SellerId>) -> bool {
        match (self.seller_id(), seller_id) {
            (Some(bound), Some(wanted)) => bound == wanted,
            _ => false,
        }
    }

    /// Whether adding an item from `seller_id` would discard another seller's items.
    #[must_use]
    pub fn conflicts_with(&self, seller_id: &SellerId) -> bool {
        self.seller_id().is_some_and(|bound| bound != seller_id)
    }

    /// Bind the cart to `seller`, replacing any previous binding.
    pub fn bind(&mut self, seller: Seller) {
        self.seller_id = Some(seller.id);
        self.seller_name = seller.name;
        self.seller_phone = seller.phone.unwrap_or_default();
    }

    /// Clear the seller binding.
    pub fn unbind(&mut self) {
        self.seller_id = None;
        self.seller_name.clear();
        self.seller_phone.clear();
    }

    /// Look up an item by id.
    #[must_use]
    pub fn find_item(&self, id: &ItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    fn find_item_mut(&mut self, id: &ItemId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    /// Quantity of an item, if present.
    #[must_use]
    pub fn item_quantity(&self, id: &ItemId) -> Option<u32> {
        self.find_item(id).map(CartItem::quantity)
    }

    /// Add one unit of `item`.
    ///
    /// An existing entry with the same id is incremented; otherwise `item` is
    /// appended with quantity 1, overriding whatever quantity it carried.
    pub fn add_one(&mut self, mut item: CartItem) {
        if let Some(existing) = self.find_item_mut(&item.id) {
            existing.quantity = Some(existing.quantity().saturating_add(1));
        } else {
            item.quantity = Some(1);
            self.items.push(item);
        }
    }

    /// Remove an item. Removing the last item unbinds the cart.
    ///
    /// Returns whether an item was removed.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);

        if self.items.is_empty() {
            self.unbind();
        }

        self.items.len() != before
    }

    /// Set an item's quantity. Zero removes the item.
    ///
    /// Returns whether the cart changed.
    pub fn set_quantity(&mut self, id: &ItemId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(id);
        }

        match self.find_item_mut(id) {
            Some(item) => {
                item.quantity = Some(quantity);
                true
            }
            None => false,
        }
    }

    /// Sum of `price * quantity` over all items.
    #[must_use]
    pub fn total(&self) -> Decimal {
        saturating_sum(self.items.iter().map(CartItem::line_total))
    }

    /// Sum of quantities over all items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity())).sum()
    }
}
