//! Cart commands.
//!
//! Each command runs one store operation and writes its result to `out`.
//! Operations the store reports as failed (a rejected add, an edit that did
//! not reach storage, an empty cart to share) become a [`CartCommandError`]
//! so the binary exits non-zero.

use std::io::{self, Write};

use b2b_cart_core::{Cart, CartItem, IdError, ItemId, Seller, SellerId};
use b2b_cart_store::{CartStore, Confirm, KeyValueStorage};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] io::Error),

    /// An id argument was empty.
    #[error("Invalid argument: {0}")]
    InvalidId(#[from] IdError),

    /// The record could not be rendered as JSON.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The item was not added: the seller switch was declined or the cart could not be saved.
    #[error("Item {0} was not added to the cart")]
    NotAdded(String),

    /// The change did not reach storage.
    #[error("Cart could not be saved")]
    NotSaved,

    /// There is nothing to share.
    #[error("Cart is empty; nothing to share")]
    EmptyCart,
}

/// Arguments of the `add` command.
#[derive(Debug, Clone)]
pub struct AddArgs {
    pub id: String,
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub seller_id: String,
    pub seller_name: String,
    pub seller_phone: Option<String>,
}

/// Print the cart, either as a summary or as the stored JSON record.
pub fn show<S, W>(store: &CartStore<S>, out: &mut W, json: bool) -> Result<(), CartCommandError>
where
    S: KeyValueStorage,
    W: Write,
{
    let cart = store.load();

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&cart)?)?;
        return Ok(());
    }

    write_summary(store, out, &cart)?;
    Ok(())
}

fn write_summary<S, W>(store: &CartStore<S>, out: &mut W, cart: &Cart) -> io::Result<()>
where
    S: KeyValueStorage,
    W: Write,
{
    if cart.is_empty() {
        return writeln!(out, "Cart is empty");
    }

    match cart.seller_id() {
        Some(id) if cart.seller_phone.is_empty() => {
            writeln!(out, "Seller: {} ({id})", cart.seller_name)?;
        }
        Some(id) => writeln!(out, "Seller: {} ({id}) {}", cart.seller_name, cart.seller_phone)?,
        None => writeln!(out, "Seller: none")?,
    }

    for item in &cart.items {
        writeln!(
            out,
            "  {}  {}  {} {} x {}",
            item.id,
            item.display_title(),
            item.currency_or(store.default_currency()),
            store.format_amount(item.unit_price()),
            item.quantity()
        )?;
    }

    writeln!(
        out,
        "Items: {}  Total: {} {}",
        cart.item_count(),
        store.default_currency(),
        store.format_amount(cart.total())
    )
}

/// Add one unit of an item.
pub fn add<S, W>(
    store: &CartStore<S>,
    out: &mut W,
    args: AddArgs,
    confirm: &dyn Confirm,
) -> Result<(), CartCommandError>
where
    S: KeyValueStorage,
    W: Write,
{
    let id = ItemId::parse(&args.id)?;
    let mut seller = Seller::new(SellerId::parse(&args.seller_id)?, args.seller_name);
    if let Some(phone) = args.seller_phone {
        seller = seller.with_phone(phone);
    }

    let mut item = CartItem::new(id.clone());
    item.title = args.title;
    item.price = args.price;
    item.currency = args.currency;

    if !store.add_item(item, seller, confirm) {
        return Err(CartCommandError::NotAdded(id.into_inner()));
    }

    let cart = store.load();
    writeln!(
        out,
        "Added {id} (quantity {}); {} item(s) in cart",
        cart.item_quantity(&id).unwrap_or(1),
        cart.item_count()
    )?;
    Ok(())
}

/// Remove an item.
pub fn remove<S, W>(store: &CartStore<S>, out: &mut W, id: &str) -> Result<(), CartCommandError>
where
    S: KeyValueStorage,
    W: Write,
{
    let id = ItemId::parse(id)?;
    let cart = store.remove_item(&id);
    ensure_saved(store, &cart)?;

    writeln!(out, "Removed {id}; {} item(s) in cart", cart.item_count())?;
    Ok(())
}

/// Set an item's quantity.
pub fn update<S, W>(
    store: &CartStore<S>,
    out: &mut W,
    id: &str,
    quantity: i64,
) -> Result<(), CartCommandError>
where
    S: KeyValueStorage,
    W: Write,
{
    let id = ItemId::parse(id)?;
    let cart = store.update_item_quantity(&id, quantity);
    ensure_saved(store, &cart)?;

    match cart.item_quantity(&id) {
        Some(quantity) => writeln!(out, "{id} quantity is now {quantity}")?,
        None => writeln!(out, "{id} is not in the cart")?,
    }
    Ok(())
}

/// Empty the cart.
pub fn clear<S, W>(store: &CartStore<S>, out: &mut W) -> Result<(), CartCommandError>
where
    S: KeyValueStorage,
    W: Write,
{
    let cart = store.clear();
    ensure_saved(store, &cart)?;
    writeln!(out, "Cart cleared")?;
    Ok(())
}

/// Print the cart total.
pub fn total<S, W>(store: &CartStore<S>, out: &mut W) -> Result<(), CartCommandError>
where
    S: KeyValueStorage,
    W: Write,
{
    writeln!(
        out,
        "{} {}",
        store.default_currency(),
        store.format_amount(store.total())
    )?;
    Ok(())
}

/// Print the number of units in the cart.
pub fn count<S, W>(store: &CartStore<S>, out: &mut W) -> Result<(), CartCommandError>
where
    S: KeyValueStorage,
    W: Write,
{
    writeln!(out, "{}", store.item_count())?;
    Ok(())
}

/// Print the message to send to the seller.
pub fn share<S, W>(store: &CartStore<S>, out: &mut W) -> Result<(), CartCommandError>
where
    S: KeyValueStorage,
    W: Write,
{
    let message = store
        .format_for_sharing()
        .ok_or(CartCommandError::EmptyCart)?;
    writeln!(out, "{message}")?;
    Ok(())
}

/// Print whether the cart is bound to `seller_id`.
pub fn belongs<S, W>(
    store: &CartStore<S>,
    out: &mut W,
    seller_id: Option<&str>,
) -> Result<(), CartCommandError>
where
    S: KeyValueStorage,
    W: Write,
{
    let seller_id = seller_id.map(SellerId::parse).transpose()?;
    let answer = if store.belongs_to_seller(seller_id.as_ref()) {
        "yes"
    } else {
        "no"
    };
    writeln!(out, "{answer}")?;
    Ok(())
}

/// The store reports write failures only through its logs, so read the
/// record back and compare.
fn ensure_saved<S: KeyValueStorage>(
    store: &CartStore<S>,
    expected: &Cart,
) -> Result<(), CartCommandError> {
    if store.load() == *expected {
        Ok(())
    } else {
        Err(CartCommandError::NotSaved)
    }
}
