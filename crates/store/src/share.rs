//! Shareable cart summary.
//!
//! The message is meant to be pasted into a chat with the seller, so item
//! titles and the total use `*bold*` markup.

use b2b_cart_core::Cart;

use crate::format::NumberFormat;

/// Build the message sent to the seller, or `None` for an empty cart.
///
/// Items without a currency are shown in `default_currency`, which is also
/// the currency of the total line.
#[must_use]
pub fn share_message(
    cart: &Cart,
    numbers: &dyn NumberFormat,
    default_currency: &str,
) -> Option<String> {
    if cart.is_empty() {
        return None;
    }

    let mut message = format!(
        "Hello *{}*, I'm interested in the following items:\n\n",
        cart.seller_name
    );

    for (index, item) in cart.items.iter().enumerate() {
        message.push_str(&format!(
            "{}. *{}* - {} {} x {}\n",
            index + 1,
            item.display_title(),
            item.currency_or(default_currency),
            numbers.format(item.unit_price()),
            item.quantity(),
        ));
    }

    message.push_str(&format!(
        "\n*Total: {} {}*",
        default_currency,
        numbers.format(cart.total())
    ));

    Some(message)
}
