//! Price helpers using decimal arithmetic.
//!
//! Cart prices are plain decimal amounts in the currency's standard unit.
//! Persisted carts store them as JSON numbers, so the [`number`] module keeps
//! integral amounts as integers (`50000`, not `"50000"` or `50000.0`).

use rust_decimal::Decimal;

/// Currency used when an item or the cart total has none.
pub const DEFAULT_CURRENCY: &str = "UGX";

/// Price of `quantity` units at `unit_price`.
///
/// Saturates at [`Decimal::MAX`] (or [`Decimal::MIN`]) instead of overflowing.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price.saturating_mul(Decimal::from(quantity))
}

/// Sum of `amounts`, saturating instead of overflowing.
#[must_use]
pub fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Serde adapter for an optional decimal stored as a JSON number.
///
/// Reads numbers or numeric strings; writes integers when the amount has no
/// fractional part and floats otherwise.
///
/// Reading never fails: amounts beyond the range of [`Decimal`] saturate and
/// values that are not numeric read as no price.
pub mod number {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    /// Serialize an optional decimal as a JSON number.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::ref_option)]
    pub fn serialize<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let Some(amount) = value else {
            return serializer.serialize_none();
        };

        let whole = amount.fract().is_zero().then(|| amount.to_i64()).flatten();
        if let Some(whole) = whole {
            return serializer.serialize_i64(whole);
        }

        match amount.to_f64() {
            Some(float) => serializer.serialize_f64(float),
            None => serializer.serialize_str(&amount.to_string()),
        }
    }

    /// Deserialize an optional decimal from a JSON number, numeric string, or null.
    ///
    /// # Errors
    ///
    /// Propagates deserializer errors; the value itself is never rejected.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Decimal::from)
                .or_else(|| n.as_u64().map(Decimal::from))
                .or_else(|| n.as_f64().map(from_float)),
            Some(Value::String(s)) => {
                let text = s.trim();
                Decimal::from_str(text)
                    .ok()
                    .or_else(|| f64::from_str(text).ok().filter(|f| !f.is_nan()).map(from_float))
            }
            _ => None,
        })
    }

    fn from_float(float: f64) -> Decimal {
        Decimal::from_f64(float).unwrap_or(if float.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
    }
}
