//! Locale-aware number formatting for share messages.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Errors that can occur when selecting a number format.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    /// No preset exists for the locale tag.
    #[error("unsupported locale: {0}")]
    UnsupportedLocale(String),
}

/// Renders a decimal for display.
pub trait NumberFormat: Send + Sync {
    /// Format `value` for humans.
    fn format(&self, value: Decimal) -> String;
}

/// Digit grouping with configurable separators.
///
/// Rounds to at most `max_fraction_digits` (midpoint away from zero), drops
/// trailing zeros, and groups the integer part by thousands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupedFormat {
    group_separator: char,
    decimal_separator: char,
    max_fraction_digits: u32,
}

impl Default for GroupedFormat {
    fn default() -> Self {
        Self::EN_US
    }
}

impl GroupedFormat {
    /// `1,234,567.891`
    pub const EN_US: Self = Self::new(',', '.', 3);
    /// `1.234.567,891`
    pub const DE_DE: Self = Self::new('.', ',', 3);
    /// `1 234 567,891` with a narrow no-break space.
    pub const FR_FR: Self = Self::new('\u{202f}', ',', 3);

    /// Create a custom format.
    #[must_use]
    pub const fn new(group_separator: char, decimal_separator: char, max_fraction_digits: u32) -> Self {
        Self {
            group_separator,
            decimal_separator,
            max_fraction_digits,
        }
    }

    /// Pick the preset for a BCP 47 tag such as `en-US` or `de`.
    ///
    /// # Errors
    ///
    /// Returns an error if no preset matches the tag's language.
    pub fn for_locale(tag: &str) -> Result<Self, FormatError> {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match language.as_str() {
            "en" => Ok(Self::EN_US),
            "de" => Ok(Self::DE_DE),
            "fr" => Ok(Self::FR_FR),
            _ => Err(FormatError::UnsupportedLocale(tag.to_owned())),
        }
    }
}

impl NumberFormat for GroupedFormat {
    fn format(&self, value: Decimal) -> String {
        let rounded = value
            .round_dp_with_strategy(self.max_fraction_digits, RoundingStrategy::MidpointAwayFromZero)
            .normalize();
        let digits = rounded.abs().to_string();
        let (integer, fraction) = digits
            .split_once('.')
            .map_or((digits.as_str(), None), |(i, f)| (i, Some(f)));

        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            out.push('-');
        }

        let len = integer.len();
        for (i, ch) in integer.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(self.group_separator);
            }
            out.push(ch);
        }

        if let Some(fraction) = fraction {
            out.push(self.decimal_separator);
            out.push_str(fraction);
        }

        out
    }
}
