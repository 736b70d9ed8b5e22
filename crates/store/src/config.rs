//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_STORAGE_KEY` - Storage key holding the cart record (default: `b2bCart`)
//! - `CART_DEFAULT_CURRENCY` - ISO 4217 code used when an item has none (default: `UGX`)
//! - `CART_LOCALE` - Number format for share messages: `en`, `de`, or `fr` tags (default: `en-US`)

use b2b_cart_core::DEFAULT_CURRENCY;
use thiserror::Error;

use crate::format::GroupedFormat;

/// Storage key used by the storefront pages.
pub const DEFAULT_STORAGE_KEY: &str = "b2bCart";

/// Locale used when none is configured.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Key the cart record is stored under
    pub storage_key: String,
    /// Currency for items without one and for the total line
    pub default_currency: String,
    /// Locale tag the number format was chosen from
    pub locale: String,
    /// Number format for share messages
    pub number_format: GroupedFormat,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            default_currency: DEFAULT_CURRENCY.to_owned(),
            locale: DEFAULT_LOCALE.to_owned(),
            number_format: GroupedFormat::EN_US,
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let storage_key = lookup("CART_STORAGE_KEY").map_or(Ok(defaults.storage_key), |key| {
            let key = key.trim().to_owned();
            if key.is_empty() {
                Err(ConfigError::InvalidEnvVar(
                    "CART_STORAGE_KEY".to_owned(),
                    "must not be empty".to_owned(),
                ))
            } else {
                Ok(key)
            }
        })?;

        let default_currency = lookup("CART_DEFAULT_CURRENCY")
            .map_or(Ok(defaults.default_currency), |code| parse_currency(&code))?;

        let locale = lookup("CART_LOCALE").unwrap_or(defaults.locale);
        let number_format = GroupedFormat::for_locale(&locale)
            .map_err(|e| ConfigError::InvalidEnvVar("CART_LOCALE".to_owned(), e.to_string()))?;

        Ok(Self {
            storage_key,
            default_currency,
            locale,
            number_format,
        })
    }
}

fn parse_currency(code: &str) -> Result<String, ConfigError> {
    let code = code.trim().to_ascii_uppercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(ConfigError::InvalidEnvVar(
            "CART_DEFAULT_CURRENCY".to_owned(),
            format!("expected a 3-letter ISO 4217 code, got {code:?}"),
        ))
    }
}
