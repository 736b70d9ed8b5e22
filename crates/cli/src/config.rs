//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_STORAGE_DIR` - Directory holding the cart file (default: `.cart`)
//! - `CART_STORAGE_KEY`, `CART_DEFAULT_CURRENCY`, `CART_LOCALE` - see [`CartConfig`]

use std::path::PathBuf;

use b2b_cart_store::{CartConfig, ConfigError};

const DEFAULT_STORAGE_DIR: &str = ".cart";

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory the file storage is rooted at
    pub storage_dir: PathBuf,
    /// Cart store settings
    pub cart: CartConfig,
}

impl CliConfig {
    /// Load configuration from environment variables. `dir` overrides
    /// `CART_STORAGE_DIR` when given.
    ///
    /// # Errors
    ///
    /// Returns an error if a cart variable is set to an invalid value.
    pub fn from_env(dir: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::from_lookup(dir, |name| std::env::var(name).ok())
    }

    fn from_lookup<F>(dir: Option<PathBuf>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_dir = dir
            .or_else(|| lookup("CART_STORAGE_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));

        Ok(Self {
            storage_dir,
            cart: CartConfig::from_lookup(lookup)?,
        })
    }
}
