//! Core types for the B2B cart.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod id;
pub mod price;

pub use cart::{Cart, CartItem, Seller};
pub use id::*;
pub use price::DEFAULT_CURRENCY;
