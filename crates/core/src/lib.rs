//! B2B Cart Core - Shared cart types library.
//!
//! This crate provides the types used across all B2B cart components:
//! - `store` - Persistence, notification, and sharing around a single cart record
//! - `cli` - Command-line front end over a file-backed store
//!
//! # Architecture
//!
//! The core crate contains only types and pure derivations - no I/O, no
//! storage access, no prompts. This keeps it lightweight and allows it to be
//! used anywhere, including inside a browser build.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, price helpers, and the [`Cart`] record itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
