//! Integration tests for the B2B cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p b2b-cart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - End-to-end store operations against file-backed storage
//! - `shared_storage` - Several views of one cart kept in sync through storage events
