//! # coach-cart
//!
//! Client-side cart for the coaching storefront.
//!
//! The cart is a flat, id-keyed list persisted through a `KeyValueStore`.
//! Native builds and tests use `MemoryStorage`; with the `browser` feature the
//! crate also builds to WebAssembly with a `localStorage` backend.
//!
//! ## Example
//!
//! ```rust
//! use coach_cart::{CartItem, CartStore, MemoryStorage};
//!
//! let mut cart = CartStore::load(MemoryStorage::new());
//! cart.add(CartItem::new("prod_SG1JjNgIywzd5S", "Workout only", 199.0));
//! cart.add(CartItem::new("prod_SG1JjNgIywzd5S", "Workout only", 199.0));
//!
//! assert_eq!(cart.len(), 1);
//! assert_eq!(cart.total(), 199.0);
//! ```

pub mod cart;
pub mod storage;

#[cfg(feature = "browser")]
pub mod bindings;

pub use cart::{buy_now_request, CartError, CartItem, CartStore, CART_STORAGE_KEY};
pub use storage::{KeyValueStore, MemoryStorage};

#[cfg(feature = "browser")]
pub use bindings::{LocalStorage, WasmCart};
