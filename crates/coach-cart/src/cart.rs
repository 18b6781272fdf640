//! # Cart Store
//!
//! Ordered set of coaching packages awaiting checkout, keyed by product id.
//! Every mutation is written through to storage immediately. Two stores over
//! the same storage do not reconcile: the last one to write wins.

use crate::storage::KeyValueStore;
use coach_core::{CheckoutRequest, Product, ProductCatalog, RequestLineItem};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Storage key holding the serialized cart
pub const CART_STORAGE_KEY: &str = "cart";

/// A package in the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product id; unique within the cart
    pub id: String,
    /// Display name
    #[serde(default)]
    pub title: String,
    /// Display price. The charged price comes from the catalog's price object.
    #[serde(default)]
    pub price: f64,
}

impl CartItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
        }
    }
}

/// Errors building a checkout request from the cart
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    #[error("Cart is empty")]
    Empty,

    #[error("Product configuration not found for: {title}")]
    UnknownProduct { title: String },

    /// A session has exactly one mode, so carts mixing modes cannot check out
    #[error("{title} is sold as {found} and cannot be checked out with {expected} items")]
    MixedModes {
        title: String,
        expected: String,
        found: String,
    },
}

/// Cart backed by a key-value store
#[derive(Debug)]
pub struct CartStore<S: KeyValueStore> {
    storage: S,
    items: Vec<CartItem>,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Open the cart persisted in `storage`.
    ///
    /// Absent or unparseable data gives an empty cart.
    pub fn load(storage: S) -> Self {
        let items = read_items(&storage);
        Self { storage, items }
    }

    /// Re-read the persisted cart, dropping in-memory state
    pub fn reload(&mut self) {
        self.items = read_items(&self.storage);
    }

    /// Add an item unless one with the same id is already present.
    ///
    /// Returns whether the item was inserted.
    pub fn add(&mut self, item: CartItem) -> bool {
        if self.contains(&item.id) {
            debug!("Cart already holds {}", item.id);
            return false;
        }
        self.items.push(item);
        self.persist();
        true
    }

    /// Remove the item with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return false;
        }
        self.persist();
        true
    }

    /// Empty the cart and drop the persisted entry
    pub fn clear(&mut self) {
        self.items.clear();
        self.storage.remove(CART_STORAGE_KEY);
    }

    /// Items in insertion order
    pub fn list(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of display prices
    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.price).sum()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Build the checkout request for the whole cart.
    ///
    /// Each item becomes one line of quantity 1 using the catalog's price
    /// reference. The first item's product decides the mode. Redirects go to
    /// `{origin}/thank-you` and `{origin}/cart`.
    pub fn checkout_request(
        &self,
        catalog: &ProductCatalog,
        origin: &str,
    ) -> Result<CheckoutRequest, CartError> {
        let first = self.items.first().ok_or(CartError::Empty)?;
        let mode = purchasable(catalog, &first.id, &first.title)?.mode;

        let line_items = self
            .items
            .iter()
            .map(|item| {
                let product = purchasable(catalog, &item.id, &item.title)?;
                if product.mode != mode {
                    return Err(CartError::MixedModes {
                        title: item.title.clone(),
                        expected: mode.to_string(),
                        found: product.mode.to_string(),
                    });
                }
                Ok(RequestLineItem::new(product.price_id.clone(), 1))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (success_url, cancel_url) = redirect_urls(origin);
        Ok(CheckoutRequest::multi(line_items, mode, success_url, cancel_url))
    }

    fn persist(&self) {
        match serde_json::to_string(&self.items) {
            Ok(raw) => self.storage.set(CART_STORAGE_KEY, &raw),
            Err(e) => warn!("Failed to serialize cart: {}", e),
        }
    }
}

/// Single-product checkout straight from a product page, bypassing the cart.
///
/// Sends the legacy `price_id` field with the product's own mode.
pub fn buy_now_request(
    catalog: &ProductCatalog,
    product_id: &str,
    origin: &str,
) -> Result<CheckoutRequest, CartError> {
    let product = purchasable(catalog, product_id, product_id)?;
    let (success_url, cancel_url) = redirect_urls(origin);
    Ok(CheckoutRequest {
        price_id: Some(product.price_id.clone()),
        mode: Some(product.mode.to_string()),
        success_url: Some(success_url),
        cancel_url: Some(cancel_url),
        ..CheckoutRequest::default()
    })
}

/// Only active products can be bought; retired ones are unknown to the server
fn purchasable<'a>(
    catalog: &'a ProductCatalog,
    id: &str,
    title: &str,
) -> Result<&'a Product, CartError> {
    catalog
        .active_products()
        .find(|product| product.id == id)
        .ok_or_else(|| CartError::UnknownProduct {
            title: title.to_string(),
        })
}

fn redirect_urls(origin: &str) -> (String, String) {
    let origin = origin.trim_end_matches('/');
    (format!("{}/thank-you", origin), format!("{}/cart", origin))
}

fn read_items<S: KeyValueStore>(storage: &S) -> Vec<CartItem> {
    let Some(raw) = storage.get(CART_STORAGE_KEY) else {
        return Vec::new();
    };

    let parsed: Vec<CartItem> = match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            warn!("Failed to parse cart from storage: {}", e);
            return Vec::new();
        }
    };

    // another writer may have stored duplicates; first one wins
    let mut items: Vec<CartItem> = Vec::with_capacity(parsed.len());
    for item in parsed {
        if !items.iter().any(|existing| existing.id == item.id) {
            items.push(item);
        }
    }
    items
}
