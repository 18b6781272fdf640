//! # Browser bindings
//!
//! `localStorage` backend and WebAssembly exports for the storefront.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCart, buyNowRequestJson } from 'coach-cart';
//!
//! await init();
//!
//! const cart = new WasmCart();
//! cart.add('prod_SG1UWIK3PV3QxM', '1:1 posing', 99);
//! console.log('Total:', cart.total());
//!
//! const body = cart.checkoutRequestJson(catalogJson, window.location.origin);
//! const oneClick = buyNowRequestJson(catalogJson, 'prod_SG1JjNgIywzd5S', window.location.origin);
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build crates/coach-cart --target web -- --features browser
//! ```

use crate::cart::{buy_now_request, CartItem, CartStore};
use crate::storage::KeyValueStore;
use coach_core::ProductCatalog;
use wasm_bindgen::prelude::*;
use web_sys::Storage;

/// The page origin's `localStorage`
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// Open `window.localStorage`
    pub fn open() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let storage = window
            .local_storage()?
            .ok_or_else(|| JsValue::from_str("localStorage unavailable"))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if self.storage.set_item(key, value).is_err() {
            log(&format!("Failed to write {} to localStorage", key));
        }
    }

    fn remove(&self, key: &str) {
        if self.storage.remove_item(key).is_err() {
            log(&format!("Failed to remove {} from localStorage", key));
        }
    }
}

/// Cart handle exported to JavaScript
#[wasm_bindgen]
pub struct WasmCart {
    inner: CartStore<LocalStorage>,
}

#[wasm_bindgen]
impl WasmCart {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmCart, JsValue> {
        Ok(Self {
            inner: CartStore::load(LocalStorage::open()?),
        })
    }

    /// Add a package; returns false if it is already in the cart
    #[wasm_bindgen]
    pub fn add(&mut self, id: String, title: String, price: f64) -> bool {
        self.inner.add(CartItem::new(id, title, price))
    }

    #[wasm_bindgen]
    pub fn remove(&mut self, id: &str) -> bool {
        self.inner.remove(id)
    }

    /// Called on explicit user action and from the thank-you page
    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.inner.clear()
    }

    #[wasm_bindgen]
    pub fn reload(&mut self) {
        self.inner.reload()
    }

    #[wasm_bindgen]
    pub fn total(&self) -> f64 {
        self.inner.total()
    }

    #[wasm_bindgen(js_name = itemCount)]
    pub fn item_count(&self) -> usize {
        self.inner.len()
    }

    /// Items as a JSON array, in insertion order
    #[wasm_bindgen(js_name = itemsJson)]
    pub fn items_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.inner.list()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// JSON body for the checkout endpoint
    #[wasm_bindgen(js_name = checkoutRequestJson)]
    pub fn checkout_request_json(&self, catalog_json: &str, origin: &str) -> Result<String, JsValue> {
        let catalog: ProductCatalog = serde_json::from_str(catalog_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid catalog: {}", e)))?;
        let request = self
            .inner
            .checkout_request(&catalog, origin)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        serde_json::to_string(&request).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// JSON body for buying one product without touching the cart
#[wasm_bindgen(js_name = buyNowRequestJson)]
pub fn buy_now_request_json(
    catalog_json: &str,
    product_id: &str,
    origin: &str,
) -> Result<String, JsValue> {
    let catalog: ProductCatalog = serde_json::from_str(catalog_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid catalog: {}", e)))?;
    let request = buy_now_request(&catalog, product_id, origin)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&request).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Format a display price (e.g. `$199.00`)
#[wasm_bindgen(js_name = formatPrice)]
pub fn format_price(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Log to browser console
fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
