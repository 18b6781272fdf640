//! # Product Types
//!
//! Product catalog types for the coaching storefront.
//! Products are loaded from `config/products.toml`.

use crate::checkout::CheckoutMode;
use serde::{Deserialize, Serialize};

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::CAD => "cad",
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::CAD => "C$",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Display price with amount in smallest currency unit.
///
/// Informational only: the amount charged is whatever the provider's
/// price object says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (cents for USD)
    pub amount: i64,
    /// Currency
    #[serde(default)]
    pub currency: Currency,
}

impl Price {
    /// Create a price from smallest unit (cents)
    pub fn from_cents(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Get the decimal amount
    pub fn as_decimal(&self) -> f64 {
        self.amount as f64 / 100.0
    }

    /// Format for display (e.g., "$199.00")
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency.symbol(), self.as_decimal())
    }
}

/// A coaching package in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Provider product identifier (e.g., "prod_SG1JjNgIywzd5S")
    pub id: String,

    /// Provider price reference used in checkout line items
    pub price_id: String,

    /// Display name
    pub name: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Checkout mode this price can be bought with
    pub mode: CheckoutMode,

    /// Display price
    pub price: Price,

    /// Optional label shown next to the price ("3 sessions", "8 weeks")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_label: Option<String>,

    /// Whether this product is active and available for purchase
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Create a one-time purchase product
    pub fn one_time(
        id: impl Into<String>,
        price_id: impl Into<String>,
        name: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            id: id.into(),
            price_id: price_id.into(),
            name: name.into(),
            description: String::new(),
            mode: CheckoutMode::Payment,
            price,
            price_label: None,
            active: true,
        }
    }

    /// Create a subscription product
    pub fn subscription(
        id: impl Into<String>,
        price_id: impl Into<String>,
        name: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            mode: CheckoutMode::Subscription,
            ..Self::one_time(id, price_id, name, price)
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: set price label
    pub fn with_price_label(mut self, label: impl Into<String>) -> Self {
        self.price_label = Some(label.into());
        self
    }

    /// Check if this is a subscription product
    pub fn is_subscription(&self) -> bool {
        self.mode == CheckoutMode::Subscription
    }
}

/// Product catalog (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    #[serde(default)]
    pub products: Vec<Product>,
}

impl ProductCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// Add a product to the catalog
    pub fn add(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Builder: add a product
    pub fn with_product(mut self, product: Product) -> Self {
        self.add(product);
        self
    }

    /// Find a product by ID
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Find the active product selling a given price reference
    pub fn by_price_id(&self, price_id: &str) -> Option<&Product> {
        self.active_products().find(|p| p.price_id == price_id)
    }

    /// Get all active products
    pub fn active_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.active)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_display() {
        assert_eq!(Price::from_cents(19900, Currency::USD).display(), "$199.00");
        assert_eq!(Price::from_cents(8000, Currency::EUR).display(), "€80.00");
    }

    #[test]
    fn test_catalog_lookup_by_price() {
        let mut retired = Product::one_time("prod_old", "price_old", "Retired", Price::from_cents(100, Currency::USD));
        retired.active = false;

        let catalog = ProductCatalog::new()
            .with_product(Product::subscription(
                "prod_workout",
                "price_workout",
                "Workout only",
                Price::from_cents(19900, Currency::USD),
            ))
            .with_product(retired);

        let product = catalog.by_price_id("price_workout").unwrap();
        assert_eq!(product.id, "prod_workout");
        assert!(product.is_subscription());

        assert!(catalog.by_price_id("price_old").is_none());
        assert!(catalog.get("prod_old").is_some());
        assert_eq!(catalog.active_products().count(), 1);
    }

    #[test]
    fn test_catalog_from_toml() {
        let catalog = ProductCatalog::from_toml(
            r#"
            [[products]]
            id = "prod_posing"
            price_id = "price_posing"
            name = "1:1 posing"
            mode = "payment"
            price_label = "3 sessions"
            price = { amount = 9900 }
            "#,
        )
        .unwrap();

        let product = catalog.get("prod_posing").unwrap();
        assert_eq!(product.mode, CheckoutMode::Payment);
        assert_eq!(product.price.currency, Currency::USD);
        assert_eq!(product.price_label.as_deref(), Some("3 sessions"));
        assert!(product.active);
    }
}
