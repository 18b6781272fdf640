//! # Checkout Request Types
//!
//! The checkout request as it arrives on the wire, and its validated form.
//!
//! Validation runs in a fixed order and stops at the first broken rule:
//!
//! 1. a supplied `line_items` list is non-empty and every item carries a price
//! 2. `mode` is present and is `payment` or `subscription`
//! 3. `success_url` and `cancel_url` are present
//! 4. the single-item form carries `price` or `price_id`

use crate::error::{PaymentError, PaymentResult};
use crate::product::ProductCatalog;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Checkout mode. One mode governs a whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMode {
    /// One-time payment
    Payment,
    /// Recurring subscription
    Subscription,
}

impl CheckoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutMode::Payment => "payment",
            CheckoutMode::Subscription => "subscription",
        }
    }
}

impl FromStr for CheckoutMode {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment" => Ok(CheckoutMode::Payment),
            "subscription" => Ok(CheckoutMode::Subscription),
            _ => Err(PaymentError::validation(
                r#"Mode must be either "payment" or "subscription""#,
            )),
        }
    }
}

impl std::fmt::Display for CheckoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line item exactly as the caller sent it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl RequestLineItem {
    pub fn new(price: impl Into<String>, quantity: u32) -> Self {
        Self {
            price: Some(price.into()),
            quantity: Some(quantity),
        }
    }
}

/// Checkout request body.
///
/// Every field is optional here so that a missing field becomes a
/// validation message rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Single-item price reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    /// Older name for `price`, consulted only when `price` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_id: Option<String>,
    /// Multi-item form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_items: Option<Vec<RequestLineItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
}

/// Empty strings count as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl CheckoutRequest {
    /// Single-item request
    pub fn single(
        price: impl Into<String>,
        mode: CheckoutMode,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        Self {
            price: Some(price.into()),
            mode: Some(mode.to_string()),
            success_url: Some(success_url.into()),
            cancel_url: Some(cancel_url.into()),
            ..Self::default()
        }
    }

    /// Multi-item request sharing one mode
    pub fn multi(
        line_items: Vec<RequestLineItem>,
        mode: CheckoutMode,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        Self {
            line_items: Some(line_items),
            mode: Some(mode.to_string()),
            success_url: Some(success_url.into()),
            cancel_url: Some(cancel_url.into()),
            ..Self::default()
        }
    }

    /// Single-item price reference: `price` wins over `price_id`
    pub fn single_price(&self) -> Option<&str> {
        present(&self.price).or_else(|| present(&self.price_id))
    }

    /// Apply the validation rules in order
    pub fn validate(&self) -> PaymentResult<ValidatedCheckout> {
        let multi = match &self.line_items {
            Some(items) => {
                if items.is_empty() {
                    return Err(PaymentError::validation(
                        "At least one line item is required",
                    ));
                }

                let mut line_items = Vec::with_capacity(items.len());
                for item in items {
                    let price = present(&item.price).ok_or_else(|| {
                        let raw = serde_json::to_string(item).unwrap_or_default();
                        PaymentError::validation(format!(
                            "Line item missing price property: {}",
                            raw
                        ))
                    })?;
                    line_items.push(LineItem::new(price, item.quantity.unwrap_or(1)));
                }
                Some(line_items)
            }
            None => None,
        };

        let mode: CheckoutMode = present(&self.mode)
            .ok_or_else(|| PaymentError::validation("Mode is required"))?
            .parse()?;

        let success_url = present(&self.success_url)
            .ok_or_else(|| PaymentError::validation("Success URL is required"))?;
        let cancel_url = present(&self.cancel_url)
            .ok_or_else(|| PaymentError::validation("Cancel URL is required"))?;

        let items = match multi {
            Some(line_items) => LineItems::Multi(line_items),
            None => LineItems::Single(
                self.single_price()
                    .ok_or_else(|| PaymentError::validation("Price ID is required"))?
                    .to_string(),
            ),
        };

        Ok(ValidatedCheckout {
            mode,
            success_url: success_url.to_string(),
            cancel_url: cancel_url.to_string(),
            items,
        })
    }
}

/// A priced line item sent to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Provider price reference
    pub price: String,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(price: impl Into<String>, quantity: u32) -> Self {
        Self {
            price: price.into(),
            quantity,
        }
    }
}

/// Items of a validated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineItems {
    Multi(Vec<LineItem>),
    Single(String),
}

impl LineItems {
    /// Price references in request order
    pub fn price_refs(&self) -> Vec<&str> {
        match self {
            LineItems::Multi(items) => items.iter().map(|i| i.price.as_str()).collect(),
            LineItems::Single(price) => vec![price.as_str()],
        }
    }

    /// Line items for the provider; the single form becomes one item of quantity 1
    pub fn into_line_items(self) -> Vec<LineItem> {
        match self {
            LineItems::Multi(items) => items,
            LineItems::Single(price) => vec![LineItem::new(price, 1)],
        }
    }
}

/// A request that passed every validation rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheckout {
    pub mode: CheckoutMode,
    pub success_url: String,
    pub cancel_url: String,
    pub items: LineItems,
}

impl ValidatedCheckout {
    /// Check every price against the catalog.
    ///
    /// An empty catalog means none is configured and the provider is left to
    /// reject unknown prices.
    pub fn conform_to(&self, catalog: &ProductCatalog) -> PaymentResult<()> {
        if catalog.is_empty() {
            return Ok(());
        }

        for price in self.items.price_refs() {
            let product = catalog
                .by_price_id(price)
                .ok_or_else(|| PaymentError::validation(format!("Unknown price: {}", price)))?;

            if product.mode != self.mode {
                return Err(PaymentError::validation(format!(
                    "Price {} cannot be purchased in {} mode",
                    price, self.mode
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{Currency, Price, Product};

    const OK: &str = "https://coach.example/thank-you";
    const CANCEL: &str = "https://coach.example/cart";

    fn message(request: &CheckoutRequest) -> String {
        request.validate().unwrap_err().client_message()
    }

    #[test]
    fn test_valid_single_request() {
        let validated = CheckoutRequest::single("price_X", CheckoutMode::Payment, OK, CANCEL)
            .validate()
            .unwrap();

        assert_eq!(validated.mode, CheckoutMode::Payment);
        assert_eq!(validated.items, LineItems::Single("price_X".into()));
        assert_eq!(
            validated.items.into_line_items(),
            vec![LineItem::new("price_X", 1)]
        );
    }

    #[test]
    fn test_price_wins_over_price_id() {
        let mut request = CheckoutRequest::single("price_new", CheckoutMode::Payment, OK, CANCEL);
        request.price_id = Some("price_legacy".into());
        assert_eq!(request.single_price(), Some("price_new"));

        request.price = None;
        assert_eq!(request.single_price(), Some("price_legacy"));

        request.price = Some(String::new());
        assert_eq!(request.single_price(), Some("price_legacy"));
    }

    #[test]
    fn test_empty_line_items_rejected() {
        let request = CheckoutRequest::multi(vec![], CheckoutMode::Payment, OK, CANCEL);
        assert_eq!(message(&request), "At least one line item is required");
    }

    #[test]
    fn test_line_item_without_price_rejected_before_mode() {
        let mut request = CheckoutRequest::multi(
            vec![
                RequestLineItem::new("price_a", 1),
                RequestLineItem {
                    price: None,
                    quantity: Some(2),
                },
            ],
            CheckoutMode::Payment,
            OK,
            CANCEL,
        );
        request.mode = None;

        assert_eq!(
            message(&request),
            r#"Line item missing price property: {"quantity":2}"#
        );
    }

    #[test]
    fn test_mode_rules() {
        let mut request = CheckoutRequest::single("price_X", CheckoutMode::Payment, OK, CANCEL);

        request.mode = None;
        assert_eq!(message(&request), "Mode is required");

        request.mode = Some("setup".into());
        assert_eq!(
            message(&request),
            r#"Mode must be either "payment" or "subscription""#
        );

        request.mode = Some("Payment".into());
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_urls_required() {
        let mut request = CheckoutRequest::single("price_X", CheckoutMode::Subscription, OK, CANCEL);
        request.success_url = None;
        assert_eq!(message(&request), "Success URL is required");

        let mut request = CheckoutRequest::single("price_X", CheckoutMode::Subscription, OK, CANCEL);
        request.cancel_url = Some(String::new());
        assert_eq!(message(&request), "Cancel URL is required");
    }

    #[test]
    fn test_missing_price_checked_last() {
        let request = CheckoutRequest {
            mode: Some("payment".into()),
            ..CheckoutRequest::default()
        };
        assert_eq!(message(&request), "Success URL is required");

        let request = CheckoutRequest {
            mode: Some("payment".into()),
            success_url: Some(OK.into()),
            cancel_url: Some(CANCEL.into()),
            ..CheckoutRequest::default()
        };
        assert_eq!(message(&request), "Price ID is required");
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        let request = CheckoutRequest::multi(
            vec![RequestLineItem {
                price: Some("price_a".into()),
                quantity: None,
            }],
            CheckoutMode::Payment,
            OK,
            CANCEL,
        );

        let validated = request.validate().unwrap();
        assert_eq!(
            validated.items,
            LineItems::Multi(vec![LineItem::new("price_a", 1)])
        );
    }

    #[test]
    fn test_wire_format() {
        let request: CheckoutRequest = serde_json::from_str(
            r#"{
                "line_items": [{"price": "price_a", "quantity": 1}],
                "mode": "subscription",
                "success_url": "https://coach.example/thank-you",
                "cancel_url": "https://coach.example/cart"
            }"#,
        )
        .unwrap();

        let validated = request.validate().unwrap();
        assert_eq!(validated.mode, CheckoutMode::Subscription);
        assert_eq!(validated.items.price_refs(), vec!["price_a"]);
    }

    #[test]
    fn test_catalog_conformance() {
        let catalog = ProductCatalog::new()
            .with_product(Product::one_time(
                "prod_posing",
                "price_posing",
                "1:1 posing",
                Price::from_cents(9900, Currency::USD),
            ))
            .with_product(Product::subscription(
                "prod_workout",
                "price_workout",
                "Workout only",
                Price::from_cents(19900, Currency::USD),
            ));

        let ok = CheckoutRequest::single("price_posing", CheckoutMode::Payment, OK, CANCEL)
            .validate()
            .unwrap();
        assert!(ok.conform_to(&catalog).is_ok());

        let unknown = CheckoutRequest::single("price_nope", CheckoutMode::Payment, OK, CANCEL)
            .validate()
            .unwrap();
        assert_eq!(
            unknown.conform_to(&catalog).unwrap_err().client_message(),
            "Unknown price: price_nope"
        );

        let mixed = CheckoutRequest::multi(
            vec![
                RequestLineItem::new("price_posing", 1),
                RequestLineItem::new("price_workout", 1),
            ],
            CheckoutMode::Payment,
            OK,
            CANCEL,
        )
        .validate()
        .unwrap();
        assert_eq!(
            mixed.conform_to(&catalog).unwrap_err().client_message(),
            "Price price_workout cannot be purchased in payment mode"
        );

        assert!(unknown.conform_to(&ProductCatalog::new()).is_ok());
    }
}
