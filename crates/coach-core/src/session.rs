//! # Checkout Sessions
//!
//! What we ask the provider for, and what it hands back.

use crate::checkout::{CheckoutMode, LineItem, ValidatedCheckout};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parameters of a provider session-creation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    pub mode: CheckoutMode,
    pub success_url: String,
    pub cancel_url: String,
    /// Provider customer to attach; `None` checks out as a guest
    pub customer: Option<String>,
    pub line_items: Vec<LineItem>,
}

impl SessionParams {
    pub fn new(checkout: ValidatedCheckout, customer: Option<String>) -> Self {
        Self {
            mode: checkout.mode,
            success_url: checkout.success_url,
            cancel_url: checkout.cancel_url,
            customer,
            line_items: checkout.items.into_line_items(),
        }
    }

    /// Total units across all line items
    pub fn item_count(&self) -> u64 {
        self.line_items
            .iter()
            .fold(0u64, |n, item| n + u64::from(item.quantity))
    }
}

/// A provider-hosted, single-use checkout session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID
    #[serde(rename = "sessionId")]
    pub session_id: String,

    /// Hosted page to redirect the customer to
    pub url: String,

    /// When the provider will expire the session (not part of the response body)
    #[serde(skip)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CheckoutSession {
    pub fn new(session_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            url: url.into(),
            expires_at: None,
        }
    }

    /// Builder: set expiry
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{CheckoutRequest, RequestLineItem};

    #[test]
    fn test_session_response_shape() {
        let session = CheckoutSession::new("sess_1", "https://pay/sess_1")
            .with_expiry(Utc::now());
        let json = serde_json::to_value(&session).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"sessionId": "sess_1", "url": "https://pay/sess_1"})
        );
    }

    #[test]
    fn test_single_item_synthesized() {
        let validated = CheckoutRequest::single(
            "price_X",
            CheckoutMode::Payment,
            "https://coach.example/thank-you",
            "https://coach.example/cart",
        )
        .validate()
        .unwrap();

        let params = SessionParams::new(validated, Some("cus_1".into()));
        assert_eq!(params.line_items, vec![LineItem::new("price_X", 1)]);
        assert_eq!(params.customer.as_deref(), Some("cus_1"));
        assert_eq!(params.item_count(), 1);
    }

    #[test]
    fn test_item_count_exceeds_u32() {
        let validated = CheckoutRequest::multi(
            vec![
                RequestLineItem::new("price_a", u32::MAX),
                RequestLineItem::new("price_b", 1),
            ],
            CheckoutMode::Payment,
            "https://coach.example/thank-you",
            "https://coach.example/cart",
        )
        .validate()
        .unwrap();

        let params = SessionParams::new(validated, None);
        assert_eq!(params.item_count(), u64::from(u32::MAX) + 1);
    }
}
