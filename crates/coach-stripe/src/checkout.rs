//! # Stripe Checkout Sessions
//!
//! Implementation of the Stripe Checkout Sessions and Customers APIs.
//! Sessions reference existing Stripe price objects; amounts are never sent.

use crate::config::StripeConfig;
use async_trait::async_trait;
use chrono::DateTime;
use coach_core::{
    Account, CheckoutSession, PaymentError, PaymentResult, PaymentStrategy, SessionParams,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

const PROVIDER: &str = "stripe";

/// Stripe Checkout Session strategy
///
/// Uses Stripe's hosted checkout page for payments.
pub struct StripeCheckoutStrategy {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckoutStrategy {
    /// Create a new Stripe checkout strategy
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    /// Form body for `POST /v1/checkout/sessions`
    fn session_form(params: &SessionParams) -> Vec<(String, String)> {
        let mut form = vec![
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("mode".to_string(), params.mode.as_str().to_string()),
            ("success_url".to_string(), params.success_url.clone()),
            ("cancel_url".to_string(), params.cancel_url.clone()),
        ];

        if let Some(ref customer) = params.customer {
            form.push(("customer".to_string(), customer.clone()));
        }

        for (i, item) in params.line_items.iter().enumerate() {
            form.push((format!("line_items[{}][price]", i), item.price.clone()));
            form.push((format!("line_items[{}][quantity]", i), item.quantity.to_string()));
        }

        form
    }

    /// Form body for `POST /v1/customers`
    fn customer_form(account: &Account) -> Vec<(String, String)> {
        let mut form = Vec::with_capacity(2);
        if let Some(ref email) = account.email {
            form.push(("email".to_string(), email.clone()));
        }
        form.push(("metadata[userId]".to_string(), account.id.clone()));
        form
    }

    /// POST a form to the Stripe API and decode the response
    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> PaymentResult<T> {
        let url = format!("{}{}", self.config.api_base_url, path);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .form(form)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: path={}, status={}, body={}", path, status, body);

            // Parse Stripe error
            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                if let Some(message) = error_response.error.message {
                    return Err(PaymentError::ProviderError {
                        provider: PROVIDER.to_string(),
                        message,
                    });
                }
            }

            return Err(PaymentError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentStrategy for StripeCheckoutStrategy {
    #[instrument(skip(self, account), fields(account_id = %account.id))]
    async fn create_customer(&self, account: &Account) -> PaymentResult<String> {
        let form = Self::customer_form(account);
        let customer: StripeCustomerResponse = self.post_form("/v1/customers", &form).await?;

        info!("Created Stripe customer {} for account {}", customer.id, account.id);
        Ok(customer.id)
    }

    #[instrument(skip(self, params), fields(mode = %params.mode))]
    async fn create_checkout(&self, params: &SessionParams) -> PaymentResult<CheckoutSession> {
        let form = Self::session_form(params);

        debug!(
            "Creating Stripe checkout session: {} items, customer={:?}",
            params.line_items.len(),
            params.customer
        );

        let response: StripeCheckoutSessionResponse =
            self.post_form("/v1/checkout/sessions", &form).await?;

        let url = response.url.ok_or_else(|| PaymentError::ProviderError {
            provider: PROVIDER.to_string(),
            message: format!("Checkout session {} has no redirect URL", response.id),
        })?;

        info!("Created Stripe checkout session: id={}, url={}", response.id, url);

        let mut session = CheckoutSession::new(response.id, url);
        if let Some(expires_at) = response.expires_at.and_then(|ts| DateTime::from_timestamp(ts, 0)) {
            session = session.with_expiry(expires_at);
        }
        Ok(session)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeCustomerResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::{CheckoutMode, LineItem};

    fn params(customer: Option<&str>) -> SessionParams {
        SessionParams {
            mode: CheckoutMode::Subscription,
            success_url: "https://coach.example/thank-you".into(),
            cancel_url: "https://coach.example/cart".into(),
            customer: customer.map(String::from),
            line_items: vec![LineItem::new("price_a", 1), LineItem::new("price_b", 2)],
        }
    }

    fn value<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_session_form() {
        let form = StripeCheckoutStrategy::session_form(&params(Some("cus_1")));

        assert_eq!(value(&form, "payment_method_types[0]"), Some("card"));
        assert_eq!(value(&form, "mode"), Some("subscription"));
        assert_eq!(value(&form, "customer"), Some("cus_1"));
        assert_eq!(value(&form, "line_items[0][price]"), Some("price_a"));
        assert_eq!(value(&form, "line_items[1][quantity]"), Some("2"));
    }

    #[test]
    fn test_guest_session_form_has_no_customer() {
        let form = StripeCheckoutStrategy::session_form(&params(None));
        assert_eq!(value(&form, "customer"), None);
    }

    #[test]
    fn test_customer_form() {
        let form = StripeCheckoutStrategy::customer_form(
            &Account::new("user_1").with_email("client@coach.example"),
        );
        assert_eq!(value(&form, "email"), Some("client@coach.example"));
        assert_eq!(value(&form, "metadata[userId]"), Some("user_1"));

        let form = StripeCheckoutStrategy::customer_form(&Account::new("user_2"));
        assert_eq!(form.len(), 1);
    }
}
