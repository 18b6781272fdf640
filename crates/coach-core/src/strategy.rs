//! # Payment Strategy Trait
//!
//! The seam between the checkout service and a payment provider.
//! Stripe is the only implementation; tests plug in stubs.

use crate::customer::Account;
use crate::error::PaymentResult;
use crate::session::{CheckoutSession, SessionParams};
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for payment provider implementations.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Create a provider customer for an account and return its ID.
    async fn create_customer(&self, account: &Account) -> PaymentResult<String>;

    /// Create a hosted checkout session.
    ///
    /// # Arguments
    /// * `params` - Mode, redirect URLs, optional customer and line items
    ///
    /// # Returns
    /// A `CheckoutSession` containing the session ID and redirect URL.
    async fn create_checkout(&self, params: &SessionParams) -> PaymentResult<CheckoutSession>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a boxed payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;
