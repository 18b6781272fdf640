//! # coach-stripe
//!
//! Stripe payment strategy for the coaching storefront.
//!
//! `StripeCheckoutStrategy` talks to two Stripe endpoints:
//!
//! - `POST /v1/customers` - link a signed-in account to a Stripe customer
//! - `POST /v1/checkout/sessions` - create a hosted checkout session
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use coach_stripe::StripeCheckoutStrategy;
//! use coach_core::CheckoutService;
//! use std::sync::Arc;
//!
//! // Create strategy from environment
//! let strategy = StripeCheckoutStrategy::from_env()?;
//! let service = CheckoutService::new(Arc::new(strategy));
//! ```

pub mod checkout;
pub mod config;

// Re-exports
pub use checkout::StripeCheckoutStrategy;
pub use config::StripeConfig;
