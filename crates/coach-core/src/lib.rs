//! # coach-core
//!
//! Core types and traits for the coaching storefront checkout engine.
//!
//! This crate provides:
//! - `CheckoutRequest` and its ordered validation rules
//! - `Product` and `ProductCatalog` for the coaching packages
//! - `SessionParams` and `CheckoutSession` for the provider call
//! - `AccountResolver` and `CustomerStore` for linking accounts to customers
//! - `PaymentStrategy` trait for implementing payment providers
//! - `CheckoutService`, the adapter tying it all together
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use coach_core::{CheckoutMode, CheckoutRequest, CheckoutService};
//!
//! let service = CheckoutService::new(strategy).with_catalog(catalog);
//!
//! let request = CheckoutRequest::single(
//!     "price_1RLVJCCL7GDM85rztQjBApQW",
//!     CheckoutMode::Subscription,
//!     "https://coach.example/thank-you",
//!     "https://coach.example/cart",
//! );
//!
//! let session = service.create_session(&request, None).await?;
//! // Redirect user to session.url
//! ```

pub mod checkout;
pub mod customer;
pub mod error;
pub mod product;
pub mod service;
pub mod session;
pub mod strategy;

// Re-exports for convenience
pub use checkout::{
    CheckoutMode, CheckoutRequest, LineItem, LineItems, RequestLineItem, ValidatedCheckout,
};
pub use customer::{
    Account, AccountResolver, CustomerStore, InMemoryCustomerStore, NoAccounts, StaticAccounts,
};
pub use error::{PaymentError, PaymentResult};
pub use product::{Currency, Price, Product, ProductCatalog};
pub use service::{CheckoutService, CustomerResolution};
pub use session::{CheckoutSession, SessionParams};
pub use strategy::{BoxedPaymentStrategy, PaymentStrategy};
