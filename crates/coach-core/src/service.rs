//! # Checkout Service
//!
//! Turns a checkout request into a provider session:
//!
//! ```text
//! request ─▶ validate ─▶ catalog check ─▶ resolve customer ─▶ create session
//!                 │             │                 │
//!                400           400          guest on failure
//! ```
//!
//! Each call is independent. The only shared state is the customer store.

use crate::checkout::CheckoutRequest;
use crate::customer::{AccountResolver, CustomerStore, InMemoryCustomerStore, NoAccounts};
use crate::error::PaymentResult;
use crate::product::ProductCatalog;
use crate::session::{CheckoutSession, SessionParams};
use crate::strategy::BoxedPaymentStrategy;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Outcome of customer resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerResolution {
    /// Session will be attached to this provider customer
    Linked(String),
    /// Session runs without a customer
    Guest,
}

impl CustomerResolution {
    pub fn customer_id(self) -> Option<String> {
        match self {
            CustomerResolution::Linked(id) => Some(id),
            CustomerResolution::Guest => None,
        }
    }
}

/// Checkout session adapter
#[derive(Clone)]
pub struct CheckoutService {
    strategy: BoxedPaymentStrategy,
    accounts: Arc<dyn AccountResolver>,
    customers: Arc<dyn CustomerStore>,
    catalog: ProductCatalog,
}

impl CheckoutService {
    /// Service with no accounts, an in-memory customer store and no catalog
    pub fn new(strategy: BoxedPaymentStrategy) -> Self {
        Self {
            strategy,
            accounts: Arc::new(NoAccounts),
            customers: Arc::new(InMemoryCustomerStore::new()),
            catalog: ProductCatalog::new(),
        }
    }

    /// Builder: set the account resolver
    pub fn with_accounts(mut self, accounts: Arc<dyn AccountResolver>) -> Self {
        self.accounts = accounts;
        self
    }

    /// Builder: set the customer store
    pub fn with_customers(mut self, customers: Arc<dyn CustomerStore>) -> Self {
        self.customers = customers;
        self
    }

    /// Builder: set the catalog prices are checked against
    pub fn with_catalog(mut self, catalog: ProductCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn provider_name(&self) -> &'static str {
        self.strategy.provider_name()
    }

    /// Validate a request and create a provider checkout session.
    ///
    /// `bearer_token` is the credential from the `Authorization` header, if any.
    #[instrument(skip_all, fields(provider = self.strategy.provider_name()))]
    pub async fn create_session(
        &self,
        request: &CheckoutRequest,
        bearer_token: Option<&str>,
    ) -> PaymentResult<CheckoutSession> {
        let checkout = request.validate()?;
        checkout.conform_to(&self.catalog)?;

        let customer = self.resolve_customer(bearer_token).await.customer_id();
        let params = SessionParams::new(checkout, customer);

        info!(
            "Creating checkout session: mode={}, {} items, customer={:?}",
            params.mode,
            params.item_count(),
            params.customer
        );

        let session = self.strategy.create_checkout(&params).await.map_err(|e| {
            error!("Checkout error: {}", e);
            e
        })?;

        info!("Created checkout session {}", session.session_id);
        Ok(session)
    }

    /// Guest-degrade policy: find or create the provider customer for the
    /// token's account. Every failure here is logged and the checkout
    /// continues as a guest; nothing is retried.
    pub async fn resolve_customer(&self, bearer_token: Option<&str>) -> CustomerResolution {
        let Some(token) = bearer_token.filter(|t| !t.is_empty()) else {
            return CustomerResolution::Guest;
        };

        let account = match self.accounts.resolve(token).await {
            Ok(Some(account)) => account,
            Ok(None) => return CustomerResolution::Guest,
            Err(e) => {
                warn!("Auth error but proceeding as guest: {}", e);
                return CustomerResolution::Guest;
            }
        };

        match self.customers.customer_id(&account.id).await {
            Ok(Some(customer_id)) => return CustomerResolution::Linked(customer_id),
            Ok(None) => {}
            Err(e) => {
                warn!(account_id = %account.id, "Customer lookup failed, proceeding as guest: {}", e);
                return CustomerResolution::Guest;
            }
        }

        let customer_id = match self.strategy.create_customer(&account).await {
            Ok(id) => id,
            Err(e) => {
                warn!(account_id = %account.id, "Failed to create customer, proceeding as guest: {}", e);
                return CustomerResolution::Guest;
            }
        };

        info!("Created new customer {} for account {}", customer_id, account.id);

        // The customer exists at the provider either way, so attach it even
        // if the link could not be written.
        if let Err(e) = self.customers.save_customer_id(&account.id, &customer_id).await {
            warn!(account_id = %account.id, "Failed to save customer mapping: {}", e);
        }

        CustomerResolution::Linked(customer_id)
    }
}
