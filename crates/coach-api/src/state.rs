//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the checkout service (with its catalog) and the server config.

use crate::supabase::{SupabaseAccounts, SupabaseClient, SupabaseConfig, SupabaseCustomerStore};
use anyhow::Context;
use coach_core::{
    AccountResolver, CheckoutService, CustomerStore, InMemoryCustomerStore, NoAccounts,
    ProductCatalog,
};
use coach_stripe::StripeCheckoutStrategy;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Explicit product catalog path
    pub products_path: Option<String>,
    /// Emit JSON log lines
    pub json_logs: bool,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            products_path: std::env::var("PRODUCTS_PATH").ok(),
            json_logs: std::env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
            products_path: None,
            json_logs: false,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Checkout session adapter
    pub service: Arc<CheckoutService>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Build state from the environment: Stripe, catalog and account backends
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let catalog =
            load_product_catalog(config.products_path.as_deref(), config.is_production())?;

        let stripe = StripeCheckoutStrategy::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        let (accounts, customers) = account_backends()?;

        let service = CheckoutService::new(Arc::new(stripe))
            .with_catalog(catalog)
            .with_accounts(accounts)
            .with_customers(customers);

        Ok(Self::from_parts(config, service))
    }

    /// Assemble state from an already-built service
    pub fn from_parts(config: AppConfig, service: CheckoutService) -> Self {
        Self {
            service: Arc::new(service),
            config,
        }
    }

    pub fn catalog(&self) -> &ProductCatalog {
        self.service.catalog()
    }
}

/// Supabase when configured, otherwise guest-only checkout
fn account_backends() -> anyhow::Result<(Arc<dyn AccountResolver>, Arc<dyn CustomerStore>)> {
    match SupabaseConfig::from_env() {
        Some(config) => {
            let client = SupabaseClient::new(config)
                .map_err(|e| anyhow::anyhow!("Failed to initialize Supabase: {}", e))?;
            tracing::info!("Account linking via Supabase at {}", client.base_url());
            Ok((
                Arc::new(SupabaseAccounts::new(client.clone())),
                Arc::new(SupabaseCustomerStore::new(client)),
            ))
        }
        None => {
            tracing::warn!("SUPABASE_URL / SUPABASE_SERVICE_ROLE_KEY not set, all checkouts run as guest");
            Ok((Arc::new(NoAccounts), Arc::new(InMemoryCustomerStore::new())))
        }
    }
}

const CATALOG_PATHS: [&str; 3] = [
    "config/products.toml",
    "../config/products.toml",
    "../../config/products.toml",
];

/// Load product catalog from config file.
///
/// Production refuses to start without one: an empty catalog disables the
/// unknown-price check.
fn load_product_catalog(explicit: Option<&str>, required: bool) -> anyhow::Result<ProductCatalog> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read product catalog {}", path))?;
        return parse_catalog(&content, path);
    }

    find_catalog(&CATALOG_PATHS, required)
}

fn find_catalog(candidates: &[&str], required: bool) -> anyhow::Result<ProductCatalog> {
    for path in candidates {
        if let Ok(content) = std::fs::read_to_string(path) {
            return parse_catalog(&content, path);
        }
    }

    if required {
        tracing::error!("No product catalog found in {:?}", candidates);
        anyhow::bail!("No product catalog found; set PRODUCTS_PATH");
    }

    tracing::warn!("No product catalog found, prices will not be checked before checkout");
    Ok(ProductCatalog::new())
}

fn parse_catalog(content: &str, path: &str) -> anyhow::Result<ProductCatalog> {
    let catalog = ProductCatalog::from_toml(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
    tracing::info!("Loaded {} products from {}", catalog.len(), path);
    Ok(catalog)
}
