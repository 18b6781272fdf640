//! # coach-checkout
//!
//! Checkout session server for the coaching storefront.
//!
//! ## Usage
//!
//! ```bash
//! # Required
//! export STRIPE_SECRET_KEY=sk_test_...
//!
//! # Optional: link signed-in clients to Stripe customers
//! export SUPABASE_URL=https://<ref>.supabase.co
//! export SUPABASE_SERVICE_ROLE_KEY=...
//!
//! # Run the server
//! coach-checkout
//! ```

use coach_api::{routes, AppConfig, AppState, CHECKOUT_FUNCTION_PATH};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    init_tracing(config.json_logs);

    print_banner();

    let state = AppState::new(config)?;

    let addr = state.config.socket_addr()?;

    info!("Environment: {}", state.config.environment);
    info!("Products loaded: {}", state.catalog().len());
    info!("Payment provider: {}", state.service.provider_name());

    let is_prod = state.config.is_production();
    let app = routes::create_router(state);

    info!("Checkout server starting on http://{}", addr);
    if !is_prod {
        info!("Checkout: POST http://{}{}", addr, CHECKOUT_FUNCTION_PATH);
        info!("Products: GET http://{}/api/v1/products", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

fn print_banner() {
    println!(
        r#"
  Coach Checkout
  ━━━━━━━━━━━━━━
  Stripe checkout sessions for the storefront
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
