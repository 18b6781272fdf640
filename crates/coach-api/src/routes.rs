//! # Routes
//!
//! Axum router configuration for the checkout API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue,
    },
    routing::{get, post, MethodRouter},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

/// Path the storefront has always posted to
pub const CHECKOUT_FUNCTION_PATH: &str = "/functions/v1/stripe-checkout";

/// Create the main application router
///
/// Routes:
/// - Checkout (POST creates a session, OPTIONS answers preflight, anything else is 405):
///   - /functions/v1/stripe-checkout
///   - /api/v1/checkout
/// - Catalog:
///   - GET /api/v1/products
///   - GET /api/v1/products/{product_id}
/// - GET /health and GET /
///
/// Every response carries the permissive CORS headers the browser storefront
/// relies on, error responses included.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/checkout", checkout_endpoint())
        .route("/products", get(handlers::list_products))
        .route("/products/{product_id}", get(handlers::get_product));

    let cors = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("*"),
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .route(CHECKOUT_FUNCTION_PATH, checkout_endpoint())
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn checkout_endpoint() -> MethodRouter<AppState> {
    post(handlers::create_checkout)
        .options(handlers::checkout_preflight)
        .fallback(handlers::method_not_allowed)
}
