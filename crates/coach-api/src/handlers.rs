//! # Request Handlers
//!
//! Axum request handlers for the checkout API.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use coach_core::{CheckoutRequest, CheckoutSession, PaymentError};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn payment_error_to_response(err: PaymentError) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::new(err.client_message())))
}

/// Token from `Authorization: Bearer <token>`, if present and non-empty
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "coach-checkout",
        "provider": state.service.provider_name(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a checkout session.
///
/// The body is read raw so malformed JSON gets the same `{error}` shape as
/// every other failure.
#[instrument(skip_all)]
pub async fn create_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CheckoutSession>, ApiError> {
    let request: CheckoutRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejected checkout body: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!("Invalid JSON body: {}", e))),
        )
    })?;

    let session = state
        .service
        .create_session(&request, bearer_token(&headers))
        .await
        .map_err(|e| {
            if e.is_validation() {
                info!("Invalid checkout request: {}", e);
            } else {
                error!("Checkout failed: {}", e);
            }
            payment_error_to_response(e)
        })?;

    Ok(Json(session))
}

/// CORS preflight
pub async fn checkout_preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Any method other than POST or OPTIONS on the checkout endpoint
pub async fn method_not_allowed() -> ApiError {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method not allowed")),
    )
}

/// Active products, for building the storefront and the cart
pub async fn list_products(State(state): State<AppState>) -> impl IntoResponse {
    let products: Vec<_> = state.catalog().active_products().collect();
    Json(serde_json::json!({
        "products": products,
        "count": products.len()
    }))
}

/// Get single product
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.catalog().get(&product_id).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("Product not found: {}", product_id))),
        )
    })?;

    Ok(Json(product.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_validation_error_is_bad_request() {
        let err = PaymentError::validation("Mode is required");
        let (status, Json(body)) = payment_error_to_response(err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Mode is required");
    }

    #[test]
    fn test_provider_error_passes_through() {
        let err = PaymentError::ProviderError {
            provider: "stripe".to_string(),
            message: "No such price: 'price_x'".to_string(),
        };
        let (status, Json(body)) = payment_error_to_response(err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "No such price: 'price_x'");
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer jwt_abc"));
        assert_eq!(bearer_token(&headers), Some("jwt_abc"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer  jwt_abc "));
        assert_eq!(bearer_token(&headers), Some("jwt_abc"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
