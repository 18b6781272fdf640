//! # coach-api
//!
//! HTTP API layer for the coaching storefront checkout engine.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The checkout session endpoint with CORS preflight handling
//! - Read-only product catalog endpoints
//! - Supabase-backed account resolution and customer links
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST, OPTIONS | `/functions/v1/stripe-checkout` | Create checkout session |
//! | POST, OPTIONS | `/api/v1/checkout` | Same endpoint, versioned path |
//! | GET | `/api/v1/products` | List products |
//! | GET | `/api/v1/products/{id}` | Get product |

pub mod handlers;
pub mod routes;
pub mod state;
pub mod supabase;

pub use routes::{create_router, CHECKOUT_FUNCTION_PATH};
pub use state::{AppConfig, AppState};
pub use supabase::{SupabaseAccounts, SupabaseClient, SupabaseConfig, SupabaseCustomerStore};
