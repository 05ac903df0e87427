//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Liveness string (in main.rs)
//! GET  /favicon.ico            - 204, short-circuits browser requests
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (verifies database)
//!
//! # API
//! GET  /api/test               - Smoke-test responder
//! POST /api/address            - Save an address
//! GET  /api/address/{userId}   - Most recent address for a user, or null
//! POST /api/checkout           - Open a Stripe Checkout session
//! GET  /api/orders/{userId}    - Order history, most recent first
//! POST /api/webhooks/stripe    - Stripe event webhook (signed)
//! ```

pub mod address;
pub mod checkout;
pub mod orders;
pub mod webhook;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;

/// Smoke-test response body.
#[derive(Debug, Serialize)]
struct TestResponse {
    message: &'static str,
}

/// Smoke-test responder.
async fn api_test() -> Json<TestResponse> {
    Json(TestResponse {
        message: "API working successfully",
    })
}

/// Create all `/api` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/test", get(api_test))
        .route("/address", post(address::create_address))
        .route("/address/{user_id}", get(address::get_address))
        .route("/checkout", post(checkout::create_checkout_session))
        .route("/orders/{user_id}", get(orders::list_orders))
        .route("/webhooks/stripe", post(webhook::stripe_webhook))
}
