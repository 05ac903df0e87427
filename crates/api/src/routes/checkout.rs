//! Checkout route handler.
//!
//! Opens a Stripe Checkout session for the submitted cart and records the
//! order as `pending` before the client is redirected. The webhook handler
//! later reconciles the payment status.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use shopkart_core::{AddressId, UserId};

use crate::db::{AddressRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::models::{LineItem, NewOrder, total_cents};
use crate::services::CheckoutSessionParams;
use crate::state::AppState;

/// Checkout request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Line items in the gateway's schema.
    pub products: Vec<LineItem>,
    pub user_id: String,
    /// Reference to a previously saved address. Opaque toward the gateway;
    /// locally it selects the address snapshot embedded in the order.
    pub address_id: AddressId,
}

/// Checkout response body.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Externally issued redirect URL for the payment session.
    pub url: String,
}

/// Open a Checkout session.
///
/// POST /api/checkout
///
/// On success the pending order is persisted with the session id and the
/// gateway's redirect URL is returned. A gateway failure responds 500 and
/// leaves no order row behind.
#[instrument(skip(state, request), fields(user_id = %request.user_id, address_id = %request.address_id))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    validate(&request)?;

    let user_id = UserId::new(request.user_id.trim());

    // Snapshot the shipping address if the reference resolves. The reference
    // is not enforced: an unknown id still opens a session, it just leaves
    // the order without a snapshot.
    let address = AddressRepository::new(state.pool())
        .get(request.address_id)
        .await?;
    if address.is_none() {
        tracing::warn!(address_id = %request.address_id, "Checkout references an unknown address");
    }

    let client_url = &state.config().client_url;
    let params = CheckoutSessionParams {
        line_items: request.products.clone(),
        success_url: success_url(client_url),
        cancel_url: cancel_url(client_url),
        metadata: vec![
            ("userId".to_string(), user_id.to_string()),
            ("addressId".to_string(), request.address_id.to_string()),
        ],
    };

    // Gateway first: if Stripe rejects the session, no local state exists.
    let session = state.stripe().create_checkout_session(&params).await?;

    let order = OrderRepository::new(state.pool())
        .create(&NewOrder {
            user_id,
            products: request.products,
            address,
            amount_cents: total_cents(&params.line_items),
            stripe_session_id: session.id,
        })
        .await?;
    tracing::info!(
        order_id = %order.id,
        amount_cents = order.amount_cents,
        "Checkout session opened, order pending"
    );

    Ok(Json(CheckoutResponse { url: session.url }))
}

/// Validate a checkout request body.
fn validate(request: &CheckoutRequest) -> Result<()> {
    if request.user_id.trim().is_empty() {
        return Err(AppError::BadRequest("userId is required".to_string()));
    }
    if request.products.is_empty() {
        return Err(AppError::BadRequest(
            "products must not be empty".to_string(),
        ));
    }
    if request.products.iter().any(|item| item.quantity == 0) {
        return Err(AppError::BadRequest(
            "every line item needs a positive quantity".to_string(),
        ));
    }
    Ok(())
}

/// Redirect target after a completed payment. `{CHECKOUT_SESSION_ID}` is a
/// template placeholder Stripe substitutes, not a local interpolation.
fn success_url(client_url: &str) -> String {
    format!("{client_url}/order-success?session_id={{CHECKOUT_SESSION_ID}}")
}

/// Redirect target when the customer backs out.
fn cancel_url(client_url: &str) -> String {
    format!("{client_url}/cart")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::order::tests::line_item;

    fn request(products: Vec<LineItem>, user_id: &str) -> CheckoutRequest {
        CheckoutRequest {
            products,
            user_id: user_id.to_string(),
            address_id: AddressId::new(7),
        }
    }

    #[test]
    fn test_validate_accepts_a_normal_cart() {
        let req = request(vec![line_item("Shirt", 1999, 1)], "u1");
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_cart() {
        let req = request(vec![], "u1");
        assert!(matches!(
            validate(&req).unwrap_err(),
            AppError::BadRequest(_)
        ));
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let req = request(vec![line_item("Shirt", 1999, 0)], "u1");
        assert!(matches!(
            validate(&req).unwrap_err(),
            AppError::BadRequest(_)
        ));
    }

    #[test]
    fn test_validate_rejects_blank_user() {
        let req = request(vec![line_item("Shirt", 1999, 1)], "  ");
        assert!(matches!(
            validate(&req).unwrap_err(),
            AppError::BadRequest(_)
        ));
    }

    #[test]
    fn test_redirect_urls() {
        assert_eq!(
            success_url("http://localhost:3000"),
            "http://localhost:3000/order-success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(cancel_url("http://localhost:3000"), "http://localhost:3000/cart");
    }
}
