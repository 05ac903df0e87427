//! Stripe webhook route handler.
//!
//! Reconciles checkout outcomes back into the order store. The session
//! lives inside Stripe; this endpoint is the only path by which an order
//! leaves the `pending` state.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use shopkart_core::PaymentStatus;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::services::webhook::{SignatureHeader, verify_signature};
use crate::state::AppState;

/// A Stripe webhook event, reduced to the fields this service consumes.
#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: SessionObject,
}

/// The checkout session embedded in a `checkout.session.*` event.
#[derive(Debug, Deserialize)]
struct SessionObject {
    id: String,
}

/// Handle a Stripe webhook delivery.
///
/// POST /api/webhooks/stripe
///
/// Verifies the `Stripe-Signature` header against the raw body, then maps
/// `checkout.session.*` events onto the order's payment status. Events for
/// unknown sessions and event types this service doesn't track are
/// acknowledged and ignored.
#[instrument(skip_all)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    let Some(secret) = state.config().stripe.webhook_secret.as_ref() else {
        return Err(AppError::Internal(
            "STRIPE_WEBHOOK_SECRET is not configured".to_string(),
        ));
    };

    let header_value = headers
        .get("Stripe-Signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("missing Stripe-Signature header".to_string()))?;
    let header = SignatureHeader::parse(header_value)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    verify_signature(secret.expose_secret(), &header, &body, unix_now())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("malformed event payload: {e}")))?;

    let Some(status) = status_for_event(&event.event_type) else {
        tracing::debug!(event_type = %event.event_type, "Ignoring untracked event type");
        return Ok(StatusCode::OK);
    };

    let session_id = &event.data.object.id;
    let updated = OrderRepository::new(state.pool())
        .update_status_by_session(session_id, status)
        .await?;

    match updated {
        Some(order) => {
            tracing::info!(order_id = %order.id, status = %status, "Order reconciled");
        }
        None => {
            // Acknowledge anyway; Stripe would otherwise retry forever.
            tracing::warn!(session_id = %session_id, "Webhook for unknown session");
        }
    }

    Ok(StatusCode::OK)
}

/// Map a Stripe event type onto the resulting payment status.
///
/// Returns `None` for event types this service doesn't track.
fn status_for_event(event_type: &str) -> Option<PaymentStatus> {
    match event_type {
        "checkout.session.completed" | "checkout.session.async_payment_succeeded" => {
            Some(PaymentStatus::Paid)
        }
        "checkout.session.expired" | "checkout.session.async_payment_failed" => {
            Some(PaymentStatus::Failed)
        }
        _ => None,
    }
}

/// Current unix time in seconds.
#[allow(clippy::cast_possible_wrap)]
fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_event_mapping() {
        assert_eq!(
            status_for_event("checkout.session.completed"),
            Some(PaymentStatus::Paid)
        );
        assert_eq!(
            status_for_event("checkout.session.async_payment_succeeded"),
            Some(PaymentStatus::Paid)
        );
        assert_eq!(
            status_for_event("checkout.session.expired"),
            Some(PaymentStatus::Failed)
        );
        assert_eq!(
            status_for_event("checkout.session.async_payment_failed"),
            Some(PaymentStatus::Failed)
        );
        assert_eq!(status_for_event("invoice.paid"), None);
    }

    #[test]
    fn test_event_payload_shape() {
        let body = br#"{
            "id": "evt_123",
            "type": "checkout.session.completed",
            "data": { "object": { "id": "cs_test_abc", "payment_status": "paid" } }
        }"#;
        let event: WebhookEvent = serde_json::from_slice(body).expect("event should parse");
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.data.object.id, "cs_test_abc");
    }
}
