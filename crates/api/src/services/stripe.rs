//! Stripe API client for Checkout sessions.
//!
//! Creates one-time-payment Checkout sessions and returns the externally
//! issued redirect URL. The Stripe API takes form-encoded bodies with
//! bracket notation for nested fields, so the session request is flattened
//! into key/value pairs before sending.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::StripeConfig;
use crate::models::LineItem;

/// Stripe API base URL.
const BASE_URL: &str = "https://api.stripe.com/v1";

/// Errors that can occur when interacting with the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The created session carried no redirect URL.
    #[error("checkout session has no redirect URL")]
    MissingRedirectUrl,
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
}

/// Everything needed to open a Checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSessionParams {
    /// Line items in the gateway's schema, passed through untouched.
    pub line_items: Vec<LineItem>,
    /// Where Stripe redirects after a completed payment.
    pub success_url: String,
    /// Where Stripe redirects when the customer backs out.
    pub cancel_url: String,
    /// Opaque key/value pairs attached to the session for later correlation.
    pub metadata: Vec<(String, String)>,
}

/// A created Checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Opaque session id (`cs_...`), stored for webhook correlation.
    pub id: String,
    /// Externally issued redirect URL the client is sent to.
    pub url: String,
}

/// Wire form of a session, as Stripe returns it.
#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    // Absent for sessions in a state that cannot be resumed
    url: Option<String>,
}

impl StripeClient {
    /// Create a new Stripe API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build from the
    /// configured secret key.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| StripeError::Parse(format!("Invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert("Authorization", auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// Create a one-time-payment Checkout session.
    ///
    /// The session accepts card payments only, in `payment` (one-time) mode.
    /// Returns the session id and redirect URL.
    ///
    /// # Errors
    ///
    /// Any gateway failure (network, auth, validation) surfaces as a
    /// `StripeError`; there is no retry or idempotency key.
    pub async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, StripeError> {
        let url = format!("{BASE_URL}/checkout/sessions");
        let form = encode_session_form(params);

        let response = self.client.post(&url).form(&form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))?;

        let redirect_url = session.url.ok_or(StripeError::MissingRedirectUrl)?;

        Ok(CheckoutSession {
            id: session.id,
            url: redirect_url,
        })
    }
}

/// Flatten a session request into Stripe's form encoding.
///
/// Nested fields use bracket notation, e.g.
/// `line_items[0][price_data][unit_amount]=1999`.
fn encode_session_form(params: &CheckoutSessionParams) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        (
            "payment_method_types[0]".to_string(),
            "card".to_string(),
        ),
        ("success_url".to_string(), params.success_url.clone()),
        ("cancel_url".to_string(), params.cancel_url.clone()),
    ];

    for (i, item) in params.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
        form.push((
            format!("{prefix}[price_data][currency]"),
            item.price_data.currency.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.price_data.unit_amount.to_string(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.price_data.product_data.name.clone(),
        ));
        if let Some(description) = &item.price_data.product_data.description {
            form.push((
                format!("{prefix}[price_data][product_data][description]"),
                description.clone(),
            ));
        }
        if let Some(images) = &item.price_data.product_data.images {
            for (j, image) in images.iter().enumerate() {
                form.push((
                    format!("{prefix}[price_data][product_data][images][{j}]"),
                    image.clone(),
                ));
            }
        }
    }

    for (key, value) in &params.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }

    form
}
