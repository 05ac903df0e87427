//! Clients for external services.

pub mod stripe;
pub mod webhook;

pub use stripe::{CheckoutSession, CheckoutSessionParams, StripeClient, StripeError};
