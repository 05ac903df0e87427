//! Payment status for orders.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payment status of an order, reconciled from Stripe Checkout.
///
/// Orders are created as [`Pending`](Self::Pending) when the checkout
/// session is opened; the webhook moves them to `Paid` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    /// Storage representation (matches the serde form).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a payment status from its storage representation.
#[derive(Debug, Error)]
#[error("unknown payment status: {0}")]
pub struct ParsePaymentStatusError(pub String);

impl FromStr for PaymentStatus {
    type Err = ParsePaymentStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            other => Err(ParsePaymentStatusError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_storage_form() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Paid,
            PaymentStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<PaymentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_rejects_unknown_status() {
        let err = "settled".parse::<PaymentStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown payment status: settled");
    }

    #[test]
    fn test_serde_form_matches_storage_form() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Paid).unwrap(),
            "\"paid\""
        );
        let back: PaymentStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(back, PaymentStatus::Pending);
    }
}
