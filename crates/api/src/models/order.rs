//! Order domain types and the Stripe line-item schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopkart_core::{OrderId, PaymentStatus, UserId};

use super::Address;

/// A stored order.
///
/// Created as `pending` when a checkout session is opened; the Stripe
/// webhook reconciles the final payment status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Owning user (opaque, non-enforced reference).
    pub user_id: UserId,
    /// The line items sent to the payment gateway.
    pub products: Vec<LineItem>,
    /// Snapshot of the shipping address at checkout time, if the referenced
    /// address existed.
    pub address: Option<Address>,
    /// Order total in the smallest currency unit (cents).
    pub amount_cents: i64,
    pub payment_status: PaymentStatus,
    /// Stripe Checkout session id used for webhook correlation.
    pub stripe_session_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A new order about to be persisted (always starts as `pending`).
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub products: Vec<LineItem>,
    pub address: Option<Address>,
    pub amount_cents: i64,
    pub stripe_session_id: String,
}

/// A cart entry in the shape Stripe Checkout's `line_items` expects.
///
/// Validated at the boundary (non-empty list, positive quantity) and passed
/// through to the gateway otherwise untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub quantity: u32,
    pub price_data: PriceData,
}

/// Price data for a line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceData {
    /// ISO 4217 currency code, lowercase (e.g., "usd", "inr").
    pub currency: String,
    /// Unit price in the smallest currency unit (cents).
    pub unit_amount: i64,
    pub product_data: ProductData,
}

/// Product details for a line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductData {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

/// Order total: the sum of `unit_amount * quantity` over all line items.
#[must_use]
pub fn total_cents(items: &[LineItem]) -> i64 {
    items
        .iter()
        .map(|item| item.price_data.unit_amount * i64::from(item.quantity))
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Build a line item for tests.
    pub(crate) fn line_item(name: &str, unit_amount: i64, quantity: u32) -> LineItem {
        LineItem {
            quantity,
            price_data: PriceData {
                currency: "usd".to_string(),
                unit_amount,
                product_data: ProductData {
                    name: name.to_string(),
                    description: None,
                    images: None,
                },
            },
        }
    }

    #[test]
    fn test_total_cents_sums_over_quantities() {
        let items = vec![line_item("Shirt", 1999, 2), line_item("Mug", 500, 3)];
        assert_eq!(total_cents(&items), 2 * 1999 + 3 * 500);
    }

    #[test]
    fn test_total_cents_empty_cart_is_zero() {
        assert_eq!(total_cents(&[]), 0);
    }

    #[test]
    fn test_line_item_wire_shape() {
        let item = line_item("Shirt", 1999, 1);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["quantity"], 1);
        assert_eq!(value["price_data"]["currency"], "usd");
        assert_eq!(value["price_data"]["unit_amount"], 1999);
        assert_eq!(value["price_data"]["product_data"]["name"], "Shirt");
        // Optional fields are omitted, not serialized as null
        assert!(value["price_data"]["product_data"].get("description").is_none());
    }
}
