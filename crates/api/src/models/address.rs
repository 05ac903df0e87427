//! Address domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopkart_core::{AddressId, UserId};

/// A stored mailing address.
///
/// Fields are stored verbatim as submitted; no phone or pincode format
/// validation is applied. The wire form is camelCase to match the client.
/// `Deserialize` is needed because orders embed a JSON snapshot of the
/// address that was current at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Unique address ID.
    pub id: AddressId,
    /// Owning user (opaque, non-enforced reference).
    pub user_id: UserId,
    pub full_name: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// When the address was created.
    pub created_at: DateTime<Utc>,
    /// When the address was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A new address about to be persisted (no id or timestamps yet).
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub user_id: UserId,
    pub full_name: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: Option<String>,
}
