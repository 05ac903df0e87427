//! Order repository for database operations.
//!
//! Orders carry JSONB payloads (line items, address snapshot) and a textual
//! payment status, so rows are mapped to the domain type by hand; a stored
//! status outside the known set is surfaced as `DataCorruption`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use shopkart_core::{OrderId, PaymentStatus, UserId};

use super::RepositoryError;
use crate::models::{Address, LineItem, NewOrder, Order};

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

/// Raw database row for an order.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    products: Json<Vec<LineItem>>,
    address: Option<Json<Address>>,
    amount_cents: i64,
    payment_status: String,
    stripe_session_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_domain(self) -> Result<Order, RepositoryError> {
        let payment_status: PaymentStatus = self.payment_status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment status in database: {e}"))
        })?;

        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            products: self.products.0,
            address: self.address.map(|snapshot| snapshot.0),
            amount_cents: self.amount_cents,
            payment_status,
            stripe_session_id: self.stripe_session_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, user_id, products, address, amount_cents, payment_status, \
                             stripe_session_id, created_at, updated_at";

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new order as `pending` and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewOrder) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO orders (user_id, products, address, amount_cents, payment_status, stripe_session_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(new.user_id.as_str())
        .bind(Json(&new.products))
        .bind(new.address.as_ref().map(Json))
        .bind(new.amount_cents)
        .bind(PaymentStatus::Pending.as_str())
        .bind(&new.stripe_session_id)
        .fetch_one(self.pool)
        .await?;

        row.into_domain()
    }

    /// List a user's orders, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored row cannot be mapped.
    pub async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(user_id.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_domain).collect()
    }

    /// Set the payment status of the order created for a Stripe session.
    ///
    /// Returns the updated order, or `None` when no order matches the
    /// session id (e.g., a webhook for a session this instance never saw).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_status_by_session(
        &self,
        stripe_session_id: &str,
        status: PaymentStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE orders
            SET payment_status = $2, updated_at = now()
            WHERE stripe_session_id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(stripe_session_id)
        .bind(status.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_domain).transpose()
    }
}
