//! Order history route handler.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use shopkart_core::UserId;

use crate::db::OrderRepository;
use crate::error::Result;
use crate::models::Order;
use crate::state::AppState;

/// List a user's orders, most recent first.
///
/// GET /api/orders/{userId}
///
/// A user with no orders gets an empty array, not an error.
#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Order>>> {
    let user_id = UserId::new(user_id);
    let orders = OrderRepository::new(state.pool())
        .list_by_user(&user_id)
        .await?;

    Ok(Json(orders))
}
