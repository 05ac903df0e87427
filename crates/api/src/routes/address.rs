//! Address route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use shopkart_core::UserId;

use crate::db::AddressRepository;
use crate::error::{AppError, Result};
use crate::models::{Address, NewAddress};
use crate::state::AppState;

/// Address submission body.
///
/// Everything except `userId` is stored verbatim, absent fields included;
/// there is no phone or pincode format validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Save a new address.
///
/// POST /api/address
///
/// Returns 201 with the stored record (including the generated id and
/// timestamps), or 400 when `userId` is missing or blank. Nothing is
/// persisted on the 400 path.
#[instrument(skip(state, request))]
pub async fn create_address(
    State(state): State<AppState>,
    Json(request): Json<CreateAddressRequest>,
) -> Result<(StatusCode, Json<Address>)> {
    let user_id = match request.user_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => UserId::new(id),
        _ => return Err(AppError::BadRequest("userId is required".to_string())),
    };

    let new = NewAddress {
        user_id,
        full_name: request.full_name.unwrap_or_default(),
        phone: request.phone.unwrap_or_default(),
        street: request.street.unwrap_or_default(),
        city: request.city.unwrap_or_default(),
        state: request.state.unwrap_or_default(),
        pincode: request.pincode.unwrap_or_default(),
        country: request.country,
    };

    let address = AddressRepository::new(state.pool()).create(&new).await?;
    tracing::info!(user_id = %address.user_id, address_id = %address.id, "Address saved");

    Ok((StatusCode::CREATED, Json(address)))
}

/// Get the most recent address for a user.
///
/// GET /api/address/{userId}
///
/// Absence is a normal outcome: responds 200 with `null` when the user has
/// no stored address.
#[instrument(skip(state))]
pub async fn get_address(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Option<Address>>> {
    let user_id = UserId::new(user_id);
    let address = AddressRepository::new(state.pool())
        .latest_by_user(&user_id)
        .await?;

    Ok(Json(address))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, StripeConfig};
    use axum::response::IntoResponse;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;

    /// State over a lazy pool: handlers that bail before touching the
    /// database never open a connection.
    fn test_state() -> AppState {
        let config = AppConfig {
            database_url: SecretString::from("postgres://localhost/unreachable"),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            client_url: "http://localhost:3000".to_string(),
            stripe: StripeConfig {
                secret_key: SecretString::from("sk_test_51Hxyzabc123"),
                webhook_secret: None,
            },
            sentry_dsn: None,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unreachable")
            .unwrap();
        AppState::new(config, pool).unwrap()
    }

    #[tokio::test]
    async fn test_create_address_without_user_id_is_rejected() {
        let request = CreateAddressRequest {
            user_id: None,
            full_name: Some("A".to_string()),
            phone: Some("123".to_string()),
            street: Some("S".to_string()),
            city: Some("C".to_string()),
            state: Some("ST".to_string()),
            pincode: Some("000".to_string()),
            country: None,
        };

        let response = create_address(State(test_state()), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_address_with_blank_user_id_is_rejected() {
        let request = CreateAddressRequest {
            user_id: Some("   ".to_string()),
            full_name: None,
            phone: None,
            street: None,
            city: None,
            state: None,
            pincode: None,
            country: None,
        };

        let response = create_address(State(test_state()), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
