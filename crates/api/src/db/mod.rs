//! Database operations for the shopkart `PostgreSQL` instance.
//!
//! ## Tables
//!
//! - `addresses` - Mailing addresses keyed by an opaque user identifier
//! - `orders` - Orders with an embedded address snapshot and Stripe session id
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and are NOT run on
//! server startup. Run them explicitly via:
//! ```bash
//! cargo run -p shopkart-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod addresses;
pub mod orders;

pub use addresses::AddressRepository;
pub use orders::OrderRepository;

/// Errors from the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped to its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
