//! Address repository for database operations.

use sqlx::PgPool;

use shopkart_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::{Address, NewAddress};

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new address and return the stored record, including the
    /// generated id and timestamps.
    ///
    /// No uniqueness constraint applies: repeated calls create additional
    /// rows for the same user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewAddress) -> Result<Address, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(
            r"
            INSERT INTO addresses (user_id, full_name, phone, street, city, state, pincode, country)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, full_name, phone, street, city, state, pincode, country,
                      created_at, updated_at
            ",
        )
        .bind(new.user_id.as_str())
        .bind(&new.full_name)
        .bind(&new.phone)
        .bind(&new.street)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.pincode)
        .bind(new.country.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(address)
    }

    /// Get the most recent address for a user, or `None` if the user has
    /// never submitted one.
    ///
    /// Users can have multiple stored addresses; the most recently created
    /// wins, with the larger id as tie-break.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_by_user(&self, user_id: &UserId) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(
            r"
            SELECT id, user_id, full_name, phone, street, city, state, pincode, country,
                   created_at, updated_at
            FROM addresses
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(address)
    }

    /// Get an address by its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(
            r"
            SELECT id, user_id, full_name, phone, street, city, state, pincode, country,
                   created_at, updated_at
            FROM addresses
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(address)
    }
}
