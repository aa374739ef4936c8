//! Address repository.

use sqlx::PgPool;

use bazaar_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::{Address, AddressFields, AddressUpdate};

const ADDRESS_COLUMNS: &str =
    "id, user_id, street, city, state, phone_number, postal_code, country, kind";

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

    /// List a user's addresses in creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM shop.addresses WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(addresses)
    }

    /// Get one address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM shop.addresses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(address)
    }

    /// Save an address for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        fields: &AddressFields,
    ) -> Result<Address, RepositoryError> {
        sqlx::query_as::<_, Address>(&format!(
            r"
            INSERT INTO shop.addresses
                (user_id, street, city, state, phone_number, postal_code, country, kind)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(&fields.street)
        .bind(&fields.city)
        .bind(&fields.state)
        .bind(&fields.phone_number)
        .bind(&fields.postal_code)
        .bind(&fields.country)
        .bind(&fields.kind)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "address already exists"))
    }

    /// Apply a partial update. Absent fields keep their current values.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist.
    pub async fn update(
        &self,
        id: AddressId,
        update: &AddressUpdate,
    ) -> Result<Address, RepositoryError> {
        sqlx::query_as::<_, Address>(&format!(
            r"
            UPDATE shop.addresses SET
                street = COALESCE($2, street),
                city = COALESCE($3, city),
                state = COALESCE($4, state),
                phone_number = COALESCE($5, phone_number),
                postal_code = COALESCE($6, postal_code),
                country = COALESCE($7, country),
                kind = COALESCE($8, kind)
            WHERE id = $1
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(id)
        .bind(update.street.as_deref())
        .bind(update.city.as_deref())
        .bind(update.state.as_deref())
        .bind(update.phone_number.as_deref())
        .bind(update.postal_code.as_deref())
        .bind(update.country.as_deref())
        .bind(update.kind.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete an address, returning it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist.
    pub async fn delete(&self, id: AddressId) -> Result<Address, RepositoryError> {
        sqlx::query_as::<_, Address>(&format!(
            "DELETE FROM shop.addresses WHERE id = $1 RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
