//! Order repository.

use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use bazaar_core::{OrderId, OrderStatus, Page, PaymentMode, UserId};

use super::RepositoryError;
use crate::models::order::OrderRow;
use crate::models::{AddressFields, Order, OrderLine};

const ORDER_COLUMNS: &str = "id, user_id, items, address, status, payment_mode, total, created_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a new order in the `Pending` state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        items: &[OrderLine],
        address: &AddressFields,
        payment_mode: PaymentMode,
        total: Decimal,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO shop.orders (user_id, items, address, status, payment_mode, total)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(Json(items))
        .bind(Json(address))
        .bind(OrderStatus::Pending)
        .bind(payment_mode)
        .bind(total)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "order already exists"))?;

        Ok(row.into())
    }

    /// Get one order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Order::from))
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM shop.orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// One page of all orders, newest first, with the total count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, page: Page) -> Result<(Vec<Order>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM shop.orders
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.orders")
            .fetch_one(self.pool)
            .await?;

        Ok((rows.into_iter().map(Order::from).collect(), total))
    }

    /// Move an order to `status`, provided it is still in `expected`.
    ///
    /// The compare-and-set keeps two concurrent updates from both applying a
    /// transition validated against the same old status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the status changed concurrently.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE shop.orders SET status = $3
            WHERE id = $1 AND status = $2
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(expected)
        .bind(status)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::from)
            .ok_or_else(|| RepositoryError::Conflict("order status changed concurrently".to_owned()))
    }
}
