//! Order placement and status changes.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use bazaar_core::{OrderId, OrderStatus, ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::models::{NewOrder, Order, OrderLine, Product, ValidationError};

/// Errors that can occur while placing or updating orders.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request body is invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A requested product doesn't exist or was deleted.
    #[error("product {0} is not available")]
    ProductUnavailable(ProductId),

    /// The order doesn't exist.
    #[error("order not found")]
    NotFound,

    /// The status change isn't allowed from the current status.
    #[error("cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Place an order for `user_id`, pricing every line from the catalog.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` for an invalid body.
    /// Returns `OrderError::ProductUnavailable` if a product is missing or deleted.
    pub async fn place(&self, user_id: UserId, order: NewOrder) -> Result<Order, OrderError> {
        let order = order.validate()?;

        let ids: Vec<ProductId> = order.items.iter().map(|line| line.product).collect();
        let products: HashMap<ProductId, Product> = self
            .products
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let lines = order
            .items
            .iter()
            .map(|line| {
                products
                    .get(&line.product)
                    .filter(|p| !p.deleted)
                    .map(|p| OrderLine::snapshot(p, line.quantity))
                    .ok_or(OrderError::ProductUnavailable(line.product))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total = order_total(&lines)?;
        let placed = self
            .orders
            .create(user_id, &lines, &order.address, order.payment_mode, total)
            .await?;

        tracing::info!(order_id = %placed.id, user_id = %user_id, total = %total, "Order placed");
        Ok(placed)
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order doesn't exist.
    /// Returns `OrderError::InvalidTransition` if the change isn't allowed.
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, OrderError> {
        let current = self.orders.get(id).await?.ok_or(OrderError::NotFound)?;
        if !current.status.can_transition_to(status) {
            return Err(OrderError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        let updated = self.orders.set_status(id, current.status, status).await?;
        tracing::info!(order_id = %id, from = %current.status, to = %status, "Order status changed");
        Ok(updated)
    }
}

/// Largest value the `orders.total` column (`NUMERIC(12, 2)`) holds.
fn max_order_total() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// Sum of line totals, rejected if it cannot be stored.
fn order_total(lines: &[OrderLine]) -> Result<Decimal, ValidationError> {
    lines
        .iter()
        .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.line_total))
        .filter(|total| *total <= max_order_total())
        .ok_or(ValidationError::OutOfRange {
            field: "total",
            reason: "exceeds the largest order value",
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use bazaar_core::Discount;

    fn line(total: &str) -> OrderLine {
        OrderLine {
            product: ProductId::new(1),
            title: "Item".to_string(),
            brand: "Brand".to_string(),
            thumbnail: "t.png".to_string(),
            price: Decimal::from_str(total).unwrap(),
            discount_percentage: Discount::NONE,
            quantity: 1,
            line_total: Decimal::from_str(total).unwrap(),
        }
    }

    #[test]
    fn test_order_total() {
        let lines = vec![line("44.97"), line("10.00"), line("0.03")];
        assert_eq!(order_total(&lines), Ok(Decimal::from_str("55.00").unwrap()));
        assert_eq!(order_total(&[]), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_order_total_rejects_unstorable_totals() {
        let fits = vec![line("9999999999.99")];
        assert_eq!(order_total(&fits), Ok(max_order_total()));

        let huge = vec![line("99999999900.00")];
        assert!(order_total(&huge).is_err());

        let summed = vec![line("6000000000.00"), line("6000000000.00")];
        assert!(order_total(&summed).is_err());
    }

    #[test]
    fn test_oversized_total_is_a_validation_error() {
        let err = OrderError::from(order_total(&[line("99999999900.00")]).unwrap_err());
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[test]
    fn test_transition_error_message() {
        let err = OrderError::InvalidTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Dispatched,
        };
        assert_eq!(
            err.to_string(),
            "cannot change order status from Cancelled to Dispatched"
        );
    }
}
