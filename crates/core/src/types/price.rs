//! Price arithmetic using decimal math.
//!
//! Prices are stored as `NUMERIC(12, 2)` and never touch floating point on the
//! server. A product carries a base price and a [`Discount`] percentage; the
//! amount charged for a line is `price * (100 - discount) / 100 * quantity`,
//! rounded half-away-from-zero to cents.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Discount`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage below zero or above one hundred.
    #[error("discount percentage must be between 0 and 100 (got {0})")]
    OutOfRange(Decimal),
}

/// A discount percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Discount(Decimal);

impl Discount {
    /// No discount.
    pub const NONE: Self = Self(Decimal::ZERO);

    /// Create a discount from a percentage.
    ///
    /// # Errors
    ///
    /// Returns `DiscountError::OutOfRange` unless `0 <= percent <= 100`.
    pub fn new(percent: Decimal) -> Result<Self, DiscountError> {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(DiscountError::OutOfRange(percent));
        }
        Ok(Self(percent))
    }

    /// The percentage as a decimal (e.g. `12.5` for 12.5% off).
    #[must_use]
    pub const fn percent(&self) -> Decimal {
        self.0
    }

    /// Apply this discount to a unit price, rounded to cents.
    #[must_use]
    pub fn apply(&self, price: Decimal) -> Decimal {
        let factor = (Decimal::ONE_HUNDRED - self.0) / Decimal::ONE_HUNDRED;
        (price * factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl TryFrom<Decimal> for Discount {
    type Error = DiscountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Discount> for Decimal {
    fn from(discount: Discount) -> Self {
        discount.0
    }
}

/// Total for `quantity` units of a product at `price` with `discount`.
#[must_use]
pub fn line_total(price: Decimal, discount: Discount, quantity: u32) -> Decimal {
    discount.apply(price) * Decimal::from(quantity)
}
