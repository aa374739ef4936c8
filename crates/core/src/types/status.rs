//! Status enums for orders.
//!
//! The JSON spelling matches what storefront clients display directly
//! (`"Out for delivery"`, `"COD"`); the database spelling is a snake_case
//! label stored in a `TEXT` column guarded by a `CHECK` constraint.

use serde::{Deserialize, Serialize};

/// An unrecognized database label for a status enum.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} label: {label:?}")]
pub struct UnknownLabel {
    kind: &'static str,
    label: String,
}

/// Order fulfillment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Dispatched,
    #[serde(rename = "Out for delivery")]
    OutForDelivery,
    Cancelled,
}

impl OrderStatus {
    /// Whether the order can still move to `next`.
    ///
    /// Cancelled orders are final, and nothing moves back to `Pending`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Cancelled, _) | (_, Self::Pending) => false,
            (Self::Pending, _) => true,
            (Self::Dispatched, Self::OutForDelivery | Self::Cancelled | Self::Dispatched) => true,
            (Self::OutForDelivery, Self::OutForDelivery | Self::Cancelled) => true,
            _ => false,
        }
    }

    /// Database label.
    #[must_use]
    pub const fn as_db_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Dispatched => "dispatched",
            Self::OutForDelivery => "out_for_delivery",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a database label.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLabel` for anything [`Self::as_db_str`] never produces.
    pub fn from_db_str(label: &str) -> Result<Self, UnknownLabel> {
        match label {
            "pending" => Ok(Self::Pending),
            "dispatched" => Ok(Self::Dispatched),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(UnknownLabel {
                kind: "order status",
                label: label.to_owned(),
            }),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Dispatched => write!(f, "Dispatched"),
            Self::OutForDelivery => write!(f, "Out for delivery"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// How an order is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMode {
    /// Cash on delivery.
    Cod,
    Upi,
    Card,
}

impl PaymentMode {
    /// Database label.
    #[must_use]
    pub const fn as_db_str(self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Upi => "upi",
            Self::Card => "card",
        }
    }

    /// Parse a database label.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLabel` for anything [`Self::as_db_str`] never produces.
    pub fn from_db_str(label: &str) -> Result<Self, UnknownLabel> {
        match label {
            "cod" => Ok(Self::Cod),
            "upi" => Ok(Self::Upi),
            "card" => Ok(Self::Card),
            _ => Err(UnknownLabel {
                kind: "payment mode",
                label: label.to_owned(),
            }),
        }
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cod => write!(f, "COD"),
            Self::Upi => write!(f, "UPI"),
            Self::Card => write!(f, "CARD"),
        }
    }
}

/// Store a label enum as `TEXT`.
#[cfg(feature = "postgres")]
macro_rules! text_label_sqlx {
    ($name:ident) => {
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let label = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(Self::from_db_str(label)?)
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_db_str(), buf)
            }
        }
    };
}

#[cfg(feature = "postgres")]
text_label_sqlx!(OrderStatus);
#[cfg(feature = "postgres")]
text_label_sqlx!(PaymentMode);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_json_labels() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::OutForDelivery).unwrap(),
            "\"Out for delivery\""
        );
        let status: OrderStatus = serde_json::from_str("\"Dispatched\"").unwrap();
        assert_eq!(status, OrderStatus::Dispatched);
        assert!(serde_json::from_str::<OrderStatus>("\"shipped\"").is_err());
    }

    #[test]
    fn test_payment_mode_json_labels() {
        assert_eq!(serde_json::to_string(&PaymentMode::Cod).unwrap(), "\"COD\"");
        let mode: PaymentMode = serde_json::from_str("\"CARD\"").unwrap();
        assert_eq!(mode, PaymentMode::Card);
    }

    #[test]
    fn test_status_transitions() {
        use OrderStatus::{Cancelled, Dispatched, OutForDelivery, Pending};

        assert!(Pending.can_transition_to(Dispatched));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Dispatched.can_transition_to(OutForDelivery));
        assert!(OutForDelivery.can_transition_to(Cancelled));

        assert!(!Cancelled.can_transition_to(Dispatched));
        assert!(!Dispatched.can_transition_to(Pending));
        assert!(!OutForDelivery.can_transition_to(Dispatched));
    }

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_db_labels() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Dispatched,
            OrderStatus::OutForDelivery,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::from_db_str(status.as_db_str()).unwrap(), status);
        }
        assert_eq!(PaymentMode::from_db_str("upi").unwrap(), PaymentMode::Upi);
        assert!(PaymentMode::from_db_str("UPI").is_err());
        assert_eq!(
            OrderStatus::from_db_str("shipped").unwrap_err().to_string(),
            "unknown order status label: \"shipped\""
        );
    }
}
