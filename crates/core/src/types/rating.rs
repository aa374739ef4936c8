//! Review star rating.

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rating must be between {min} and {max} (got {got})", min = Rating::MIN, max = Rating::MAX)]
pub struct RatingError {
    got: i64,
}

/// A whole-star rating from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i16")]
pub struct Rating(i16);

impl Rating {
    /// Lowest allowed rating.
    pub const MIN: i16 = 1;
    /// Highest allowed rating.
    pub const MAX: i16 = 5;

    /// Create a rating.
    ///
    /// # Errors
    ///
    /// Returns `RatingError` when `stars` is outside `1..=5`.
    pub fn new(stars: i64) -> Result<Self, RatingError> {
        i16::try_from(stars)
            .ok()
            .filter(|s| (Self::MIN..=Self::MAX).contains(s))
            .map(Self)
            .ok_or(RatingError { got: stars })
    }

    /// Number of stars.
    #[must_use]
    pub const fn stars(&self) -> i16 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i16 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Rating {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i16 as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Rating {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let stars = <i16 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(i64::from(stars))?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Rating {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i16 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert_eq!(Rating::new(1).unwrap().stars(), 1);
        assert_eq!(Rating::new(5).unwrap().stars(), 5);
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert!(Rating::new(i64::MAX).is_err());
    }

    #[test]
    fn test_rating_error_message() {
        let err = Rating::new(9).unwrap_err();
        assert_eq!(err.to_string(), "rating must be between 1 and 5 (got 9)");
    }

    #[test]
    fn test_rating_json() {
        let rating: Rating = serde_json::from_str("4").unwrap();
        assert_eq!(serde_json::to_string(&rating).unwrap(), "4");
        assert!(serde_json::from_str::<Rating>("7").is_err());
    }
}
