//! Domain models and request payloads.
//!
//! Response types serialize in the shape browser clients expect: `_id` for
//! primary keys, camelCase field names, and prices as JSON numbers.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod product;
pub mod review;
pub mod session;
pub mod user;
pub mod wishlist;

pub use address::{Address, AddressFields, AddressUpdate};
pub use cart::{CartLine, NewCartLine};
pub use catalog::{Brand, Category, NewCatalogEntry};
pub use order::{NewOrder, Order, OrderLine, OrderLineRequest};
pub use product::{NewProduct, Product, ProductUpdate};
pub use review::{NewReview, Review, ReviewAuthor, ReviewUpdate};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{SanitizedUser, User};
pub use wishlist::{NewWishlistItem, WishlistItem};

use bazaar_core::Discount;
use serde::Serializer;
use thiserror::Error;

/// A request payload failed validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is blank.
    #[error("{0} is required")]
    Blank(&'static str),

    /// A numeric field is out of range.
    #[error("{field} {reason}")]
    OutOfRange {
        field: &'static str,
        reason: &'static str,
    },

    /// A list field is empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Trim `value`, rejecting it if nothing is left.
pub(crate) fn required_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(trimmed.to_owned())
}

/// Apply [`required_text`] to an optional update field.
pub(crate) fn optional_text(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    value.map(|v| required_text(field, v)).transpose()
}

/// Serialize a [`Discount`] as a plain JSON number.
pub(crate) fn serialize_discount<S>(discount: &Discount, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    rust_decimal::serde::float::serialize(&discount.percent(), serializer)
}
