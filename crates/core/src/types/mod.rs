//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod page;
pub mod price;
pub mod rating;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use page::{Page, PageError};
pub use price::{Discount, DiscountError, line_total};
pub use rating::{Rating, RatingError};
pub use status::{OrderStatus, PaymentMode, UnknownLabel};
