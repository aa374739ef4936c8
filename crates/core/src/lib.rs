//! Bazaar Core - Shared domain types.
//!
//! This crate provides the types used across all Bazaar components:
//! - `api` - The storefront REST server
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. This keeps it lightweight and trivially testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, prices, order statuses, ratings and pagination

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
