//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Signup, login, and the password reset flow
//! - `catalog` - Cached brand and category lists
//! - `email` - Transactional email (password reset)
//! - `orders` - Order placement with server-side pricing, status changes
//!
//! Plain CRUD routes talk to the repositories in [`crate::db`] directly.

pub mod auth;
pub mod catalog;
pub mod email;
pub mod orders;
