//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with a `request_id` field)
//! 3. Request ID (fills the span field, echoes `x-request-id`)
//! 4. CORS (the configured `ORIGIN` only, with credentials)
//! 5. Security headers
//! 6. Session layer (tower-sessions with `PostgreSQL` store)
//! 7. Rate limiting (governor) on the credential routes under `/auth`

pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAdmin, RequireAuth, clear_current_user, set_current_user};
pub use cors::{TOTAL_COUNT_HEADER, cors_layer};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, create_session_store};
