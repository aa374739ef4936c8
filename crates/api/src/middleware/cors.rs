//! CORS for the browser client.
//!
//! Only the configured `ORIGIN` may call the API, with cookies. The
//! `X-Total-Count` header is exposed so list pages can paginate.

use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::ApiConfig;

/// Response header carrying the total size of a paginated listing.
pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

/// Build the CORS layer for `config.origin`.
///
/// An origin that cannot be expressed as a header value matches nothing.
#[must_use]
pub fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origin = match HeaderValue::from_str(&config.origin) {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            tracing::warn!(origin = %config.origin, "ORIGIN is not a valid header value");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([TOTAL_COUNT_HEADER])
}
