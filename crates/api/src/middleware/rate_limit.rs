//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the credential endpoints (signup, login, password reset) are
//! limited. Limits come from `AUTH_RATE_LIMIT_*` in [`crate::config`].
//! Rejections use the API's `{"message": ...}` error body.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderValue, Request, header::RETRY_AFTER};
use axum::response::{IntoResponse, Response};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::config::RateLimitConfig;
use crate::error::AppError;

/// Key extractor that prefers proxy headers and falls back to the peer
/// address of the TCP connection.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        header_ip(req, "x-forwarded-for")
            .or_else(|| header_ip(req, "x-real-ip"))
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create the rate limiter for the credential endpoints.
///
/// The defaults (burst of 5, one request back every 6 seconds) allow
/// roughly 10 requests per minute per IP.
///
/// # Panics
///
/// Never; `ApiConfig` rejects a zero burst or period.
#[must_use]
pub fn auth_rate_limiter(limit: RateLimitConfig) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(limit.period_seconds)
        .burst_size(limit.burst)
        .finish()
        .expect("rate limiter config with a positive period and burst is valid");
    GovernorLayer::new(Arc::new(config)).error_handler(governor_error_response)
}

/// Render a limiter rejection as an [`AppError`] response.
fn governor_error_response(error: GovernorError) -> Response {
    match error {
        GovernorError::TooManyRequests { wait_time, headers } => {
            let mut response = AppError::RateLimited.into_response();
            if let Some(headers) = headers {
                response.headers_mut().extend(headers);
            }
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(wait_time));
            response
        }
        GovernorError::UnableToExtractKey => {
            AppError::Internal("unable to determine client address".to_string()).into_response()
        }
        GovernorError::Other { msg, .. } => {
            AppError::Internal(msg.unwrap_or_else(|| "rate limiter error".to_string()))
                .into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    #[test]
    fn test_prefers_forwarded_for() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(())
            .unwrap();
        assert_eq!(
            ClientIpKeyExtractor.extract(&req).unwrap(),
            "203.0.113.7".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut req = Request::builder().body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("198.51.100.2:5000".parse::<SocketAddr>().unwrap()));
        assert_eq!(
            ClientIpKeyExtractor.extract(&req).unwrap(),
            "198.51.100.2".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_no_address_is_an_error() {
        let req = Request::builder().body(()).unwrap();
        assert!(ClientIpKeyExtractor.extract(&req).is_err());
    }

    #[tokio::test]
    async fn test_rejection_is_json_with_retry_after() {
        let response = governor_error_response(GovernorError::TooManyRequests {
            wait_time: 6,
            headers: None,
        });

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "6");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"message": "Too many requests"}));
    }

    #[tokio::test]
    async fn test_second_request_over_burst_is_limited() {
        use axum::{Router, body::Body, routing::post};
        use tower::ServiceExt;

        let app = Router::new()
            .route("/login", post(|| async { "ok" }))
            .layer(auth_rate_limiter(RateLimitConfig {
                burst: 1,
                period_seconds: 60,
            }));

        let request = || {
            Request::builder()
                .method("POST")
                .uri("/login")
                .header("x-forwarded-for", "203.0.113.9")
                .body(Body::empty())
                .unwrap()
        };

        let first = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
