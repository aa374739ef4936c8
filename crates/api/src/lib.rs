//! Bazaar storefront REST API.
//!
//! The server binary is a thin wrapper around [`app`]; everything else is
//! exposed as a library so the CLI can reuse the repositories and tests can
//! drive the router directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, http::Request};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::Span;

use middleware::{cors_layer, request_id_middleware, security_headers_middleware};
use state::AppState;

/// Build the full application router with its middleware stack.
///
/// Layers run outermost first: trace span, request ID, CORS, security
/// headers, session. Sentry layers are added by the caller around the
/// result.
pub fn app(state: AppState, session_layer: SessionManagerLayer<PostgresStore>) -> Router {
    let cors = cors_layer(state.config());

    routes::routes(state.config())
        .layer(session_layer)
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(cors)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
