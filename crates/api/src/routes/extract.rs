//! Extractors whose rejections use the API's `{"message": ...}` error body.
//!
//! Axum's built-in extractors answer malformed input with plain text. These
//! wrappers route the rejection through [`AppError`] instead.

use axum::{
    extract::{FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;

/// JSON request body or response.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::Body,
        extract::Request,
        http::{StatusCode, header},
        routing::{get, post},
    };
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    use super::*;

    #[derive(Deserialize, Serialize)]
    struct Echo {
        name: String,
    }

    fn app() -> Router {
        Router::new()
            .route("/echo", post(|Json(body): Json<Echo>| async move { Json(body) }))
            .route("/items/{id}", get(|Path(id): Path<i32>| async move { id.to_string() }))
    }

    async fn message(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        body["message"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!message(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_json_round_trips() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"name":"lamp"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], br#"{"name":"lamp"}"#);
    }

    #[tokio::test]
    async fn test_bad_path_param_is_bad_request() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/items/abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
