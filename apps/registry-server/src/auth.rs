//! Shared-secret request gate.
//!
//! Every API request must carry the configured secret in the `accessKey`
//! header; anything else is rejected before a handler (and the datastore)
//! is reached.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

/// Header carrying the shared secret. Header lookup is case-insensitive.
pub const ACCESS_KEY_HEADER: &str = "accessKey";

/// Process-wide immutable gate secret, loaded once at startup.
#[derive(Clone)]
pub struct AccessKey(Arc<str>);

impl AccessKey {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    fn matches(&self, provided: Option<&str>) -> bool {
        provided == Some(self.0.as_ref())
    }
}

/// Middleware rejecting any request whose `accessKey` header does not
/// equal the configured secret.
pub async fn require_access_key(
    State(key): State<AccessKey>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let provided = req
        .headers()
        .get(ACCESS_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if !key.matches(provided) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Unauthorized" })),
        )
            .into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn gated_router(secret: &str) -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(from_fn_with_state(
                AccessKey::new(secret),
                require_access_key,
            ))
    }

    async fn send(router: Router, header: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/ping");
        if let Some(value) = header {
            builder = builder.header(ACCESS_KEY_HEADER, value);
        }
        let response = router
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn matching_key_passes_through() {
        let (status, body) = send(gated_router("s3cret"), Some("s3cret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "pong");
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let (status, body) = send(gated_router("s3cret"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, r#"{"message":"Unauthorized"}"#);
    }

    #[tokio::test]
    async fn wrong_key_is_unauthorized() {
        let (status, body) = send(gated_router("s3cret"), Some("nope")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, r#"{"message":"Unauthorized"}"#);
    }
}
