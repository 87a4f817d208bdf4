//! Router assembly: the gated patient API plus open health and
//! documentation endpoints.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::middleware::from_fn_with_state;
use axum::response::{Html, Json};
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use patients::api::rest::dto::{
    CreatePatientReq, PatientDto, PatientSummaryDto, UpdatePatientReq, UserDto,
};
use patients::api::rest::routes;
use patients::domain::service::Service;

use crate::auth::{require_access_key, AccessKey};

#[derive(OpenApi)]
#[openapi(
    paths(
        patients::api::rest::handlers::list_patients,
        patients::api::rest::handlers::create_patient,
        patients::api::rest::handlers::show_patient,
        patients::api::rest::handlers::update_patient,
        patients::api::rest::handlers::delete_patient,
    ),
    components(schemas(
        PatientSummaryDto,
        PatientDto,
        UserDto,
        CreatePatientReq,
        UpdatePatientReq
    )),
    tags((name = "patients", description = "Patient registry API"))
)]
struct ApiDoc;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn serve_docs() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>API Docs</title>
  <script src="https://unpkg.com/@stoplight/elements@latest/web-components.min.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@latest/styles.min.css">
</head>
<body>
  <elements-api apiDescriptionUrl="/openapi.json" router="hash" layout="sidebar"></elements-api>
</body>
</html>"#,
    )
}

/// Build the full application router. The access-key gate wraps the
/// patient API; health and docs stay open for supervision and discovery.
pub fn build_router(service: Arc<Service>, access_key: AccessKey) -> Router {
    let api = routes::router(service).layer(from_fn_with_state(access_key, require_access_key));

    Router::new()
        .merge(api)
        .route("/healthz", get(health_check))
        .route("/openapi.json", get(serve_openapi))
        .route("/docs", get(serve_docs))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                )
            }),
        )
}
