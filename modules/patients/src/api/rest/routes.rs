use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Route table for the patient API.
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route(
            "/patients",
            get(handlers::list_patients).post(handlers::create_patient),
        )
        .route(
            "/patients/{id}",
            get(handlers::show_patient)
                .put(handlers::update_patient)
                .delete(handlers::delete_patient),
        )
        .layer(Extension(service))
}
