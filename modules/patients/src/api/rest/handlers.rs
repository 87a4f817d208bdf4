use std::sync::Arc;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use tracing::info;

use crate::api::rest::dto::{CreatePatientReq, PatientDto, PatientSummaryDto, UpdatePatientReq};
use crate::api::rest::error::{map_domain_error, ApiError};
use crate::domain::service::Service;

/// List all patients
#[utoipa::path(
    get,
    path = "/patients",
    tag = "patients",
    responses(
        (status = 200, description = "List of patients", body = [PatientSummaryDto]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_patients(
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<Vec<PatientSummaryDto>>, ApiError> {
    info!("Listing patients");

    match svc.list().await {
        Ok(rows) => Ok(Json(
            rows.iter()
                .map(|(patient, user)| PatientSummaryDto::from_pair(patient, user))
                .collect(),
        )),
        Err(e) => Err(map_domain_error(
            &e,
            "Failed to fetch patients. Please try again later.",
        )),
    }
}

/// Create a new patient with its backing user
#[utoipa::path(
    post,
    path = "/patients",
    tag = "patients",
    request_body = CreatePatientReq,
    responses(
        (status = 201, description = "Patient created", body = PatientDto),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_patient(
    Extension(svc): Extension<Arc<Service>>,
    Json(body): Json<CreatePatientReq>,
) -> Result<(StatusCode, Json<PatientDto>), ApiError> {
    info!("Creating patient");

    match svc.create(body.into()).await {
        Ok((patient, user)) => Ok((
            StatusCode::CREATED,
            Json(PatientDto::from_pair(&patient, &user)),
        )),
        Err(e) => Err(map_domain_error(
            &e,
            "Failed to create patient. Please try again later.",
        )),
    }
}

/// Get a specific patient by ID
#[utoipa::path(
    get,
    path = "/patients/{id}",
    tag = "patients",
    params(("id" = i32, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient data", body = PatientDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn show_patient(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
) -> Result<Json<PatientDto>, ApiError> {
    info!("Getting patient {id}");

    match svc.get(id).await {
        Ok((patient, user)) => Ok(Json(PatientDto::from_pair(&patient, &user))),
        Err(e) => Err(map_domain_error(
            &e,
            "Failed to fetch patient data. Please try again later.",
        )),
    }
}

/// Update an existing patient and/or its user
#[utoipa::path(
    put,
    path = "/patients/{id}",
    tag = "patients",
    params(("id" = i32, Path, description = "Patient ID")),
    request_body = UpdatePatientReq,
    responses(
        (status = 200, description = "Patient updated", body = PatientDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Patient not found"),
        (status = 422, description = "Validation error"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_patient(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    body: Option<Json<UpdatePatientReq>>,
) -> Result<Json<PatientDto>, ApiError> {
    info!("Updating patient {id}");

    // An absent body is a valid no-op update.
    let draft = body.map(|Json(req)| req.into()).unwrap_or_default();

    match svc.update(id, draft).await {
        Ok((patient, user)) => Ok(Json(PatientDto::from_pair(&patient, &user))),
        Err(e) => Err(map_domain_error(
            &e,
            "Failed to update patient. Please try again later.",
        )),
    }
}

/// Delete a patient and its backing user
#[utoipa::path(
    delete,
    path = "/patients/{id}",
    tag = "patients",
    params(("id" = i32, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_patient(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    info!("Deleting patient {id}");

    match svc.delete(id).await {
        Ok(()) => Ok(Json(
            serde_json::json!({ "message": "Patient deleted successfully" }),
        )),
        Err(e) => Err(map_domain_error(
            &e,
            "Failed to delete patient. Please try again later.",
        )),
    }
}
