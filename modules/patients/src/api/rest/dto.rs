use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::model::{Patient, PatientDraft, User};

/// Render a timestamp in the wire format used by every response.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Summary row returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientSummaryDto {
    pub id: i32,
    pub name: String,
    pub medium_acquisition: String,
    pub created_at: String,
    pub updated_at: String,
}

impl PatientSummaryDto {
    pub fn from_pair(patient: &Patient, user: &User) -> Self {
        Self {
            id: patient.id,
            name: user.name.clone(),
            medium_acquisition: patient.medium_acquisition.clone(),
            created_at: format_timestamp(patient.created_at),
            updated_at: format_timestamp(patient.updated_at),
        }
    }
}

/// Embedded user object. The password never appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    pub id_type: String,
    pub id_no: String,
    pub gender: String,
    pub dob: String,
    pub address: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            id_type: user.id_type.clone(),
            id_no: user.id_no.clone(),
            gender: user.gender.as_str().to_string(),
            dob: format_date(user.dob),
            address: user.address.clone(),
            email: user.email.clone(),
            created_at: format_timestamp(user.created_at),
            updated_at: format_timestamp(user.updated_at),
        }
    }
}

/// Nested representation returned by create/show/update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientDto {
    pub id: i32,
    pub user_id: i32,
    pub medium_acquisition: String,
    pub created_at: String,
    pub updated_at: String,
    pub user: UserDto,
}

impl PatientDto {
    pub fn from_pair(patient: &Patient, user: &User) -> Self {
        Self {
            id: patient.id,
            user_id: patient.user_id,
            medium_acquisition: patient.medium_acquisition.clone(),
            created_at: format_timestamp(patient.created_at),
            updated_at: format_timestamp(patient.updated_at),
            user: UserDto::from(user),
        }
    }
}

/// Body of POST /patients. Presence of every field is enforced by
/// validation rather than deserialization, so a missing field reports a
/// field error instead of a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientReq {
    pub name: Option<String>,
    pub id_type: Option<String>,
    pub id_no: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub address: Option<String>,
    pub medium_acquisition: Option<String>,
}

/// Body of PUT /patients/{id}; any subset of the create fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePatientReq {
    pub name: Option<String>,
    pub id_type: Option<String>,
    pub id_no: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub address: Option<String>,
    pub medium_acquisition: Option<String>,
}

impl From<CreatePatientReq> for PatientDraft {
    fn from(req: CreatePatientReq) -> Self {
        Self {
            name: req.name,
            id_type: req.id_type,
            id_no: req.id_no,
            gender: req.gender,
            dob: req.dob,
            address: req.address,
            medium_acquisition: req.medium_acquisition,
        }
    }
}

impl From<UpdatePatientReq> for PatientDraft {
    fn from(req: UpdatePatientReq) -> Self {
        Self {
            name: req.name,
            id_type: req.id_type,
            id_no: req.id_no,
            gender: req.gender,
            dob: req.dob,
            address: req.address,
            medium_acquisition: req.medium_acquisition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::Gender;
    use chrono::TimeZone;

    fn sample_pair() -> (Patient, User) {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 5).unwrap();
        let user = User {
            id: 7,
            name: "Nico Robin".to_string(),
            id_type: "KTP".to_string(),
            id_no: "111".to_string(),
            gender: Gender::Female,
            dob: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            address: "Ohara".to_string(),
            email: "nico.robin1@example.com".to_string(),
            created_at: ts,
            updated_at: ts,
        };
        let patient = Patient {
            id: 3,
            user_id: 7,
            medium_acquisition: "Online".to_string(),
            created_at: ts,
            updated_at: ts,
        };
        (patient, user)
    }

    #[test]
    fn timestamps_render_as_date_space_time() {
        let (patient, user) = sample_pair();
        let dto = PatientDto::from_pair(&patient, &user);
        assert_eq!(dto.created_at, "2025-06-01 08:30:05");
        assert_eq!(dto.user.updated_at, "2025-06-01 08:30:05");
        assert_eq!(dto.user.dob, "2000-01-01");
    }

    #[test]
    fn nested_dto_excludes_password_by_construction() {
        let (patient, user) = sample_pair();
        let value = serde_json::to_value(PatientDto::from_pair(&patient, &user)).unwrap();
        assert!(value["user"].get("password").is_none());
        assert_eq!(value["user"]["email"], "nico.robin1@example.com");
        assert_eq!(value["user_id"], 7);
    }

    #[test]
    fn summary_takes_name_from_the_user() {
        let (patient, user) = sample_pair();
        let dto = PatientSummaryDto::from_pair(&patient, &user);
        assert_eq!(dto.id, 3);
        assert_eq!(dto.name, "Nico Robin");
        assert_eq!(dto.medium_acquisition, "Online");
    }
}
