use chrono::{DateTime, NaiveDate, Utc};

/// Gender values accepted by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Parse the wire form; only the exact strings "male" and "female"
    /// are valid.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Pure user model (no serde). The password hash never leaves the
/// storage layer, so it has no field here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub id_type: String,
    pub id_no: String,
    pub gender: Gender,
    pub dob: NaiveDate,
    pub address: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pure patient model; a 1:1 extension of its owning [`User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub id: i32,
    pub user_id: i32,
    pub medium_acquisition: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw request fields before validation.
///
/// Every field is optional: create requires all of them present, update
/// validates only the ones present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientDraft {
    pub name: Option<String>,
    pub id_type: Option<String>,
    pub id_no: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub address: Option<String>,
    pub medium_acquisition: Option<String>,
}

/// Validated data for creating a patient and its backing user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub name: String,
    pub id_type: String,
    pub id_no: String,
    pub gender: Gender,
    pub dob: NaiveDate,
    pub address: String,
    pub medium_acquisition: String,
}

/// Validated partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientPatch {
    pub name: Option<String>,
    pub id_type: Option<String>,
    pub id_no: Option<String>,
    pub gender: Option<Gender>,
    pub dob: Option<NaiveDate>,
    pub address: Option<String>,
    pub medium_acquisition: Option<String>,
}

impl PatientPatch {
    /// True when no user-side column is touched.
    pub fn user_is_empty(&self) -> bool {
        self.name.is_none()
            && self.id_type.is_none()
            && self.id_no.is_none()
            && self.gender.is_none()
            && self.dob.is_none()
            && self.address.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.user_is_empty() && self.medium_acquisition.is_none()
    }
}
