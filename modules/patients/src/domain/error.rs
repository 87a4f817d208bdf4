use thiserror::Error;

use crate::domain::validation::FieldErrors;

/// Field carrying a datastore uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    IdNo,
    Email,
}

impl UniqueField {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueField::IdNo => "id_no",
            UniqueField::Email => "email",
        }
    }
}

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Patient not found: {id}")]
    PatientNotFound { id: i32 },

    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("unique constraint violated on {}", field.as_str())]
    UniqueViolation { field: UniqueField },

    #[error("no free email candidate for base '{base}'")]
    EmailExhausted { base: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn patient_not_found(id: i32) -> Self {
        Self::PatientNotFound { id }
    }

    pub fn validation(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }

    pub fn unique_violation(field: UniqueField) -> Self {
        Self::UniqueViolation { field }
    }

    pub fn email_exhausted(base: impl Into<String>) -> Self {
        Self::EmailExhausted { base: base.into() }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
