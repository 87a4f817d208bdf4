use async_trait::async_trait;

use crate::contract::model::{NewPatient, Patient, PatientPatch, User};
use crate::domain::error::UniqueField;

/// Write-side failures the service must tell apart: a lost uniqueness
/// race maps to a client error, everything else to infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("unique constraint violated on {}", field.as_str())]
    Unique { field: UniqueField },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait PatientsRepository: Send + Sync {
    /// Load every patient joined with its user, oldest first.
    async fn list_with_users(&self) -> anyhow::Result<Vec<(Patient, User)>>;

    /// Load one patient joined with its user.
    async fn find_with_user(&self, id: i32) -> anyhow::Result<Option<(Patient, User)>>;

    /// Check id_no uniqueness, optionally ignoring one user row (the
    /// self-exclusion used by update).
    async fn id_no_exists(&self, id_no: &str, exclude_user: Option<i32>) -> anyhow::Result<bool>;

    /// Check whether an email is already taken.
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;

    /// Insert the user and its patient as one transaction.
    ///
    /// Service derives the email and hashes the credential; repo persists
    /// and returns the rows with their database-assigned ids.
    async fn create_with_user(
        &self,
        new: NewPatient,
        email: String,
        password_hash: String,
    ) -> Result<(Patient, User), RepoError>;

    /// Apply a validated partial update to the patient and/or its user as
    /// one transaction. Returns the post-update pair.
    async fn update_with_user(
        &self,
        current: &Patient,
        patch: PatientPatch,
    ) -> Result<(Patient, User), RepoError>;

    /// Delete the patient and its user as one transaction.
    async fn delete_with_user(&self, current: &Patient) -> anyhow::Result<()>;
}
