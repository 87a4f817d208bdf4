use std::sync::Arc;

use pbkdf2::password_hash::rand_core::OsRng;
use pbkdf2::password_hash::{PasswordHasher, SaltString};
use pbkdf2::Pbkdf2;
use tracing::{debug, info, instrument};

use crate::contract::model::{Patient, PatientDraft, User};
use crate::domain::error::DomainError;
use crate::domain::repo::{PatientsRepository, RepoError};
use crate::domain::validation::{self, FieldErrors};

/// Every created user starts with the same credential; accounts are
/// activated out of band.
const DEFAULT_PASSWORD: &str = "Physiomobile2025@!";

/// Domain service with the registry business rules.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn PatientsRepository>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Domain appended to generated email addresses.
    pub email_domain: String,
    /// Upper bound on sequential email probes before giving up.
    pub max_email_probes: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            email_domain: "example.com".to_string(),
            max_email_probes: 1000,
        }
    }
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(repo: Arc<dyn PatientsRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(name = "patients.service.list", skip(self))]
    pub async fn list(&self) -> Result<Vec<(Patient, User)>, DomainError> {
        debug!("Listing patients");

        let rows = self
            .repo
            .list_with_users()
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!("Listed {} patients", rows.len());
        Ok(rows)
    }

    #[instrument(name = "patients.service.get", skip(self), fields(patient_id = id))]
    pub async fn get(&self, id: i32) -> Result<(Patient, User), DomainError> {
        debug!("Getting patient by id");

        self.repo
            .find_with_user(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::patient_not_found(id))
    }

    #[instrument(name = "patients.service.create", skip(self, draft))]
    pub async fn create(&self, draft: PatientDraft) -> Result<(Patient, User), DomainError> {
        info!("Creating patient");

        // Field rules and id_no uniqueness report through the same error
        // map, so one response lists every broken field.
        let new = match validation::validate_create(&draft) {
            Ok(new) => {
                if self.id_no_taken(&new.id_no, None).await? {
                    let mut errors = FieldErrors::default();
                    errors.push("id_no", validation::taken_message("id_no"));
                    return Err(DomainError::validation(errors));
                }
                new
            }
            Err(mut errors) => {
                if !errors.contains("id_no") {
                    if let Some(ref id_no) = draft.id_no {
                        if self.id_no_taken(id_no, None).await? {
                            errors.push("id_no", validation::taken_message("id_no"));
                        }
                    }
                }
                return Err(DomainError::validation(errors));
            }
        };

        let email = self.next_free_email(&validation::slugify(&new.name)).await?;
        let password_hash = hash_default_password()?;

        let (patient, user) = self
            .repo
            .create_with_user(new, email, password_hash)
            .await
            .map_err(map_repo_error)?;

        info!("Created patient id={} (user id={})", patient.id, user.id);
        Ok((patient, user))
    }

    #[instrument(name = "patients.service.update", skip(self, draft), fields(patient_id = id))]
    pub async fn update(&self, id: i32, draft: PatientDraft) -> Result<(Patient, User), DomainError> {
        info!("Updating patient");

        let (patient, user) = self
            .repo
            .find_with_user(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::patient_not_found(id))?;

        let patch = match validation::validate_update(&draft) {
            Ok(patch) => {
                if let Some(ref id_no) = patch.id_no {
                    if self.id_no_taken(id_no, Some(user.id)).await? {
                        let mut errors = FieldErrors::default();
                        errors.push("id_no", validation::taken_message("id_no"));
                        return Err(DomainError::validation(errors));
                    }
                }
                patch
            }
            Err(mut errors) => {
                if !errors.contains("id_no") {
                    if let Some(ref id_no) = draft.id_no {
                        if self.id_no_taken(id_no, Some(user.id)).await? {
                            errors.push("id_no", validation::taken_message("id_no"));
                        }
                    }
                }
                return Err(DomainError::validation(errors));
            }
        };

        if patch.is_empty() {
            // Nothing to change; echo current state.
            return Ok((patient, user));
        }

        let updated = self
            .repo
            .update_with_user(&patient, patch)
            .await
            .map_err(map_repo_error)?;

        info!("Updated patient");
        Ok(updated)
    }

    #[instrument(name = "patients.service.delete", skip(self), fields(patient_id = id))]
    pub async fn delete(&self, id: i32) -> Result<(), DomainError> {
        info!("Deleting patient");

        let (patient, _user) = self
            .repo
            .find_with_user(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::patient_not_found(id))?;

        self.repo
            .delete_with_user(&patient)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Deleted patient");
        Ok(())
    }

    async fn id_no_taken(&self, id_no: &str, exclude_user: Option<i32>) -> Result<bool, DomainError> {
        self.repo
            .id_no_exists(id_no, exclude_user)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    /// Sequential probe: the smallest integer suffix >= 1 whose candidate
    /// email is free at probe time. The datastore unique constraint stays
    /// the safety net for concurrent creates with the same base.
    async fn next_free_email(&self, base: &str) -> Result<String, DomainError> {
        for counter in 1..=self.config.max_email_probes {
            let candidate = format!("{}{}@{}", base, counter, self.config.email_domain);
            let exists = self
                .repo
                .email_exists(&candidate)
                .await
                .map_err(|e| DomainError::database(e.to_string()))?;
            if !exists {
                return Ok(candidate);
            }
        }
        Err(DomainError::email_exhausted(base))
    }
}

fn map_repo_error(e: RepoError) -> DomainError {
    match e {
        RepoError::Unique { field } => DomainError::unique_violation(field),
        RepoError::Other(e) => DomainError::database(e.to_string()),
    }
}

/// Hash the fixed default credential for a newly created user.
fn hash_default_password() -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Pbkdf2
        .hash_password(DEFAULT_PASSWORD.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DomainError::database(format!("password hash failed: {e}")))
}
