//! SeaORM-backed repository implementation for the domain port.
//!
//! Multi-row writes (create, update, delete) run inside a transaction so a
//! partial failure can never leave an orphan user or patient row.

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::contract::model::{NewPatient, Patient, PatientPatch, User};
use crate::domain::error::UniqueField;
use crate::domain::repo::{PatientsRepository, RepoError};
use crate::infra::storage::entity::{patient, user};
use crate::infra::storage::mapper;

/// SeaORM repository impl. Holds the pooled connection handle.
pub struct SeaOrmPatientsRepository {
    db: DatabaseConnection,
}

impl SeaOrmPatientsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Classify a write failure: unique-index violations on `users.id_no` or
/// `users.email` are lost client races, not infrastructure faults.
fn unique_violation(err: &DbErr) -> Option<UniqueField> {
    let message = err.to_string();
    let lower = message.to_lowercase();
    if !lower.contains("unique") && !lower.contains("duplicate key") {
        return None;
    }
    if message.contains("email") {
        Some(UniqueField::Email)
    } else if message.contains("id_no") {
        Some(UniqueField::IdNo)
    } else {
        None
    }
}

fn write_error(err: DbErr, what: &'static str) -> RepoError {
    match unique_violation(&err) {
        Some(field) => RepoError::Unique { field },
        None => RepoError::Other(anyhow::Error::new(err).context(what)),
    }
}

#[async_trait]
impl PatientsRepository for SeaOrmPatientsRepository {
    async fn list_with_users(&self) -> anyhow::Result<Vec<(Patient, User)>> {
        let rows = patient::Entity::find()
            .find_also_related(user::Entity)
            .order_by_asc(patient::Column::Id)
            .all(&self.db)
            .await
            .context("list_with_users failed")?;

        rows.into_iter()
            .map(|(p, u)| {
                let u = u.with_context(|| format!("patient {} has no user row", p.id))?;
                Ok((mapper::patient_to_contract(p), mapper::user_to_contract(u)?))
            })
            .collect()
    }

    async fn find_with_user(&self, id: i32) -> anyhow::Result<Option<(Patient, User)>> {
        let found = patient::Entity::find_by_id(id)
            .find_also_related(user::Entity)
            .one(&self.db)
            .await
            .context("find_with_user failed")?;

        match found {
            Some((p, Some(u))) => Ok(Some((
                mapper::patient_to_contract(p),
                mapper::user_to_contract(u)?,
            ))),
            Some((p, None)) => Err(anyhow::anyhow!("patient {} has no user row", p.id)),
            None => Ok(None),
        }
    }

    async fn id_no_exists(&self, id_no: &str, exclude_user: Option<i32>) -> anyhow::Result<bool> {
        let mut query = user::Entity::find().filter(user::Column::IdNo.eq(id_no));
        if let Some(user_id) = exclude_user {
            query = query.filter(user::Column::Id.ne(user_id));
        }
        let count = query.count(&self.db).await.context("id_no_exists failed")?;
        Ok(count > 0)
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .count(&self.db)
            .await
            .context("email_exists failed")?;
        Ok(count > 0)
    }

    async fn create_with_user(
        &self,
        new: NewPatient,
        email: String,
        password_hash: String,
    ) -> Result<(Patient, User), RepoError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| write_error(e, "begin create transaction"))?;
        let now = Utc::now();

        let user_row = user::ActiveModel {
            name: Set(new.name),
            id_type: Set(new.id_type),
            id_no: Set(new.id_no),
            gender: Set(new.gender.as_str().to_string()),
            dob: Set(new.dob),
            address: Set(new.address),
            email: Set(email),
            password: Set(password_hash),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| write_error(e, "insert user"))?;

        let patient_row = patient::ActiveModel {
            user_id: Set(user_row.id),
            medium_acquisition: Set(new.medium_acquisition),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| write_error(e, "insert patient"))?;

        txn.commit()
            .await
            .map_err(|e| write_error(e, "commit create transaction"))?;

        let user = mapper::user_to_contract(user_row).map_err(RepoError::Other)?;
        Ok((mapper::patient_to_contract(patient_row), user))
    }

    async fn update_with_user(
        &self,
        current: &Patient,
        patch: PatientPatch,
    ) -> Result<(Patient, User), RepoError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| write_error(e, "begin update transaction"))?;
        let now = Utc::now();

        if let Some(medium) = patch.medium_acquisition.clone() {
            patient::ActiveModel {
                id: Set(current.id),
                medium_acquisition: Set(medium),
                updated_at: Set(now),
                ..Default::default()
            }
            .update(&txn)
            .await
            .map_err(|e| write_error(e, "update patient"))?;
        }

        if !patch.user_is_empty() {
            let mut row = user::ActiveModel {
                id: Set(current.user_id),
                updated_at: Set(now),
                ..Default::default()
            };
            if let Some(name) = patch.name {
                row.name = Set(name);
            }
            if let Some(id_type) = patch.id_type {
                row.id_type = Set(id_type);
            }
            if let Some(id_no) = patch.id_no {
                row.id_no = Set(id_no);
            }
            if let Some(gender) = patch.gender {
                row.gender = Set(gender.as_str().to_string());
            }
            if let Some(dob) = patch.dob {
                row.dob = Set(dob);
            }
            if let Some(address) = patch.address {
                row.address = Set(address);
            }
            row.update(&txn)
                .await
                .map_err(|e| write_error(e, "update user"))?;
        }

        // Re-read inside the transaction so the response reflects exactly
        // what is being committed.
        let reloaded = patient::Entity::find_by_id(current.id)
            .find_also_related(user::Entity)
            .one(&txn)
            .await
            .map_err(|e| write_error(e, "reload updated patient"))?
            .and_then(|(p, u)| u.map(|u| (p, u)));
        let (p, u) = reloaded.ok_or_else(|| {
            RepoError::Other(anyhow::anyhow!(
                "patient {} vanished during update",
                current.id
            ))
        })?;

        txn.commit()
            .await
            .map_err(|e| write_error(e, "commit update transaction"))?;

        let user = mapper::user_to_contract(u).map_err(RepoError::Other)?;
        Ok((mapper::patient_to_contract(p), user))
    }

    async fn delete_with_user(&self, current: &Patient) -> anyhow::Result<()> {
        let txn = self.db.begin().await.context("begin delete transaction")?;

        // Patient row goes first so the FK to users holds at every
        // statement; the transaction makes the pair atomic either way.
        patient::Entity::delete_by_id(current.id)
            .exec(&txn)
            .await
            .context("delete patient")?;
        user::Entity::delete_by_id(current.user_id)
            .exec(&txn)
            .await
            .context("delete user")?;

        txn.commit().await.context("commit delete transaction")?;
        Ok(())
    }
}
