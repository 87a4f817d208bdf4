use anyhow::{anyhow, Result};

use crate::contract::model::{Gender, Patient, User};
use crate::infra::storage::entity;

/// Convert a user row to its contract model. The password hash stays
/// behind in the row.
pub fn user_to_contract(row: entity::user::Model) -> Result<User> {
    let gender = Gender::parse(&row.gender)
        .ok_or_else(|| anyhow!("corrupt gender value '{}' for user {}", row.gender, row.id))?;
    Ok(User {
        id: row.id,
        name: row.name,
        id_type: row.id_type,
        id_no: row.id_no,
        gender,
        dob: row.dob,
        address: row.address,
        email: row.email,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Convert a patient row to its contract model.
pub fn patient_to_contract(row: entity::patient::Model) -> Patient {
    Patient {
        id: row.id,
        user_id: row.user_id,
        medium_acquisition: row.medium_acquisition,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
