//! Field validation rules and name slugging.
//!
//! Validation accumulates into a field → messages map so a single 422
//! response can report every broken field at once.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::contract::model::{Gender, NewPatient, PatientDraft, PatientPatch};

/// Accumulated field → messages map, serialized as the `errors` body of a
/// 422 response. BTreeMap keeps field ordering deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

fn required_message(field: &str) -> String {
    format!("The {} field is required.", field.replace('_', " "))
}

pub fn taken_message(field: &str) -> String {
    format!("The {} has already been taken.", field.replace('_', " "))
}

/// Names may contain ASCII letters, spaces, and periods only.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == '.' || c.is_ascii_whitespace())
}

/// Lowercase the name and collapse every non-alphanumeric run into a
/// single `.`, dropping leading and trailing separators.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('.');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

pub fn parse_dob(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Validate a create request: every field is required, then the
/// per-field rules apply. Uniqueness of `id_no` is checked separately by
/// the service, against the datastore.
pub fn validate_create(draft: &PatientDraft) -> Result<NewPatient, FieldErrors> {
    let mut errors = FieldErrors::default();

    let name = require_text(&draft.name, "name", &mut errors);
    if let Some(ref name) = name {
        if !is_valid_name(name) {
            errors.push("name", "The name format is invalid.");
        }
    }
    let id_type = require_text(&draft.id_type, "id_type", &mut errors);
    let id_no = require_text(&draft.id_no, "id_no", &mut errors);
    let gender = require_text(&draft.gender, "gender", &mut errors).and_then(|raw| {
        let parsed = Gender::parse(&raw);
        if parsed.is_none() {
            errors.push("gender", "The selected gender is invalid.");
        }
        parsed
    });
    let dob = require_text(&draft.dob, "dob", &mut errors).and_then(|raw| {
        let parsed = parse_dob(&raw);
        if parsed.is_none() {
            errors.push("dob", "The dob is not a valid date.");
        }
        parsed
    });
    let address = require_text(&draft.address, "address", &mut errors);
    let medium_acquisition = require_text(&draft.medium_acquisition, "medium_acquisition", &mut errors);

    match (name, id_type, id_no, gender, dob, address, medium_acquisition) {
        (
            Some(name),
            Some(id_type),
            Some(id_no),
            Some(gender),
            Some(dob),
            Some(address),
            Some(medium_acquisition),
        ) if errors.is_empty() => Ok(NewPatient {
            name,
            id_type,
            id_no,
            gender,
            dob,
            address,
            medium_acquisition,
        }),
        _ => Err(errors),
    }
}

/// Validate only the fields present in the draft. A present field obeys
/// the same rules as in create.
pub fn validate_update(draft: &PatientDraft) -> Result<PatientPatch, FieldErrors> {
    let mut errors = FieldErrors::default();
    let mut patch = PatientPatch::default();

    if let Some(ref name) = draft.name {
        match present_text(name, "name", &mut errors) {
            Some(name) if !is_valid_name(&name) => {
                errors.push("name", "The name format is invalid.");
            }
            Some(name) => patch.name = Some(name),
            None => {}
        }
    }
    if let Some(ref id_type) = draft.id_type {
        patch.id_type = present_text(id_type, "id_type", &mut errors);
    }
    if let Some(ref id_no) = draft.id_no {
        patch.id_no = present_text(id_no, "id_no", &mut errors);
    }
    if let Some(ref gender) = draft.gender {
        patch.gender = present_text(gender, "gender", &mut errors).and_then(|raw| {
            let parsed = Gender::parse(&raw);
            if parsed.is_none() {
                errors.push("gender", "The selected gender is invalid.");
            }
            parsed
        });
    }
    if let Some(ref dob) = draft.dob {
        patch.dob = present_text(dob, "dob", &mut errors).and_then(|raw| {
            let parsed = parse_dob(&raw);
            if parsed.is_none() {
                errors.push("dob", "The dob is not a valid date.");
            }
            parsed
        });
    }
    if let Some(ref address) = draft.address {
        patch.address = present_text(address, "address", &mut errors);
    }
    if let Some(ref medium) = draft.medium_acquisition {
        patch.medium_acquisition = present_text(medium, "medium_acquisition", &mut errors);
    }

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(errors)
    }
}

fn require_text(value: &Option<String>, field: &str, errors: &mut FieldErrors) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v.clone()),
        _ => {
            errors.push(field, required_message(field));
            None
        }
    }
}

fn present_text(value: &str, field: &str, errors: &mut FieldErrors) -> Option<String> {
    if value.trim().is_empty() {
        errors.push(field, required_message(field));
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_draft() -> PatientDraft {
        PatientDraft {
            name: Some("Nico Robin".to_string()),
            id_type: Some("KTP".to_string()),
            id_no: Some("111".to_string()),
            gender: Some("female".to_string()),
            dob: Some("2000-01-01".to_string()),
            address: Some("Ohara".to_string()),
            medium_acquisition: Some("Online".to_string()),
        }
    }

    #[test]
    fn slugify_joins_words_with_dots() {
        assert_eq!(slugify("Nico Robin"), "nico.robin");
        assert_eq!(slugify("Nico   Robin"), "nico.robin");
        assert_eq!(slugify("Ms. Ada Lovelace"), "ms.ada.lovelace");
        assert_eq!(slugify(" John. "), "john");
        assert_eq!(slugify("a"), "a");
        assert_eq!(slugify("..."), "");
    }

    #[test]
    fn name_rule_accepts_letters_spaces_periods_only() {
        assert!(is_valid_name("Nico Robin"));
        assert!(is_valid_name("Dr. John Doe"));
        assert!(!is_valid_name("Nico123"));
        assert!(!is_valid_name("Nico-Robin"));
        assert!(!is_valid_name(""));
    }

    #[test]
    fn dob_must_be_a_calendar_date() {
        assert!(parse_dob("2000-01-01").is_some());
        assert!(parse_dob("2000-02-30").is_none());
        assert!(parse_dob("01-01-2000").is_none());
        assert!(parse_dob("yesterday").is_none());
    }

    #[test]
    fn create_accepts_a_full_valid_draft() {
        let new = validate_create(&full_draft()).expect("valid draft");
        assert_eq!(new.name, "Nico Robin");
        assert_eq!(new.gender, Gender::Female);
        assert_eq!(new.dob, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
    }

    #[test]
    fn create_reports_every_missing_field() {
        let errors = validate_create(&PatientDraft::default()).unwrap_err();
        assert_eq!(errors.len(), 7);
        assert!(errors.contains("name"));
        assert!(errors.contains("medium_acquisition"));
    }

    #[test]
    fn create_rejects_bad_gender_and_dob_together() {
        let mut draft = full_draft();
        draft.gender = Some("unknown".to_string());
        draft.dob = Some("not-a-date".to_string());
        let errors = validate_create(&draft).unwrap_err();
        assert!(errors.contains("gender"));
        assert!(errors.contains("dob"));
        assert!(!errors.contains("name"));
    }

    #[test]
    fn update_validates_only_present_fields() {
        let draft = PatientDraft {
            address: Some("Alabasta".to_string()),
            ..Default::default()
        };
        let patch = validate_update(&draft).expect("valid partial draft");
        assert_eq!(patch.address.as_deref(), Some("Alabasta"));
        assert!(patch.name.is_none());
    }

    #[test]
    fn update_rejects_present_but_empty_field() {
        let draft = PatientDraft {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        let errors = validate_update(&draft).unwrap_err();
        assert!(errors.contains("name"));
    }

    #[test]
    fn empty_update_draft_is_an_empty_patch() {
        let patch = validate_update(&PatientDraft::default()).expect("empty draft");
        assert!(patch.is_empty());
    }
}
