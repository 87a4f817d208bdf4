//! Domain-level tests against a fresh in-memory database: connect,
//! migrate, exercise the service through the repository port.

use std::sync::Arc;

use sea_orm::{ConnectOptions, Database};

use patients::contract::model::{Gender, PatientDraft};
use patients::domain::error::DomainError;
use patients::domain::service::{Service, ServiceConfig};
use patients::infra::storage::migrations;
use patients::infra::storage::sea_orm_repo::SeaOrmPatientsRepository;

async fn service() -> Service {
    // A single pooled connection keeps the in-memory database alive and
    // shared for the whole test.
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);
    let db = Database::connect(opts).await.expect("connect sqlite");
    migrations::run(&db).await.expect("run migrations");

    Service::new(
        Arc::new(SeaOrmPatientsRepository::new(db)),
        ServiceConfig::default(),
    )
}

fn nico() -> PatientDraft {
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

fn expect_validation(err: DomainError) -> patients::domain::validation::FieldErrors {
    match err {
        DomainError::Validation(errors) => errors,
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn create_derives_the_first_free_email() {
    let svc = service().await;

    let (patient, user) = svc.create(nico()).await.expect("create patient");

    assert_eq!(user.email, "nico.robin1@example.com");
    assert_eq!(user.name, "Nico Robin");
    assert_eq!(user.gender, Gender::Female);
    assert_eq!(user.id_no, "111");
    assert_eq!(patient.user_id, user.id);
    assert_eq!(patient.medium_acquisition, "Online");
}

#[tokio::test]
async fn identical_slugs_get_consecutive_counters() {
    let svc = service().await;

    let (_, first) = svc.create(nico()).await.expect("first create");

    let mut second_draft = nico();
    second_draft.id_no = Some("222".to_string());
    second_draft.name = Some("Nico   Robin".to_string());
    let (_, second) = svc.create(second_draft).await.expect("second create");

    assert_eq!(first.email, "nico.robin1@example.com");
    assert_eq!(second.email, "nico.robin2@example.com");
}

#[tokio::test]
async fn duplicate_id_no_is_rejected_without_writes() {
    let svc = service().await;
    svc.create(nico()).await.expect("first create");

    let mut dup = nico();
    dup.name = Some("Tony Chopper".to_string());
    let errors = expect_validation(svc.create(dup).await.expect_err("must fail"));
    assert!(errors.contains("id_no"));

    let rows = svc.list().await.expect("list");
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn invalid_fields_and_taken_id_no_report_together() {
    let svc = service().await;
    svc.create(nico()).await.expect("first create");

    let mut bad = nico();
    bad.name = Some("Nico123".to_string());
    let errors = expect_validation(svc.create(bad).await.expect_err("must fail"));
    assert!(errors.contains("name"));
    assert!(errors.contains("id_no"));
}

#[tokio::test]
async fn empty_update_is_a_noop() {
    let svc = service().await;
    let (patient, user) = svc.create(nico()).await.expect("create");

    let (after_patient, after_user) = svc
        .update(patient.id, PatientDraft::default())
        .await
        .expect("empty update");

    assert_eq!(after_patient, patient);
    assert_eq!(after_user, user);
}

#[tokio::test]
async fn updating_id_no_to_its_own_value_succeeds() {
    let svc = service().await;
    let (patient, _) = svc.create(nico()).await.expect("create");

    let draft = PatientDraft {
        id_no: Some("111".to_string()),
        ..Default::default()
    };
    let (_, user) = svc.update(patient.id, draft).await.expect("self update");
    assert_eq!(user.id_no, "111");
}

#[tokio::test]
async fn updating_id_no_to_another_users_value_fails() {
    let svc = service().await;
    svc.create(nico()).await.expect("first create");

    let mut other = nico();
    other.name = Some("Tony Chopper".to_string());
    other.id_no = Some("222".to_string());
    let (other_patient, _) = svc.create(other).await.expect("second create");

    let draft = PatientDraft {
        id_no: Some("111".to_string()),
        ..Default::default()
    };
    let errors = expect_validation(
        svc.update(other_patient.id, draft)
            .await
            .expect_err("must conflict"),
    );
    assert!(errors.contains("id_no"));
}

#[tokio::test]
async fn partial_update_leaves_other_fields_untouched() {
    let svc = service().await;
    let (patient, before) = svc.create(nico()).await.expect("create");

    let draft = PatientDraft {
        address: Some("Alabasta".to_string()),
        medium_acquisition: Some("Referral".to_string()),
        ..Default::default()
    };
    let (after_patient, after_user) = svc.update(patient.id, draft).await.expect("update");

    assert_eq!(after_patient.medium_acquisition, "Referral");
    assert_eq!(after_user.address, "Alabasta");
    assert_eq!(after_user.name, before.name);
    assert_eq!(after_user.email, before.email);
    assert_eq!(after_user.dob, before.dob);
}

#[tokio::test]
async fn update_with_invalid_present_field_persists_nothing() {
    let svc = service().await;
    let (patient, _) = svc.create(nico()).await.expect("create");

    let draft = PatientDraft {
        gender: Some("unknown".to_string()),
        medium_acquisition: Some("Referral".to_string()),
        ..Default::default()
    };
    let errors = expect_validation(svc.update(patient.id, draft).await.expect_err("must fail"));
    assert!(errors.contains("gender"));

    let (unchanged, _) = svc.get(patient.id).await.expect("get");
    assert_eq!(unchanged.medium_acquisition, "Online");
}

#[tokio::test]
async fn missing_patient_maps_to_not_found() {
    let svc = service().await;

    assert!(matches!(
        svc.get(42).await.expect_err("get must fail"),
        DomainError::PatientNotFound { id: 42 }
    ));
    assert!(matches!(
        svc.update(42, PatientDraft::default())
            .await
            .expect_err("update must fail"),
        DomainError::PatientNotFound { id: 42 }
    ));
    assert!(matches!(
        svc.delete(42).await.expect_err("delete must fail"),
        DomainError::PatientNotFound { id: 42 }
    ));
}

#[tokio::test]
async fn delete_removes_both_rows_and_frees_identifiers() {
    let svc = service().await;
    let (patient, _) = svc.create(nico()).await.expect("create");

    svc.delete(patient.id).await.expect("delete");
    assert!(matches!(
        svc.get(patient.id).await.expect_err("gone"),
        DomainError::PatientNotFound { .. }
    ));
    assert!(svc.list().await.expect("list").is_empty());

    // Both the id_no and the generated email are reusable afterwards.
    let (_, user) = svc.create(nico()).await.expect("recreate");
    assert_eq!(user.email, "nico.robin1@example.com");
    assert_eq!(user.id_no, "111");
}

#[tokio::test]
async fn list_returns_patients_with_their_users() {
    let svc = service().await;
    assert!(svc.list().await.expect("empty list").is_empty());

    svc.create(nico()).await.expect("create");
    let mut other = nico();
    other.name = Some("Tony Chopper".to_string());
    other.id_no = Some("222".to_string());
    svc.create(other).await.expect("second create");

    let rows = svc.list().await.expect("list");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].1.name, "Nico Robin");
    assert_eq!(rows[1].1.name, "Tony Chopper");
}
