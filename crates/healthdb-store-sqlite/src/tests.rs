//! Integration tests for `SqliteStore` against an in-memory database.

use healthdb_core::{
  entity::{Condition, Encounter, Medication, Organization, Patient, Provider},
  row::Row,
  schema::{Table, navigate},
  store::ClinicalStore,
  terminology::{Degree, Terminology},
  value::Stored,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn patient(s: &SqliteStore) -> Uuid {
  s.insert_entity(Patient {
    first_name: Some("Ada".into()),
    last_name: Some("Byron".into()),
    state: Some("NY".into()),
    ..Default::default()
  })
  .await
  .unwrap()
}

async fn encounter(s: &SqliteStore, patient_id: Uuid) -> Uuid {
  s.insert(Table::Encounter, Row::new().with("patient_id", patient_id))
    .await
    .unwrap()
}

// ─── Referential integrity ───────────────────────────────────────────────────

#[tokio::test]
async fn encounter_without_patient_is_rejected() {
  let s = store().await;
  let err = s.insert(Table::Encounter, Row::new()).await.unwrap_err();
  assert!(err.is_constraint(), "{err}");
  assert_eq!(s.count(Table::Encounter).await.unwrap(), 0);
}

#[tokio::test]
async fn encounter_with_unknown_patient_is_rejected() {
  let s = store().await;
  let err = s
    .insert(Table::Encounter, Row::new().with("patient_id", Uuid::new_v4()))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Constraint(_)), "{err}");
}

#[tokio::test]
async fn encounter_with_patient_is_accepted() {
  let s = store().await;
  let p = patient(&s).await;
  let e = encounter(&s, p).await;
  let row = s.get(Table::Encounter, e).await.unwrap().unwrap();
  assert_eq!(row.uuid("patient_id").unwrap(), Some(p));
}

#[tokio::test]
async fn condition_requires_an_encounter() {
  let s = store().await;
  let err = s
    .insert(Table::Condition, Row::new().with("code", "44054006"))
    .await
    .unwrap_err();
  assert!(err.is_constraint());
}

#[tokio::test]
async fn meta_record_target_is_not_checked() {
  let s = store().await;
  let id = s
    .insert(
      Table::MetaRecord,
      Row::new()
        .with("task_id", "load-1")
        .with("target_entity", "patient")
        .with("target_id", Uuid::new_v4()),
    )
    .await
    .unwrap();
  let row = s.get(Table::MetaRecord, id).await.unwrap().unwrap();
  assert!(row.timestamp("entry_date").unwrap().is_some());
}

#[tokio::test]
async fn external_id_is_unique() {
  let s = store().await;
  let p = patient(&s).await;
  let row = || Row::new().with("patient_id", p).with("external_id", "enc-1");
  s.insert(Table::Encounter, row()).await.unwrap();
  let err = s.insert(Table::Encounter, row()).await.unwrap_err();
  assert!(err.is_constraint());
}

#[tokio::test]
async fn dictionary_code_is_required() {
  let s = store().await;
  let err = s
    .insert(Table::Snomed, Row::new().with("description", "Diabetes"))
    .await
    .unwrap_err();
  assert!(err.is_constraint());
}

// ─── Column checks ───────────────────────────────────────────────────────────

#[tokio::test]
async fn phone_check_rejects_raw_sql() {
  let s = store().await;
  let result = s
    .conn
    .call(|conn| {
      conn.execute(
        "INSERT INTO \"payer\" (\"id\", \"phone\") VALUES (?1, ?2)",
        rusqlite::params![Uuid::new_v4().to_string(), "555-0100"],
      )?;
      Ok(())
    })
    .await;
  assert!(Error::from(result.unwrap_err()).is_constraint());
}

#[tokio::test]
async fn enum_check_rejects_raw_sql() {
  let s = store().await;
  let result = s
    .conn
    .call(|conn| {
      conn.execute(
        "INSERT INTO \"provider\" (\"id\", \"degree\") VALUES (?1, 'PHD')",
        rusqlite::params![Uuid::new_v4().to_string()],
      )?;
      Ok(())
    })
    .await;
  assert!(Error::from(result.unwrap_err()).is_constraint());
}

#[tokio::test]
async fn bad_phone_never_reaches_the_database() {
  let s = store().await;
  let err = s
    .insert(Table::Payer, Row::new().with("phone", "555-0100"))
    .await
    .unwrap_err();
  assert!(matches!(&err, Error::Core(e) if e.is_format()), "{err}");
  assert_eq!(s.count(Table::Payer).await.unwrap(), 0);
}

#[tokio::test]
async fn negative_phone_number_is_a_format_error() {
  let s = store().await;
  let err = s
    .insert(Table::Payer, Row::new().with("phone", -800_555_010_i64))
    .await
    .unwrap_err();
  assert!(matches!(&err, Error::Core(e) if e.is_format()), "{err}");
  assert!(!err.is_constraint());
}

// ─── Batches ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_accepts_children_before_parents() {
  let s = store().await;
  let patient_id = Uuid::new_v4();
  let encounter_id = Uuid::new_v4();

  let ids = s
    .insert_batch(vec![
      (
        Table::Condition,
        Row::new()
          .with("encounter_id", encounter_id)
          .with("term", Terminology::Snomed)
          .with("code", "44054006"),
      ),
      (
        Table::Encounter,
        Row::new().with("id", encounter_id).with("patient_id", patient_id),
      ),
      (Table::Patient, Row::new().with("id", patient_id)),
    ])
    .await
    .unwrap();

  assert_eq!(ids.len(), 3);
  assert_eq!(ids[1], encounter_id);
  assert_eq!(ids[2], patient_id);
  assert_eq!(s.count(Table::Condition).await.unwrap(), 1);
}

#[tokio::test]
async fn batch_with_missing_parent_fails_at_commit() {
  let s = store().await;
  let err = s
    .insert_batch(vec![
      (Table::Patient, Row::new()),
      (Table::Encounter, Row::new().with("patient_id", Uuid::new_v4())),
    ])
    .await
    .unwrap_err();
  assert!(err.is_constraint(), "{err}");

  // Nothing from the failed batch survives, and the connection is usable.
  assert_eq!(s.count(Table::Patient).await.unwrap(), 0);
  patient(&s).await;
  assert_eq!(s.count(Table::Patient).await.unwrap(), 1);
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(Table::Patient, Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn get_returns_bound_values() {
  let s = store().await;
  let id = s
    .insert(
      Table::Organization,
      Row::new()
        .with("name", "Mercy General")
        .with("phone", "+1 (212) 555-0199")
        .with("zipcode", "10001"),
    )
    .await
    .unwrap();
  let row = s.get(Table::Organization, id).await.unwrap().unwrap();
  assert_eq!(row.get("phone"), Some(&Stored::Text("2125550199".into())));
  assert_eq!(row.get("street"), Some(&Stored::Null));
  assert_eq!(row.id().unwrap(), id);
}

#[tokio::test]
async fn entity_round_trip() {
  let s = store().await;
  let p = patient(&s).await;
  let e = encounter(&s, p).await;

  let medication = Medication {
    encounter_id: Some(e),
    term: Some(Terminology::RxNorm),
    code: Some("197361".into()),
    dispenses: Some(30),
    ..Default::default()
  };
  let id = s.insert_entity(medication.clone()).await.unwrap();
  let fetched: Medication = s.get_entity(id).await.unwrap().unwrap();
  assert_eq!(fetched, Medication { id: Some(id), ..medication });

  let ada: Patient = s.get_entity(p).await.unwrap().unwrap();
  assert_eq!(ada.first_name.as_deref(), Some("Ada"));
  assert!(s.get_entity::<Encounter>(p).await.unwrap().is_none());
}

#[tokio::test]
async fn rows_get_distinct_ids() {
  let s = store().await;
  let a = s.insert(Table::Payer, Row::new()).await.unwrap();
  let b = s.insert(Table::Payer, Row::new()).await.unwrap();
  assert_ne!(a, b);
  assert_eq!(s.count(Table::Payer).await.unwrap(), 2);
}

// ─── Navigation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn follow_both_directions() {
  let s = store().await;
  let org = s
    .insert_entity(Organization {
      name: Some("Mercy General".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  for name in ["Dr. Grey", "Dr. Yang"] {
    s.insert_entity(Provider {
      organization_id: Some(org),
      name: Some(name.into()),
      degree: Some(Degree::Md),
      ..Default::default()
    })
    .await
    .unwrap();
  }
  let unattached = s.insert_entity(Provider::default()).await.unwrap();

  let providers = navigate(Table::Organization, "providers").unwrap();
  let rows = s.follow(providers, org).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert!(rows.iter().all(|r| r.table() == Table::Provider));

  let up = providers.reverse();
  let parent = s.follow(up, rows[0].id().unwrap()).await.unwrap();
  assert_eq!(parent.len(), 1);
  assert_eq!(parent[0].id().unwrap(), org);
  assert_eq!(parent[0].text("name").unwrap().as_deref(), Some("Mercy General"));

  assert!(s.follow(up, unattached).await.unwrap().is_empty());
}

#[tokio::test]
async fn follow_encounter_to_facts() {
  let s = store().await;
  let p = patient(&s).await;
  let e = encounter(&s, p).await;
  let c = s
    .insert_entity(Condition {
      encounter_id: Some(e),
      patient_id: Some(p),
      term: Some(Terminology::Snomed),
      code: Some("44054006".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  s.insert_entity(Medication {
    encounter_id: Some(e),
    condition_id: Some(c),
    ..Default::default()
  })
  .await
  .unwrap();

  let conditions = navigate(Table::Encounter, "conditions").unwrap();
  let found = s.follow(conditions, e).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].id().unwrap(), c);

  let treated_by = navigate(Table::Condition, "medications").unwrap();
  assert_eq!(s.follow(treated_by, c).await.unwrap().len(), 1);

  let encounters = navigate(Table::Patient, "encounters").unwrap();
  assert_eq!(s.follow(encounters, p).await.unwrap().len(), 1);
}
