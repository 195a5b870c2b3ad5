//! Integration tests for `SqliteStore` against an in-memory database.

use casework_core::{
  CaseService,
  case::{Case, CaseKind, CasePatch, LegalBasisFlags, NewCase},
  repository::Source,
  store::CaseStore,
  subject::SubjectContact,
};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2025, 2, 14, 8, 15, 30).unwrap() }

fn case(kind: CaseKind, org_id: &str, number: &str) -> Case {
  Case {
    id: Uuid::new_v4(),
    kind,
    org_id: org_id.into(),
    number: number.into(),
    created_at: t0(),
    updated_at: t0(),
    status: "received".into(),
    title: format!("Case {number}"),
    description: None,
    category: None,
    is_anonymous: false,
    subject: None,
    legal_basis: LegalBasisFlags::new(),
    confirmation_deadline: None,
    resolution_deadline: None,
    responsible_party: None,
    resolution_notes: None,
    rejection_reason: None,
    attachments: vec![],
  }
}

// ─── Round trips ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_preserves_every_field() {
  let s = store().await;

  let mut c = case(CaseKind::GdprRightForgotten, "org-1", "GDPR17-2025-001");
  c.description = Some("Please delete my account".into());
  c.category = Some("customers".into());
  c.subject = Some(SubjectContact {
    name: Some("Ana Novak".into()),
    email: Some("ana.novak@example.si".into()),
    ..Default::default()
  });
  c.legal_basis = [("17(1)(a)".to_owned(), true), ("17(1)(b)".to_owned(), false)].into();
  c.confirmation_deadline = Some(t0() + TimeDelta::days(3));
  c.resolution_deadline = Some(t0() + TimeDelta::days(28) + TimeDelta::microseconds(250));
  c.attachments = vec!["att/1.pdf".into(), "att/2.png".into()];

  let inserted = s.insert(c.clone()).await.unwrap();
  assert_eq!(inserted, c);

  let fetched = s.get(c.id).await.unwrap().unwrap();
  assert_eq!(fetched, c);
}

#[tokio::test]
async fn insert_returns_timestamps_at_storage_precision() {
  let s = store().await;

  let at = t0() + TimeDelta::nanoseconds(123_456_789);
  let mut c = case(CaseKind::SupportTicket, "org-1", "SUP-2025-001");
  c.created_at = at;
  c.updated_at = at;

  let inserted = s.insert(c.clone()).await.unwrap();
  assert_eq!(inserted.created_at, t0() + TimeDelta::microseconds(123_456));
  assert_ne!(inserted, c);
  assert_eq!(s.get(c.id).await.unwrap().unwrap(), inserted);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn select_is_scoped_by_kind_and_org() {
  let s = store().await;
  s.insert(case(CaseKind::WhistleblowerReport, "org-1", "ZZPRI-2025-001")).await.unwrap();
  s.insert(case(CaseKind::WhistleblowerReport, "org-2", "ZZPRI-2025-001")).await.unwrap();
  s.insert(case(CaseKind::GdprRightForgotten, "org-1", "GDPR17-2025-001")).await.unwrap();

  let rows = s.select(CaseKind::WhistleblowerReport, "org-1".into()).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].org_id, "org-1");
  assert_eq!(rows[0].kind, CaseKind::WhistleblowerReport);
}

#[tokio::test]
async fn select_returns_newest_first() {
  let s = store().await;
  let mut older = case(CaseKind::SupportTicket, "org-1", "TICKET-2025-001");
  older.status = "open".into();
  let mut newer = case(CaseKind::SupportTicket, "org-1", "TICKET-2025-002");
  newer.status = "open".into();
  newer.created_at = t0() + TimeDelta::hours(1);

  s.insert(older).await.unwrap();
  s.insert(newer).await.unwrap();

  let numbers: Vec<String> = s
    .select(CaseKind::SupportTicket, "org-1".into())
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.number)
    .collect();
  assert_eq!(numbers, ["TICKET-2025-002", "TICKET-2025-001"]);
}

// ─── Writes ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_number_in_one_org_is_rejected() {
  let s = store().await;
  s.insert(case(CaseKind::WhistleblowerReport, "org-1", "ZZPRI-2025-001")).await.unwrap();
  let err = s
    .insert(case(CaseKind::WhistleblowerReport, "org-1", "ZZPRI-2025-001"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Database(_)));
}

#[tokio::test]
async fn anonymous_row_with_subject_violates_check() {
  let s = store().await;
  let mut c = case(CaseKind::WhistleblowerReport, "org-1", "ZZPRI-2025-001");
  c.is_anonymous = true;
  c.subject = Some(SubjectContact {
    email: Some("jana@example.si".into()),
    ..Default::default()
  });
  assert!(s.insert(c).await.is_err());
}

#[tokio::test]
async fn update_replaces_mutable_fields_only() {
  let s = store().await;
  let c = case(CaseKind::WhistleblowerReport, "org-1", "ZZPRI-2025-001");
  s.insert(c.clone()).await.unwrap();

  let mut edited = c.clone();
  edited.status = "acknowledged".into();
  edited.updated_at = t0() + TimeDelta::days(1);
  edited.number = "ZZPRI-2025-999".into();
  edited.responsible_party = Some("Trustee".into());

  let stored = s.update(edited).await.unwrap().unwrap();
  assert_eq!(stored.status, "acknowledged");
  assert_eq!(stored.responsible_party.as_deref(), Some("Trustee"));
  assert_eq!(stored.number, c.number);
  assert_eq!(stored.created_at, c.created_at);
}

#[tokio::test]
async fn update_missing_returns_none() {
  let s = store().await;
  let c = case(CaseKind::WhistleblowerReport, "org-1", "ZZPRI-2025-001");
  assert!(s.update(c).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_reports_whether_a_row_existed() {
  let s = store().await;
  let c = case(CaseKind::DecisionLog, "org-1", "NIS2-2025-001");
  s.insert(c.clone()).await.unwrap();

  assert!(s.delete(c.id).await.unwrap());
  assert!(!s.delete(c.id).await.unwrap());
  assert!(s.get(c.id).await.unwrap().is_none());
}

// ─── Through the engine ──────────────────────────────────────────────────────

#[tokio::test]
async fn service_lifecycle_against_sqlite() {
  let service = CaseService::new(store().await);

  let empty = service
    .list_cases(CaseKind::WhistleblowerReport, "org-1")
    .await
    .unwrap();
  assert_eq!(empty.source, Source::Demo);

  let new = NewCase {
    is_anonymous: true,
    category: Some("korupcija".into()),
    ..NewCase::new(CaseKind::WhistleblowerReport, "org-1", "Kickbacks in procurement")
  };
  let created = service.create_case(new, t0()).await.unwrap();
  assert_eq!(created.number, "ZZPRI-2025-001");

  let listing = service
    .list_cases(CaseKind::WhistleblowerReport, "org-1")
    .await
    .unwrap();
  assert_eq!(listing.source, Source::Live);
  assert_eq!(listing.items, [created.clone()]);

  let patched = service
    .update_case(
      created.id,
      CasePatch {
        responsible_party: Some("Whistle-blowing trustee".into()),
        ..Default::default()
      },
      t0(),
    )
    .await
    .unwrap();
  let acknowledged = service
    .transition_case(&patched, "acknowledged", t0() + TimeDelta::days(1))
    .await
    .unwrap();
  let investigating = service
    .transition_case(&acknowledged, "investigating", t0() + TimeDelta::days(2))
    .await
    .unwrap();
  assert_eq!(service.get_case(created.id).await.unwrap(), investigating);

  let second = service
    .create_case(
      NewCase::new(CaseKind::WhistleblowerReport, "org-1", "Harassment"),
      t0(),
    )
    .await
    .unwrap();
  assert_eq!(second.number, "ZZPRI-2025-002");

  service.delete_case(created.id).await.unwrap();
  service.delete_case(second.id).await.unwrap();
  let after = service
    .list_cases(CaseKind::WhistleblowerReport, "org-1")
    .await
    .unwrap();
  assert_eq!(after.source, Source::Demo);
}
