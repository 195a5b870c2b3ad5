//! JSON REST API for Casework.
//!
//! Exposes an axum [`Router`] backed by a [`CaseService`] over any
//! [`CaseStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", casework_api::api_router(state))
//! ```

pub mod cases;
pub mod error;
pub mod schemas;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use casework_core::{
  CaseService,
  clock::{Clock, SystemClock},
  store::CaseStore,
};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub service: Arc<CaseService<S>>,
  /// Source of `now` for deadline classification and status changes.
  pub clock:   Arc<dyn Clock>,
}

impl<S> AppState<S> {
  /// State reading the system clock.
  pub fn new(service: CaseService<S>) -> Self {
    Self {
      service: Arc::new(service),
      clock:   Arc::new(SystemClock),
    }
  }

  pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
    self.clock = Arc::new(clock);
    self
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      service: Arc::clone(&self.service),
      clock:   Arc::clone(&self.clock),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: CaseStore + 'static,
{
  Router::new()
    // Schemas
    .route("/schemas", get(schemas::list::<S>))
    .route("/schemas/{kind}", get(schemas::get_one::<S>))
    // Cases
    .route("/cases", get(cases::list::<S>).post(cases::create::<S>))
    .route("/cases/summary", get(cases::summary::<S>))
    .route(
      "/cases/{id}",
      get(cases::get_one::<S>)
        .patch(cases::update_one::<S>)
        .delete(cases::delete_one::<S>),
    )
    .route("/cases/{id}/transition", post(cases::transition_one::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use casework_core::{
    case::{Case, CaseKind},
    clock::FixedClock,
  };
  use casework_store_sqlite::SqliteStore;
  use chrono::{DateTime, TimeZone, Utc};
  use serde_json::{Value, json};
  use tower::ServiceExt;
  use uuid::Uuid;

  use super::*;

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap() }

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState::new(CaseService::new(store)).with_clock(FixedClock(now()))
  }

  async fn oneshot_json<S: CaseStore + 'static>(
    state:  AppState<S>,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = api_router(state)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  fn anonymous_report() -> Value {
    json!({
      "kind": "whistleblower_report",
      "org_id": "org-1",
      "title": "Kickbacks in IT procurement",
      "category": "korupcija",
      "is_anonymous": true
    })
  }

  // ── Schemas ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn schemas_lists_every_kind() {
    let (status, body) = oneshot_json(make_state().await, "GET", "/schemas", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 6);
  }

  #[tokio::test]
  async fn unknown_schema_is_404() {
    let (status, body) =
      oneshot_json(make_state().await, "GET", "/schemas/tax_audit", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("tax_audit"));
  }

  #[tokio::test]
  async fn schema_exposes_statuses_and_prefix() {
    let (status, body) =
      oneshot_json(make_state().await, "GET", "/schemas/whistleblower_report", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["number_prefix"], "ZZPRI");
    assert_eq!(body["statuses"][0]["id"], "received");
  }

  // ── Listing ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn empty_store_lists_demo_cases_with_advisory() {
    let (status, body) = oneshot_json(
      make_state().await,
      "GET",
      "/cases?kind=gdpr_right_forgotten&org_id=org-1",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "demo");
    assert_eq!(body["items"].as_array().unwrap().len(), 7);
    assert_eq!(body["advisory"]["reason"], "empty_live_store");
    assert!(body["advisory"]["message"].as_str().unwrap().contains("demo"));
  }

  #[tokio::test]
  async fn listing_unknown_kind_is_404() {
    let (status, _) =
      oneshot_json(make_state().await, "GET", "/cases?kind=tax_audit&org_id=org-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn bad_deadline_bucket_is_400() {
    let (status, _) = oneshot_json(
      make_state().await,
      "GET",
      "/cases?kind=whistleblower_report&org_id=org-1&deadline=someday",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn listing_filters_created_cases() {
    let state = make_state().await;
    oneshot_json(state.clone(), "POST", "/cases", Some(anonymous_report())).await;
    let mut other = anonymous_report();
    other["title"] = json!("Harassment in logistics");
    other["category"] = json!("mobing");
    oneshot_json(state.clone(), "POST", "/cases", Some(other)).await;

    let (status, body) = oneshot_json(
      state.clone(),
      "GET",
      "/cases?kind=whistleblower_report&org_id=org-1&category=MOBING&deadline=normal",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "live");
    assert!(body.get("advisory").is_none());
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Harassment in logistics");

    let (_, summary) = oneshot_json(
      state,
      "GET",
      "/cases/summary?kind=whistleblower_report&org_id=org-1",
      None,
    )
    .await;
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["by_status"]["received"], 2);
    assert_eq!(summary["source"], "live");
  }

  #[tokio::test]
  async fn listing_skips_rows_with_unregistered_status() {
    let state = make_state().await;
    let (_, created) = oneshot_json(state.clone(), "POST", "/cases", Some(anonymous_report())).await;

    let mut stray: Case = serde_json::from_value(created.clone()).unwrap();
    stray.id = Uuid::new_v4();
    stray.number = "ZZPRI-2025-099".into();
    stray.status = "verifying".into();
    state.service.repository().store().insert(stray).await.unwrap();

    let (status, body) = oneshot_json(
      state,
      "GET",
      "/cases?kind=whistleblower_report&org_id=org-1",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "live");
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], created["id"]);
  }

  // ── Writes ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_returns_201_with_annotations() {
    let (status, body) =
      oneshot_json(make_state().await, "POST", "/cases", Some(anonymous_report())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["number"], "ZZPRI-2025-001");
    assert_eq!(body["status"], "received");
    assert_eq!(body["status_label"], "Received");
    assert_eq!(body["deadline"]["bucket"], "normal");
    assert_eq!(body["deadline"]["days_delta"], 7);
    assert_eq!(body["legal_basis_code"], "-");
    assert_eq!(body["permitted_transitions"], json!(["acknowledged", "rejected"]));
  }

  #[tokio::test]
  async fn anonymous_with_subject_is_422() {
    let mut report = anonymous_report();
    report["subject"] = json!({ "email": "jana@example.si" });
    let (status, body) = oneshot_json(make_state().await, "POST", "/cases", Some(report)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("anonymous"));
  }

  #[tokio::test]
  async fn transitions_map_to_status_codes() {
    let state = make_state().await;
    let (_, created) = oneshot_json(state.clone(), "POST", "/cases", Some(anonymous_report())).await;
    let id = created["id"].as_str().unwrap().to_owned();
    let uri = format!("/cases/{id}/transition");

    let (status, _) =
      oneshot_json(state.clone(), "POST", &uri, Some(json!({ "to": "resolved" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) =
      oneshot_json(state.clone(), "POST", &uri, Some(json!({ "to": "acknowledged" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "acknowledged");

    let (status, _) =
      oneshot_json(state.clone(), "POST", &uri, Some(json!({ "to": "received" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) =
      oneshot_json(state.clone(), "POST", &uri, Some(json!({ "to": "investigating" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = oneshot_json(
      state.clone(),
      "PATCH",
      &format!("/cases/{id}"),
      Some(json!({ "responsible_party": "Whistle-blowing trustee" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["responsible_party"], "Whistle-blowing trustee");

    let (status, body) =
      oneshot_json(state, "POST", &uri, Some(json!({ "to": "investigating" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "investigating");
  }

  #[tokio::test]
  async fn delete_then_get_is_404() {
    let state = make_state().await;
    let (_, created) = oneshot_json(state.clone(), "POST", "/cases", Some(anonymous_report())).await;
    let uri = format!("/cases/{}", created["id"].as_str().unwrap());

    let (status, _) = oneshot_json(state.clone(), "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = oneshot_json(state.clone(), "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = oneshot_json(state.clone(), "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = oneshot_json(state, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Unreachable store ────────────────────────────────────────────────────────

  #[derive(Debug, thiserror::Error)]
  #[error("connection refused")]
  struct Refused;

  /// A store that is always down.
  struct DownStore;

  impl CaseStore for DownStore {
    type Error = Refused;

    async fn select(&self, _: CaseKind, _: String) -> Result<Vec<Case>, Refused> { Err(Refused) }

    async fn get(&self, _: Uuid) -> Result<Option<Case>, Refused> { Err(Refused) }

    async fn insert(&self, _: Case) -> Result<Case, Refused> { Err(Refused) }

    async fn update(&self, _: Case) -> Result<Option<Case>, Refused> { Err(Refused) }

    async fn delete(&self, _: Uuid) -> Result<bool, Refused> { Err(Refused) }
  }

  fn down_state() -> AppState<DownStore> {
    AppState::new(CaseService::new(DownStore)).with_clock(FixedClock(now()))
  }

  #[tokio::test]
  async fn down_store_still_lists_demo_data() {
    let (status, body) = oneshot_json(
      down_state(),
      "GET",
      "/cases?kind=whistleblower_report&org_id=org-1",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "demo");
    assert_eq!(body["advisory"]["reason"], "unreachable");
    assert_eq!(body["advisory"]["error"], "connection refused");
  }

  #[tokio::test]
  async fn down_store_write_is_502() {
    let (status, body) = oneshot_json(down_state(), "POST", "/cases", Some(anonymous_report())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("connection refused"));

    let (status, _) =
      oneshot_json(down_state(), "GET", &format!("/cases/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
  }
}
