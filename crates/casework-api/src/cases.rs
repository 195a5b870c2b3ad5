//! Handlers for `/cases` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/cases` | `?kind&org_id` required; optional `text`, `status`, `category`, `deadline` |
//! | `GET`    | `/cases/summary` | `?kind&org_id`; dashboard counts |
//! | `POST`   | `/cases` | Body: [`NewCase`]; returns 201 + the annotated case |
//! | `GET`    | `/cases/{id}` | Live store only |
//! | `PATCH`  | `/cases/{id}` | Body: [`CasePatch`] |
//! | `POST`   | `/cases/{id}/transition` | Body: `{"to":"<status>"}` |
//! | `DELETE` | `/cases/{id}` | 204 |

use std::str::FromStr;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use casework_core::{
  CaseView,
  case::{CasePatch, NewCase},
  deadline::DeadlineBucket,
  filter::{CaseFilter, CaseSummary},
  repository::{ReadAdvisory, Source},
  store::CaseStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// A fallback notice: the machine-readable reason plus the text to show.
#[derive(Debug, Serialize)]
pub struct Advisory {
  pub message: String,
  #[serde(flatten)]
  pub detail:  ReadAdvisory,
}

impl From<ReadAdvisory> for Advisory {
  fn from(detail: ReadAdvisory) -> Self {
    Self {
      message: detail.to_string(),
      detail,
    }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub kind:     String,
  pub org_id:   String,
  pub text:     Option<String>,
  pub status:   Option<String>,
  pub category: Option<String>,
  /// `overdue`, `due_soon` (or `dueSoon`), `normal` or `none`.
  pub deadline: Option<String>,
}

impl ListParams {
  fn filter(&self) -> Result<CaseFilter, ApiError> {
    let deadline = self
      .deadline
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(|s| {
        DeadlineBucket::from_str(s)
          .map_err(|_| ApiError::BadRequest(format!("unknown deadline bucket: {s:?}")))
      })
      .transpose()?;
    Ok(CaseFilter {
      text: self.text.clone(),
      status: self.status.clone(),
      category: self.category.clone(),
      deadline,
    })
  }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
  pub items:    Vec<CaseView>,
  pub source:   Source,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub advisory: Option<Advisory>,
}

/// `GET /cases?kind=<kind>&org_id=<org>[&text=...][&status=...][&category=...][&deadline=...]`
pub async fn list<S: CaseStore + 'static>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
  let kind = state.service.registry().lookup(&params.kind)?.kind;
  let filter = params.filter()?;
  let now = state.clock.now();

  let listing = state.service.list_cases(kind, &params.org_id).await?;
  let matched = state.service.filter_cases(&listing.items, &filter, now);
  let items = state.service.views(matched, now);

  Ok(Json(ListResponse {
    items,
    source: listing.source,
    advisory: listing.advisory.map(Advisory::from),
  }))
}

// ─── Summary ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
  pub kind:   String,
  pub org_id: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
  #[serde(flatten)]
  pub summary:  CaseSummary,
  pub source:   Source,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub advisory: Option<Advisory>,
}

/// `GET /cases/summary?kind=<kind>&org_id=<org>`
pub async fn summary<S: CaseStore + 'static>(
  State(state): State<AppState<S>>,
  Query(params): Query<SummaryParams>,
) -> Result<Json<SummaryResponse>, ApiError> {
  let kind = state.service.registry().lookup(&params.kind)?.kind;
  let listing = state.service.list_cases(kind, &params.org_id).await?;
  Ok(Json(SummaryResponse {
    summary:  state.service.summarize(&listing.items, state.clock.now()),
    source:   listing.source,
    advisory: listing.advisory.map(Advisory::from),
  }))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /cases`
pub async fn create<S: CaseStore + 'static>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewCase>,
) -> Result<impl IntoResponse, ApiError> {
  let now = state.clock.now();
  let case = state.service.create_case(body, now).await?;
  Ok((StatusCode::CREATED, Json(state.service.view(case, now)?)))
}

// ─── Single case ──────────────────────────────────────────────────────────────

/// `GET /cases/{id}`
pub async fn get_one<S: CaseStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CaseView>, ApiError> {
  let case = state.service.get_case(id).await?;
  Ok(Json(state.service.view(case, state.clock.now())?))
}

/// `PATCH /cases/{id}`
pub async fn update_one<S: CaseStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<CasePatch>,
) -> Result<Json<CaseView>, ApiError> {
  let now = state.clock.now();
  let case = state.service.update_case(id, patch, now).await?;
  Ok(Json(state.service.view(case, now)?))
}

#[derive(Debug, Deserialize)]
pub struct TransitionBody {
  pub to: String,
}

/// `POST /cases/{id}/transition`, body: `{"to":"acknowledged"}`
pub async fn transition_one<S: CaseStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<TransitionBody>,
) -> Result<Json<CaseView>, ApiError> {
  let now = state.clock.now();
  let current = state.service.get_case(id).await?;
  let case = state.service.transition_case(&current, &body.to, now).await?;
  Ok(Json(state.service.view(case, now)?))
}

/// `DELETE /cases/{id}`
pub async fn delete_one<S: CaseStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.service.delete_case(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
