//! Handlers for `/schemas` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/schemas` | Every registered kind |
//! | `GET`  | `/schemas/{kind}` | 404 if the kind is unknown |

use axum::{
  Json,
  extract::{Path, State},
};
use casework_core::{schema::CaseSchema, store::CaseStore};

use crate::{AppState, error::ApiError};

/// `GET /schemas`
pub async fn list<S: CaseStore + 'static>(
  State(state): State<AppState<S>>,
) -> Json<Vec<&'static CaseSchema>> {
  Json(state.service.registry().schemas().collect())
}

/// `GET /schemas/{kind}`
pub async fn get_one<S: CaseStore + 'static>(
  State(state): State<AppState<S>>,
  Path(kind): Path<String>,
) -> Result<Json<&'static CaseSchema>, ApiError> {
  Ok(Json(state.service.registry().lookup(&kind)?))
}
