//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use casework_core::Error as EngineError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Engine(#[from] EngineError),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Engine(e) => match e {
        EngineError::UnknownCaseKind(_) | EngineError::CaseNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::IllegalTransition { .. } => StatusCode::CONFLICT,
        EngineError::UnknownStatus { .. } | EngineError::Validation(_) => {
          StatusCode::UNPROCESSABLE_ENTITY
        }
        EngineError::RepositoryWrite { .. } => StatusCode::BAD_GATEWAY,
        EngineError::DeadlineOutOfRange { .. } => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
