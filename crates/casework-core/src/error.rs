//! Error types for `casework-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{case::CaseKind, repository::StoreOp, schema::RequiredField};

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown case kind: {0:?}")]
  UnknownCaseKind(String),

  #[error("status {status:?} is not registered for {kind}")]
  UnknownStatus { kind: CaseKind, status: String },

  #[error("illegal transition for {kind}: {from} -> {to}")]
  IllegalTransition {
    kind: CaseKind,
    from: String,
    to:   String,
  },

  #[error("validation failed: {0}")]
  Validation(#[from] ValidationError),

  #[error("case not found: {0}")]
  CaseNotFound(Uuid),

  /// The live store rejected a write (or a write-path read), or timed out.
  /// Never produced by [`crate::repository::ResilientRepository::list`].
  #[error("live store {op} failed: {reason}")]
  RepositoryWrite { op: StoreOp, reason: String },

  #[error("deadline for {field} falls outside the representable date range")]
  DeadlineOutOfRange { field: &'static str },
}

/// A case failed a write-time constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("status {status:?} requires {field}")]
  MissingField { status: String, field: RequiredField },

  #[error("anonymous cases cannot carry subject contact details")]
  AnonymousWithSubject,

  #[error("title must not be empty")]
  EmptyTitle,

  #[error("case is in terminal status {0:?} and is read-only")]
  Terminal(String),

  /// The caller's copy no longer matches the live record.
  #[error("case {0} changed since it was loaded")]
  Stale(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
