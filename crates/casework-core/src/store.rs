//! The `CaseStore` trait: the live data store the engine writes to.
//!
//! The trait is implemented by storage backends (e.g. `casework-store-sqlite`).
//! The engine never talks to a backend directly: reads go through
//! [`crate::repository::ResilientRepository`], which adds the timeout and the
//! demo fallback.

use std::future::Future;

use uuid::Uuid;

use crate::case::{Case, CaseKind};

/// Abstraction over the live case store.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CaseStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All cases of `kind` owned by `org_id`, newest first.
  fn select(
    &self,
    kind: CaseKind,
    org_id: String,
  ) -> impl Future<Output = Result<Vec<Case>, Self::Error>> + Send + '_;

  /// Retrieve a case by id. Returns `None` if not found.
  fn get(&self, id: Uuid) -> impl Future<Output = Result<Option<Case>, Self::Error>> + Send + '_;

  /// Persist a new case. Fails if the id or the (org, number) pair is taken.
  fn insert(&self, case: Case) -> impl Future<Output = Result<Case, Self::Error>> + Send + '_;

  /// Replace the stored record with the same id. Returns `None` if no such
  /// record exists.
  fn update(
    &self,
    case: Case,
  ) -> impl Future<Output = Result<Option<Case>, Self::Error>> + Send + '_;

  /// Delete a case. Returns `false` if it did not exist.
  fn delete(&self, id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
