//! Resilient Case Repository.
//!
//! Reads prefer the live [`CaseStore`] and fall back to the [`DemoDataset`]
//! when the store is empty, fails, or does not answer within the timeout. A
//! listing is never an error: the fallback is reported as a [`ReadAdvisory`]
//! next to the items. Writes go to the live store only and fail loudly.

use std::{fmt, future::Future, sync::Arc, time::Duration};

use serde::Serialize;
use strum::Display;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  case::{Case, CaseKind},
  demo::DemoDataset,
  store::CaseStore,
};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// The live-store operation a [`Error::RepositoryWrite`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StoreOp {
  Select,
  Get,
  Insert,
  Update,
  Delete,
}

/// Where the items of a [`CaseListing`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Source {
  Live,
  Demo,
}

/// Why a listing is not live data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ReadAdvisory {
  EmptyLiveStore { kind: CaseKind },
  Unreachable { kind: CaseKind, error: String },
  TimedOut { kind: CaseKind, after_ms: u64 },
}

impl ReadAdvisory {
  pub fn kind(&self) -> CaseKind {
    match self {
      Self::EmptyLiveStore { kind }
      | Self::Unreachable { kind, .. }
      | Self::TimedOut { kind, .. } => *kind,
    }
  }
}

impl fmt::Display for ReadAdvisory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::EmptyLiveStore { kind } => {
        write!(f, "no {kind} cases stored yet; showing demo data")
      }
      Self::Unreachable { kind, error } => {
        write!(f, "could not load {kind} cases ({error}); showing demo data")
      }
      Self::TimedOut { kind, after_ms } => {
        write!(f, "loading {kind} cases timed out after {after_ms} ms; showing demo data")
      }
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseListing {
  pub items:    Vec<Case>,
  pub source:   Source,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub advisory: Option<ReadAdvisory>,
}

impl CaseListing {
  fn live(items: Vec<Case>) -> Self {
    Self {
      items,
      source: Source::Live,
      advisory: None,
    }
  }
}

// ─── Repository ──────────────────────────────────────────────────────────────

pub struct ResilientRepository<S> {
  store:   S,
  demo:    Arc<DemoDataset>,
  timeout: Duration,
}

impl<S: CaseStore> ResilientRepository<S> {
  pub fn new(store: S) -> Self {
    Self {
      store,
      demo: DemoDataset::builtin(),
      timeout: DEFAULT_FETCH_TIMEOUT,
    }
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn with_demo(mut self, demo: Arc<DemoDataset>) -> Self {
    self.demo = demo;
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn demo(&self) -> &DemoDataset { &self.demo }

  pub fn timeout(&self) -> Duration { self.timeout }

  fn timeout_ms(&self) -> u64 { u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX) }

  /// Load the cases of `kind` for `org_id`.
  ///
  /// Live data wins whenever the store returns at least one case. Otherwise
  /// the demo cases of `kind` are returned together with the reason.
  pub async fn list(&self, kind: CaseKind, org_id: &str) -> CaseListing {
    let advisory = match timeout(self.timeout, self.store.select(kind, org_id.to_owned())).await {
      Ok(Ok(items)) if !items.is_empty() => {
        debug!(%kind, org_id, count = items.len(), "served live cases");
        return CaseListing::live(items);
      }
      Ok(Ok(_)) => ReadAdvisory::EmptyLiveStore { kind },
      Ok(Err(e)) => ReadAdvisory::Unreachable {
        kind,
        error: e.to_string(),
      },
      Err(_) => ReadAdvisory::TimedOut {
        kind,
        after_ms: self.timeout_ms(),
      },
    };
    self.fallback(advisory)
  }

  fn fallback(&self, advisory: ReadAdvisory) -> CaseListing {
    let kind = advisory.kind();
    let demo = self.demo.cases(kind);

    if demo.is_empty() {
      if matches!(advisory, ReadAdvisory::EmptyLiveStore { .. }) {
        return CaseListing::live(Vec::new());
      }
      warn!(%kind, %advisory, "live store unavailable and no demo data for kind");
      return CaseListing {
        items:    Vec::new(),
        source:   Source::Demo,
        advisory: Some(advisory),
      };
    }

    match advisory {
      ReadAdvisory::EmptyLiveStore { .. } => {
        info!(%kind, demo_version = self.demo.version(), "live store empty; serving demo data")
      }
      _ => warn!(%kind, %advisory, demo_version = self.demo.version(), "serving demo data"),
    }
    CaseListing {
      items:    demo.to_vec(),
      source:   Source::Demo,
      advisory: Some(advisory),
    }
  }

  async fn live<T, F>(&self, op: StoreOp, fut: F) -> Result<T>
  where
    F: Future<Output = Result<T, S::Error>>,
  {
    match timeout(self.timeout, fut).await {
      Ok(Ok(value)) => Ok(value),
      Ok(Err(e)) => Err(Error::RepositoryWrite {
        op,
        reason: e.to_string(),
      }),
      Err(_) => Err(Error::RepositoryWrite {
        op,
        reason: format!("timed out after {} ms", self.timeout_ms()),
      }),
    }
  }

  /// Live cases only, without fallback. Used when the result feeds a write
  /// (e.g. allocating the next case number).
  pub async fn live_select(&self, kind: CaseKind, org_id: &str) -> Result<Vec<Case>> {
    self
      .live(StoreOp::Select, self.store.select(kind, org_id.to_owned()))
      .await
  }

  /// Read one case from the live store.
  pub async fn get(&self, id: Uuid) -> Result<Option<Case>> {
    self.live(StoreOp::Get, self.store.get(id)).await
  }

  pub async fn create(&self, case: Case) -> Result<Case> {
    let (id, kind) = (case.id, case.kind);
    let created = self.live(StoreOp::Insert, self.store.insert(case)).await?;
    info!(%id, %kind, number = %created.number, "case created");
    Ok(created)
  }

  pub async fn update(&self, case: Case) -> Result<Case> {
    let id = case.id;
    let updated = self
      .live(StoreOp::Update, self.store.update(case))
      .await?
      .ok_or(Error::CaseNotFound(id))?;
    info!(%id, status = %updated.status, "case updated");
    Ok(updated)
  }

  pub async fn delete(&self, id: Uuid) -> Result<()> {
    if !self.live(StoreOp::Delete, self.store.delete(id)).await? {
      return Err(Error::CaseNotFound(id));
    }
    info!(%id, "case deleted");
    Ok(())
  }
}
