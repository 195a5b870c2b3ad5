//! `CaseService`: the operations a dashboard page calls.
//!
//! Every operation validates against the schema before touching the store, so
//! an unknown kind or an illegal transition never costs a round trip.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
  Error, Result, ValidationError,
  case::{Case, CaseKind, CasePatch, LegalBasisFlags, NewCase, format_number, parse_sequence},
  deadline::{self, Classification},
  demo::DemoDataset,
  filter::{self, CaseFilter, CaseSummary},
  legal_basis,
  lifecycle,
  repository::{CaseListing, ResilientRepository},
  schema::{CaseSchema, DeadlineField, SchemaRegistry, Tone},
  store::CaseStore,
  subject,
};

/// Classify one deadline; see [`deadline::classify`].
pub fn classify_deadline(
  deadline: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
  due_soon_days: i64,
) -> Classification {
  deadline::classify(deadline, now, due_soon_days)
}

/// Canonical short code for a flag set; see [`legal_basis::encode`].
pub fn encode_legal_basis(flags: &LegalBasisFlags) -> String { legal_basis::encode(flags) }

// ─── CaseView ────────────────────────────────────────────────────────────────

/// A case annotated for display. Everything beyond `case` is derived at the
/// `now` the view was built for.
#[derive(Debug, Clone, Serialize)]
pub struct CaseView {
  #[serde(flatten)]
  pub case:                    Case,
  pub status_label:            &'static str,
  pub status_tone:             Tone,
  pub terminal:                bool,
  pub confirmation:            Classification,
  pub resolution:              Classification,
  /// Classification of the deadline the case is currently working against.
  pub deadline:                Classification,
  pub legal_basis_code:        String,
  pub legal_basis_description: String,
  pub permitted_transitions:   Vec<&'static str>,
}

impl CaseView {
  pub fn new(schema: &CaseSchema, case: Case, now: DateTime<Utc>) -> Result<Self> {
    let status = schema.status(&case.status).ok_or_else(|| Error::UnknownStatus {
      kind:   case.kind,
      status: case.status.clone(),
    })?;

    let deadline = match filter::active_deadline(schema, &case) {
      Some((field, at)) => deadline::classify(Some(at), now, schema.threshold(field)),
      None => Classification::NONE,
    };

    Ok(Self {
      status_label: status.label,
      status_tone: status.tone,
      terminal: schema.is_terminal(status.id),
      confirmation: deadline::classify(
        case.confirmation_deadline,
        now,
        schema.threshold(DeadlineField::Confirmation),
      ),
      resolution: deadline::classify(
        case.resolution_deadline,
        now,
        schema.threshold(DeadlineField::Resolution),
      ),
      deadline,
      legal_basis_code: legal_basis::encode(&case.legal_basis),
      legal_basis_description: legal_basis::describe(&case.legal_basis, schema.legal_basis_fields),
      permitted_transitions: lifecycle::permitted_transitions(schema, status.id),
      case,
    })
  }
}

// ─── CaseService ─────────────────────────────────────────────────────────────

pub struct CaseService<S> {
  registry:   Arc<SchemaRegistry>,
  repository: ResilientRepository<S>,
}

impl<S: CaseStore> CaseService<S> {
  /// A service over `store` with the built-in schemas and demo data.
  pub fn new(store: S) -> Self {
    Self {
      registry:   SchemaRegistry::builtin(),
      repository: ResilientRepository::new(store),
    }
  }

  pub fn with_registry(mut self, registry: Arc<SchemaRegistry>) -> Self {
    self.registry = registry;
    self
  }

  /// Bound every live-store call by `timeout`.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.repository = self.repository.with_timeout(timeout);
    self
  }

  pub fn with_demo(mut self, demo: Arc<DemoDataset>) -> Self {
    self.repository = self.repository.with_demo(demo);
    self
  }

  pub fn registry(&self) -> &SchemaRegistry { &self.registry }

  pub fn repository(&self) -> &ResilientRepository<S> { &self.repository }

  pub async fn list_cases(&self, kind: CaseKind, org_id: &str) -> Result<CaseListing> {
    self.registry.get(kind)?;
    Ok(self.repository.list(kind, org_id).await)
  }

  /// A case from the live store.
  pub async fn get_case(&self, id: Uuid) -> Result<Case> {
    self.repository.get(id).await?.ok_or(Error::CaseNotFound(id))
  }

  /// Create a case in its kind's initial status, with a fresh number and the
  /// initial status's deadlines.
  pub async fn create_case(&self, new: NewCase, now: DateTime<Utc>) -> Result<Case> {
    let schema = self.registry.get(new.kind)?;

    let mut case = Case {
      id: Uuid::new_v4(),
      kind: new.kind,
      org_id: new.org_id,
      number: String::new(),
      created_at: now,
      updated_at: now,
      status: String::new(),
      title: new.title,
      description: new.description,
      category: new.category,
      is_anonymous: new.is_anonymous,
      subject: subject::normalize(new.subject),
      legal_basis: new.legal_basis,
      confirmation_deadline: None,
      resolution_deadline: None,
      responsible_party: new.responsible_party,
      resolution_notes: None,
      rejection_reason: None,
      attachments: new.attachments,
    };
    lifecycle::check_write_constraints(&case)?;

    case.number = self.next_number(schema, &case.org_id, now).await?;
    lifecycle::initialize(schema, &mut case, now)?;
    self.repository.create(case).await
  }

  async fn next_number(&self, schema: &CaseSchema, org_id: &str, now: DateTime<Utc>) -> Result<String> {
    let year = now.year();
    let last = self
      .repository
      .live_select(schema.kind, org_id)
      .await?
      .iter()
      .filter_map(|c| parse_sequence(&c.number, schema.number_prefix, year))
      .max()
      .unwrap_or(0);
    Ok(format_number(schema.number_prefix, year, last + 1))
  }

  /// Edit the non-lifecycle fields of a live case. Terminal cases are
  /// read-only.
  pub async fn update_case(&self, id: Uuid, patch: CasePatch, now: DateTime<Utc>) -> Result<Case> {
    let mut case = self.get_case(id).await?;
    let schema = self.registry.get(case.kind)?;
    if schema.is_terminal(&case.status) {
      return Err(ValidationError::Terminal(case.status).into());
    }

    patch.apply(&mut case);
    lifecycle::check_write_constraints(&case)?;
    case.updated_at = now;
    self.repository.update(case).await
  }

  /// Move the live record behind `case` to `to` and persist the result.
  ///
  /// The transition is applied to the stored copy, so deadlines and other
  /// fields edited on `case` in memory are ignored; edits go through
  /// [`Self::update_case`]. A copy whose kind or status no longer matches the
  /// store is rejected as stale. Nothing is written when the transition is
  /// rejected.
  pub async fn transition_case(&self, case: &Case, to: &str, now: DateTime<Utc>) -> Result<Case> {
    let stored = self.get_case(case.id).await?;
    if stored.kind != case.kind {
      return Err(ValidationError::Stale("kind").into());
    }
    if stored.status != case.status {
      return Err(ValidationError::Stale("status").into());
    }

    let next = lifecycle::apply_transition(&self.registry, &stored, to, now)?;
    self.repository.update(next).await
  }

  pub async fn delete_case(&self, id: Uuid) -> Result<()> { self.repository.delete(id).await }

  pub fn filter_cases(&self, cases: &[Case], filter: &CaseFilter, now: DateTime<Utc>) -> Vec<Case> {
    filter::filter(cases, filter, &self.registry, now)
  }

  pub fn view(&self, case: Case, now: DateTime<Utc>) -> Result<CaseView> {
    CaseView::new(self.registry.get(case.kind)?, case, now)
  }

  /// Views for every displayable case. A case whose status is not registered
  /// for its kind is logged and left out instead of failing the listing.
  pub fn views(&self, cases: Vec<Case>, now: DateTime<Utc>) -> Vec<CaseView> {
    cases
      .into_iter()
      .filter_map(|case| {
        let id = case.id;
        match self.view(case, now) {
          Ok(view) => Some(view),
          Err(err) => {
            warn!(%id, error = %err, "skipping case that cannot be displayed");
            None
          }
        }
      })
      .collect()
  }

  pub fn summarize(&self, cases: &[Case], now: DateTime<Utc>) -> CaseSummary {
    filter::summarize(cases, &self.registry, now)
  }

  pub fn can_transition(&self, kind: CaseKind, from: &str, to: &str) -> bool {
    lifecycle::can_transition(&self.registry, kind, from, to)
  }
}
