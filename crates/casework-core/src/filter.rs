//! Search & Filter Engine.
//!
//! Narrows an already loaded listing in memory. Criteria combine with AND;
//! blank criteria are ignored. Deadline buckets are recomputed for the `now`
//! passed in, never read from the case.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  case::Case,
  deadline::{self, Classification, DeadlineBucket},
  schema::{CaseSchema, DeadlineField, SchemaRegistry},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseFilter {
  /// Case-insensitive substring of number, title or description.
  pub text:     Option<String>,
  pub status:   Option<String>,
  /// Case-insensitive equality.
  pub category: Option<String>,
  pub deadline: Option<DeadlineBucket>,
}

fn criterion(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl CaseFilter {
  pub fn is_empty(&self) -> bool {
    criterion(&self.text).is_none()
      && criterion(&self.status).is_none()
      && criterion(&self.category).is_none()
      && self.deadline.is_none()
  }

  pub fn matches(&self, case: &Case, registry: &SchemaRegistry, now: DateTime<Utc>) -> bool {
    if let Some(text) = criterion(&self.text) {
      let needle = text.to_lowercase();
      let hit = [Some(case.number.as_str()), Some(case.title.as_str()), case.description.as_deref()]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle));
      if !hit {
        return false;
      }
    }

    if let Some(status) = criterion(&self.status)
      && case.status != status
    {
      return false;
    }

    if let Some(category) = criterion(&self.category)
      && !case
        .category
        .as_deref()
        .is_some_and(|c| c.trim().to_lowercase() == category.to_lowercase())
    {
      return false;
    }

    match self.deadline {
      Some(bucket) => active_classification(registry, case, now).bucket == bucket,
      None => true,
    }
  }
}

/// Cases from `cases` matching `filter`, in their original order.
pub fn filter(
  cases: &[Case],
  filter: &CaseFilter,
  registry: &SchemaRegistry,
  now: DateTime<Utc>,
) -> Vec<Case> {
  cases
    .iter()
    .filter(|c| filter.matches(c, registry, now))
    .cloned()
    .collect()
}

// ─── Active deadline ─────────────────────────────────────────────────────────

/// The deadline a case is currently working against: none once terminal, the
/// confirmation deadline while still in the initial status, the resolution
/// deadline afterwards.
pub fn active_deadline(schema: &CaseSchema, case: &Case) -> Option<(DeadlineField, DateTime<Utc>)> {
  if schema.is_terminal(&case.status) {
    return None;
  }
  if case.status == schema.initial_status {
    case
      .confirmation_deadline
      .map(|at| (DeadlineField::Confirmation, at))
  } else {
    case
      .resolution_deadline
      .map(|at| (DeadlineField::Resolution, at))
  }
}

/// Classify the active deadline with the threshold of its type. Cases of an
/// unregistered kind classify as `none`.
pub fn active_classification(
  registry: &SchemaRegistry,
  case: &Case,
  now: DateTime<Utc>,
) -> Classification {
  let Ok(schema) = registry.get(case.kind) else {
    return Classification::NONE;
  };
  match active_deadline(schema, case) {
    Some((field, at)) => deadline::classify(Some(at), now, schema.threshold(field)),
    None => Classification::NONE,
  }
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// Dashboard tile counts over a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaseSummary {
  pub total:     usize,
  pub by_status: BTreeMap<String, usize>,
  pub overdue:   usize,
  pub due_soon:  usize,
  pub normal:    usize,
  pub none:      usize,
}

pub fn summarize(cases: &[Case], registry: &SchemaRegistry, now: DateTime<Utc>) -> CaseSummary {
  let mut summary = CaseSummary::default();
  for case in cases {
    summary.total += 1;
    *summary.by_status.entry(case.status.clone()).or_default() += 1;
    let slot = match active_classification(registry, case, now).bucket {
      DeadlineBucket::Overdue => &mut summary.overdue,
      DeadlineBucket::DueSoon => &mut summary.due_soon,
      DeadlineBucket::Normal => &mut summary.normal,
      DeadlineBucket::None => &mut summary.none,
    };
    *slot += 1;
  }
  summary
}
