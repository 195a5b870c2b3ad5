//! Status State Machine.
//!
//! Validates status changes against the kind's transition edges and applies
//! the declarative deadline side effects of entering a status. Nothing here
//! persists anything: [`apply_transition`] returns the next version of a
//! case and leaves the input untouched.

use chrono::{DateTime, Utc};

use crate::{
  Error, Result, ValidationError,
  case::{Case, CaseKind},
  schema::{Anchor, CaseSchema, DeadlineField, SchemaRegistry},
  subject,
};

/// `true` if `kind` declares an edge `from -> to` and `from` is not terminal.
pub fn can_transition(registry: &SchemaRegistry, kind: CaseKind, from: &str, to: &str) -> bool {
  registry
    .get(kind)
    .is_ok_and(|schema| edge_allowed(schema, from, to))
}

fn edge_allowed(schema: &CaseSchema, from: &str, to: &str) -> bool {
  !schema.is_terminal(from) && schema.edge(from, to).is_some()
}

/// Statuses reachable from `from` in one step, in schema order.
pub fn permitted_transitions(schema: &CaseSchema, from: &str) -> Vec<&'static str> {
  if schema.is_terminal(from) {
    return Vec::new();
  }
  schema
    .statuses
    .iter()
    .map(|s| s.id)
    .filter(|to| schema.edge(from, to).is_some())
    .collect()
}

/// Put a freshly built case into its kind's initial status and fire the
/// initial status's deadline rules.
pub fn initialize(schema: &CaseSchema, case: &mut Case, now: DateTime<Utc>) -> Result<()> {
  check_write_constraints(case)?;
  enter_status(schema, case, schema.initial_status, now)
}

/// Move `case` to `to`, returning the updated copy.
///
/// Checks run in order: both statuses registered, write-time constraints,
/// fields required by `to` ([`Error::Validation`]), then the edge itself
/// ([`Error::IllegalTransition`]).
pub fn apply_transition(
  registry: &SchemaRegistry,
  case: &Case,
  to: &str,
  now: DateTime<Utc>,
) -> Result<Case> {
  let schema = registry.get(case.kind)?;

  for status in [case.status.as_str(), to] {
    if !schema.has_status(status) {
      return Err(Error::UnknownStatus {
        kind:   case.kind,
        status: status.to_owned(),
      });
    }
  }

  check_write_constraints(case)?;

  if let Some(field) = schema
    .required_for(to)
    .iter()
    .find(|f| !f.is_satisfied(case))
  {
    return Err(
      ValidationError::MissingField {
        status: to.to_owned(),
        field:  *field,
      }
      .into(),
    );
  }

  if !edge_allowed(schema, &case.status, to) {
    return Err(Error::IllegalTransition {
      kind: case.kind,
      from: case.status.clone(),
      to:   to.to_owned(),
    });
  }

  let mut next = case.clone();
  enter_status(schema, &mut next, to, now)?;
  Ok(next)
}

/// Constraints that hold for every persisted case regardless of status.
pub fn check_write_constraints(case: &Case) -> Result<(), ValidationError> {
  if case.title.trim().is_empty() {
    return Err(ValidationError::EmptyTitle);
  }
  if case.is_anonymous && subject::normalize(case.subject.clone()).is_some() {
    return Err(ValidationError::AnonymousWithSubject);
  }
  Ok(())
}

/// Set the status and recompute every deadline the status declares.
fn enter_status(
  schema: &CaseSchema,
  case: &mut Case,
  status: &str,
  now: DateTime<Utc>,
) -> Result<()> {
  for rule in schema.rules_on_enter(status) {
    let anchor = match rule.anchor {
      Anchor::StatusEntry => now,
      Anchor::Submission => case.created_at,
    };
    let at = rule.period.after(anchor).ok_or(Error::DeadlineOutOfRange {
      field: match rule.field {
        DeadlineField::Confirmation => "confirmation_deadline",
        DeadlineField::Resolution => "resolution_deadline",
      },
    })?;
    match rule.field {
      DeadlineField::Confirmation => case.confirmation_deadline = Some(at),
      DeadlineField::Resolution => case.resolution_deadline = Some(at),
    }
  }
  case.status = status.to_owned();
  case.updated_at = now;
  Ok(())
}
