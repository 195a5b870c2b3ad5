//! Case Schema Registry: static per-kind configuration.
//!
//! Every compliance domain is described by one [`CaseSchema`]: its ordered
//! statuses, the edges between them, which statuses set deadlines (and with
//! what statutory period), which fields a status requires, and which
//! legal-basis flags apply. Adding a domain means adding a schema here, not
//! branching engine code.

use std::{
  collections::BTreeMap,
  str::FromStr,
  sync::{Arc, LazyLock},
};

use serde::Serialize;
use strum::{Display, IntoEnumIterator};

use crate::{
  Error, Result,
  case::{Case, CaseKind},
  deadline::Period,
};

// ─── Descriptors ─────────────────────────────────────────────────────────────

/// Colour family used by the UI for a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
  Neutral,
  Info,
  Warning,
  Success,
  Danger,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusDescriptor {
  pub id:    &'static str,
  pub label: &'static str,
  pub tone:  Tone,
}

/// One legal-basis flag, e.g. GDPR Art. 17(1)(a).
#[derive(Debug, Clone, Serialize)]
pub struct FlagDescriptor {
  /// `<article>(<paragraph>)(<clause>)`, e.g. `"17(1)(a)"`.
  pub id:    &'static str,
  pub label: &'static str,
}

/// A permitted status change. Edges back into the initial status must be
/// marked `reopen`.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionEdge {
  pub from:   &'static str,
  pub to:     &'static str,
  pub reopen: bool,
}

const fn edge(from: &'static str, to: &'static str) -> TransitionEdge {
  TransitionEdge { from, to, reopen: false }
}

const fn reopen(from: &'static str, to: &'static str) -> TransitionEdge {
  TransitionEdge { from, to, reopen: true }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeadlineField {
  Confirmation,
  Resolution,
}

/// What a deadline period is counted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
  /// The moment the case enters the rule's status.
  StatusEntry,
  /// The case's `created_at`.
  Submission,
}

/// Entering `on_enter` sets `field` to `anchor + period`.
#[derive(Debug, Clone, Serialize)]
pub struct DeadlineRule {
  pub on_enter: &'static str,
  pub field:    DeadlineField,
  pub period:   Period,
  pub anchor:   Anchor,
}

/// A field that must be filled before a case may enter a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequiredField {
  ResponsibleParty,
  ResolutionNotes,
  RejectionReason,
  /// At least one legal-basis flag set.
  LegalBasis,
}

impl RequiredField {
  pub fn is_satisfied(self, case: &Case) -> bool {
    fn filled(v: &Option<String>) -> bool { v.as_deref().is_some_and(|s| !s.trim().is_empty()) }
    match self {
      Self::ResponsibleParty => filled(&case.responsible_party),
      Self::ResolutionNotes => filled(&case.resolution_notes),
      Self::RejectionReason => filled(&case.rejection_reason),
      Self::LegalBasis => case.legal_basis.values().any(|v| *v),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusRequirement {
  pub status: &'static str,
  pub fields: &'static [RequiredField],
}

/// "Due soon" windows, in days, per deadline type.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DueSoonThresholds {
  pub confirmation_days: i64,
  pub resolution_days:   i64,
}

// ─── CaseSchema ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CaseSchema {
  pub kind:               CaseKind,
  pub label:              &'static str,
  pub number_prefix:      &'static str,
  /// Ordered; the first entry is the initial status.
  pub statuses:           &'static [StatusDescriptor],
  pub initial_status:     &'static str,
  pub terminal_statuses:  &'static [&'static str],
  pub transitions:        &'static [TransitionEdge],
  pub deadline_rules:     &'static [DeadlineRule],
  pub requirements:       &'static [StatusRequirement],
  pub legal_basis_fields: &'static [FlagDescriptor],
  pub due_soon:           DueSoonThresholds,
}

impl CaseSchema {
  pub fn status(&self, id: &str) -> Option<&StatusDescriptor> {
    self.statuses.iter().find(|s| s.id == id)
  }

  pub fn has_status(&self, id: &str) -> bool { self.status(id).is_some() }

  pub fn is_terminal(&self, id: &str) -> bool { self.terminal_statuses.contains(&id) }

  pub fn edge(&self, from: &str, to: &str) -> Option<&TransitionEdge> {
    self.transitions.iter().find(|e| e.from == from && e.to == to)
  }

  /// Deadline rules fired by entering `status`.
  pub fn rules_on_enter<'a>(&'a self, status: &'a str) -> impl Iterator<Item = &'a DeadlineRule> {
    self.deadline_rules.iter().filter(move |r| r.on_enter == status)
  }

  pub fn required_for(&self, status: &str) -> &'static [RequiredField] {
    self
      .requirements
      .iter()
      .find(|r| r.status == status)
      .map_or(&[], |r| r.fields)
  }

  pub fn threshold(&self, field: DeadlineField) -> i64 {
    match field {
      DeadlineField::Confirmation => self.due_soon.confirmation_days,
      DeadlineField::Resolution => self.due_soon.resolution_days,
    }
  }
}

// ─── Built-in schemas ────────────────────────────────────────────────────────

const fn status(id: &'static str, label: &'static str, tone: Tone) -> StatusDescriptor {
  StatusDescriptor { id, label, tone }
}

const fn flag(id: &'static str, label: &'static str) -> FlagDescriptor { FlagDescriptor { id, label } }

pub static SUPPORT_TICKET: CaseSchema = CaseSchema {
  kind:               CaseKind::SupportTicket,
  label:              "Support ticket",
  number_prefix:      "TICKET",
  statuses:           &[
    status("open", "Open", Tone::Info),
    status("in_progress", "In progress", Tone::Warning),
    status("waiting", "Waiting for requester", Tone::Neutral),
    status("resolved", "Resolved", Tone::Success),
    status("closed", "Closed", Tone::Neutral),
  ],
  initial_status:     "open",
  terminal_statuses:  &["closed"],
  transitions:        &[
    edge("open", "in_progress"),
    edge("in_progress", "waiting"),
    edge("waiting", "in_progress"),
    edge("in_progress", "resolved"),
    edge("waiting", "resolved"),
    edge("resolved", "closed"),
    reopen("resolved", "open"),
  ],
  deadline_rules:     &[
    DeadlineRule {
      on_enter: "open",
      field:    DeadlineField::Confirmation,
      period:   Period::Days(2),
      anchor:   Anchor::StatusEntry,
    },
    DeadlineRule {
      on_enter: "open",
      field:    DeadlineField::Resolution,
      period:   Period::Days(14),
      anchor:   Anchor::StatusEntry,
    },
  ],
  requirements:       &[StatusRequirement {
    status: "resolved",
    fields: &[RequiredField::ResolutionNotes],
  }],
  legal_basis_fields: &[],
  due_soon:           DueSoonThresholds {
    confirmation_days: 1,
    resolution_days:   3,
  },
};

pub static GDPR_RIGHT_FORGOTTEN: CaseSchema = CaseSchema {
  kind:               CaseKind::GdprRightForgotten,
  label:              "GDPR erasure request",
  number_prefix:      "GDPR17",
  statuses:           &[
    status("received", "Received", Tone::Info),
    status("verifying", "Verifying identity", Tone::Warning),
    status("processing", "Processing", Tone::Warning),
    status("executed", "Erasure executed", Tone::Success),
    status("rejected", "Rejected", Tone::Danger),
  ],
  initial_status:     "received",
  terminal_statuses:  &["executed", "rejected"],
  transitions:        &[
    edge("received", "verifying"),
    edge("received", "processing"),
    edge("received", "rejected"),
    edge("verifying", "processing"),
    edge("verifying", "rejected"),
    edge("processing", "executed"),
    edge("processing", "rejected"),
  ],
  // Art. 12(3): one month from receipt of the request.
  deadline_rules:     &[
    DeadlineRule {
      on_enter: "received",
      field:    DeadlineField::Confirmation,
      period:   Period::Days(3),
      anchor:   Anchor::StatusEntry,
    },
    DeadlineRule {
      on_enter: "received",
      field:    DeadlineField::Resolution,
      period:   Period::Months(1),
      anchor:   Anchor::Submission,
    },
    DeadlineRule {
      on_enter: "processing",
      field:    DeadlineField::Resolution,
      period:   Period::Months(1),
      anchor:   Anchor::Submission,
    },
  ],
  requirements:       &[
    StatusRequirement {
      status: "processing",
      fields: &[RequiredField::LegalBasis],
    },
    StatusRequirement {
      status: "executed",
      fields: &[RequiredField::ResolutionNotes],
    },
    StatusRequirement {
      status: "rejected",
      fields: &[RequiredField::RejectionReason],
    },
  ],
  legal_basis_fields: &[
    flag("17(1)(a)", "personal data no longer necessary for the original purpose"),
    flag("17(1)(b)", "consent withdrawn and no other legal ground"),
    flag("17(1)(c)", "objection to processing under Art. 21"),
    flag("17(1)(d)", "personal data unlawfully processed"),
    flag("17(1)(e)", "erasure required by a legal obligation"),
    flag("17(1)(f)", "data collected in relation to information society services offered to a child"),
  ],
  due_soon:           DueSoonThresholds {
    confirmation_days: 3,
    resolution_days:   14,
  },
};

pub static WHISTLEBLOWER_REPORT: CaseSchema = CaseSchema {
  kind:               CaseKind::WhistleblowerReport,
  label:              "Whistle-blower report",
  number_prefix:      "ZZPRI",
  statuses:           &[
    status("received", "Received", Tone::Info),
    status("acknowledged", "Receipt confirmed", Tone::Info),
    status("investigating", "Under investigation", Tone::Warning),
    status("resolved", "Resolved", Tone::Success),
    status("rejected", "Rejected", Tone::Danger),
  ],
  initial_status:     "received",
  terminal_statuses:  &["resolved", "rejected"],
  transitions:        &[
    edge("received", "acknowledged"),
    edge("received", "rejected"),
    edge("acknowledged", "investigating"),
    edge("acknowledged", "rejected"),
    edge("investigating", "resolved"),
    edge("investigating", "rejected"),
  ],
  // Receipt confirmed within 7 days, feedback within 3 months.
  deadline_rules:     &[
    DeadlineRule {
      on_enter: "received",
      field:    DeadlineField::Confirmation,
      period:   Period::Days(7),
      anchor:   Anchor::StatusEntry,
    },
    DeadlineRule {
      on_enter: "received",
      field:    DeadlineField::Resolution,
      period:   Period::Months(3),
      anchor:   Anchor::StatusEntry,
    },
  ],
  requirements:       &[
    StatusRequirement {
      status: "investigating",
      fields: &[RequiredField::ResponsibleParty],
    },
    StatusRequirement {
      status: "resolved",
      fields: &[RequiredField::ResolutionNotes],
    },
    StatusRequirement {
      status: "rejected",
      fields: &[RequiredField::RejectionReason],
    },
  ],
  legal_basis_fields: &[
    flag("2(1)(a)", "breach of Union law in a listed area (procurement, financial services, safety, environment, ...)"),
    flag("2(1)(b)", "breach affecting the financial interests of the Union"),
    flag("2(1)(c)", "breach relating to the internal market"),
  ],
  due_soon:           DueSoonThresholds {
    confirmation_days: 3,
    resolution_days:   30,
  },
};

pub static POLICY_APPROVAL: CaseSchema = CaseSchema {
  kind:               CaseKind::PolicyApproval,
  label:              "Policy approval",
  number_prefix:      "POL",
  statuses:           &[
    status("draft", "Draft", Tone::Neutral),
    status("in_review", "In review", Tone::Warning),
    status("approved", "Approved", Tone::Success),
    status("published", "Published", Tone::Success),
    status("withdrawn", "Withdrawn", Tone::Danger),
  ],
  initial_status:     "draft",
  terminal_statuses:  &["published", "withdrawn"],
  transitions:        &[
    edge("draft", "in_review"),
    edge("draft", "withdrawn"),
    edge("in_review", "approved"),
    edge("in_review", "withdrawn"),
    reopen("in_review", "draft"),
    edge("approved", "published"),
    edge("approved", "withdrawn"),
  ],
  deadline_rules:     &[DeadlineRule {
    on_enter: "in_review",
    field:    DeadlineField::Resolution,
    period:   Period::Days(30),
    anchor:   Anchor::StatusEntry,
  }],
  requirements:       &[
    StatusRequirement {
      status: "approved",
      fields: &[RequiredField::ResponsibleParty],
    },
    StatusRequirement {
      status: "withdrawn",
      fields: &[RequiredField::RejectionReason],
    },
  ],
  legal_basis_fields: &[
    flag("5(2)", "ISO/IEC 27001 clause 5.2 information security policy"),
    flag("A.5(1)", "Annex A 5.1 policies for information security"),
  ],
  due_soon:           DueSoonThresholds {
    confirmation_days: 3,
    resolution_days:   7,
  },
};

pub static DECISION_LOG: CaseSchema = CaseSchema {
  kind:               CaseKind::DecisionLog,
  label:              "NIS2 decision log entry",
  number_prefix:      "NIS2",
  statuses:           &[
    status("proposed", "Proposed", Tone::Info),
    status("under_review", "Under management review", Tone::Warning),
    status("decided", "Decided", Tone::Info),
    status("implemented", "Implemented", Tone::Success),
    status("rejected", "Rejected", Tone::Danger),
  ],
  initial_status:     "proposed",
  terminal_statuses:  &["implemented", "rejected"],
  transitions:        &[
    edge("proposed", "under_review"),
    reopen("under_review", "proposed"),
    edge("under_review", "decided"),
    edge("under_review", "rejected"),
    edge("decided", "implemented"),
  ],
  deadline_rules:     &[
    DeadlineRule {
      on_enter: "proposed",
      field:    DeadlineField::Confirmation,
      period:   Period::Days(14),
      anchor:   Anchor::StatusEntry,
    },
    DeadlineRule {
      on_enter: "decided",
      field:    DeadlineField::Resolution,
      period:   Period::Days(90),
      anchor:   Anchor::StatusEntry,
    },
  ],
  requirements:       &[
    StatusRequirement {
      status: "decided",
      fields: &[RequiredField::ResponsibleParty],
    },
    StatusRequirement {
      status: "implemented",
      fields: &[RequiredField::ResolutionNotes],
    },
    StatusRequirement {
      status: "rejected",
      fields: &[RequiredField::RejectionReason],
    },
  ],
  legal_basis_fields: &[
    flag("21(2)(a)", "policies on risk analysis and information system security"),
    flag("21(2)(b)", "incident handling"),
    flag("21(2)(c)", "business continuity and crisis management"),
    flag("21(2)(d)", "supply chain security"),
    flag("21(2)(e)", "security in acquisition, development and maintenance"),
    flag("21(2)(f)", "assessing the effectiveness of risk-management measures"),
    flag("21(2)(g)", "basic cyber hygiene and training"),
    flag("21(2)(h)", "cryptography and encryption"),
    flag("21(2)(i)", "human resources security and access control"),
    flag("21(2)(j)", "multi-factor authentication and secured communications"),
  ],
  due_soon:           DueSoonThresholds {
    confirmation_days: 3,
    resolution_days:   30,
  },
};

pub static RESPONSIBILITY_OFFICER: CaseSchema = CaseSchema {
  kind:               CaseKind::ResponsibilityOfficer,
  label:              "Responsibility officer record",
  number_prefix:      "DPO",
  statuses:           &[
    status("nominated", "Nominated", Tone::Info),
    status("appointed", "Appointed", Tone::Success),
    status("notified", "Authority notified", Tone::Success),
    status("revoked", "Revoked", Tone::Danger),
  ],
  initial_status:     "nominated",
  terminal_statuses:  &["notified", "revoked"],
  transitions:        &[
    edge("nominated", "appointed"),
    edge("nominated", "revoked"),
    edge("appointed", "notified"),
    edge("appointed", "revoked"),
  ],
  deadline_rules:     &[
    DeadlineRule {
      on_enter: "nominated",
      field:    DeadlineField::Confirmation,
      period:   Period::Days(14),
      anchor:   Anchor::StatusEntry,
    },
    DeadlineRule {
      on_enter: "appointed",
      field:    DeadlineField::Resolution,
      period:   Period::Days(30),
      anchor:   Anchor::StatusEntry,
    },
  ],
  requirements:       &[
    StatusRequirement {
      status: "appointed",
      fields: &[RequiredField::ResponsibleParty],
    },
    StatusRequirement {
      status: "revoked",
      fields: &[RequiredField::RejectionReason],
    },
  ],
  legal_basis_fields: &[
    flag("37(1)(a)", "processing carried out by a public authority or body"),
    flag("37(1)(b)", "core activities require regular and systematic monitoring on a large scale"),
    flag("37(1)(c)", "core activities involve large-scale processing of special categories of data"),
  ],
  due_soon:           DueSoonThresholds {
    confirmation_days: 3,
    resolution_days:   14,
  },
};

// ─── Registry ────────────────────────────────────────────────────────────────

static BUILTIN: LazyLock<Arc<SchemaRegistry>> = LazyLock::new(|| {
  Arc::new(
    SchemaRegistry::default()
      .with(&SUPPORT_TICKET)
      .with(&GDPR_RIGHT_FORGOTTEN)
      .with(&WHISTLEBLOWER_REPORT)
      .with(&POLICY_APPROVAL)
      .with(&DECISION_LOG)
      .with(&RESPONSIBILITY_OFFICER),
  )
});

/// Lookup table from [`CaseKind`] to its schema. Built once, never mutated
/// afterwards.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
  schemas: BTreeMap<CaseKind, &'static CaseSchema>,
}

impl SchemaRegistry {
  /// The registry holding every built-in schema.
  pub fn builtin() -> Arc<Self> { Arc::clone(&BUILTIN) }

  /// Register `schema`, replacing any schema previously registered for its
  /// kind.
  pub fn with(mut self, schema: &'static CaseSchema) -> Self {
    self.schemas.insert(schema.kind, schema);
    self
  }

  pub fn get(&self, kind: CaseKind) -> Result<&'static CaseSchema> {
    self
      .schemas
      .get(&kind)
      .copied()
      .ok_or_else(|| Error::UnknownCaseKind(kind.as_str().to_owned()))
  }

  /// Resolve a kind by its wire name (e.g. `"whistleblower_report"`).
  pub fn lookup(&self, name: &str) -> Result<&'static CaseSchema> {
    let kind =
      CaseKind::from_str(name).map_err(|_| Error::UnknownCaseKind(name.to_owned()))?;
    self.get(kind)
  }

  pub fn schemas(&self) -> impl Iterator<Item = &'static CaseSchema> + '_ {
    self.schemas.values().copied()
  }

  /// Kinds that have no schema in this registry.
  pub fn missing_kinds(&self) -> Vec<CaseKind> {
    CaseKind::iter().filter(|k| !self.schemas.contains_key(k)).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtin_registers_every_kind() {
    let registry = SchemaRegistry::builtin();
    assert!(registry.missing_kinds().is_empty());
    for kind in CaseKind::iter() {
      assert_eq!(registry.get(kind).unwrap().kind, kind);
    }
  }

  #[test]
  fn lookup_unknown_kind_fails() {
    let registry = SchemaRegistry::builtin();
    let err = registry.lookup("tax_audit").unwrap_err();
    assert!(matches!(err, Error::UnknownCaseKind(ref k) if k == "tax_audit"));
  }

  #[test]
  fn get_unregistered_kind_fails() {
    let registry = SchemaRegistry::default().with(&WHISTLEBLOWER_REPORT);
    assert!(registry.get(CaseKind::WhistleblowerReport).is_ok());
    assert!(matches!(
      registry.get(CaseKind::PolicyApproval),
      Err(Error::UnknownCaseKind(_))
    ));
    assert_eq!(registry.missing_kinds().len(), 5);
  }

  #[test]
  fn builtin_schemas_are_consistent() {
    for schema in SchemaRegistry::builtin().schemas() {
      let kind = schema.kind;
      assert_eq!(schema.statuses[0].id, schema.initial_status, "{kind}");
      assert!(!schema.is_terminal(schema.initial_status), "{kind}");

      for t in schema.terminal_statuses {
        assert!(schema.has_status(t), "{kind}: terminal {t}");
        assert!(
          schema.transitions.iter().all(|e| e.from != *t),
          "{kind}: terminal {t} has outgoing edges"
        );
      }

      for e in schema.transitions {
        assert!(schema.has_status(e.from), "{kind}: edge from {}", e.from);
        assert!(schema.has_status(e.to), "{kind}: edge to {}", e.to);
        assert_ne!(e.from, e.to, "{kind}: self loop on {}", e.from);
        assert_eq!(
          e.to == schema.initial_status,
          e.reopen,
          "{kind}: {} -> {} must be a reopen edge iff it targets the initial status",
          e.from,
          e.to
        );
      }

      for r in schema.deadline_rules {
        assert!(schema.has_status(r.on_enter), "{kind}: rule on {}", r.on_enter);
      }
      for r in schema.requirements {
        assert!(schema.has_status(r.status), "{kind}: requirement on {}", r.status);
      }
      for f in schema.legal_basis_fields {
        assert!(f.id.ends_with(')'), "{kind}: flag id {}", f.id);
      }
    }
  }

  #[test]
  fn whistleblower_periods_follow_statute() {
    let rules: Vec<_> = WHISTLEBLOWER_REPORT.rules_on_enter("received").collect();
    assert_eq!(rules.len(), 2);
    assert!(rules.iter().any(|r| r.field == DeadlineField::Confirmation
      && r.period == Period::Days(7)));
    assert!(rules.iter().any(|r| r.field == DeadlineField::Resolution
      && r.period == Period::Months(3)));
  }
}
