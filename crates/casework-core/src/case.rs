//! Case types: the tracked compliance items every dashboard module shares.
//!
//! A case belongs to exactly one [`CaseKind`]; its status set, transitions and
//! statutory deadlines come from that kind's schema in
//! [`crate::schema::SchemaRegistry`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::subject::{self, SubjectContact};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The compliance domain a case belongs to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CaseKind {
  /// Internal support / helpdesk ticket.
  SupportTicket,
  /// GDPR Art. 17 right-to-erasure request.
  GdprRightForgotten,
  /// Whistle-blower report (ZZPri / Directive 2019/1937).
  WhistleblowerReport,
  /// ISO 27001 policy document approval.
  PolicyApproval,
  /// NIS2 management decision log entry.
  DecisionLog,
  /// Data-protection / responsibility officer appointment record.
  ResponsibilityOfficer,
}

impl CaseKind {
  pub fn as_str(self) -> &'static str { self.into() }
}

/// Legal-basis flags keyed by flag id (e.g. `"17(1)(a)"`).
pub type LegalBasisFlags = BTreeMap<String, bool>;

// ─── Case ────────────────────────────────────────────────────────────────────

/// A tracked compliance item.
///
/// `confirmation_deadline` and `resolution_deadline` are derived: they are set
/// by [`crate::lifecycle`] when the case enters a status that declares a
/// deadline rule, and by nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
  pub id:                    Uuid,
  pub kind:                  CaseKind,
  pub org_id:                String,
  /// Human-readable number, e.g. `ZZPRI-2025-001`.
  pub number:                String,
  pub created_at:            DateTime<Utc>,
  pub updated_at:            DateTime<Utc>,
  pub status:                String,
  pub title:                 String,
  pub description:           Option<String>,
  /// Free classification, e.g. "korupcija", "mobing".
  pub category:              Option<String>,
  pub is_anonymous:          bool,
  pub subject:               Option<SubjectContact>,
  pub legal_basis:           LegalBasisFlags,
  pub confirmation_deadline: Option<DateTime<Utc>>,
  pub resolution_deadline:   Option<DateTime<Utc>>,
  pub responsible_party:     Option<String>,
  pub resolution_notes:      Option<String>,
  pub rejection_reason:      Option<String>,
  /// Opaque references owned by the attachment store.
  pub attachments:           Vec<String>,
}

// ─── NewCase ─────────────────────────────────────────────────────────────────

/// Input to [`crate::service::CaseService::create_case`].
///
/// Identity, number, status and deadlines are assigned by the engine; they are
/// not accepted from callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCase {
  pub kind:              CaseKind,
  pub org_id:            String,
  pub title:             String,
  #[serde(default)]
  pub description:       Option<String>,
  #[serde(default)]
  pub category:          Option<String>,
  #[serde(default)]
  pub is_anonymous:      bool,
  #[serde(default)]
  pub subject:           Option<SubjectContact>,
  #[serde(default)]
  pub legal_basis:       LegalBasisFlags,
  #[serde(default)]
  pub responsible_party: Option<String>,
  #[serde(default)]
  pub attachments:       Vec<String>,
}

impl NewCase {
  /// Convenience constructor with all optional fields set to their defaults.
  pub fn new(kind: CaseKind, org_id: impl Into<String>, title: impl Into<String>) -> Self {
    Self {
      kind,
      org_id: org_id.into(),
      title: title.into(),
      description: None,
      category: None,
      is_anonymous: false,
      subject: None,
      legal_basis: LegalBasisFlags::new(),
      responsible_party: None,
      attachments: Vec::new(),
    }
  }
}

// ─── CasePatch ───────────────────────────────────────────────────────────────

/// Field edits accepted by [`crate::service::CaseService::update_case`].
///
/// Status and deadlines are absent on purpose: status changes go through
/// [`crate::service::CaseService::transition_case`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CasePatch {
  pub title:             Option<String>,
  pub description:       Option<String>,
  pub category:          Option<String>,
  /// Switching a case to anonymous redacts any stored subject.
  pub is_anonymous:      Option<bool>,
  pub subject:           Option<SubjectContact>,
  /// Replaces individual flags; flags not mentioned keep their value.
  pub legal_basis:       LegalBasisFlags,
  pub responsible_party: Option<String>,
  pub resolution_notes:  Option<String>,
  pub rejection_reason:  Option<String>,
  pub attachments:       Option<Vec<String>>,
}

impl CasePatch {
  /// Apply the edits to `case`. Blank text clears an optional field. The
  /// result still has to pass the write-time checks in [`crate::lifecycle`].
  pub fn apply(self, case: &mut Case) {
    fn text(v: String) -> Option<String> {
      let trimmed = v.trim();
      (!trimmed.is_empty()).then(|| trimmed.to_owned())
    }

    if let Some(title) = self.title {
      case.title = title;
    }
    if let Some(v) = self.description {
      case.description = text(v);
    }
    if let Some(v) = self.category {
      case.category = text(v);
    }
    if let Some(anonymous) = self.is_anonymous {
      case.is_anonymous = anonymous;
      if anonymous {
        case.subject = None;
      }
    }
    if let Some(subject) = self.subject {
      case.subject = subject::normalize(Some(subject));
    }
    case.legal_basis.extend(self.legal_basis);
    if let Some(v) = self.responsible_party {
      case.responsible_party = text(v);
    }
    if let Some(v) = self.resolution_notes {
      case.resolution_notes = text(v);
    }
    if let Some(v) = self.rejection_reason {
      case.rejection_reason = text(v);
    }
    if let Some(v) = self.attachments {
      case.attachments = v;
    }
  }
}

// ─── Case numbers ────────────────────────────────────────────────────────────

/// Format a human-readable case number: `<PREFIX>-<YEAR>-<SEQ>`.
pub fn format_number(prefix: &str, year: i32, seq: u32) -> String {
  format!("{prefix}-{year}-{seq:03}")
}

/// Extract the sequence part of `number` if it was issued under `prefix` in
/// `year`.
pub fn parse_sequence(number: &str, prefix: &str, year: i32) -> Option<u32> {
  let rest = number.strip_prefix(prefix)?.strip_prefix('-')?;
  let (y, seq) = rest.split_once('-')?;
  if y.parse::<i32>().ok()? != year {
    return None;
  }
  seq.parse().ok()
}
