//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as fixed-width RFC 3339 strings in UTC so that
//! text order is time order. Structured fields (subject, legal basis,
//! attachments) are stored as compact JSON. UUIDs are stored as hyphenated
//! lowercase strings.

use std::str::FromStr;

use casework_core::{
  case::{Case, CaseKind, LegalBasisFlags},
  subject::SubjectContact,
};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── CaseKind ────────────────────────────────────────────────────────────────

pub fn encode_kind(kind: CaseKind) -> &'static str { kind.as_str() }

pub fn decode_kind(s: &str) -> Result<CaseKind> {
  CaseKind::from_str(s).map_err(|_| Error::UnknownValue {
    column: "kind",
    value:  s.to_owned(),
  })
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_subject(subject: Option<&SubjectContact>) -> Result<Option<String>> {
  Ok(subject.map(serde_json::to_string).transpose()?)
}

pub fn encode_legal_basis(flags: &LegalBasisFlags) -> Result<String> {
  Ok(serde_json::to_string(flags)?)
}

pub fn encode_attachments(refs: &[String]) -> Result<String> {
  Ok(serde_json::to_string(refs)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawCase`].
pub const CASE_COLUMNS: &str = "case_id, kind, org_id, number, created_at, updated_at, status,
  title, description, category, is_anonymous, subject, legal_basis,
  confirmation_deadline, resolution_deadline, responsible_party,
  resolution_notes, rejection_reason, attachments";

/// Raw values read directly from a `cases` row.
pub struct RawCase {
  pub case_id:               String,
  pub kind:                  String,
  pub org_id:                String,
  pub number:                String,
  pub created_at:            String,
  pub updated_at:            String,
  pub status:                String,
  pub title:                 String,
  pub description:           Option<String>,
  pub category:              Option<String>,
  pub is_anonymous:          bool,
  pub subject:               Option<String>,
  pub legal_basis:           String,
  pub confirmation_deadline: Option<String>,
  pub resolution_deadline:   Option<String>,
  pub responsible_party:     Option<String>,
  pub resolution_notes:      Option<String>,
  pub rejection_reason:      Option<String>,
  pub attachments:           String,
}

impl RawCase {
  /// Read a row selected with [`CASE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      case_id:               row.get(0)?,
      kind:                  row.get(1)?,
      org_id:                row.get(2)?,
      number:                row.get(3)?,
      created_at:            row.get(4)?,
      updated_at:            row.get(5)?,
      status:                row.get(6)?,
      title:                 row.get(7)?,
      description:           row.get(8)?,
      category:              row.get(9)?,
      is_anonymous:          row.get(10)?,
      subject:               row.get(11)?,
      legal_basis:           row.get(12)?,
      confirmation_deadline: row.get(13)?,
      resolution_deadline:   row.get(14)?,
      responsible_party:     row.get(15)?,
      resolution_notes:      row.get(16)?,
      rejection_reason:      row.get(17)?,
      attachments:           row.get(18)?,
    })
  }

  pub fn into_case(self) -> Result<Case> {
    Ok(Case {
      id:                    decode_uuid(&self.case_id)?,
      kind:                  decode_kind(&self.kind)?,
      org_id:                self.org_id,
      number:                self.number,
      created_at:            decode_dt(&self.created_at)?,
      updated_at:            decode_dt(&self.updated_at)?,
      status:                self.status,
      title:                 self.title,
      description:           self.description,
      category:              self.category,
      is_anonymous:          self.is_anonymous,
      subject:               self
        .subject
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?,
      legal_basis:           serde_json::from_str(&self.legal_basis)?,
      confirmation_deadline: self.confirmation_deadline.as_deref().map(decode_dt).transpose()?,
      resolution_deadline:   self.resolution_deadline.as_deref().map(decode_dt).transpose()?,
      responsible_party:     self.responsible_party,
      resolution_notes:      self.resolution_notes,
      rejection_reason:      self.rejection_reason,
      attachments:           serde_json::from_str(&self.attachments)?,
    })
  }
}

/// Owned column values for an INSERT or UPDATE, in [`CASE_COLUMNS`] order.
pub struct CaseParams {
  pub case_id:               String,
  pub kind:                  &'static str,
  pub org_id:                String,
  pub number:                String,
  pub created_at:            String,
  pub updated_at:            String,
  pub status:                String,
  pub title:                 String,
  pub description:           Option<String>,
  pub category:              Option<String>,
  pub is_anonymous:          bool,
  pub subject:               Option<String>,
  pub legal_basis:           String,
  pub confirmation_deadline: Option<String>,
  pub resolution_deadline:   Option<String>,
  pub responsible_party:     Option<String>,
  pub resolution_notes:      Option<String>,
  pub rejection_reason:      Option<String>,
  pub attachments:           String,
}

impl CaseParams {
  pub fn new(case: &Case) -> Result<Self> {
    Ok(Self {
      case_id:               encode_uuid(case.id),
      kind:                  encode_kind(case.kind),
      org_id:                case.org_id.clone(),
      number:                case.number.clone(),
      created_at:            encode_dt(case.created_at),
      updated_at:            encode_dt(case.updated_at),
      status:                case.status.clone(),
      title:                 case.title.clone(),
      description:           case.description.clone(),
      category:              case.category.clone(),
      is_anonymous:          case.is_anonymous,
      subject:               encode_subject(case.subject.as_ref())?,
      legal_basis:           encode_legal_basis(&case.legal_basis)?,
      confirmation_deadline: case.confirmation_deadline.map(encode_dt),
      resolution_deadline:   case.resolution_deadline.map(encode_dt),
      responsible_party:     case.responsible_party.clone(),
      resolution_notes:      case.resolution_notes.clone(),
      rejection_reason:      case.rejection_reason.clone(),
      attachments:           encode_attachments(&case.attachments)?,
    })
  }
}
