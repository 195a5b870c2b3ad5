//! [`SqliteStore`]: the SQLite implementation of [`CaseStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use casework_core::{
  case::{Case, CaseKind},
  store::CaseStore,
};

use crate::{
  Result,
  encode::{CASE_COLUMNS, CaseParams, RawCase, encode_kind, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Casework live store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CaseStore impl ──────────────────────────────────────────────────────────

impl CaseStore for SqliteStore {
  type Error = crate::Error;

  async fn select(&self, kind: CaseKind, org_id: String) -> Result<Vec<Case>> {
    let kind_str = encode_kind(kind);

    let raws: Vec<RawCase> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CASE_COLUMNS} FROM cases
           WHERE kind = ?1 AND org_id = ?2
           ORDER BY created_at DESC, number DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![kind_str, org_id], RawCase::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCase::into_case).collect()
  }

  async fn get(&self, id: Uuid) -> Result<Option<Case>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCase> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CASE_COLUMNS} FROM cases WHERE case_id = ?1"),
              rusqlite::params![id_str],
              RawCase::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCase::into_case).transpose()
  }

  /// Returns the row as stored, so timestamps come back at storage precision.
  async fn insert(&self, case: Case) -> Result<Case> {
    let p = CaseParams::new(&case)?;

    let raw: RawCase = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          &format!(
            "INSERT INTO cases ({CASE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                     ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
          ),
          rusqlite::params![
            p.case_id,
            p.kind,
            p.org_id,
            p.number,
            p.created_at,
            p.updated_at,
            p.status,
            p.title,
            p.description,
            p.category,
            p.is_anonymous,
            p.subject,
            p.legal_basis,
            p.confirmation_deadline,
            p.resolution_deadline,
            p.responsible_party,
            p.resolution_notes,
            p.rejection_reason,
            p.attachments,
          ],
        )?;
        let raw = tx.query_row(
          &format!("SELECT {CASE_COLUMNS} FROM cases WHERE case_id = ?1"),
          rusqlite::params![p.case_id],
          RawCase::from_row,
        )?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_case()
  }

  async fn update(&self, case: Case) -> Result<Option<Case>> {
    let p = CaseParams::new(&case)?;

    // Identity, kind, owner, number and submission time never change.
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE cases SET
             updated_at = ?2, status = ?3, title = ?4, description = ?5,
             category = ?6, is_anonymous = ?7, subject = ?8, legal_basis = ?9,
             confirmation_deadline = ?10, resolution_deadline = ?11,
             responsible_party = ?12, resolution_notes = ?13,
             rejection_reason = ?14, attachments = ?15
           WHERE case_id = ?1",
          rusqlite::params![
            p.case_id,
            p.updated_at,
            p.status,
            p.title,
            p.description,
            p.category,
            p.is_anonymous,
            p.subject,
            p.legal_basis,
            p.confirmation_deadline,
            p.resolution_deadline,
            p.responsible_party,
            p.resolution_notes,
            p.rejection_reason,
            p.attachments,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get(case.id).await
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM cases WHERE case_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }
}
