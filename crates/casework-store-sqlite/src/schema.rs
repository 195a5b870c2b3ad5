//! SQL schema for the Casework SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Every kind shares the one `cases` table, so listing, reading and deleting
/// always address the same rows.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS cases (
    case_id               TEXT PRIMARY KEY,
    kind                  TEXT NOT NULL,   -- snake_case CaseKind
    org_id                TEXT NOT NULL,
    number                TEXT NOT NULL,   -- <PREFIX>-<YEAR>-<SEQ>
    created_at            TEXT NOT NULL,   -- RFC 3339 UTC
    updated_at            TEXT NOT NULL,
    status                TEXT NOT NULL,
    title                 TEXT NOT NULL,
    description           TEXT,
    category              TEXT,
    is_anonymous          INTEGER NOT NULL DEFAULT 0,
    subject               TEXT,            -- JSON SubjectContact or NULL
    legal_basis           TEXT NOT NULL DEFAULT '{}',
    confirmation_deadline TEXT,
    resolution_deadline   TEXT,
    responsible_party     TEXT,
    resolution_notes      TEXT,
    rejection_reason      TEXT,
    attachments           TEXT NOT NULL DEFAULT '[]',
    UNIQUE (org_id, number),
    CHECK  (is_anonymous = 0 OR subject IS NULL)
);

CREATE INDEX IF NOT EXISTS cases_kind_org_idx ON cases(kind, org_id);
CREATE INDEX IF NOT EXISTS cases_created_idx  ON cases(created_at);

PRAGMA user_version = 1;
";
