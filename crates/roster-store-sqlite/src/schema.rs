//! SQL schema for the Roster SQLite store.
//!
//! Executed once when a connection opens. The schema version is recorded in
//! `PRAGMA user_version`.

/// Full schema DDL. Safe to re-run against an existing file.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS employees (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    last_name    TEXT    NOT NULL,
    first_name   TEXT    NOT NULL,
    middle_name  TEXT    NOT NULL,
    position     TEXT    NOT NULL,
    date_hired   TEXT    NOT NULL,   -- YYYY-MM-DD
    salary_cents INTEGER NOT NULL CHECK (salary_cents >= 0),
    manager_id   INTEGER REFERENCES employees(id) ON DELETE SET NULL,
    created_at   TEXT    NOT NULL,   -- RFC 3339 UTC, fixed microsecond width
    updated_at   TEXT    NOT NULL,
    CHECK (manager_id IS NULL OR manager_id != id)
);

CREATE INDEX IF NOT EXISTS employees_manager_idx ON employees(manager_id);
CREATE INDEX IF NOT EXISTS employees_hired_idx   ON employees(date_hired);
CREATE INDEX IF NOT EXISTS employees_salary_idx  ON employees(salary_cents);

PRAGMA user_version = 1;
";

/// Name of the scalar SQL function registered on every connection for
/// Unicode-aware case-insensitive substring matching.
pub const ICONTAINS_FN: &str = "icontains";
