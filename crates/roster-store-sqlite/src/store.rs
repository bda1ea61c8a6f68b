//! [`SqliteStore`]: the SQLite implementation of [`EmployeeStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, functions::FunctionFlags};
use roster_core::{
  employee::{self, Employee, EmployeeId, EmployeeUpdate, NewEmployee},
  filter::{EmployeeFilters, contains_ci},
  hierarchy::ManagerLookup,
  pagination::Pagination,
  store::EmployeeStore,
  validate::validate_employee,
};

use crate::{
  Error, Result,
  encode::{Cents, EMPLOYEE_COLUMNS, RawEmployee, encode_cents, encode_date, encode_dt},
  query::SqlFilter,
  schema::{ICONTAINS_FN, SCHEMA},
};

// ─── Writes inside a transaction ─────────────────────────────────────────────

/// Reads manager links through whatever connection or transaction the write
/// runs in, so the check sees exactly what the commit will.
struct ConnLookup<'c>(&'c rusqlite::Connection);

impl ManagerLookup for ConnLookup<'_> {
  type Error = Error;

  fn manager_of(&self, id: EmployeeId) -> Result<Option<Option<EmployeeId>>> {
    Ok(
      self
        .0
        .query_row(
          "SELECT manager_id FROM employees WHERE id = ?1",
          rusqlite::params![id],
          |row| row.get::<_, Option<EmployeeId>>(0),
        )
        .optional()?,
    )
  }
}

fn insert_row(
  tx: &rusqlite::Connection,
  input: NewEmployee,
  now: DateTime<Utc>,
) -> Result<Employee> {
  validate_employee(&ConnLookup(tx), None, &input, true)?;
  let row = EncodedDraft::new(&input)?;

  tx.execute(
    "INSERT INTO employees (
       last_name, first_name, middle_name, position, date_hired,
       salary_cents, manager_id, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
    rusqlite::params![
      row.last_name,
      row.first_name,
      row.middle_name,
      row.position,
      row.date_hired,
      row.salary_cents,
      row.manager_id,
      encode_dt(now),
    ],
  )?;
  Ok(Employee::from_draft(tx.last_insert_rowid(), input, now))
}

/// Read, merge, validate and write one row against a single snapshot.
fn update_row(
  tx: &rusqlite::Connection,
  id: EmployeeId,
  patch: EmployeeUpdate,
  now: DateTime<Utc>,
) -> Result<Option<Employee>> {
  let raw = tx
    .query_row(
      &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?1"),
      rusqlite::params![id],
      RawEmployee::from_row,
    )
    .optional()?;
  let Some(mut current) = raw.map(RawEmployee::into_employee).transpose()? else {
    return Ok(None);
  };

  let reassigns = patch.reassigns_manager();
  let draft = patch.merge(&current);
  validate_employee(&ConnLookup(tx), Some(id), &draft, reassigns)?;
  let row = EncodedDraft::new(&draft)?;

  tx.execute(
    "UPDATE employees SET
       last_name = ?2, first_name = ?3, middle_name = ?4, position = ?5,
       date_hired = ?6, salary_cents = ?7, manager_id = ?8, updated_at = ?9
     WHERE id = ?1",
    rusqlite::params![
      id,
      row.last_name,
      row.first_name,
      row.middle_name,
      row.position,
      row.date_hired,
      row.salary_cents,
      row.manager_id,
      encode_dt(now),
    ],
  )?;
  current.apply_draft(draft, now);
  Ok(Some(current))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Column values of a validated draft, encoded for binding.
struct EncodedDraft {
  last_name:    String,
  first_name:   String,
  middle_name:  String,
  position:     String,
  date_hired:   String,
  salary_cents: i64,
  manager_id:   Option<EmployeeId>,
}

impl EncodedDraft {
  fn new(draft: &NewEmployee) -> Result<Self> {
    Ok(Self {
      last_name:    draft.last_name.clone(),
      first_name:   draft.first_name.clone(),
      middle_name:  draft.middle_name.clone(),
      position:     draft.position.clone(),
      date_hired:   encode_date(draft.date_hired),
      salary_cents: encode_cents(draft.salary, Cents::Exact)?,
      manager_id:   draft.manager_id,
    })
  }
}

/// An employee store backed by a single SQLite file.
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
    store.init().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init().await?;
    Ok(store)
  }

  async fn init(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        conn.create_scalar_function(
          ICONTAINS_FN,
          2,
          FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
          |ctx| {
            let haystack: Option<String> = ctx.get(0)?;
            let needle: Option<String> = ctx.get(1)?;
            Ok(match (haystack, needle) {
              (Some(h), Some(n)) => contains_ci(&h, &n),
              _ => false,
            })
          },
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Overwrite the server-assigned timestamps of a row.
  #[cfg(test)]
  pub(crate) async fn set_timestamps(
    &self,
    id: EmployeeId,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
  ) -> Result<()> {
    let created = encode_dt(created_at);
    let updated = encode_dt(updated_at);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE employees SET created_at = ?2, updated_at = ?3 WHERE id = ?1",
          rusqlite::params![id, created, updated],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── EmployeeStore impl ──────────────────────────────────────────────────────

impl EmployeeStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn create(&self, input: NewEmployee) -> Result<Employee> {
    let now = employee::now();
    let created = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let out = insert_row(&tx, input, now);
        if out.is_ok() {
          tx.commit()?;
        }
        Ok(out)
      })
      .await??;

    tracing::debug!(employee_id = created.id, "employee created");
    Ok(created)
  }

  async fn update(
    &self,
    id: EmployeeId,
    patch: EmployeeUpdate,
  ) -> Result<Option<Employee>> {
    let reassigns = patch.reassigns_manager();
    let now = employee::now();
    let updated = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let out = update_row(&tx, id, patch, now);
        if matches!(out, Ok(Some(_))) {
          tx.commit()?;
        }
        Ok(out)
      })
      .await??;

    if updated.is_some() {
      tracing::debug!(employee_id = id, reassigns, "employee updated");
    }
    Ok(updated)
  }

  async fn delete(&self, id: EmployeeId) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        // `ON DELETE SET NULL` detaches subordinates.
        let n = conn.execute(
          "DELETE FROM employees WHERE id = ?1",
          rusqlite::params![id],
        )?;
        Ok(n > 0)
      })
      .await?;

    if deleted {
      tracing::debug!(employee_id = id, "employee deleted");
    }
    Ok(deleted)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get(&self, id: EmployeeId) -> Result<Option<Employee>> {
    let raw: Option<RawEmployee> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?1"),
              rusqlite::params![id],
              RawEmployee::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEmployee::into_employee).transpose()
  }

  async fn count(&self, filters: &EmployeeFilters) -> Result<u64> {
    let SqlFilter { clause, params } = SqlFilter::from_predicate(&filters.to_predicate());

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!("SELECT COUNT(*) FROM employees WHERE {clause}"),
          rusqlite::params_from_iter(params.iter()),
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(u64::try_from(n).unwrap_or_default())
  }

  async fn list(
    &self,
    filters: &EmployeeFilters,
    pagination: Pagination,
  ) -> Result<Vec<Employee>> {
    let SqlFilter { clause, mut params } =
      SqlFilter::from_predicate(&filters.to_predicate());

    let limit = i64::try_from(pagination.limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(pagination.offset).unwrap_or(i64::MAX);
    params.push(limit.into());
    let limit_idx = params.len();
    params.push(offset.into());
    let offset_idx = params.len();

    let raws: Vec<RawEmployee> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {EMPLOYEE_COLUMNS}
           FROM employees
           WHERE {clause}
           ORDER BY id
           LIMIT ?{limit_idx} OFFSET ?{offset_idx}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawEmployee::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEmployee::into_employee).collect()
  }
}
