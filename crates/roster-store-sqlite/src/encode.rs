//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width
//! and a `Z` suffix, so lexicographic order equals chronological order.
//! Dates are `YYYY-MM-DD`. Salaries are stored as integer cents.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use roster_core::{employee::Employee, validate::SALARY_SCALE};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive as _};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Salary ──────────────────────────────────────────────────────────────────

/// How to bring a decimal with more than two fractional digits onto the
/// cent grid. Range bounds round inwards so the integer comparison keeps the
/// exact decimal semantics.
#[derive(Debug, Clone, Copy)]
pub enum Cents {
  Exact,
  Ceil,
  Floor,
}

pub fn encode_cents(amount: Decimal, mode: Cents) -> Result<i64> {
  let strategy = match mode {
    Cents::Exact => RoundingStrategy::MidpointNearestEven,
    Cents::Ceil => RoundingStrategy::ToPositiveInfinity,
    Cents::Floor => RoundingStrategy::ToNegativeInfinity,
  };
  amount
    .round_dp_with_strategy(SALARY_SCALE, strategy)
    .checked_mul(Decimal::from(10_i64.pow(SALARY_SCALE)))
    .and_then(|cents| cents.to_i64())
    .ok_or_else(|| Error::Salary(amount.to_string()))
}

/// Like [`encode_cents`], but saturating: a bound beyond the representable
/// range still compares correctly against every storable salary.
pub fn bound_cents(amount: Decimal, mode: Cents) -> i64 {
  encode_cents(amount, mode).unwrap_or(if amount.is_sign_negative() {
    i64::MIN
  } else {
    i64::MAX
  })
}

pub fn decode_cents(cents: i64) -> Decimal { Decimal::new(cents, SALARY_SCALE) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// The column list every employee `SELECT` uses, in [`RawEmployee`] order.
pub const EMPLOYEE_COLUMNS: &str = "id, last_name, first_name, middle_name, position, \
   date_hired, salary_cents, manager_id, created_at, updated_at";

/// Raw values read directly from an `employees` row.
pub struct RawEmployee {
  pub id:           i64,
  pub last_name:    String,
  pub first_name:   String,
  pub middle_name:  String,
  pub position:     String,
  pub date_hired:   String,
  pub salary_cents: i64,
  pub manager_id:   Option<i64>,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawEmployee {
  /// Read a row selected with [`EMPLOYEE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      last_name:    row.get(1)?,
      first_name:   row.get(2)?,
      middle_name:  row.get(3)?,
      position:     row.get(4)?,
      date_hired:   row.get(5)?,
      salary_cents: row.get(6)?,
      manager_id:   row.get(7)?,
      created_at:   row.get(8)?,
      updated_at:   row.get(9)?,
    })
  }

  pub fn into_employee(self) -> Result<Employee> {
    Ok(Employee {
      id:          self.id,
      last_name:   self.last_name,
      first_name:  self.first_name,
      middle_name: self.middle_name,
      position:    self.position,
      date_hired:  decode_date(&self.date_hired)?,
      salary:      decode_cents(self.salary_cents),
      manager_id:  self.manager_id,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}
