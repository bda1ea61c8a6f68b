//! Employee filters and the predicate they compile to.
//!
//! [`EmployeeFilters`] is the caller-facing shape: every field optional.
//! [`EmployeeFilters::to_predicate`] folds the populated fields into a single
//! conjunctive [`Predicate`], which backends either evaluate in memory
//! ([`Predicate::matches`]) or translate into their own query language.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, SubsecRound as _, TimeDelta, Utc};
use rust_decimal::Decimal;

use crate::employee::{Employee, EmployeeId};

// ─── Filters ─────────────────────────────────────────────────────────────────

/// Structured list filter. Absent fields add no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilters {
  pub id:              Option<EmployeeId>,
  pub ids:             Option<Vec<EmployeeId>>,

  /// Case-insensitive substring filters.
  pub first_name:      Option<String>,
  pub last_name:       Option<String>,
  pub middle_name:     Option<String>,
  pub position:        Option<String>,

  /// Substring search across all name fields and position.
  pub search:          Option<String>,

  pub date_hired_from: Option<NaiveDate>,
  pub date_hired_to:   Option<NaiveDate>,

  pub salary_min:      Option<Decimal>,
  pub salary_max:      Option<Decimal>,

  pub manager_id:      Option<EmployeeId>,

  pub created_at_from: Option<DateTime<Utc>>,
  pub created_at_to:   Option<DateTime<Utc>>,
  pub updated_at_from: Option<DateTime<Utc>>,
  pub updated_at_to:   Option<DateTime<Utc>>,
}

impl EmployeeFilters {
  /// Compile into a single conjunctive predicate.
  ///
  /// Rows store timestamps at microseconds, so a lower timestamp bound is
  /// rounded up to the next microsecond and an upper one truncated.
  pub fn to_predicate(&self) -> Predicate {
    use Field::*;

    let text = |field: Field, v: &Option<String>| {
      v.as_ref().map(|s| Predicate::IContains(field, s.clone()))
    };
    let from = |t: &Option<DateTime<Utc>>| t.map(|t| Value::Timestamp(ceil_micros(t)));
    let to = |t: &Option<DateTime<Utc>>| t.map(|t| Value::Timestamp(t.trunc_subsecs(6)));

    PredicateBuilder::new()
      .push(self.id.map(|id| Predicate::Eq(Id, Value::Int(id))))
      .push(self.ids.clone().map(|ids| Predicate::In(Id, ids)))
      .push(text(FirstName, &self.first_name))
      .push(text(LastName, &self.last_name))
      .push(text(MiddleName, &self.middle_name))
      .push(text(Position, &self.position))
      .push(self.search.as_ref().map(|s| {
        Predicate::Or(
          Field::TEXT
            .iter()
            .map(|&f| Predicate::IContains(f, s.clone()))
            .collect(),
        )
      }))
      .push(self.date_hired_from.map(|d| Predicate::Gte(DateHired, Value::Date(d))))
      .push(self.date_hired_to.map(|d| Predicate::Lte(DateHired, Value::Date(d))))
      .push(self.salary_min.map(|m| Predicate::Gte(Salary, Value::Money(m))))
      .push(self.salary_max.map(|m| Predicate::Lte(Salary, Value::Money(m))))
      .push(self.manager_id.map(|id| Predicate::Eq(ManagerId, Value::Int(id))))
      .push(from(&self.created_at_from).map(|v| Predicate::Gte(CreatedAt, v)))
      .push(to(&self.created_at_to).map(|v| Predicate::Lte(CreatedAt, v)))
      .push(from(&self.updated_at_from).map(|v| Predicate::Gte(UpdatedAt, v)))
      .push(to(&self.updated_at_to).map(|v| Predicate::Lte(UpdatedAt, v)))
      .build()
  }
}

/// Smallest whole microsecond not before `t`.
fn ceil_micros(t: DateTime<Utc>) -> DateTime<Utc> {
  let floor = t.trunc_subsecs(6);
  if floor == t {
    return floor;
  }
  floor.checked_add_signed(TimeDelta::microseconds(1)).unwrap_or(floor)
}

// ─── Fields and values ───────────────────────────────────────────────────────

/// A filterable employee column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
  Id,
  FirstName,
  LastName,
  MiddleName,
  Position,
  DateHired,
  Salary,
  ManagerId,
  CreatedAt,
  UpdatedAt,
}

impl Field {
  /// The fields covered by free-text search.
  pub const TEXT: [Field; 4] =
    [Field::FirstName, Field::LastName, Field::MiddleName, Field::Position];

  /// Read this field from `e`. `None` for a null (no manager).
  pub fn value_of(self, e: &Employee) -> Option<Value> {
    Some(match self {
      Field::Id => Value::Int(e.id),
      Field::FirstName => Value::Text(e.first_name.clone()),
      Field::LastName => Value::Text(e.last_name.clone()),
      Field::MiddleName => Value::Text(e.middle_name.clone()),
      Field::Position => Value::Text(e.position.clone()),
      Field::DateHired => Value::Date(e.date_hired),
      Field::Salary => Value::Money(e.salary),
      Field::ManagerId => Value::Int(e.manager_id?),
      Field::CreatedAt => Value::Timestamp(e.created_at),
      Field::UpdatedAt => Value::Timestamp(e.updated_at),
    })
  }
}

/// A typed operand. Values of different variants never compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
  Int(i64),
  Text(String),
  Date(NaiveDate),
  Money(Decimal),
  Timestamp(DateTime<Utc>),
}

impl Value {
  fn compare(&self, other: &Value) -> Option<Ordering> {
    match (self, other) {
      (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
      (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
      (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
      (Value::Money(a), Value::Money(b)) => Some(a.cmp(b)),
      (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
      _ => None,
    }
  }
}

/// Unicode case-insensitive substring test shared by every backend.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
  haystack.to_lowercase().contains(&needle.to_lowercase())
}

// ─── Predicate ───────────────────────────────────────────────────────────────

/// A boolean expression over one employee row.
///
/// Comparisons against a null field are false, matching SQL semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
  /// Matches every row.
  All,
  Eq(Field, Value),
  /// Set membership; an empty set matches nothing.
  In(Field, Vec<i64>),
  IContains(Field, String),
  Gte(Field, Value),
  Lte(Field, Value),
  And(Vec<Predicate>),
  Or(Vec<Predicate>),
}

impl Predicate {
  /// Conjunction that absorbs `All` and flattens nested `And`s.
  pub fn and(self, other: Predicate) -> Predicate {
    match (self, other) {
      (Predicate::All, p) | (p, Predicate::All) => p,
      (Predicate::And(mut a), Predicate::And(b)) => {
        a.extend(b);
        Predicate::And(a)
      }
      (Predicate::And(mut a), p) => {
        a.push(p);
        Predicate::And(a)
      }
      (p, Predicate::And(mut b)) => {
        b.insert(0, p);
        Predicate::And(b)
      }
      (a, b) => Predicate::And(vec![a, b]),
    }
  }

  pub fn matches(&self, e: &Employee) -> bool {
    let cmp = |field: &Field, v: &Value| {
      field.value_of(e).and_then(|actual| actual.compare(v))
    };

    match self {
      Predicate::All => true,
      Predicate::Eq(f, v) => cmp(f, v) == Some(Ordering::Equal),
      Predicate::In(f, set) => match f.value_of(e) {
        Some(Value::Int(actual)) => set.contains(&actual),
        _ => false,
      },
      Predicate::IContains(f, needle) => match f.value_of(e) {
        Some(Value::Text(actual)) => contains_ci(&actual, needle),
        _ => false,
      },
      Predicate::Gte(f, v) => cmp(f, v).is_some_and(Ordering::is_ge),
      Predicate::Lte(f, v) => cmp(f, v).is_some_and(Ordering::is_le),
      Predicate::And(ps) => ps.iter().all(|p| p.matches(e)),
      Predicate::Or(ps) => ps.iter().any(|p| p.matches(e)),
    }
  }
}

/// Folds an ordered list of optional predicates into one conjunction.
#[derive(Debug, Default)]
pub struct PredicateBuilder {
  parts: Vec<Predicate>,
}

impl PredicateBuilder {
  pub fn new() -> Self { Self::default() }

  /// Add `p` if present; `None` contributes no constraint.
  pub fn push(mut self, p: Option<Predicate>) -> Self {
    self.parts.extend(p);
    self
  }

  pub fn build(self) -> Predicate {
    self.parts.into_iter().fold(Predicate::All, Predicate::and)
  }
}
