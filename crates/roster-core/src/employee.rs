//! The `Employee` record and its write inputs.
//!
//! Identity and timestamps are always assigned by the store. Callers create
//! rows from a [`NewEmployee`] and modify them with an [`EmployeeUpdate`]
//! patch, which is merged back into a [`NewEmployee`] draft before
//! validation.

use chrono::{DateTime, NaiveDate, SubsecRound as _, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Store-assigned identity of an employee row.
pub type EmployeeId = i64;

// ─── Employee ────────────────────────────────────────────────────────────────

/// A persisted employee row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
  pub id:          EmployeeId,
  pub last_name:   String,
  pub first_name:  String,
  pub middle_name: String,
  pub position:    String,
  pub date_hired:  NaiveDate,
  #[serde(with = "rust_decimal::serde::float")]
  pub salary:      Decimal,
  /// The employee's direct manager, if any.
  pub manager_id:  Option<EmployeeId>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

impl Employee {
  /// Build a freshly-inserted row from a validated draft.
  pub fn from_draft(id: EmployeeId, draft: NewEmployee, now: DateTime<Utc>) -> Self {
    Self {
      id,
      last_name: draft.last_name,
      first_name: draft.first_name,
      middle_name: draft.middle_name,
      position: draft.position,
      date_hired: draft.date_hired,
      salary: draft.salary,
      manager_id: draft.manager_id,
      created_at: now,
      updated_at: now,
    }
  }

  /// Overwrite every mutable field from `draft` and bump `updated_at`.
  pub fn apply_draft(&mut self, draft: NewEmployee, now: DateTime<Utc>) {
    self.last_name = draft.last_name;
    self.first_name = draft.first_name;
    self.middle_name = draft.middle_name;
    self.position = draft.position;
    self.date_hired = draft.date_hired;
    self.salary = draft.salary;
    self.manager_id = draft.manager_id;
    self.updated_at = now;
  }

  /// "Last First Middle", trimmed.
  pub fn full_name(&self) -> String {
    format!("{} {} {}", self.last_name, self.first_name, self.middle_name)
      .trim()
      .to_owned()
  }
}

/// The current time at the precision the stores persist (microseconds).
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

// ─── NewEmployee ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::EmployeeStore::create`], and the merged draft an
/// update is validated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
  pub last_name:   String,
  pub first_name:  String,
  pub middle_name: String,
  pub position:    String,
  pub date_hired:  NaiveDate,
  pub salary:      Decimal,
  pub manager_id:  Option<EmployeeId>,
}

impl NewEmployee {
  /// Convenience constructor for an employee without a manager.
  pub fn new(
    last_name: impl Into<String>,
    first_name: impl Into<String>,
    middle_name: impl Into<String>,
    position: impl Into<String>,
    date_hired: NaiveDate,
    salary: Decimal,
  ) -> Self {
    Self {
      last_name: last_name.into(),
      first_name: first_name.into(),
      middle_name: middle_name.into(),
      position: position.into(),
      date_hired,
      salary,
      manager_id: None,
    }
  }

  pub fn with_manager(mut self, manager_id: EmployeeId) -> Self {
    self.manager_id = Some(manager_id);
    self
  }
}

// ─── EmployeeUpdate ──────────────────────────────────────────────────────────

/// A partial update. `None` leaves a field untouched.
///
/// `manager_id` is a double option: `Some(None)` clears the manager,
/// `Some(Some(id))` reassigns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeUpdate {
  pub last_name:   Option<String>,
  pub first_name:  Option<String>,
  pub middle_name: Option<String>,
  pub position:    Option<String>,
  pub date_hired:  Option<NaiveDate>,
  pub salary:      Option<Decimal>,
  pub manager_id:  Option<Option<EmployeeId>>,
}

impl EmployeeUpdate {
  /// Whether this patch touches the manager reference.
  pub fn reassigns_manager(&self) -> bool { self.manager_id.is_some() }

  /// Merge the patch over `current`, producing the draft to validate.
  pub fn merge(self, current: &Employee) -> NewEmployee {
    NewEmployee {
      last_name:   self.last_name.unwrap_or_else(|| current.last_name.clone()),
      first_name:  self.first_name.unwrap_or_else(|| current.first_name.clone()),
      middle_name: self
        .middle_name
        .unwrap_or_else(|| current.middle_name.clone()),
      position:    self.position.unwrap_or_else(|| current.position.clone()),
      date_hired:  self.date_hired.unwrap_or(current.date_hired),
      salary:      self.salary.unwrap_or(current.salary),
      manager_id:  self.manager_id.unwrap_or(current.manager_id),
    }
  }
}
