//! Field-level validation of employee drafts.
//!
//! Every rule failure becomes a [`FieldError`] scoped to the offending field;
//! a write is rejected as a whole if any rule fails. Hierarchy failures are
//! folded in under the `manager` field.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
  employee::{EmployeeId, NewEmployee},
  hierarchy::{HierarchyError, ManagerLookup, check_manager},
};

pub const NAME_MAX_CHARS: usize = 255;
pub const POSITION_MAX_CHARS: usize = 128;
/// Salary is stored with at most this many fractional digits …
pub const SALARY_SCALE: u32 = 2;
/// … and at most this many digits in total.
pub const SALARY_MAX_DIGITS: u32 = 12;

/// A single rule failure, scoped to one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   &'static str,
  pub code:    &'static str,
  pub message: String,
}

impl FieldError {
  pub fn new(
    field: &'static str,
    code: &'static str,
    message: impl Into<String>,
  ) -> Self {
    Self { field, code, message: message.into() }
  }
}

impl From<HierarchyError> for FieldError {
  fn from(e: HierarchyError) -> Self {
    Self::new("manager", e.code(), e.to_string())
  }
}

/// A non-empty set of field errors blocking a write.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
  pub fn errors(&self) -> &[FieldError] { &self.0 }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// The first error recorded against `field`, if any.
  pub fn field(&self, field: &str) -> Option<&FieldError> {
    self.0.iter().find(|e| e.field == field)
  }

  fn push(&mut self, err: FieldError) { self.0.push(err); }

  fn into_result(self) -> Result<(), Self> {
    if self.0.is_empty() { Ok(()) } else { Err(self) }
  }
}

impl From<HierarchyError> for ValidationErrors {
  fn from(e: HierarchyError) -> Self { Self(vec![e.into()]) }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("validation failed")?;
    for (i, e) in self.0.iter().enumerate() {
      let sep = if i == 0 { ": " } else { "; " };
      write!(f, "{sep}{}: {}", e.field, e.message)?;
    }
    Ok(())
  }
}

impl std::error::Error for ValidationErrors {}

// ─── Rules ───────────────────────────────────────────────────────────────────

fn check_text(
  errors: &mut ValidationErrors,
  field: &'static str,
  value: &str,
  max_chars: usize,
) {
  if value.trim().is_empty() {
    errors.push(FieldError::new(field, "blank", "this field may not be blank"));
  } else if value.chars().count() > max_chars {
    errors.push(FieldError::new(
      field,
      "too_long",
      format!("at most {max_chars} characters are allowed"),
    ));
  }
}

fn check_salary(errors: &mut ValidationErrors, salary: Decimal) {
  if salary.is_sign_negative() && !salary.is_zero() {
    errors.push(FieldError::new("salary", "negative", "salary cannot be negative"));
    return;
  }

  let normalized = salary.normalize();
  if normalized.scale() > SALARY_SCALE {
    errors.push(FieldError::new(
      "salary",
      "precision",
      format!("at most {SALARY_SCALE} decimal places are allowed"),
    ));
    return;
  }

  let max_whole = Decimal::from(10_i64.pow(SALARY_MAX_DIGITS - SALARY_SCALE));
  if normalized >= max_whole {
    errors.push(FieldError::new(
      "salary",
      "too_large",
      format!("at most {SALARY_MAX_DIGITS} digits are allowed"),
    ));
  }
}

fn field_errors(draft: &NewEmployee) -> ValidationErrors {
  let mut errors = ValidationErrors::default();
  check_text(&mut errors, "last_name", &draft.last_name, NAME_MAX_CHARS);
  check_text(&mut errors, "first_name", &draft.first_name, NAME_MAX_CHARS);
  check_text(&mut errors, "middle_name", &draft.middle_name, NAME_MAX_CHARS);
  check_text(&mut errors, "position", &draft.position, POSITION_MAX_CHARS);
  check_salary(&mut errors, draft.salary);
  errors
}

/// Validate every field rule of `draft`. The manager reference is checked
/// separately by [`crate::hierarchy::validate_manager`].
pub fn validate_fields(draft: &NewEmployee) -> Result<(), ValidationErrors> {
  field_errors(draft).into_result()
}

/// Field rules plus, when `reassigns` is set, the manager hierarchy. All
/// failures are reported together; only a failing lookup short-circuits.
pub fn validate_employee<L>(
  lookup: &L,
  candidate: Option<EmployeeId>,
  draft: &NewEmployee,
  reassigns: bool,
) -> Result<(), L::Error>
where
  L: ManagerLookup,
  L::Error: From<ValidationErrors>,
{
  let mut errors = field_errors(draft);
  if reassigns
    && let Err(rejected) = check_manager(lookup, candidate, draft.manager_id)?
  {
    errors.push(rejected.into());
  }
  errors.into_result().map_err(Into::into)
}
