//! The `EmployeeStore` trait.
//!
//! The trait is implemented by storage backends (the in-memory arena in
//! [`crate::memory`], `roster-store-sqlite`). Higher layers (`roster-api`)
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  employee::{Employee, EmployeeId, EmployeeUpdate, NewEmployee},
  filter::EmployeeFilters,
  pagination::Pagination,
  validate::ValidationErrors,
};

/// Errors a store can return. Validation failures are distinguished so the
/// caller can report them per field instead of as a backend fault.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The field errors that blocked a write, if this is a validation failure.
  fn validation(&self) -> Option<&ValidationErrors>;
}

impl StoreError for crate::Error {
  fn validation(&self) -> Option<&ValidationErrors> {
    match self {
      crate::Error::Validation(v) => Some(v),
      _ => None,
    }
  }
}

/// Abstraction over an employee store backend.
///
/// Every write validates the resulting row (field rules and the manager
/// hierarchy) before anything is persisted; a rejected write leaves the store
/// untouched.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait EmployeeStore: Send + Sync {
  type Error: StoreError;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Validate and insert a new employee. Identity and timestamps are
  /// assigned by the store.
  fn create(
    &self,
    input: NewEmployee,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + '_;

  /// Apply a patch. Returns `None` if `id` does not exist.
  fn update(
    &self,
    id: EmployeeId,
    patch: EmployeeUpdate,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + '_;

  /// Delete an employee; subordinates lose their manager reference.
  /// Returns `false` if `id` did not exist.
  fn delete(
    &self,
    id: EmployeeId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve an employee by id. Returns `None` if not found.
  fn get(
    &self,
    id: EmployeeId,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + '_;

  /// Number of employees matching `filters`.
  fn count<'a>(
    &'a self,
    filters: &'a EmployeeFilters,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Employees matching `filters`, ordered by id, sliced by `pagination`.
  fn list<'a>(
    &'a self,
    filters: &'a EmployeeFilters,
    pagination: Pagination,
  ) -> impl Future<Output = Result<Vec<Employee>, Self::Error>> + Send + 'a;
}
