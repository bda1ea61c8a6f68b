//! Manager-hierarchy validation.
//!
//! Employees form a forest through their `manager_id` back-references. The
//! records themselves never own each other, so the checks here are a bounded
//! upward walk over ids rather than a graph traversal over pointers.
//!
//! Identity is always the persisted id. A manager reference can only name a
//! persisted row, so an unsaved candidate can never appear in its own chain;
//! for it the walk only validates the proposed manager's existing chain.

use std::collections::HashSet;

use thiserror::Error;

use crate::employee::EmployeeId;

/// Maximum number of managers allowed above any employee.
pub const MAX_MANAGER_DEPTH: usize = 5;

/// Why a manager assignment was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HierarchyError {
  #[error("an employee cannot be their own manager")]
  SelfReference,

  #[error("manager assignment creates a cycle through employee {id}")]
  CycleDetected { id: EmployeeId },

  #[error(
    "manager chain is {depth} levels deep; at most {} are allowed",
    MAX_MANAGER_DEPTH
  )]
  DepthExceeded { depth: usize },

  #[error("manager {id} does not exist")]
  ManagerNotFound { id: EmployeeId },
}

impl HierarchyError {
  /// Stable machine-readable code, used in field-scoped error payloads.
  pub fn code(&self) -> &'static str {
    match self {
      Self::SelfReference => "self_reference",
      Self::CycleDetected { .. } => "cycle_detected",
      Self::DepthExceeded { .. } => "depth_exceeded",
      Self::ManagerNotFound { .. } => "manager_not_found",
    }
  }
}

/// Read access to the manager links of persisted employees.
///
/// Implemented by each backend over whatever it can read consistently with
/// the pending write (the arena under its lock, a SQLite transaction).
pub trait ManagerLookup {
  type Error: From<HierarchyError>;

  /// `None` if no employee `id` exists, otherwise that employee's manager.
  fn manager_of(
    &self,
    id: EmployeeId,
  ) -> Result<Option<Option<EmployeeId>>, Self::Error>;
}

/// Check that `candidate` may report to `manager`.
///
/// `candidate` is `None` for an employee that has not been persisted yet.
/// Returns the depth of the resulting chain (0 when there is no manager).
pub fn validate_manager<L: ManagerLookup>(
  lookup: &L,
  candidate: Option<EmployeeId>,
  manager: Option<EmployeeId>,
) -> Result<usize, L::Error> {
  check_manager(lookup, candidate, manager)?.map_err(Into::into)
}

/// Like [`validate_manager`], but keeps a rejected assignment apart from a
/// failing lookup: the outer error is the lookup's, the inner one the verdict.
pub fn check_manager<L: ManagerLookup>(
  lookup: &L,
  candidate: Option<EmployeeId>,
  manager: Option<EmployeeId>,
) -> Result<Result<usize, HierarchyError>, L::Error> {
  let Some(first) = manager else {
    return Ok(Ok(0));
  };

  if candidate == Some(first) {
    return Ok(Err(HierarchyError::SelfReference));
  }

  let mut visited: HashSet<EmployeeId> = candidate.into_iter().collect();
  let mut current = Some(first);
  let mut depth = 0;

  while let Some(id) = current {
    if !visited.insert(id) {
      return Ok(Err(HierarchyError::CycleDetected { id }));
    }

    depth += 1;
    if depth > MAX_MANAGER_DEPTH {
      return Ok(Err(HierarchyError::DepthExceeded { depth }));
    }

    current = match lookup.manager_of(id)? {
      Some(next) => next,
      None => return Ok(Err(HierarchyError::ManagerNotFound { id })),
    };
  }

  Ok(Ok(depth))
}
