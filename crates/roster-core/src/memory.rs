//! [`MemoryStore`]: an in-process arena implementation of [`EmployeeStore`].
//!
//! Rows live in a vector indexed by `id - 1`; deleted rows leave a hole so ids
//! are never reused. Manager links are plain ids into the same vector, so the
//! hierarchy is data, not ownership.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
  Error, Result,
  employee::{self, Employee, EmployeeId, EmployeeUpdate, NewEmployee},
  filter::EmployeeFilters,
  hierarchy::ManagerLookup,
  pagination::Pagination,
  store::EmployeeStore,
  validate::validate_employee,
};

// ─── Arena ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Arena {
  slots: Vec<Option<Employee>>,
}

impl Arena {
  fn index(id: EmployeeId) -> Option<usize> {
    usize::try_from(id).ok()?.checked_sub(1)
  }

  fn get(&self, id: EmployeeId) -> Option<&Employee> {
    self.slots.get(Self::index(id)?)?.as_ref()
  }

  fn get_mut(&mut self, id: EmployeeId) -> Option<&mut Employee> {
    let idx = Self::index(id)?;
    self.slots.get_mut(idx)?.as_mut()
  }

  fn next_id(&self) -> EmployeeId { self.slots.len() as EmployeeId + 1 }

  fn rows(&self) -> impl Iterator<Item = &Employee> {
    self.slots.iter().flatten()
  }

  /// Field rules always; the hierarchy only when the manager link is written.
  fn check(
    &self,
    candidate: Option<EmployeeId>,
    draft: &NewEmployee,
    reassigns: bool,
  ) -> Result<()> {
    validate_employee(self, candidate, draft, reassigns)
  }
}

impl ManagerLookup for Arena {
  type Error = Error;

  fn manager_of(&self, id: EmployeeId) -> Result<Option<Option<EmployeeId>>> {
    Ok(self.get(id).map(|e| e.manager_id))
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An employee store held entirely in memory.
///
/// Cloning is cheap; clones share the same arena.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  arena: Arc<Mutex<Arena>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> Result<MutexGuard<'_, Arena>> {
    self.arena.lock().map_err(|_| Error::Poisoned)
  }

  /// Overwrite the server-assigned timestamps of a row.
  #[cfg(test)]
  pub(crate) fn set_timestamps(
    &self,
    id: EmployeeId,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
  ) {
    let mut arena = self.lock().unwrap();
    let e = arena.get_mut(id).unwrap();
    e.created_at = created_at;
    e.updated_at = updated_at;
  }
}

impl EmployeeStore for MemoryStore {
  type Error = Error;

  async fn create(&self, input: NewEmployee) -> Result<Employee> {
    let mut arena = self.lock()?;
    arena.check(None, &input, true)?;

    let employee = Employee::from_draft(arena.next_id(), input, employee::now());
    arena.slots.push(Some(employee.clone()));
    Ok(employee)
  }

  async fn update(
    &self,
    id: EmployeeId,
    patch: EmployeeUpdate,
  ) -> Result<Option<Employee>> {
    let mut arena = self.lock()?;
    let Some(current) = arena.get(id) else {
      return Ok(None);
    };

    let reassigns = patch.reassigns_manager();
    let draft = patch.merge(current);
    arena.check(Some(id), &draft, reassigns)?;

    let Some(row) = arena.get_mut(id) else {
      return Ok(None);
    };
    row.apply_draft(draft, employee::now());
    Ok(Some(row.clone()))
  }

  async fn delete(&self, id: EmployeeId) -> Result<bool> {
    let mut arena = self.lock()?;
    let Some(slot) = Arena::index(id).and_then(|i| arena.slots.get_mut(i)) else {
      return Ok(false);
    };
    if slot.take().is_none() {
      return Ok(false);
    }

    for sub in arena.slots.iter_mut().flatten() {
      if sub.manager_id == Some(id) {
        sub.manager_id = None;
      }
    }
    Ok(true)
  }

  async fn get(&self, id: EmployeeId) -> Result<Option<Employee>> {
    Ok(self.lock()?.get(id).cloned())
  }

  async fn count(&self, filters: &EmployeeFilters) -> Result<u64> {
    let predicate = filters.to_predicate();
    let arena = self.lock()?;
    Ok(arena.rows().filter(|e| predicate.matches(e)).count() as u64)
  }

  async fn list(
    &self,
    filters: &EmployeeFilters,
    pagination: Pagination,
  ) -> Result<Vec<Employee>> {
    let predicate = filters.to_predicate();
    let arena = self.lock()?;
    let matching = arena.rows().filter(|e| predicate.matches(e));
    Ok(pagination.slice(matching).cloned().collect())
  }
}
