//! Error types for `roster-core`.

use thiserror::Error;

use crate::{hierarchy::HierarchyError, validate::ValidationErrors};

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] ValidationErrors),

  #[error("store lock poisoned")]
  Poisoned,
}

impl From<HierarchyError> for Error {
  fn from(e: HierarchyError) -> Self { Self::Validation(e.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
