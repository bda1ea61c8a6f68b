//! Error type for `roster-store-sqlite`.

use roster_core::{
  hierarchy::HierarchyError, store::StoreError, validate::ValidationErrors,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("salary out of range: {0}")]
  Salary(String),

  #[error(transparent)]
  Validation(#[from] ValidationErrors),
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self { Self::Database(e.into()) }
}

impl From<HierarchyError> for Error {
  fn from(e: HierarchyError) -> Self { Self::Validation(e.into()) }
}

impl StoreError for Error {
  fn validation(&self) -> Option<&ValidationErrors> {
    match self {
      Error::Validation(v) => Some(v),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
