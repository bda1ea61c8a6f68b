//! Offset/limit pagination.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u64 = 20;

/// Requested slice of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
  #[serde(default)]
  pub offset: u64,
  #[serde(default = "default_limit")]
  pub limit:  u64,
}

fn default_limit() -> u64 { DEFAULT_LIMIT }

impl Default for Pagination {
  fn default() -> Self { Self { offset: 0, limit: DEFAULT_LIMIT } }
}

impl Pagination {
  pub fn new(offset: u64, limit: u64) -> Self { Self { offset, limit } }

  /// Apply to an already-ordered iterator.
  pub fn slice<I: IntoIterator>(&self, items: I) -> impl Iterator<Item = I::Item> {
    items
      .into_iter()
      .skip(usize::try_from(self.offset).unwrap_or(usize::MAX))
      .take(usize::try_from(self.limit).unwrap_or(usize::MAX))
  }

  /// Describe the returned page given the total number of matches.
  pub fn out(&self, total: u64) -> PaginationOut {
    PaginationOut { offset: self.offset, limit: self.limit, total }
  }
}

/// Pagination metadata rendered alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationOut {
  pub offset: u64,
  pub limit:  u64,
  pub total:  u64,
}
