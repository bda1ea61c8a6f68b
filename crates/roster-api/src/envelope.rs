//! Response envelope shared by every `/v1` endpoint.
//!
//! ```json
//! { "data": { ... }, "meta": {}, "errors": [] }
//! ```

use roster_core::{pagination::PaginationOut, validate::FieldError};
use serde::Serialize;
use serde_json::{Map, Value};

/// One entry of the `errors` array. `field` is `null` for errors that are not
/// tied to a single input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorItem {
  pub field:   Option<String>,
  pub code:    String,
  pub message: String,
}

impl ErrorItem {
  pub fn general(code: &str, message: impl Into<String>) -> Self {
    Self { field: None, code: code.to_owned(), message: message.into() }
  }
}

impl From<&FieldError> for ErrorItem {
  fn from(e: &FieldError) -> Self {
    Self {
      field:   Some(e.field.to_owned()),
      code:    e.code.to_owned(),
      message: e.message.clone(),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
  pub data:   T,
  pub meta:   Map<String, Value>,
  pub errors: Vec<ErrorItem>,
}

impl<T> ApiResponse<T> {
  pub fn ok(data: T) -> Self {
    Self { data, meta: Map::new(), errors: Vec::new() }
  }
}

impl ApiResponse<Map<String, Value>> {
  /// An error envelope: empty `data`, populated `errors`.
  pub fn failure(errors: Vec<ErrorItem>) -> Self {
    Self { data: Map::new(), meta: Map::new(), errors }
  }
}

/// `data` payload of a list endpoint.
#[derive(Debug, Serialize)]
pub struct ListPaginatedResponse<T> {
  pub items:      Vec<T>,
  pub pagination: PaginationOut,
}

/// `GET /ping`
#[derive(Debug, Serialize)]
pub struct PingResponse {
  pub response: bool,
}
