//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error renders the standard envelope with an empty `data` object and
//! one or more entries in `errors`.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::{store::StoreError, validate::ValidationErrors};
use thiserror::Error;

use crate::envelope::{ApiResponse, ErrorItem};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("invalid body: {0}")]
  InvalidBody(String),

  #[error(transparent)]
  Validation(ValidationErrors),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Split a store failure into a rejected write (422) or a backend fault.
  pub fn from_store<E: StoreError>(e: E) -> Self {
    match e.validation() {
      Some(v) => Self::Validation(v.clone()),
      None => Self::Store(Box::new(e)),
    }
  }

  fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::InvalidBody(_) | ApiError::Validation(_) => {
        StatusCode::UNPROCESSABLE_ENTITY
      }
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self { Self::BadRequest(r.body_text()) }
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self {
    match r {
      JsonRejection::JsonDataError(e) => Self::InvalidBody(e.body_text()),
      other => Self::BadRequest(other.body_text()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let errors = match self {
      ApiError::Validation(v) => v.errors().iter().map(ErrorItem::from).collect(),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        vec![ErrorItem::general("internal", "internal server error")]
      }
      ApiError::NotFound(m) => vec![ErrorItem::general("not_found", m)],
      ApiError::BadRequest(m) => vec![ErrorItem::general("bad_request", m)],
      ApiError::InvalidBody(m) => vec![ErrorItem::general("invalid_body", m)],
    };
    (status, Json(ApiResponse::failure(errors))).into_response()
  }
}
