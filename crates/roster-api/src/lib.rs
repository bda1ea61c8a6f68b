//! JSON REST API for Roster.
//!
//! Exposes an axum [`Router`] backed by any
//! [`roster_core::store::EmployeeStore`]. Tracing layers, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = roster_api::api_router(Arc::new(store));
//! ```

pub mod employees;
pub mod envelope;
pub mod error;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use roster_core::store::EmployeeStore;

pub use error::ApiError;

use envelope::PingResponse;

/// `GET /ping`
async fn ping() -> Json<PingResponse> { Json(PingResponse { response: true }) }

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: EmployeeStore + 'static,
{
  Router::new()
    .route("/ping", get(ping))
    // Employees
    .route(
      "/v1/employees/",
      get(employees::list::<S>).post(employees::create::<S>),
    )
    .route(
      "/v1/employees",
      get(employees::list::<S>).post(employees::create::<S>),
    )
    .route(
      "/v1/employees/{id}",
      get(employees::get_one::<S>)
        .patch(employees::update_one::<S>)
        .delete(employees::delete_one::<S>),
    )
    .with_state(store)
}
