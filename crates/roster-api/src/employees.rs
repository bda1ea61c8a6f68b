//! Handlers for `/v1/employees` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/v1/employees/` | Filters and `offset`/`limit` in the query string |
//! | `POST`   | `/v1/employees/` | 201 with the created employee; 422 on validation failure |
//! | `GET`    | `/v1/employees/{id}` | 404 if not found |
//! | `PATCH`  | `/v1/employees/{id}` | Partial update; `"manager": null` clears the manager |
//! | `DELETE` | `/v1/employees/{id}` | 204; subordinates lose their manager |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use roster_core::{
  employee::{Employee, EmployeeId, EmployeeUpdate, NewEmployee},
  filter::EmployeeFilters,
  pagination::{DEFAULT_LIMIT, Pagination},
  store::EmployeeStore,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
  envelope::{ApiResponse, ListPaginatedResponse},
  error::ApiError,
};

// ─── Schemas ─────────────────────────────────────────────────────────────────

/// An employee as rendered by the API.
#[derive(Debug, Serialize)]
pub struct EmployeeSchema {
  pub id:          EmployeeId,
  pub full_name:   String,
  pub first_name:  String,
  pub last_name:   String,
  pub middle_name: String,
  pub position:    String,
  pub date_hired:  NaiveDate,
  #[serde(with = "rust_decimal::serde::float")]
  pub salary:      Decimal,
  pub manager:     Option<EmployeeId>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

impl From<Employee> for EmployeeSchema {
  fn from(e: Employee) -> Self {
    Self {
      id:          e.id,
      full_name:   e.full_name(),
      first_name:  e.first_name,
      last_name:   e.last_name,
      middle_name: e.middle_name,
      position:    e.position,
      date_hired:  e.date_hired,
      salary:      e.salary,
      manager:     e.manager_id,
      created_at:  e.created_at,
      updated_at:  e.updated_at,
    }
  }
}

type Single = Json<ApiResponse<EmployeeSchema>>;

fn single(e: Employee) -> Single { Json(ApiResponse::ok(e.into())) }

fn not_found(id: EmployeeId) -> ApiError {
  ApiError::NotFound(format!("employee {id} not found"))
}

// ─── List ────────────────────────────────────────────────────────────────────

/// Query string of `GET /v1/employees/`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub id:              Option<EmployeeId>,
  /// Comma-separated ids, e.g. `ids=1,4,9`.
  pub ids:             Option<String>,
  pub first_name:      Option<String>,
  pub last_name:       Option<String>,
  pub middle_name:     Option<String>,
  pub position:        Option<String>,
  pub search:          Option<String>,
  pub date_hired_from: Option<NaiveDate>,
  pub date_hired_to:   Option<NaiveDate>,
  pub salary_min:      Option<Decimal>,
  pub salary_max:      Option<Decimal>,
  pub manager_id:      Option<EmployeeId>,
  pub created_at_from: Option<DateTime<Utc>>,
  pub created_at_to:   Option<DateTime<Utc>>,
  pub updated_at_from: Option<DateTime<Utc>>,
  pub updated_at_to:   Option<DateTime<Utc>>,
  pub offset:          Option<u64>,
  pub limit:           Option<u64>,
}

fn parse_ids(raw: &str) -> Result<Vec<EmployeeId>, ApiError> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(|s| {
      s.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid id in `ids`: {s:?}")))
    })
    .collect()
}

impl ListParams {
  pub fn into_parts(self) -> Result<(EmployeeFilters, Pagination), ApiError> {
    let ids = self.ids.as_deref().map(parse_ids).transpose()?;
    let filters = EmployeeFilters {
      id: self.id,
      ids,
      first_name: self.first_name,
      last_name: self.last_name,
      middle_name: self.middle_name,
      position: self.position,
      search: self.search,
      date_hired_from: self.date_hired_from,
      date_hired_to: self.date_hired_to,
      salary_min: self.salary_min,
      salary_max: self.salary_max,
      manager_id: self.manager_id,
      created_at_from: self.created_at_from,
      created_at_to: self.created_at_to,
      updated_at_from: self.updated_at_from,
      updated_at_to: self.updated_at_to,
    };
    let pagination = Pagination::new(
      self.offset.unwrap_or(0),
      self.limit.unwrap_or(DEFAULT_LIMIT),
    );
    Ok((filters, pagination))
  }
}

/// `GET /v1/employees/`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ApiResponse<ListPaginatedResponse<EmployeeSchema>>>, ApiError>
where
  S: EmployeeStore,
{
  let Query(params) = query?;
  let (filters, pagination) = params.into_parts()?;

  let total = store.count(&filters).await.map_err(ApiError::from_store)?;
  let items = store
    .list(&filters, pagination)
    .await
    .map_err(ApiError::from_store)?;

  Ok(Json(ApiResponse::ok(ListPaginatedResponse {
    items:      items.into_iter().map(EmployeeSchema::from).collect(),
    pagination: pagination.out(total),
  })))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /v1/employees/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<EmployeeId>,
) -> Result<Single, ApiError>
where
  S: EmployeeStore,
{
  let employee = store
    .get(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| not_found(id))?;
  Ok(single(employee))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// Body of `POST /v1/employees/`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub last_name:   String,
  pub first_name:  String,
  pub middle_name: String,
  pub position:    String,
  pub date_hired:  NaiveDate,
  pub salary:      Decimal,
  #[serde(default)]
  pub manager:     Option<EmployeeId>,
}

impl From<CreateBody> for NewEmployee {
  fn from(b: CreateBody) -> Self {
    Self {
      last_name:   b.last_name,
      first_name:  b.first_name,
      middle_name: b.middle_name,
      position:    b.position,
      date_hired:  b.date_hired,
      salary:      b.salary,
      manager_id:  b.manager,
    }
  }
}

/// `POST /v1/employees/`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EmployeeStore,
{
  let Json(body) = body?;
  let employee = store
    .create(body.into())
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(employee_id = employee.id, "created employee");
  Ok((StatusCode::CREATED, single(employee)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// Distinguish an absent key (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

/// Body of `PATCH /v1/employees/{id}`. Absent keys are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBody {
  pub last_name:   Option<String>,
  pub first_name:  Option<String>,
  pub middle_name: Option<String>,
  pub position:    Option<String>,
  pub date_hired:  Option<NaiveDate>,
  pub salary:      Option<Decimal>,
  #[serde(default, deserialize_with = "double_option")]
  pub manager:     Option<Option<EmployeeId>>,
}

impl From<UpdateBody> for EmployeeUpdate {
  fn from(b: UpdateBody) -> Self {
    Self {
      last_name:   b.last_name,
      first_name:  b.first_name,
      middle_name: b.middle_name,
      position:    b.position,
      date_hired:  b.date_hired,
      salary:      b.salary,
      manager_id:  b.manager,
    }
  }
}

/// `PATCH /v1/employees/{id}`
pub async fn update_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<EmployeeId>,
  body: Result<Json<UpdateBody>, JsonRejection>,
) -> Result<Single, ApiError>
where
  S: EmployeeStore,
{
  let Json(body) = body?;
  let employee = store
    .update(id, body.into())
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| not_found(id))?;
  tracing::info!(employee_id = id, "updated employee");
  Ok(single(employee))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /v1/employees/{id}`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<EmployeeId>,
) -> Result<StatusCode, ApiError>
where
  S: EmployeeStore,
{
  if !store.delete(id).await.map_err(ApiError::from_store)? {
    return Err(not_found(id));
  }
  tracing::info!(employee_id = id, "deleted employee");
  Ok(StatusCode::NO_CONTENT)
}
