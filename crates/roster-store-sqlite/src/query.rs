//! Translation of a core [`Predicate`] into a parameterised SQL `WHERE`
//! expression over the `employees` table.
//!
//! The generated SQL must agree row-for-row with [`Predicate::matches`]; the
//! integration tests check both against the same data.

use roster_core::filter::{Field, Predicate, Value};
use rusqlite::types::Value as SqlValue;

use crate::{
  encode::{Cents, bound_cents, encode_date, encode_dt},
  schema::ICONTAINS_FN,
};

/// A rendered boolean SQL expression plus its positional parameters.
#[derive(Debug, Default)]
pub struct SqlFilter {
  pub clause: String,
  pub params: Vec<SqlValue>,
}

impl SqlFilter {
  pub fn from_predicate(predicate: &Predicate) -> Self {
    let mut params = Vec::new();
    let clause = render(predicate, &mut params);
    Self { clause, params }
  }
}

fn column(field: Field) -> &'static str {
  match field {
    Field::Id => "id",
    Field::FirstName => "first_name",
    Field::LastName => "last_name",
    Field::MiddleName => "middle_name",
    Field::Position => "position",
    Field::DateHired => "date_hired",
    Field::Salary => "salary_cents",
    Field::ManagerId => "manager_id",
    Field::CreatedAt => "created_at",
    Field::UpdatedAt => "updated_at",
  }
}

/// Encode an operand the way its column is stored.
fn operand(value: &Value, cents: Cents) -> SqlValue {
  match value {
    Value::Int(i) => SqlValue::Integer(*i),
    Value::Text(s) => SqlValue::Text(s.clone()),
    Value::Date(d) => SqlValue::Text(encode_date(*d)),
    Value::Money(m) => SqlValue::Integer(bound_cents(*m, cents)),
    Value::Timestamp(t) => SqlValue::Text(encode_dt(*t)),
  }
}

fn push(params: &mut Vec<SqlValue>, value: SqlValue) -> String {
  params.push(value);
  format!("?{}", params.len())
}

fn join(parts: &[Predicate], sep: &str, empty: &str, params: &mut Vec<SqlValue>) -> String {
  if parts.is_empty() {
    return empty.to_owned();
  }
  let rendered: Vec<String> = parts
    .iter()
    .map(|p| format!("({})", render(p, params)))
    .collect();
  rendered.join(sep)
}

fn render(predicate: &Predicate, params: &mut Vec<SqlValue>) -> String {
  match predicate {
    Predicate::All => "1".to_owned(),
    Predicate::Eq(f, v) => {
      let p = push(params, operand(v, Cents::Exact));
      format!("{} = {p}", column(*f))
    }
    Predicate::In(_, set) if set.is_empty() => "0".to_owned(),
    Predicate::In(f, set) => {
      let placeholders: Vec<String> = set
        .iter()
        .map(|id| push(params, SqlValue::Integer(*id)))
        .collect();
      format!("{} IN ({})", column(*f), placeholders.join(", "))
    }
    Predicate::IContains(f, needle) => {
      let p = push(params, SqlValue::Text(needle.clone()));
      format!("{ICONTAINS_FN}({}, {p})", column(*f))
    }
    Predicate::Gte(f, v) => {
      let p = push(params, operand(v, Cents::Ceil));
      format!("{} >= {p}", column(*f))
    }
    Predicate::Lte(f, v) => {
      let p = push(params, operand(v, Cents::Floor));
      format!("{} <= {p}", column(*f))
    }
    Predicate::And(parts) => join(parts, " AND ", "1", params),
    Predicate::Or(parts) => join(parts, " OR ", "0", params),
  }
}
