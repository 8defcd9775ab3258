//! Conversion from relation cells to SQLite values.

use mart_core::{
  Value,
  timestamp::{DATE_FORMAT, TIMESTAMP_FORMAT},
};
use rusqlite::types::Value as SqlValue;

pub fn encode_value(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Integer(i) => SqlValue::Integer(*i),
    Value::Real(r) if r.is_nan() => SqlValue::Null,
    Value::Real(r) => SqlValue::Real(*r),
    Value::Text(s) => SqlValue::Text(s.clone()),
    Value::Date(d) => SqlValue::Text(d.format(DATE_FORMAT).to_string()),
    Value::Timestamp(ts) => SqlValue::Text(ts.format(TIMESTAMP_FORMAT).to_string()),
  }
}
