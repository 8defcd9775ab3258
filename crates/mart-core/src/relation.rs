//! [`Relation`]: a named table of typed columns and rows.
//!
//! Fact builders produce typed row structs and convert them through
//! [`Tabular`]; sinks only ever see a `Relation`. Raw files loaded without a
//! row type (for the relational store) become a `Relation` directly.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::{
  Error, Result,
  timestamp::{DATE_FORMAT, TIMESTAMP_FORMAT},
};

// ─── Columns ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
  Integer,
  Real,
  Text,
  Date,
  Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
  pub name: String,
  pub kind: ColumnKind,
}

impl Column {
  pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
    Self {
      name: name.into(),
      kind,
    }
  }
}

// ─── Values ──────────────────────────────────────────────────────────────────

/// A single cell. `Null` is the only representation of a missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
  Date(NaiveDate),
  Timestamp(NaiveDateTime),
}

/// Renders the CSV form: empty for null, `1`/`0` flags are already integers.
impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Null => Ok(()),
      Self::Integer(n) => write!(f, "{n}"),
      Self::Real(x) if x.is_finite() => write!(f, "{x}"),
      Self::Real(_) => Ok(()),
      Self::Text(s) => f.write_str(s),
      Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
      Self::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
    }
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self { Self::Integer(i64::from(b)) }
}

impl From<i64> for Value {
  fn from(n: i64) -> Self { Self::Integer(n) }
}

impl From<i32> for Value {
  fn from(n: i32) -> Self { Self::Integer(i64::from(n)) }
}

impl From<u32> for Value {
  fn from(n: u32) -> Self { Self::Integer(i64::from(n)) }
}

impl From<f64> for Value {
  fn from(x: f64) -> Self { Self::Real(x) }
}

impl From<String> for Value {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<NaiveDate> for Value {
  fn from(d: NaiveDate) -> Self { Self::Date(d) }
}

impl From<NaiveDateTime> for Value {
  fn from(ts: NaiveDateTime) -> Self { Self::Timestamp(ts) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Null, Into::into) }
}

// ─── Tabular ─────────────────────────────────────────────────────────────────

/// A row type with a fixed output schema.
pub trait Tabular {
  /// Output table name, e.g. `fact_orders`.
  const NAME: &'static str;

  fn columns() -> Vec<Column>;

  /// Values in the same order as [`Tabular::columns`].
  fn row(&self) -> Vec<Value>;
}

// ─── Relation ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
  name:    String,
  columns: Vec<Column>,
  rows:    Vec<Vec<Value>>,
}

impl Relation {
  pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
    Self {
      name: name.into(),
      columns,
      rows: Vec::new(),
    }
  }

  /// Build a relation from typed records, preserving their order.
  pub fn from_records<T: Tabular>(records: &[T]) -> Self {
    let mut relation = Self::new(T::NAME, T::columns());
    relation.rows = records.iter().map(Tabular::row).collect();
    debug_assert!(
      relation.rows.iter().all(|r| r.len() == relation.columns.len()),
      "{} row arity does not match its columns",
      T::NAME
    );
    relation
  }

  /// Append a row, rejecting one whose arity does not match the columns.
  pub fn push(&mut self, row: Vec<Value>) -> Result<()> {
    if row.len() != self.columns.len() {
      return Err(Error::RowArity {
        table:    self.name.clone(),
        expected: self.columns.len(),
        found:    row.len(),
      });
    }
    self.rows.push(row);
    Ok(())
  }

  pub fn name(&self) -> &str { &self.name }

  pub fn columns(&self) -> &[Column] { &self.columns }

  pub fn rows(&self) -> &[Vec<Value>] { &self.rows }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}
