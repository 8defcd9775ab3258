//! DDL and DML generated from a relation's columns.
//!
//! Tables are created from the relation itself; there is no fixed schema.
//! Dates and timestamps are stored as TEXT in their CSV form.

use mart_core::{Column, ColumnKind, Relation};

/// Quote an identifier for SQLite, doubling any embedded quote.
pub fn quote_ident(name: &str) -> String { format!("\"{}\"", name.replace('"', "\"\"")) }

pub fn sql_type(kind: ColumnKind) -> &'static str {
  match kind {
    ColumnKind::Integer => "INTEGER",
    ColumnKind::Real => "REAL",
    ColumnKind::Text | ColumnKind::Date | ColumnKind::Timestamp => "TEXT",
  }
}

pub fn create_table_sql(relation: &Relation) -> String {
  let columns: Vec<String> = relation
    .columns()
    .iter()
    .map(|Column { name, kind }| format!("{} {}", quote_ident(name), sql_type(*kind)))
    .collect();
  format!(
    "CREATE TABLE IF NOT EXISTS {} ({})",
    quote_ident(relation.name()),
    columns.join(", ")
  )
}

pub fn drop_table_sql(name: &str) -> String {
  format!("DROP TABLE IF EXISTS {}", quote_ident(name))
}

pub fn insert_sql(relation: &Relation) -> String {
  let names: Vec<String> = relation
    .columns()
    .iter()
    .map(|c| quote_ident(&c.name))
    .collect();
  let params: Vec<String> = (1..=names.len()).map(|i| format!("?{i}")).collect();
  format!(
    "INSERT INTO {} ({}) VALUES ({})",
    quote_ident(relation.name()),
    names.join(", "),
    params.join(", ")
  )
}
