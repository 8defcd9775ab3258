//! [`SqliteStore`]: the SQLite implementation of [`TableSink`].

use std::path::Path;

use mart_core::{IfExists, Relation, TableSink};
use rusqlite::{Connection, OptionalExtension as _};

use crate::{
  Error, Result,
  encode::encode_value,
  schema::{create_table_sql, drop_table_sql, insert_sql, quote_ident},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A table sink backed by a single SQLite file.
pub struct SqliteStore {
  conn:   Connection,
  policy: IfExists,
}

impl SqliteStore {
  /// Open (or create) the database at `path` and check it answers.
  pub fn open(path: impl AsRef<Path>, policy: IfExists) -> Result<Self> {
    let conn = Connection::open(path)?;
    let store = Self { conn, policy };
    store.ping()?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub fn open_in_memory(policy: IfExists) -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    let store = Self { conn, policy };
    store.ping()?;
    Ok(store)
  }

  pub fn policy(&self) -> IfExists { self.policy }

  /// Round-trip a trivial query.
  pub fn ping(&self) -> Result<()> {
    self.conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?;
    Ok(())
  }

  pub fn table_exists(&self, name: &str) -> Result<bool> {
    Ok(table_exists(&self.conn, name)?)
  }

  pub fn row_count(&self, name: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(name));
    Ok(self.conn.query_row(&sql, [], |r| r.get(0))?)
  }

  /// Direct access for ad-hoc queries.
  pub fn connection(&self) -> &Connection { &self.conn }
}

fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        rusqlite::params![name],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

// ─── TableSink ───────────────────────────────────────────────────────────────

impl TableSink for SqliteStore {
  type Error = Error;

  fn write_table(&mut self, relation: &Relation) -> Result<usize> {
    let name = relation.name();
    let tx = self.conn.transaction()?;

    let exists = table_exists(&tx, name)?;
    match self.policy {
      IfExists::Fail if exists => return Err(Error::TableExists(name.to_owned())),
      IfExists::Replace if exists => tx.execute_batch(&drop_table_sql(name))?,
      _ => {}
    }
    tx.execute_batch(&create_table_sql(relation))?;

    {
      let mut insert = tx.prepare(&insert_sql(relation))?;
      for row in relation.rows() {
        insert.execute(rusqlite::params_from_iter(row.iter().map(encode_value)))?;
      }
    }
    tx.commit()?;

    tracing::info!(
      table = name,
      rows = relation.len(),
      policy = %self.policy,
      "wrote table"
    );
    Ok(relation.len())
  }
}
