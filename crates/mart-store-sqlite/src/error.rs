//! Error type for `mart-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] mart_core::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  /// The `fail` policy refused to touch an existing table.
  #[error("table `{0}` already exists")]
  TableExists(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
