//! Error types for the CSV reader and sink.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] mart_core::Error),

  #[error("{}: {source}", .path.display())]
  Csv {
    path:   PathBuf,
    #[source]
    source: csv::Error,
  },

  #[error("{}: {source}", .path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("{}: failed to replace output: {source}", .path.display())]
  Persist {
    path:   PathBuf,
    #[source]
    source: tempfile::PersistError,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
