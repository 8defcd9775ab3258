//! Error type for the mart stages.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] mart_core::Error),

  #[error("csv error: {0}")]
  Csv(#[from] mart_csv::Error),

  #[error("store error: {0}")]
  Store(#[from] mart_store_sqlite::Error),

  #[error("report error: {0}")]
  Report(#[from] serde_json::Error),

  #[error("{}: {source}", .path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl Error {
  fn core(&self) -> Option<&mart_core::Error> {
    match self {
      Self::Core(e)
      | Self::Csv(mart_csv::Error::Core(e))
      | Self::Store(mart_store_sqlite::Error::Core(e)) => Some(e),
      _ => None,
    }
  }

  /// A missing file or setting, detected before any computation.
  pub fn is_precondition(&self) -> bool {
    self.core().is_some_and(mart_core::Error::is_precondition)
  }

  /// A grain or range violation, detected before any output is written.
  pub fn is_integrity(&self) -> bool {
    self.core().is_some_and(mart_core::Error::is_integrity)
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
