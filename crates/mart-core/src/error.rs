//! Error types for `mart-core`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  // ── Preconditions ─────────────────────────────────────────────────────

  /// One or more required raw files are absent. Lists every missing file.
  #[error("missing raw files in {}: {}", .dir.display(), .files.join(", "))]
  MissingSourceFiles { dir: PathBuf, files: Vec<String> },

  #[error("no parseable purchase timestamps; cannot bound the date range")]
  EmptyDateRange,

  #[error("required setting `{0}` is not configured")]
  MissingSetting(&'static str),

  // ── Integrity violations ──────────────────────────────────────────────

  #[error(
    "{table}: {key_columns} is not unique ({duplicates} duplicate rows, first \
     at {first})"
  )]
  DuplicateKey {
    table:       String,
    key_columns: String,
    first:       String,
    duplicates:  usize,
  },

  #[error("{table}: negative {column} {value} at {key}")]
  NegativeValue {
    table:  String,
    column: String,
    key:    String,
    value:  f64,
  },

  // ── Programming errors ────────────────────────────────────────────────

  #[error("{table}: row has {found} values, expected {expected}")]
  RowArity {
    table:    String,
    expected: usize,
    found:    usize,
  },
}

impl Error {
  /// Failures detected before any computation starts.
  pub fn is_precondition(&self) -> bool {
    matches!(
      self,
      Self::MissingSourceFiles { .. }
        | Self::EmptyDateRange
        | Self::MissingSetting(_)
    )
  }

  /// Failures detected after computation, before any output is written.
  pub fn is_integrity(&self) -> bool {
    matches!(self, Self::DuplicateKey { .. } | Self::NegativeValue { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
