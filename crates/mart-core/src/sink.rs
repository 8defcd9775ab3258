//! The `TableSink` trait and the existing-table policy.
//!
//! Implemented by `mart-csv` (one file per table) and `mart-store-sqlite`.
//! Stages depend on this abstraction, not on a concrete backend.

use serde::Deserialize;
use strum::{Display, EnumString};

use crate::relation::Relation;

/// What to do when the destination table already exists.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IfExists {
  /// Drop the existing table and write the new contents.
  #[default]
  Replace,
  /// Keep existing rows and add the new ones.
  Append,
  /// Refuse to write.
  Fail,
}

/// A destination for complete tables.
///
/// A write either lands the whole relation or leaves the destination as it
/// was; a partially written table is never observable.
pub trait TableSink {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist `relation` under its own name. Returns the number of rows
  /// written.
  fn write_table(&mut self, relation: &Relation) -> Result<usize, Self::Error>;
}
