//! [`CsvSink`] writes each relation to `<dir>/<name>.csv`.

use std::{
  io,
  path::{Path, PathBuf},
};

use mart_core::{Relation, TableSink};
use tempfile::NamedTempFile;

use crate::{Error, Result};

/// Serialize `relation` (header row, then data rows) into `out`.
pub fn write_relation<W: io::Write>(relation: &Relation, out: W) -> csv::Result<()> {
  let mut writer = csv::Writer::from_writer(out);
  writer.write_record(relation.columns().iter().map(|c| c.name.as_str()))?;
  for row in relation.rows() {
    writer.write_record(row.iter().map(ToString::to_string))?;
  }
  writer.flush()?;
  Ok(())
}

/// A table sink backed by a directory of CSV files.
///
/// Each table is first written to a temporary file in the same directory and
/// then renamed over `<name>.csv`, so readers see either the previous file or
/// the complete new one.
#[derive(Debug, Clone)]
pub struct CsvSink {
  dir: PathBuf,
}

impl CsvSink {
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  pub fn dir(&self) -> &Path { &self.dir }

  /// The file a relation named `name` is written to.
  pub fn path_for(&self, name: &str) -> PathBuf {
    self.dir.join(format!("{name}.csv"))
  }
}

impl TableSink for CsvSink {
  type Error = Error;

  fn write_table(&mut self, relation: &Relation) -> Result<usize> {
    let target = self.path_for(relation.name());
    let io_err = |source| Error::Io {
      path: target.clone(),
      source,
    };

    std::fs::create_dir_all(&self.dir).map_err(io_err)?;
    let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
    write_relation(relation, io::BufWriter::new(tmp.as_file_mut())).map_err(
      |source| Error::Csv {
        path: target.clone(),
        source,
      },
    )?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(&target).map_err(|source| Error::Persist {
      path: target.clone(),
      source,
    })?;

    tracing::info!(rows = relation.len(), path = %target.display(), "wrote table");
    Ok(relation.len())
  }
}
