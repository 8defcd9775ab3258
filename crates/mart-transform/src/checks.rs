//! Post-condition checks run before any output is written.
//!
//! A failure here is a data-integrity error: the run stops and nothing is
//! persisted. Values are never corrected in place.

use std::{collections::HashSet, fmt, hash::Hash};

use mart_core::{Error, Result};

/// Fail with [`Error::DuplicateKey`] if any key occurs more than once.
pub fn ensure_unique<K, I>(table: &str, key_columns: &str, keys: I) -> Result<()>
where
  I: IntoIterator<Item = K>,
  K: Hash + Eq + fmt::Debug,
{
  let mut seen = HashSet::new();
  let mut first = None;
  let mut duplicates = 0;
  for key in keys {
    if seen.contains(&key) {
      duplicates += 1;
      first.get_or_insert_with(|| format!("{key:?}"));
    } else {
      seen.insert(key);
    }
  }
  match first {
    None => Ok(()),
    Some(first) => Err(Error::DuplicateKey {
      table: table.to_owned(),
      key_columns: key_columns.to_owned(),
      first,
      duplicates,
    }),
  }
}

/// Fail with [`Error::NegativeValue`] at the first negative value. Nulls pass.
pub fn ensure_non_negative<K, I>(table: &str, column: &str, values: I) -> Result<()>
where
  I: IntoIterator<Item = (K, Option<f64>)>,
  K: fmt::Debug,
{
  for (key, value) in values {
    if let Some(v) = value
      && v < 0.0
    {
      return Err(Error::NegativeValue {
        table: table.to_owned(),
        column: column.to_owned(),
        key: format!("{key:?}"),
        value: v,
      });
    }
  }
  Ok(())
}
