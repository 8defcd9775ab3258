//! Hash join index with left-join semantics.
//!
//! A right-hand key with several rows yields every one of them, exactly like
//! a SQL join; the grain checks downstream are what catch the resulting
//! fan-out. Null keys never match.

use std::collections::HashMap;

pub struct HashIndex<'a, T> {
  by_key: HashMap<&'a str, Vec<&'a T>>,
}

impl<'a, T> HashIndex<'a, T> {
  /// Index `rows` on the key returned by `key`; rows with no key are skipped.
  pub fn build<F>(rows: &'a [T], key: F) -> Self
  where
    F: Fn(&'a T) -> Option<&'a str>,
  {
    let mut by_key: HashMap<&'a str, Vec<&'a T>> = HashMap::new();
    for row in rows {
      if let Some(k) = key(row) {
        by_key.entry(k).or_default().push(row);
      }
    }
    Self { by_key }
  }

  /// All rows matching `key`; empty for a null or unknown key.
  pub fn get(&self, key: Option<&str>) -> &[&'a T] {
    key
      .and_then(|k| self.by_key.get(k))
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  pub fn contains(&self, key: &str) -> bool { self.by_key.contains_key(key) }

  /// Left-join probe: each match as `Some`, or a single `None` if there is
  /// no match.
  pub fn left(
    &self,
    key: Option<&str>,
  ) -> impl Iterator<Item = Option<&'a T>> + use<'_, 'a, T> {
    let hits = self.get(key);
    let miss = hits.is_empty().then_some(None);
    hits.iter().map(|row| Some(*row)).chain(miss)
  }
}
