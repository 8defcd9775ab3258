//! Pre-aggregation of child tables to their parent's grain.
//!
//! Joining payments straight onto orders would repeat each order once per
//! payment row. Collapsing first guarantees at most one entry per parent key,
//! so the later join cannot fan out.

use std::collections::HashMap;

use mart_core::source::{OrderItem, Payment};

/// Fold `rows` into one accumulator per distinct key. Rows whose key is null
/// are dropped; keys with no rows are absent from the result.
pub fn group_fold<'a, T, A, K, F>(
  rows: &'a [T],
  key: K,
  init: A,
  fold: F,
) -> HashMap<&'a str, A>
where
  A: Clone,
  K: Fn(&'a T) -> Option<&'a str>,
  F: Fn(&mut A, &'a T),
{
  let mut groups: HashMap<&'a str, A> = HashMap::new();
  for row in rows {
    if let Some(k) = key(row) {
      fold(groups.entry(k).or_insert_with(|| init.clone()), row);
    }
  }
  groups
}

/// Sum of the non-null measures per key. A key whose measures are all null
/// sums to `0.0`.
pub fn sum_by<'a, T, K, M>(rows: &'a [T], key: K, measure: M) -> HashMap<&'a str, f64>
where
  K: Fn(&'a T) -> Option<&'a str>,
  M: Fn(&'a T) -> Option<f64>,
{
  group_fold(rows, key, 0.0, |acc, row| {
    if let Some(v) = measure(row) {
      *acc += v;
    }
  })
}

/// Number of rows per key.
pub fn count_by<'a, T, K>(rows: &'a [T], key: K) -> HashMap<&'a str, i64>
where
  K: Fn(&'a T) -> Option<&'a str>,
{
  group_fold(rows, key, 0, |acc, _| *acc += 1)
}

/// Total `payment_value` per `order_id`.
pub fn payment_totals(payments: &[Payment]) -> HashMap<&str, f64> {
  sum_by(payments, |p| p.order_id.as_deref(), |p| p.payment_value)
}

/// Number of line items per `order_id`.
pub fn item_counts(items: &[OrderItem]) -> HashMap<&str, i64> {
  count_by(items, |i| Some(i.order_id.as_str()))
}
