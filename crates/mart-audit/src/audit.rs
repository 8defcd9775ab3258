//! Audit measures computed over the typed raw tables.

use std::{
  collections::{HashMap, HashSet},
  hash::Hash,
};

use mart_core::{
  source::{Customer, Order, OrderItem, Payment, Product},
  stats::{MEDIAN_AND_P99, Summary, pct},
};
use serde::Serialize;

/// Borrowed raw tables to audit.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditInput<'a> {
  pub orders:    &'a [Order],
  pub items:     &'a [OrderItem],
  pub payments:  &'a [Payment],
  pub customers: &'a [Customer],
  pub products:  &'a [Product],
}

// ─── Report structure ────────────────────────────────────────────────────────

/// A count and its share of the table's rows, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measure {
  pub count: usize,
  pub pct:   f64,
}

impl Measure {
  pub fn of(count: usize, total: usize) -> Self {
    Self {
      count,
      pct: pct(count, total),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowCounts {
  pub orders:      usize,
  pub order_items: usize,
  pub payments:    usize,
  pub customers:   usize,
  pub products:    usize,
}

/// Rows repeating an earlier row's primary key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyDuplicates {
  pub orders:      Measure,
  pub order_items: Measure,
  pub customers:   Measure,
  pub products:    Measure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingTimestamps {
  pub purchase:  Measure,
  pub delivered: Measure,
  pub estimated: Measure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
  /// `None` for orders with no status.
  pub status: Option<String>,
  pub count:  usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinCoverage {
  pub orders_with_items:    Measure,
  pub items_with_products:  Measure,
  pub orders_with_payments: Measure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranges {
  pub price:         Summary,
  pub freight_value: Summary,
  pub payment_value: Summary,
}

/// Orders whose timestamps contradict each other. Only rows where both
/// timestamps parse are compared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeLogic {
  pub delivered_before_purchase: Measure,
  pub delivered_after_estimated: Measure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
  pub counts:              RowCounts,
  pub pk_dupes:            KeyDuplicates,
  pub missing_ts:          MissingTimestamps,
  /// Descending by count, then by status; the missing status sorts first
  /// among equal counts.
  pub status_distribution: Vec<StatusCount>,
  pub join_coverage:       JoinCoverage,
  pub ranges:              Ranges,
  pub time_logic:          TimeLogic,
}

// ─── Computation ─────────────────────────────────────────────────────────────

/// Number of keys that repeat an earlier key.
fn duplicate_count<K, I>(keys: I) -> usize
where
  I: IntoIterator<Item = K>,
  K: Hash + Eq,
{
  let mut seen = HashSet::new();
  let mut repeats = 0;
  for key in keys {
    if !seen.insert(key) {
      repeats += 1;
    }
  }
  repeats
}

/// Rows of `rows` matching `pred`, as a [`Measure`] of the table.
fn share<T>(rows: &[T], pred: impl Fn(&T) -> bool) -> Measure {
  Measure::of(rows.iter().filter(|r| pred(r)).count(), rows.len())
}

fn status_distribution(orders: &[Order]) -> Vec<StatusCount> {
  let mut counts: HashMap<Option<&str>, usize> = HashMap::new();
  for o in orders {
    *counts.entry(o.order_status.as_deref()).or_default() += 1;
  }
  let mut out: Vec<StatusCount> = counts
    .into_iter()
    .map(|(status, count)| StatusCount {
      status: status.map(str::to_owned),
      count,
    })
    .collect();
  out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.status.cmp(&b.status)));
  out
}

impl AuditReport {
  pub fn compute(input: &AuditInput<'_>) -> Self {
    let AuditInput {
      orders,
      items,
      payments,
      customers,
      products,
    } = *input;
    let n_orders = orders.len();
    let n_items = items.len();

    let counts = RowCounts {
      orders:      n_orders,
      order_items: n_items,
      payments:    payments.len(),
      customers:   customers.len(),
      products:    products.len(),
    };

    let pk_dupes = KeyDuplicates {
      orders:      Measure::of(
        duplicate_count(orders.iter().map(|o| o.order_id.as_str())),
        n_orders,
      ),
      order_items: Measure::of(
        duplicate_count(items.iter().map(|i| (i.order_id.as_str(), i.order_item_id))),
        n_items,
      ),
      customers:   Measure::of(
        duplicate_count(customers.iter().map(|c| c.customer_id.as_str())),
        customers.len(),
      ),
      products:    Measure::of(
        duplicate_count(products.iter().map(|p| p.product_id.as_str())),
        products.len(),
      ),
    };

    let missing_ts = MissingTimestamps {
      purchase:  share(orders, |o| o.order_purchase_timestamp.is_none()),
      delivered: share(orders, |o| o.order_delivered_customer_date.is_none()),
      estimated: share(orders, |o| o.order_estimated_delivery_date.is_none()),
    };

    let item_orders: HashSet<&str> = items.iter().map(|i| i.order_id.as_str()).collect();
    let paid_orders: HashSet<&str> =
      payments.iter().filter_map(|p| p.order_id.as_deref()).collect();
    let product_ids: HashSet<&str> = products.iter().map(|p| p.product_id.as_str()).collect();
    let join_coverage = JoinCoverage {
      orders_with_items:    share(orders, |o| item_orders.contains(o.order_id.as_str())),
      items_with_products:  share(items, |i| {
        i.product_id.as_deref().is_some_and(|p| product_ids.contains(p))
      }),
      orders_with_payments: share(orders, |o| paid_orders.contains(o.order_id.as_str())),
    };

    let ranges = Ranges {
      price:         Summary::describe(items.iter().filter_map(|i| i.price), &MEDIAN_AND_P99),
      freight_value: Summary::describe(
        items.iter().filter_map(|i| i.freight_value),
        &MEDIAN_AND_P99,
      ),
      payment_value: Summary::describe(
        payments.iter().filter_map(|p| p.payment_value),
        &MEDIAN_AND_P99,
      ),
    };

    let mut before_purchase = 0;
    let mut after_estimated = 0;
    for o in orders {
      let delivered = o.delivered_at();
      if let (Some(d), Some(p)) = (delivered, o.purchased_at())
        && d < p
      {
        before_purchase += 1;
      }
      if let (Some(d), Some(e)) = (delivered, o.estimated_delivery_at())
        && d > e
      {
        after_estimated += 1;
      }
    }
    let time_logic = TimeLogic {
      delivered_before_purchase: Measure::of(before_purchase, n_orders),
      delivered_after_estimated: Measure::of(after_estimated, n_orders),
    };

    tracing::debug!(orders = n_orders, items = n_items, "audit computed");

    Self {
      counts,
      pk_dupes,
      missing_ts,
      status_distribution: status_distribution(orders),
      join_coverage,
      ranges,
      time_logic,
    }
  }
}
