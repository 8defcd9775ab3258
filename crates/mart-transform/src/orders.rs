//! `fact_orders`: one row per order.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use mart_core::{
  Column,
  ColumnKind::{Date, Integer, Real, Text, Timestamp},
  Result, Tabular, Value,
  source::{Customer, Order, OrderItem, OrderStatus, Payment},
  stats::{QUARTILES, Summary, pct},
  timestamp::whole_days,
};

use crate::{checks, join::HashIndex, preagg};

// ─── Row type ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct FactOrder {
  pub order_id:            String,
  pub customer_id:         Option<String>,
  pub customer_unique_id:  Option<String>,
  pub order_status:        Option<String>,
  pub order_purchase_ts:   Option<NaiveDateTime>,
  pub order_purchase_date: Option<NaiveDate>,
  pub order_delivered_ts:  Option<NaiveDateTime>,
  pub order_estimated_ts:  Option<NaiveDateTime>,
  pub customer_city:       Option<String>,
  pub customer_state:      Option<String>,
  /// Sum of the order's payments; `None` when it has no payment rows.
  pub payment_value_total: Option<f64>,
  pub items_cnt:           i64,
  pub delivered_days:      Option<i64>,
  pub estimated_gap_days:  Option<i64>,
  /// `None` when either the delivered or the estimated timestamp is missing.
  pub on_time_flag:        Option<bool>,
  pub is_canceled:         bool,
  /// `None` when the customer's unique id is unknown.
  pub is_new_customer:     Option<bool>,
}

impl FactOrder {
  /// Everything derivable from the joined row alone.
  /// `is_new_customer` needs the whole table and is filled in afterwards.
  fn derive(
    order: &Order,
    customer: Option<&Customer>,
    payment_value_total: Option<f64>,
    items_cnt: i64,
  ) -> Self {
    let purchased = order.purchased_at();
    let delivered = order.delivered_at();
    let estimated = order.estimated_delivery_at();

    Self {
      order_id: order.order_id.clone(),
      customer_id: order.customer_id.clone(),
      customer_unique_id: customer.and_then(|c| c.customer_unique_id.clone()),
      order_status: order.order_status.clone(),
      order_purchase_ts: purchased,
      order_purchase_date: purchased.map(|ts| ts.date()),
      order_delivered_ts: delivered,
      order_estimated_ts: estimated,
      customer_city: customer.and_then(|c| c.customer_city.clone()),
      customer_state: customer.and_then(|c| c.customer_state.clone()),
      payment_value_total,
      items_cnt,
      delivered_days: delivered.zip(purchased).map(|(d, p)| whole_days(d, p)),
      estimated_gap_days: delivered.zip(estimated).map(|(d, e)| whole_days(d, e)),
      on_time_flag: delivered.zip(estimated).map(|(d, e)| d <= e),
      is_canceled: order.status() == Some(OrderStatus::Canceled),
      is_new_customer: None,
    }
  }

  /// Revenue is booked at order grain from payments; missing stays missing.
  pub fn revenue_order(&self) -> Option<f64> { self.payment_value_total }
}

impl Tabular for FactOrder {
  const NAME: &'static str = "fact_orders";

  fn columns() -> Vec<Column> {
    [
      ("order_id", Text),
      ("customer_id", Text),
      ("customer_unique_id", Text),
      ("order_status", Text),
      ("order_purchase_ts", Timestamp),
      ("order_purchase_date", Date),
      ("order_delivered_ts", Timestamp),
      ("order_estimated_ts", Timestamp),
      ("customer_city", Text),
      ("customer_state", Text),
      ("payment_value_total", Real),
      ("orders_cnt", Integer),
      ("items_cnt", Integer),
      ("revenue_order", Real),
      ("delivered_days", Integer),
      ("estimated_gap_days", Integer),
      ("on_time_flag", Integer),
      ("is_canceled", Integer),
      ("is_new_customer", Integer),
    ]
    .into_iter()
    .map(|(name, kind)| Column::new(name, kind))
    .collect()
  }

  fn row(&self) -> Vec<Value> {
    vec![
      self.order_id.as_str().into(),
      self.customer_id.clone().into(),
      self.customer_unique_id.clone().into(),
      self.order_status.clone().into(),
      self.order_purchase_ts.into(),
      self.order_purchase_date.into(),
      self.order_delivered_ts.into(),
      self.order_estimated_ts.into(),
      self.customer_city.clone().into(),
      self.customer_state.clone().into(),
      self.payment_value_total.into(),
      1_i64.into(),
      self.items_cnt.into(),
      self.revenue_order().into(),
      self.delivered_days.into(),
      self.estimated_gap_days.into(),
      self.on_time_flag.into(),
      self.is_canceled.into(),
      self.is_new_customer.into(),
    ]
  }
}

// ─── Build ───────────────────────────────────────────────────────────────────

/// Left-join orders to customers and the pre-aggregated payment
/// totals and item counts, then derive per-row columns. Row order follows
/// `orders`.
pub fn join_order_grain(
  orders: &[Order],
  customers: &[Customer],
  payment_totals: &HashMap<&str, f64>,
  item_counts: &HashMap<&str, i64>,
) -> Vec<FactOrder> {
  let customers = HashIndex::build(customers, |c| Some(c.customer_id.as_str()));

  let mut rows = Vec::with_capacity(orders.len());
  for order in orders {
    let key = order.order_id.as_str();
    let total = payment_totals.get(key).copied();
    let count = item_counts.get(key).copied().unwrap_or(0);
    for customer in customers.left(order.customer_id.as_deref()) {
      rows.push(FactOrder::derive(order, customer, total, count));
    }
  }
  rows
}

/// An order is a customer's first when its purchase timestamp equals
/// the earliest one among orders sharing its `customer_unique_id`. Ties all
/// count as first.
pub fn flag_new_customers(rows: &mut [FactOrder]) {
  let flags: Vec<Option<bool>> = {
    let mut first: HashMap<&str, NaiveDateTime> = HashMap::new();
    for row in rows.iter() {
      if let (Some(uid), Some(ts)) = (row.customer_unique_id.as_deref(), row.order_purchase_ts) {
        first
          .entry(uid)
          .and_modify(|min| *min = (*min).min(ts))
          .or_insert(ts);
      }
    }
    rows
      .iter()
      .map(|row| {
        row.customer_unique_id.as_deref().map(|uid| {
          row
            .order_purchase_ts
            .is_some_and(|ts| first.get(uid) == Some(&ts))
        })
      })
      .collect()
  };

  for (row, flag) in rows.iter_mut().zip(flags) {
    row.is_new_customer = flag;
  }
}

// ─── Diagnostics ─────────────────────────────────────────────────────────────

/// Advisory statistics logged after the integrity checks pass.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDiagnostics {
  pub rows:                  usize,
  /// Share of orders with no payment rows, in percent.
  pub payment_missing_pct:   f64,
  /// Share of orders with no line items (`items_cnt` filled to 0), in percent.
  pub items_missing_pct:     f64,
  pub payment_value_summary: Summary,
}

impl OrderDiagnostics {
  pub fn compute(rows: &[FactOrder]) -> Self {
    let no_payment = rows.iter().filter(|r| r.payment_value_total.is_none()).count();
    let no_items = rows.iter().filter(|r| r.items_cnt == 0).count();
    Self {
      rows:                  rows.len(),
      payment_missing_pct:   pct(no_payment, rows.len()),
      items_missing_pct:     pct(no_items, rows.len()),
      payment_value_summary: Summary::describe(
        rows.iter().filter_map(|r| r.payment_value_total),
        &QUARTILES,
      ),
    }
  }

  pub fn log(&self) {
    tracing::info!(
      rows = self.rows,
      payment_missing_pct = self.payment_missing_pct,
      items_missing_pct = self.items_missing_pct,
      "fact_orders missing rates"
    );
    tracing::info!("payment_value_total: {}", self.payment_value_summary);
  }
}

/// The checked order-grain fact table and its diagnostics.
#[derive(Debug, Clone)]
pub struct OrderFacts {
  pub rows:        Vec<FactOrder>,
  pub diagnostics: OrderDiagnostics,
}

/// Pre-aggregate, join, derive, and check `fact_orders`.
///
/// Fails with [`mart_core::Error::DuplicateKey`] if `order_id` is not unique
/// in the result, which happens when the customer table repeats a
/// `customer_id`.
pub fn build_order_facts(
  orders: &[Order],
  customers: &[Customer],
  payments: &[Payment],
  items: &[OrderItem],
) -> Result<OrderFacts> {
  let payment_totals = preagg::payment_totals(payments);
  let item_counts = preagg::item_counts(items);

  let mut rows = join_order_grain(orders, customers, &payment_totals, &item_counts);
  flag_new_customers(&mut rows);

  checks::ensure_unique(
    FactOrder::NAME,
    "order_id",
    rows.iter().map(|r| r.order_id.as_str()),
  )?;

  let diagnostics = OrderDiagnostics::compute(&rows);
  diagnostics.log();
  Ok(OrderFacts { rows, diagnostics })
}

#[cfg(test)]
mod tests {
  use mart_core::Error;

  use super::*;

  fn order(id: &str, customer: &str, purchased: &str) -> Order {
    Order {
      order_id: id.into(),
      customer_id: Some(customer.into()),
      order_status: Some("delivered".into()),
      order_purchase_timestamp: Some(purchased.into()),
      ..Default::default()
    }
  }

  fn customer(id: &str, unique: Option<&str>) -> Customer {
    Customer {
      customer_id: id.into(),
      customer_unique_id: unique.map(Into::into),
      customer_city: Some("sao paulo".into()),
      customer_state: Some("SP".into()),
      ..Default::default()
    }
  }

  fn payment(order_id: &str, value: f64) -> Payment {
    Payment {
      order_id: Some(order_id.into()),
      payment_value: Some(value),
      ..Default::default()
    }
  }

  fn item(order_id: &str, seq: i64) -> OrderItem {
    OrderItem {
      order_id: order_id.into(),
      order_item_id: seq,
      price: Some(10.0),
      freight_value: Some(1.0),
      ..Default::default()
    }
  }

  fn with_delivery(mut o: Order, delivered: Option<&str>, estimated: Option<&str>) -> Order {
    o.order_delivered_customer_date = delivered.map(Into::into);
    o.order_estimated_delivery_date = estimated.map(Into::into);
    o
  }

  #[test]
  fn one_row_per_order_even_without_children() {
    let orders = vec![
      order("o1", "c1", "2024-01-01 10:00:00"),
      order("o2", "c2", "2024-01-02 10:00:00"),
      order("o3", "missing", "2024-01-03 10:00:00"),
    ];
    let customers = vec![customer("c1", Some("u1")), customer("c2", Some("u2"))];
    let payments = vec![payment("o1", 10.0), payment("o1", 5.0), payment("o1", 2.5)];
    let items = vec![item("o1", 1), item("o1", 2)];

    let facts = build_order_facts(&orders, &customers, &payments, &items).unwrap();
    assert_eq!(facts.rows.len(), orders.len());

    let o1 = &facts.rows[0];
    assert_eq!(o1.payment_value_total, Some(17.5));
    assert_eq!(o1.revenue_order(), Some(17.5));
    assert_eq!(o1.items_cnt, 2);

    let o2 = &facts.rows[1];
    assert_eq!(o2.payment_value_total, None);
    assert_eq!(o2.items_cnt, 0);

    // Unknown customer keeps the order with null customer attributes.
    let o3 = &facts.rows[2];
    assert_eq!(o3.order_id, "o3");
    assert_eq!(o3.customer_id.as_deref(), Some("missing"));
    assert_eq!(o3.customer_unique_id, None);
    assert_eq!(o3.customer_city, None);
    assert_eq!(o3.is_new_customer, None);

    assert!((facts.diagnostics.payment_missing_pct - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(facts.diagnostics.payment_value_summary.count, 1);
  }

  #[test]
  fn on_time_flag_is_tri_state() {
    let base = order("o1", "c1", "2024-01-01 00:00:00");
    let on_time = with_delivery(
      base.clone(),
      Some("2024-01-10 00:00:00"),
      Some("2024-01-12 00:00:00"),
    );
    let late = with_delivery(
      base.clone(),
      Some("2024-01-15 00:00:00"),
      Some("2024-01-12 00:00:00"),
    );
    let unknown = with_delivery(base, None, Some("2024-01-12 00:00:00"));

    let on_time = FactOrder::derive(&on_time, None, None, 0);
    assert_eq!(on_time.on_time_flag, Some(true));
    assert_eq!(on_time.delivered_days, Some(9));
    assert_eq!(on_time.estimated_gap_days, Some(-2));

    let late = FactOrder::derive(&late, None, None, 0);
    assert_eq!(late.on_time_flag, Some(false));
    assert_eq!(late.estimated_gap_days, Some(3));

    let unknown = FactOrder::derive(&unknown, None, None, 0);
    assert_eq!(unknown.on_time_flag, None);
    assert_eq!(unknown.delivered_days, None);
    assert_eq!(unknown.estimated_gap_days, None);
  }

  #[test]
  fn delivered_on_estimate_day_is_on_time() {
    let o = with_delivery(
      order("o1", "c1", "2024-01-01 00:00:00"),
      Some("2024-01-12 00:00:00"),
      Some("2024-01-12 00:00:00"),
    );
    assert_eq!(FactOrder::derive(&o, None, None, 0).on_time_flag, Some(true));
  }

  #[test]
  fn malformed_timestamps_become_null() {
    let o = with_delivery(order("o1", "c1", "garbage"), Some("also garbage"), None);
    let row = FactOrder::derive(&o, None, None, 0);
    assert_eq!(row.order_purchase_ts, None);
    assert_eq!(row.order_purchase_date, None);
    assert_eq!(row.order_delivered_ts, None);
    assert_eq!(row.delivered_days, None);
  }

  #[test]
  fn canceled_is_strict_equality() {
    let mut o = order("o1", "c1", "2024-01-01 00:00:00");
    o.order_status = Some("canceled".into());
    assert!(FactOrder::derive(&o, None, None, 0).is_canceled);
    o.order_status = Some("Canceled".into());
    assert!(!FactOrder::derive(&o, None, None, 0).is_canceled);
    o.order_status = None;
    assert!(!FactOrder::derive(&o, None, None, 0).is_canceled);
  }

  #[test]
  fn first_purchase_per_person_is_new() {
    let orders = vec![
      order("o1", "c1", "2024-01-01 00:00:00"),
      order("o2", "c2", "2024-02-01 00:00:00"),
      order("o3", "c3", "2024-03-01 00:00:00"),
    ];
    let customers = vec![
      customer("c1", Some("U1")),
      customer("c2", Some("U1")),
      customer("c3", None),
    ];
    let facts = build_order_facts(&orders, &customers, &[], &[]).unwrap();
    let flags: Vec<Option<bool>> = facts.rows.iter().map(|r| r.is_new_customer).collect();
    assert_eq!(flags, vec![Some(true), Some(false), None]);
  }

  #[test]
  fn tied_first_purchases_are_all_new() {
    let orders = vec![
      order("o1", "c1", "2024-01-01 00:00:00"),
      order("o2", "c2", "2024-01-01 00:00:00"),
    ];
    let customers = vec![customer("c1", Some("U1")), customer("c2", Some("U1"))];
    let facts = build_order_facts(&orders, &customers, &[], &[]).unwrap();
    assert!(facts.rows.iter().all(|r| r.is_new_customer == Some(true)));
  }

  #[test]
  fn missing_purchase_with_known_person_is_not_new() {
    let orders = vec![
      order("o1", "c1", "garbage"),
      order("o2", "c2", "2024-01-05 00:00:00"),
    ];
    let customers = vec![customer("c1", Some("U1")), customer("c2", Some("U1"))];
    let facts = build_order_facts(&orders, &customers, &[], &[]).unwrap();
    assert_eq!(facts.rows[0].is_new_customer, Some(false));
    assert_eq!(facts.rows[1].is_new_customer, Some(true));
  }

  #[test]
  fn duplicate_customer_rows_abort() {
    let orders = vec![order("o1", "c1", "2024-01-01 00:00:00")];
    let customers = vec![customer("c1", Some("U1")), customer("c1", Some("U2"))];
    let err = build_order_facts(&orders, &customers, &[], &[]).unwrap_err();
    assert!(matches!(err, Error::DuplicateKey { ref table, .. } if table == "fact_orders"));
  }

  #[test]
  fn row_encodes_flags_and_constants() {
    let o = with_delivery(
      order("o1", "c1", "2024-01-01 10:00:00"),
      Some("2024-01-05 10:00:00"),
      Some("2024-01-04 10:00:00"),
    );
    let row = FactOrder::derive(&o, None, Some(3.5), 1).row();
    assert_eq!(row.len(), FactOrder::columns().len());
    let rendered: Vec<String> = row.iter().map(ToString::to_string).collect();
    assert_eq!(rendered[0], "o1");
    assert_eq!(rendered[4], "2024-01-01 10:00:00");
    assert_eq!(rendered[5], "2024-01-01");
    assert_eq!(rendered[10], "3.5");
    assert_eq!(rendered[11], "1");
    assert_eq!(rendered[13], "3.5");
    assert_eq!(rendered[16], "0");
    assert_eq!(rendered[17], "0");
    assert_eq!(rendered[18], "");
  }
}
