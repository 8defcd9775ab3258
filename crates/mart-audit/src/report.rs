//! Rendering of an [`AuditReport`] as markdown or JSON.

use std::fmt::{self, Write as _};

use mart_core::stats::Summary;
use serde::Deserialize;
use strum::{Display, EnumString};

use crate::audit::{AuditReport, Measure};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportFormat {
  #[default]
  Markdown,
  Json,
}

impl AuditReport {
  pub fn render(&self, format: ReportFormat) -> serde_json::Result<String> {
    match format {
      ReportFormat::Markdown => Ok(self.to_markdown()),
      ReportFormat::Json => {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
      }
    }
  }

  pub fn to_markdown(&self) -> String { self.to_string() }
}

impl fmt::Display for Measure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({:.2}%)", self.count, self.pct)
  }
}

fn summary_block(out: &mut String, label: &str, s: &Summary) -> fmt::Result {
  writeln!(out, "{label}:")?;
  writeln!(out)?;
  writeln!(out, "| stat | value |")?;
  writeln!(out, "|---|---|")?;
  writeln!(out, "| count | {} |", s.count)?;
  let mut row = |name: &str, v: Option<f64>| match v {
    Some(v) => writeln!(out, "| {name} | {v:.2} |"),
    None => writeln!(out, "| {name} | - |"),
  };
  row("mean", s.mean)?;
  row("std", s.std)?;
  row("min", s.min)?;
  for p in &s.percentiles {
    row(&format!("{}%", p.quantile * 100.0), Some(p.value))?;
  }
  row("max", s.max)?;
  writeln!(out)
}

impl fmt::Display for AuditReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut out = String::new();
    let o = &mut out;

    writeln!(o, "# Data Quality Report")?;
    writeln!(o)?;

    let c = &self.counts;
    writeln!(o, "## 0) Row Counts")?;
    writeln!(o)?;
    writeln!(o, "- orders: {}", c.orders)?;
    writeln!(o, "- order_items: {}", c.order_items)?;
    writeln!(o, "- payments: {}", c.payments)?;
    writeln!(o, "- customers: {}", c.customers)?;
    writeln!(o, "- products: {}", c.products)?;
    writeln!(o)?;

    let d = &self.pk_dupes;
    writeln!(o, "## 1) Primary Key Uniqueness")?;
    writeln!(o)?;
    writeln!(o, "Duplicate rows per key:")?;
    writeln!(o)?;
    writeln!(o, "- orders (order_id): {}", d.orders)?;
    writeln!(o, "- order_items (order_id, order_item_id): {}", d.order_items)?;
    writeln!(o, "- customers (customer_id): {}", d.customers)?;
    writeln!(o, "- products (product_id): {}", d.products)?;
    writeln!(o)?;

    let m = &self.missing_ts;
    writeln!(o, "## 2) Missing Critical Timestamps")?;
    writeln!(o)?;
    writeln!(o, "- order_purchase_timestamp: {}", m.purchase)?;
    writeln!(o, "- order_delivered_customer_date: {}", m.delivered)?;
    writeln!(o, "- order_estimated_delivery_date: {}", m.estimated)?;
    writeln!(o)?;

    writeln!(o, "## 3) Status Distribution")?;
    writeln!(o)?;
    writeln!(o, "| order_status | count |")?;
    writeln!(o, "|---|---|")?;
    for s in &self.status_distribution {
      writeln!(o, "| {} | {} |", s.status.as_deref().unwrap_or("(missing)"), s.count)?;
    }
    writeln!(o)?;

    let j = &self.join_coverage;
    writeln!(o, "## 4) Join Coverage")?;
    writeln!(o)?;
    writeln!(o, "- orders with >=1 item: {}", j.orders_with_items)?;
    writeln!(o, "- items with product match: {}", j.items_with_products)?;
    writeln!(o, "- orders with >=1 payment row: {}", j.orders_with_payments)?;
    writeln!(o)?;

    let r = &self.ranges;
    writeln!(o, "## 5) Price / Payment Ranges")?;
    writeln!(o)?;
    summary_block(o, "price", &r.price)?;
    summary_block(o, "freight_value", &r.freight_value)?;
    summary_block(o, "payment_value", &r.payment_value)?;

    let t = &self.time_logic;
    writeln!(o, "## 6) Time Logic")?;
    writeln!(o)?;
    writeln!(o, "- delivered before purchase: {}", t.delivered_before_purchase)?;
    writeln!(o, "- delivered after estimated: {}", t.delivered_after_estimated)?;

    f.write_str(&out)
  }
}
