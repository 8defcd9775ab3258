//! The independently runnable stages behind each subcommand.
//!
//! Every stage follows the same order: check its inputs exist, load, compute,
//! run the integrity checks, and only then open the destination and write.
//! A failure at any step before the write leaves existing outputs untouched.

use std::path::PathBuf;

use mart_audit::{AuditInput, AuditReport};
use mart_core::{
  IfExists, Relation, SourceLayout, SourceTable, TableSink,
  source::{CategoryTranslation, Customer, Order, OrderItem, Payment, Product},
};
use mart_csv::{CsvSink, read_relation, read_source};
use mart_store_sqlite::SqliteStore;
use mart_transform::{build_dim_date, build_item_facts, build_order_facts};
use serde::Deserialize;
use strum::{Display, EnumString};

use crate::{Result, config::MartConfig};

// ─── Destinations ────────────────────────────────────────────────────────────

/// Where a fact or dimension table is written.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SinkKind {
  /// `<mart_dir>/<table>.csv`
  #[default]
  Csv,
  /// A table in the configured SQLite database.
  Sqlite,
}

/// A resolved, not yet opened, destination. Resolving validates the
/// configuration up front; opening is deferred until there is something to
/// write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
  Csv(PathBuf),
  Sqlite { path: PathBuf, policy: IfExists },
}

impl Destination {
  pub fn resolve(config: &MartConfig, kind: SinkKind) -> Result<Self> {
    Ok(match kind {
      SinkKind::Csv => Self::Csv(config.mart_dir.clone()),
      SinkKind::Sqlite => Self::Sqlite {
        path:   config.require_database_path()?.to_path_buf(),
        policy: config.if_exists,
      },
    })
  }

  pub fn open(&self) -> Result<Output> {
    Ok(match self {
      Self::Csv(dir) => Output::Csv(CsvSink::new(dir)),
      Self::Sqlite { path, policy } => Output::Sqlite(SqliteStore::open(path, *policy)?),
    })
  }
}

/// An opened destination.
pub enum Output {
  Csv(CsvSink),
  Sqlite(SqliteStore),
}

impl TableSink for Output {
  type Error = crate::Error;

  fn write_table(&mut self, relation: &Relation) -> Result<usize> {
    Ok(match self {
      Self::Csv(sink) => sink.write_table(relation)?,
      Self::Sqlite(store) => store.write_table(relation)?,
    })
  }
}

fn publish(destination: &Destination, relation: &Relation) -> Result<usize> {
  let rows = destination.open()?.write_table(relation)?;
  tracing::info!(table = relation.name(), rows, "published");
  Ok(rows)
}

fn source_layout(config: &MartConfig) -> SourceLayout { SourceLayout::new(&config.raw_dir) }

// ─── Stages ──────────────────────────────────────────────────────────────────

/// Audit the raw tables. All six source files must be present.
pub fn run_audit(config: &MartConfig) -> Result<AuditReport> {
  let layout = source_layout(config);
  layout.require(&SourceTable::REQUIRED)?;

  let orders: Vec<Order> = read_source(&layout)?;
  let items: Vec<OrderItem> = read_source(&layout)?;
  let payments: Vec<Payment> = read_source(&layout)?;
  let customers: Vec<Customer> = read_source(&layout)?;
  let products: Vec<Product> = read_source(&layout)?;

  Ok(AuditReport::compute(&AuditInput {
    orders:    &orders,
    items:     &items,
    payments:  &payments,
    customers: &customers,
    products:  &products,
  }))
}

/// Build and write `fact_orders`. Returns the number of rows written.
pub fn run_fact_orders(config: &MartConfig, sink: SinkKind) -> Result<usize> {
  let destination = Destination::resolve(config, sink)?;
  let layout = source_layout(config);
  layout.require(&[
    SourceTable::Orders,
    SourceTable::Customers,
    SourceTable::Payments,
    SourceTable::OrderItems,
  ])?;

  let orders: Vec<Order> = read_source(&layout)?;
  let customers: Vec<Customer> = read_source(&layout)?;
  let payments: Vec<Payment> = read_source(&layout)?;
  let items: Vec<OrderItem> = read_source(&layout)?;

  let facts = build_order_facts(&orders, &customers, &payments, &items)?;
  publish(&destination, &Relation::from_records(&facts.rows))
}

/// Build and write `fact_order_items`. Returns the number of rows written.
pub fn run_fact_items(config: &MartConfig, sink: SinkKind) -> Result<usize> {
  let destination = Destination::resolve(config, sink)?;
  let layout = source_layout(config);
  layout.require(&[
    SourceTable::OrderItems,
    SourceTable::Orders,
    SourceTable::Customers,
    SourceTable::Products,
    SourceTable::CategoryTranslation,
  ])?;

  let items: Vec<OrderItem> = read_source(&layout)?;
  let orders: Vec<Order> = read_source(&layout)?;
  let customers: Vec<Customer> = read_source(&layout)?;
  let products: Vec<Product> = read_source(&layout)?;
  let translations: Vec<CategoryTranslation> = read_source(&layout)?;

  let facts = build_item_facts(&items, &orders, &customers, &products, &translations)?;
  publish(&destination, &Relation::from_records(&facts.rows))
}

/// Build and write `dim_date`. Returns the number of days written.
pub fn run_dim_date(config: &MartConfig, sink: SinkKind) -> Result<usize> {
  let destination = Destination::resolve(config, sink)?;
  let layout = source_layout(config);
  layout.require(&[SourceTable::Orders])?;

  let orders: Vec<Order> = read_source(&layout)?;
  let days = build_dim_date(&orders)?;
  publish(&destination, &Relation::from_records(&days))
}

/// Copy every raw file present into `raw_<entity>` tables of the configured
/// database. Absent files are skipped with a warning. Returns each loaded
/// table and its row count.
pub fn run_load_raw(config: &MartConfig) -> Result<Vec<(SourceTable, usize)>> {
  let path = config.require_database_path()?;
  let mut store = SqliteStore::open(path, config.if_exists)?;
  let layout = source_layout(config);

  let mut loaded = Vec::new();
  for table in SourceTable::ALL {
    let file = layout.path(table);
    if !file.is_file() {
      tracing::warn!(file = %file.display(), "raw file not found; skipping");
      continue;
    }
    let relation = read_relation(&file, table.raw_table_name())?;
    let rows = store.write_table(&relation)?;
    loaded.push((table, rows));
  }
  Ok(loaded)
}
