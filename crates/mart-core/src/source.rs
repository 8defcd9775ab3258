//! Source entities: the raw Olist tables as typed rows.
//!
//! Only the columns the pipeline reads are declared; extra CSV columns are
//! ignored on load. Timestamps stay raw strings here and are parsed on use
//! by [`crate::timestamp`], so a malformed value never fails the load.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, de::DeserializeOwned};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result, timestamp};

// ─── Source tables ───────────────────────────────────────────────────────────

/// A named raw input table and its conventional file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTable {
  Orders,
  OrderItems,
  Payments,
  Customers,
  Products,
  CategoryTranslation,
  Sellers,
  Geolocation,
  Reviews,
}

impl SourceTable {
  /// The tables every pipeline stage and the auditor require.
  pub const REQUIRED: [Self; 6] = [
    Self::Orders,
    Self::OrderItems,
    Self::Payments,
    Self::Customers,
    Self::Products,
    Self::CategoryTranslation,
  ];

  /// Every table the raw loader knows about.
  pub const ALL: [Self; 9] = [
    Self::Orders,
    Self::OrderItems,
    Self::Payments,
    Self::Customers,
    Self::Products,
    Self::CategoryTranslation,
    Self::Sellers,
    Self::Geolocation,
    Self::Reviews,
  ];

  pub fn file_name(self) -> &'static str {
    match self {
      Self::Orders => "olist_orders_dataset.csv",
      Self::OrderItems => "olist_order_items_dataset.csv",
      Self::Payments => "olist_order_payments_dataset.csv",
      Self::Customers => "olist_customers_dataset.csv",
      Self::Products => "olist_products_dataset.csv",
      Self::CategoryTranslation => "product_category_name_translation.csv",
      Self::Sellers => "olist_sellers_dataset.csv",
      Self::Geolocation => "olist_geolocation_dataset.csv",
      Self::Reviews => "olist_order_reviews_dataset.csv",
    }
  }

  /// Table name used when the raw file is loaded into a relational store.
  pub fn raw_table_name(self) -> &'static str {
    match self {
      Self::Orders => "raw_orders",
      Self::OrderItems => "raw_order_items",
      Self::Payments => "raw_order_payments",
      Self::Customers => "raw_customers",
      Self::Products => "raw_products",
      Self::CategoryTranslation => "raw_category_translation",
      Self::Sellers => "raw_sellers",
      Self::Geolocation => "raw_geolocation",
      Self::Reviews => "raw_reviews",
    }
  }
}

/// Binds a row type to the source table it is read from.
pub trait SourceRecord: DeserializeOwned {
  const TABLE: SourceTable;
}

// ─── Layout ──────────────────────────────────────────────────────────────────

/// Where the raw files live. Passed into loaders explicitly so tests can point
/// at a temporary directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
  raw_dir: PathBuf,
}

impl SourceLayout {
  pub fn new(raw_dir: impl Into<PathBuf>) -> Self {
    Self {
      raw_dir: raw_dir.into(),
    }
  }

  pub fn path(&self, table: SourceTable) -> PathBuf {
    self.raw_dir.join(table.file_name())
  }

  /// The subset of `tables` whose file does not exist.
  pub fn missing(&self, tables: &[SourceTable]) -> Vec<SourceTable> {
    tables
      .iter()
      .copied()
      .filter(|t| !self.path(*t).is_file())
      .collect()
  }

  /// Fail with [`Error::MissingSourceFiles`] naming every absent file.
  pub fn require(&self, tables: &[SourceTable]) -> Result<()> {
    let missing = self.missing(tables);
    if missing.is_empty() {
      return Ok(());
    }
    Err(Error::MissingSourceFiles {
      dir:   self.raw_dir.clone(),
      files: missing.iter().map(|t| t.file_name().to_owned()).collect(),
    })
  }
}

// ─── Order ───────────────────────────────────────────────────────────────────

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
  Created,
  Approved,
  Processing,
  Shipped,
  Delivered,
  Canceled,
  Unavailable,
  Invoiced,
}

/// One row of `olist_orders_dataset.csv`. Grain: `order_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Order {
  pub order_id:                      String,
  pub customer_id:                   Option<String>,
  /// Raw status text; unknown values are kept for the audit.
  pub order_status:                  Option<String>,
  pub order_purchase_timestamp:      Option<String>,
  #[serde(default)]
  pub order_approved_at:             Option<String>,
  #[serde(default)]
  pub order_delivered_carrier_date:  Option<String>,
  pub order_delivered_customer_date: Option<String>,
  pub order_estimated_delivery_date: Option<String>,
}

impl Order {
  /// The parsed status, or `None` when missing or not a known status.
  pub fn status(&self) -> Option<OrderStatus> {
    self.order_status.as_deref().and_then(|s| s.parse().ok())
  }

  pub fn purchased_at(&self) -> Option<NaiveDateTime> {
    timestamp::parse_opt(self.order_purchase_timestamp.as_deref())
  }

  pub fn delivered_at(&self) -> Option<NaiveDateTime> {
    timestamp::parse_opt(self.order_delivered_customer_date.as_deref())
  }

  pub fn estimated_delivery_at(&self) -> Option<NaiveDateTime> {
    timestamp::parse_opt(self.order_estimated_delivery_date.as_deref())
  }
}

impl SourceRecord for Order {
  const TABLE: SourceTable = SourceTable::Orders;
}

// ─── Order item ──────────────────────────────────────────────────────────────

/// One row of `olist_order_items_dataset.csv`.
/// Grain: `(order_id, order_item_id)`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderItem {
  pub order_id:            String,
  /// Sequence number of the item within its order, starting at 1.
  pub order_item_id:       i64,
  pub product_id:          Option<String>,
  pub seller_id:           Option<String>,
  #[serde(default)]
  pub shipping_limit_date: Option<String>,
  pub price:               Option<f64>,
  pub freight_value:       Option<f64>,
}

impl SourceRecord for OrderItem {
  const TABLE: SourceTable = SourceTable::OrderItems;
}

// ─── Payment ─────────────────────────────────────────────────────────────────

/// One row of `olist_order_payments_dataset.csv`. Several rows may share an
/// `order_id` (split payments, vouchers).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Payment {
  pub order_id:             Option<String>,
  #[serde(default)]
  pub payment_sequential:   Option<i64>,
  #[serde(default)]
  pub payment_type:         Option<String>,
  #[serde(default)]
  pub payment_installments: Option<i64>,
  pub payment_value:        Option<f64>,
}

impl SourceRecord for Payment {
  const TABLE: SourceTable = SourceTable::Payments;
}

// ─── Customer ────────────────────────────────────────────────────────────────

/// One row of `olist_customers_dataset.csv`.
///
/// Olist issues a fresh `customer_id` per order; `customer_unique_id` is the
/// person behind them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Customer {
  pub customer_id:              String,
  pub customer_unique_id:       Option<String>,
  #[serde(default)]
  pub customer_zip_code_prefix: Option<String>,
  #[serde(default)]
  pub customer_city:            Option<String>,
  #[serde(default)]
  pub customer_state:           Option<String>,
}

impl SourceRecord for Customer {
  const TABLE: SourceTable = SourceTable::Customers;
}

// ─── Product ─────────────────────────────────────────────────────────────────

/// One row of `olist_products_dataset.csv`. Grain: `product_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Product {
  pub product_id:            String,
  /// Portuguese category name; joins to [`CategoryTranslation`].
  pub product_category_name: Option<String>,
  #[serde(default)]
  pub product_weight_g:      Option<f64>,
  #[serde(default)]
  pub product_length_cm:     Option<f64>,
  #[serde(default)]
  pub product_height_cm:     Option<f64>,
  #[serde(default)]
  pub product_width_cm:      Option<f64>,
}

impl SourceRecord for Product {
  const TABLE: SourceTable = SourceTable::Products;
}

// ─── Category translation ────────────────────────────────────────────────────

/// One row of `product_category_name_translation.csv`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryTranslation {
  pub product_category_name:         String,
  pub product_category_name_english: Option<String>,
}

impl SourceRecord for CategoryTranslation {
  const TABLE: SourceTable = SourceTable::CategoryTranslation;
}
