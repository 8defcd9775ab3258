//! Stage tests over a miniature raw dataset written to a temporary directory.

use std::{fs, path::Path};

use mart_core::{IfExists, SourceTable};
use mart_store_sqlite::SqliteStore;
use tempfile::TempDir;

use crate::{MartConfig, SinkKind, stages};

const ORDERS: &str = "\
order_id,customer_id,order_status,order_purchase_timestamp,order_approved_at,order_delivered_carrier_date,order_delivered_customer_date,order_estimated_delivery_date
o1,c1,delivered,2018-01-01 10:00:00,2018-01-01 11:00:00,2018-01-02 09:00:00,2018-01-05 10:00:00,2018-01-10 00:00:00
o2,c2,delivered,2018-02-01 10:00:00,,,2018-02-20 10:00:00,2018-02-10 00:00:00
o3,c3,canceled,2018-01-03 08:00:00,,,,2018-01-20 00:00:00
";

const ITEMS: &str = "\
order_id,order_item_id,product_id,seller_id,shipping_limit_date,price,freight_value
o1,1,p1,s1,2018-01-03 10:00:00,10.0,2.5
o1,2,p2,s1,2018-01-03 10:00:00,5.0,0
o2,1,p1,s2,2018-02-03 10:00:00,20.0,3.0
";

const PAYMENTS: &str = "\
order_id,payment_sequential,payment_type,payment_installments,payment_value
o1,1,credit_card,1,10.0
o1,2,voucher,1,5.0
o1,3,voucher,1,2.5
o2,1,boleto,1,23.0
";

const CUSTOMERS: &str = "\
customer_id,customer_unique_id,customer_zip_code_prefix,customer_city,customer_state
c1,U1,01001,sao paulo,SP
c2,U1,01001,sao paulo,SP
c3,U2,80010,curitiba,PR
";

const PRODUCTS: &str = "\
product_id,product_category_name,product_name_lenght,product_description_lenght,product_photos_qty,product_weight_g,product_length_cm,product_height_cm,product_width_cm
p1,beleza_saude,40,300,1,500,20,10,15
p2,sem_traducao,30,200,2,,,,
";

const TRANSLATIONS: &str = "\
\u{feff}product_category_name,product_category_name_english
beleza_saude,health_beauty
";

fn raw_dataset() -> (TempDir, MartConfig) {
  let root = tempfile::tempdir().unwrap();
  let raw = root.path().join("raw");
  fs::create_dir_all(&raw).unwrap();
  for (table, body) in [
    (SourceTable::Orders, ORDERS),
    (SourceTable::OrderItems, ITEMS),
    (SourceTable::Payments, PAYMENTS),
    (SourceTable::Customers, CUSTOMERS),
    (SourceTable::Products, PRODUCTS),
    (SourceTable::CategoryTranslation, TRANSLATIONS),
  ] {
    fs::write(raw.join(table.file_name()), body).unwrap();
  }
  let cfg = MartConfig {
    raw_dir: raw,
    mart_dir: root.path().join("mart"),
    database_path: Some(root.path().join("mart.sqlite")),
    if_exists: IfExists::Replace,
  };
  (root, cfg)
}

fn read(path: &Path) -> String { fs::read_to_string(path).unwrap() }

// ─── CSV marts ───────────────────────────────────────────────────────────────

#[test]
fn fact_orders_csv() {
  let (_root, cfg) = raw_dataset();
  assert_eq!(stages::run_fact_orders(&cfg, SinkKind::Csv).unwrap(), 3);

  let text = read(&cfg.mart_dir.join("fact_orders.csv"));
  let lines: Vec<&str> = text.lines().collect();
  assert_eq!(lines.len(), 4);
  assert_eq!(
    lines[0],
    "order_id,customer_id,customer_unique_id,order_status,order_purchase_ts,\
     order_purchase_date,order_delivered_ts,order_estimated_ts,customer_city,\
     customer_state,payment_value_total,orders_cnt,items_cnt,revenue_order,\
     delivered_days,estimated_gap_days,on_time_flag,is_canceled,is_new_customer"
  );
  assert_eq!(
    lines[1],
    "o1,c1,U1,delivered,2018-01-01 10:00:00,2018-01-01,2018-01-05 10:00:00,\
     2018-01-10 00:00:00,sao paulo,SP,17.5,1,2,17.5,4,-5,1,0,1"
  );
  // Second order of U1, delivered late, no longer new.
  assert!(lines[2].ends_with(",1,1,23,19,10,0,0,0"), "{}", lines[2]);
  // Canceled, never delivered, no payments or items.
  assert!(lines[3].ends_with(",,1,0,,,,,1,1"), "{}", lines[3]);
}

#[test]
fn fact_items_csv() {
  let (_root, cfg) = raw_dataset();
  assert_eq!(stages::run_fact_items(&cfg, SinkKind::Csv).unwrap(), 3);

  let text = read(&cfg.mart_dir.join("fact_order_items.csv"));
  let lines: Vec<&str> = text.lines().collect();
  assert_eq!(lines.len(), 4);
  assert!(lines[1].starts_with("o1,1,p1,s1,c1,U1,2018-01-01 10:00:00,2018-01-01,delivered"));
  assert!(lines[1].contains(",beleza_saude,health_beauty,500,20,10,15,10,2.5,12.5,1"));
  // Untranslated category keeps the Portuguese name and a null English one.
  assert!(lines[2].contains(",sem_traducao,,,,,,5,0,5,1"), "{}", lines[2]);
}

#[test]
fn dim_date_csv_spans_purchase_range() {
  let (_root, cfg) = raw_dataset();
  // 2018-01-01 through 2018-02-01.
  assert_eq!(stages::run_dim_date(&cfg, SinkKind::Csv).unwrap(), 32);
  let text = read(&cfg.mart_dir.join("dim_date.csv"));
  assert!(text.lines().nth(1).unwrap().starts_with("2018-01-01,2018,1,1,January,"));
  assert!(text.lines().last().unwrap().starts_with("2018-02-01,"));
}

#[test]
fn reruns_are_byte_identical() {
  let (_root, cfg) = raw_dataset();
  let outputs = ["fact_orders.csv", "fact_order_items.csv", "dim_date.csv"];

  let run = || {
    stages::run_fact_orders(&cfg, SinkKind::Csv).unwrap();
    stages::run_fact_items(&cfg, SinkKind::Csv).unwrap();
    stages::run_dim_date(&cfg, SinkKind::Csv).unwrap();
    outputs.map(|f| fs::read(cfg.mart_dir.join(f)).unwrap())
  };
  let first = run();
  let second = run();
  assert_eq!(first, second);

  let leftovers = fs::read_dir(&cfg.mart_dir).unwrap().count();
  assert_eq!(leftovers, outputs.len());
}

// ─── Preconditions ───────────────────────────────────────────────────────────

#[test]
fn missing_raw_file_aborts_before_writing() {
  let (_root, cfg) = raw_dataset();
  fs::remove_file(cfg.raw_dir.join(SourceTable::Products.file_name())).unwrap();

  let err = stages::run_fact_items(&cfg, SinkKind::Csv).unwrap_err();
  assert!(err.is_precondition());
  assert!(err.to_string().contains("olist_products_dataset.csv"));
  assert!(!cfg.mart_dir.exists());

  // The audit needs every source file too.
  assert!(stages::run_audit(&cfg).unwrap_err().is_precondition());
  // fact_orders does not read products.
  stages::run_fact_orders(&cfg, SinkKind::Csv).unwrap();
}

#[test]
fn missing_files_are_all_named() {
  let (_root, cfg) = raw_dataset();
  fs::remove_file(cfg.raw_dir.join(SourceTable::Orders.file_name())).unwrap();
  fs::remove_file(cfg.raw_dir.join(SourceTable::Payments.file_name())).unwrap();

  let message = stages::run_audit(&cfg).unwrap_err().to_string();
  assert!(message.contains("olist_orders_dataset.csv"));
  assert!(message.contains("olist_order_payments_dataset.csv"));
}

#[test]
fn sqlite_sink_requires_database_setting() {
  let (_root, mut cfg) = raw_dataset();
  cfg.database_path = None;
  let err = stages::run_dim_date(&cfg, SinkKind::Sqlite).unwrap_err();
  assert!(err.is_precondition());
  assert!(stages::run_load_raw(&cfg).unwrap_err().is_precondition());
}

#[test]
fn duplicate_customer_is_an_integrity_error() {
  let (_root, cfg) = raw_dataset();
  let mut customers = CUSTOMERS.to_owned();
  customers.push_str("c1,U9,01001,sao paulo,SP\n");
  fs::write(cfg.raw_dir.join(SourceTable::Customers.file_name()), customers).unwrap();

  let err = stages::run_fact_orders(&cfg, SinkKind::Csv).unwrap_err();
  assert!(err.is_integrity());
  assert!(!cfg.mart_dir.join("fact_orders.csv").exists());
}

// ─── SQLite ──────────────────────────────────────────────────────────────────

#[test]
fn facts_can_target_sqlite() {
  let (_root, cfg) = raw_dataset();
  stages::run_fact_orders(&cfg, SinkKind::Sqlite).unwrap();
  stages::run_fact_items(&cfg, SinkKind::Sqlite).unwrap();
  stages::run_dim_date(&cfg, SinkKind::Sqlite).unwrap();

  let store = SqliteStore::open(cfg.require_database_path().unwrap(), IfExists::Fail).unwrap();
  assert_eq!(store.row_count("fact_orders").unwrap(), 3);
  assert_eq!(store.row_count("fact_order_items").unwrap(), 3);
  assert_eq!(store.row_count("dim_date").unwrap(), 32);

  let english: Option<String> = store
    .connection()
    .query_row(
      "SELECT product_category_en FROM fact_order_items \
       WHERE order_id = 'o1' AND order_item_id = 2",
      [],
      |r| r.get(0),
    )
    .unwrap();
  assert_eq!(english, None);
  assert!(!cfg.mart_dir.exists());
}

#[test]
fn load_raw_skips_absent_optional_files() {
  let (_root, cfg) = raw_dataset();
  fs::write(
    cfg.raw_dir.join(SourceTable::Sellers.file_name()),
    "seller_id,seller_zip_code_prefix,seller_city,seller_state\ns1,13023,campinas,SP\n",
  )
  .unwrap();

  let loaded = stages::run_load_raw(&cfg).unwrap();
  let tables: Vec<&str> = loaded.iter().map(|(t, _)| t.raw_table_name()).collect();
  assert_eq!(tables, vec![
    "raw_orders",
    "raw_order_items",
    "raw_order_payments",
    "raw_customers",
    "raw_products",
    "raw_category_translation",
    "raw_sellers",
  ]);

  let store = SqliteStore::open(cfg.require_database_path().unwrap(), IfExists::Fail).unwrap();
  assert_eq!(store.row_count("raw_order_payments").unwrap(), 4);
  assert!(!store.table_exists("raw_geolocation").unwrap());

  // Zip prefixes are inferred as integers, like any all-numeric column.
  let zip: i64 = store
    .connection()
    .query_row("SELECT seller_zip_code_prefix FROM raw_sellers", [], |r| r.get(0))
    .unwrap();
  assert_eq!(zip, 13023);
}

#[test]
fn load_raw_replaces_on_rerun() {
  let (_root, cfg) = raw_dataset();
  stages::run_load_raw(&cfg).unwrap();
  stages::run_load_raw(&cfg).unwrap();
  let store = SqliteStore::open(cfg.require_database_path().unwrap(), IfExists::Fail).unwrap();
  assert_eq!(store.row_count("raw_orders").unwrap(), 3);
}

// ─── Audit ───────────────────────────────────────────────────────────────────

#[test]
fn audit_reads_every_table() {
  let (_root, cfg) = raw_dataset();
  let report = stages::run_audit(&cfg).unwrap();
  assert_eq!(report.counts.orders, 3);
  assert_eq!(report.counts.payments, 4);
  assert_eq!(report.missing_ts.delivered.count, 1);
  assert_eq!(report.join_coverage.orders_with_items.count, 2);
  assert_eq!(report.time_logic.delivered_after_estimated.count, 1);
}
