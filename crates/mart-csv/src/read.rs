//! Raw table loading.
//!
//! Two entry points:
//!   typed:   `read_source::<Order>(&layout)` → `Vec<Order>` via serde
//!   untyped: `read_relation(path, name)`     → `Relation` with inferred kinds
//!
//! Headers are trimmed and a leading UTF-8 BOM is dropped, since the Olist
//! translation file ships with one.

use std::{io, path::Path};

use csv::{Reader, ReaderBuilder, StringRecord};
use mart_core::{Column, ColumnKind, Relation, SourceLayout, SourceRecord, Value};
use serde::de::DeserializeOwned;

use crate::{Error, Result};

const BOM: char = '\u{feff}';

// ─── Low-level helpers ───────────────────────────────────────────────────────

fn normalize_headers<R: io::Read>(reader: &mut Reader<R>) -> csv::Result<()> {
  let headers: StringRecord = reader
    .headers()?
    .iter()
    .map(|h| h.trim_start_matches(BOM).trim())
    .collect();
  reader.set_headers(headers);
  Ok(())
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> Error + '_ {
  move |source| Error::Csv {
    path: path.to_path_buf(),
    source,
  }
}

// ─── Typed ───────────────────────────────────────────────────────────────────

/// Deserialize every row of `input` as `T`.
pub fn parse_records<T, R>(input: R) -> csv::Result<Vec<T>>
where
  T: DeserializeOwned,
  R: io::Read,
{
  let mut reader = ReaderBuilder::new().from_reader(input);
  normalize_headers(&mut reader)?;
  reader.deserialize().collect()
}

/// Read the file backing `T`'s source table under `layout`.
///
/// Does not check for the file first; callers run
/// [`SourceLayout::require`] over every table they need before reading any.
pub fn read_source<T: SourceRecord>(layout: &SourceLayout) -> Result<Vec<T>> {
  let path = layout.path(T::TABLE);
  let file = std::fs::File::open(&path).map_err(|source| Error::Io {
    path: path.clone(),
    source,
  })?;
  let records = parse_records(io::BufReader::new(file)).map_err(csv_error(&path))?;
  tracing::debug!(rows = records.len(), file = %path.display(), "loaded source table");
  Ok(records)
}

// ─── Untyped ─────────────────────────────────────────────────────────────────

/// Pick the narrowest kind that every non-empty value in the column fits.
fn infer_kind<'a>(values: impl Iterator<Item = &'a str> + Clone) -> ColumnKind {
  let mut present = values.filter(|v| !v.is_empty());
  if present.clone().next().is_none() {
    return ColumnKind::Text;
  }
  if present.clone().all(|v| v.parse::<i64>().is_ok()) {
    ColumnKind::Integer
  } else if present.all(|v| v.parse::<f64>().is_ok()) {
    ColumnKind::Real
  } else {
    ColumnKind::Text
  }
}

fn typed_value(raw: &str, kind: ColumnKind) -> Value {
  if raw.is_empty() {
    return Value::Null;
  }
  match kind {
    ColumnKind::Integer => raw.parse().map_or(Value::Null, Value::Integer),
    ColumnKind::Real => raw.parse().map_or(Value::Null, Value::Real),
    _ => Value::Text(raw.to_owned()),
  }
}

/// Read `input` into a relation named `name`, inferring column kinds.
pub fn parse_relation<R: io::Read>(input: R, name: &str) -> Result<Relation> {
  let mut reader = ReaderBuilder::new().from_reader(input);
  let parse = |e: csv::Error| Error::Csv {
    path:   name.into(),
    source: e,
  };
  normalize_headers(&mut reader).map_err(parse)?;
  let headers = reader.headers().map_err(parse)?.clone();
  let records: Vec<StringRecord> =
    reader.records().collect::<csv::Result<_>>().map_err(parse)?;

  let columns: Vec<Column> = headers
    .iter()
    .enumerate()
    .map(|(i, h)| {
      let kind = infer_kind(records.iter().map(move |r| r.get(i).unwrap_or("")));
      Column::new(h, kind)
    })
    .collect();

  let mut relation = Relation::new(name, columns.clone());
  for record in &records {
    let row = columns
      .iter()
      .enumerate()
      .map(|(i, c)| typed_value(record.get(i).unwrap_or(""), c.kind))
      .collect();
    relation.push(row)?;
  }
  Ok(relation)
}

/// Read the file at `path` into a relation named `name`.
pub fn read_relation(path: &Path, name: &str) -> Result<Relation> {
  let file = std::fs::File::open(path).map_err(|source| Error::Io {
    path: path.to_path_buf(),
    source,
  })?;
  parse_relation(io::BufReader::new(file), name).map_err(|e| match e {
    Error::Csv { source, .. } => csv_error(path)(source),
    other => other,
  })
}

#[cfg(test)]
mod tests {
  use mart_core::source::{CategoryTranslation, Order, OrderItem};

  use super::*;

  #[test]
  fn typed_rows_treat_empty_as_none() {
    let input = "order_id,customer_id,order_status,order_purchase_timestamp,\
                 order_delivered_customer_date,order_estimated_delivery_date\n\
                 o1,c1,delivered,2018-01-01 10:00:00,,2018-01-10 00:00:00\n";
    let orders: Vec<Order> = parse_records(input.as_bytes()).unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, "o1");
    assert_eq!(orders[0].order_delivered_customer_date, None);
    assert_eq!(orders[0].order_approved_at, None);
    assert!(orders[0].estimated_delivery_at().is_some());
  }

  #[test]
  fn extra_columns_are_ignored() {
    let input = "order_id,order_item_id,product_id,seller_id,\
                 shipping_limit_date,price,freight_value,note\n\
                 o1,1,p1,s1,2018-01-01 00:00:00,10.5,2.25,hello\n";
    let items: Vec<OrderItem> = parse_records(input.as_bytes()).unwrap();
    assert_eq!(items[0].order_item_id, 1);
    assert_eq!(items[0].price, Some(10.5));
    assert_eq!(items[0].freight_value, Some(2.25));
  }

  #[test]
  fn missing_required_column_is_an_error() {
    let input = "order_id,price\no1,1.0\n";
    let result: csv::Result<Vec<OrderItem>> = parse_records(input.as_bytes());
    assert!(result.is_err());
  }

  #[test]
  fn bom_is_stripped_from_first_header() {
    let input = "\u{feff}product_category_name,product_category_name_english\n\
                 beleza_saude,health_beauty\n";
    let rows: Vec<CategoryTranslation> = parse_records(input.as_bytes()).unwrap();
    assert_eq!(rows[0].product_category_name, "beleza_saude");
  }

  #[test]
  fn relation_infers_column_kinds() {
    let input = "id,amount,label,blank\n1,2.5,a,\n2,3,b,\n,4,,\n";
    let r = parse_relation(input.as_bytes(), "raw_t").unwrap();
    let kinds: Vec<ColumnKind> = r.columns().iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![
      ColumnKind::Integer,
      ColumnKind::Real,
      ColumnKind::Text,
      ColumnKind::Text,
    ]);
    assert_eq!(r.len(), 3);
    assert_eq!(r.rows()[1][1], Value::Real(3.0));
    assert_eq!(r.rows()[2][0], Value::Null);
    assert_eq!(r.rows()[0][2], Value::Text("a".into()));
  }
}
