//! `fact_order_items`: one row per order line item.
//!
//! Items drive a chain of left joins: order → customer → product → category
//! translation. No step may drop or multiply item rows.

use chrono::{NaiveDate, NaiveDateTime};
use mart_core::{
  Column,
  ColumnKind::{Date, Integer, Real, Text, Timestamp},
  Result, Tabular, Value,
  source::{CategoryTranslation, Customer, Order, OrderItem, Product},
  stats::{QUARTILES, Summary},
};

use crate::{checks, join::HashIndex};

// ─── Row type ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct FactOrderItem {
  pub order_id:              String,
  pub order_item_id:         i64,
  pub product_id:            Option<String>,
  pub seller_id:             Option<String>,
  pub customer_id:           Option<String>,
  pub customer_unique_id:    Option<String>,
  pub order_purchase_ts:     Option<NaiveDateTime>,
  pub order_date:            Option<NaiveDate>,
  pub order_status:          Option<String>,
  pub customer_city:         Option<String>,
  pub customer_state:        Option<String>,
  pub product_category_name: Option<String>,
  /// English category; `None` when the category has no translation.
  pub product_category_en:   Option<String>,
  pub product_weight_g:      Option<f64>,
  pub product_length_cm:     Option<f64>,
  pub product_height_cm:     Option<f64>,
  pub product_width_cm:      Option<f64>,
  pub item_price:            Option<f64>,
  pub freight_value:         Option<f64>,
  /// `item_price + freight_value`; `None` if either is missing.
  pub item_gmv:              Option<f64>,
}

impl Tabular for FactOrderItem {
  const NAME: &'static str = "fact_order_items";

  fn columns() -> Vec<Column> {
    [
      ("order_id", Text),
      ("order_item_id", Integer),
      ("product_id", Text),
      ("seller_id", Text),
      ("customer_id", Text),
      ("customer_unique_id", Text),
      ("order_purchase_ts", Timestamp),
      ("order_date", Date),
      ("order_status", Text),
      ("customer_city", Text),
      ("customer_state", Text),
      ("product_category_name", Text),
      ("product_category_en", Text),
      ("product_weight_g", Real),
      ("product_length_cm", Real),
      ("product_height_cm", Real),
      ("product_width_cm", Real),
      ("item_price", Real),
      ("freight_value", Real),
      ("item_gmv", Real),
      ("item_cnt", Integer),
    ]
    .into_iter()
    .map(|(name, kind)| Column::new(name, kind))
    .collect()
  }

  fn row(&self) -> Vec<Value> {
    vec![
      self.order_id.as_str().into(),
      self.order_item_id.into(),
      self.product_id.clone().into(),
      self.seller_id.clone().into(),
      self.customer_id.clone().into(),
      self.customer_unique_id.clone().into(),
      self.order_purchase_ts.into(),
      self.order_date.into(),
      self.order_status.clone().into(),
      self.customer_city.clone().into(),
      self.customer_state.clone().into(),
      self.product_category_name.clone().into(),
      self.product_category_en.clone().into(),
      self.product_weight_g.into(),
      self.product_length_cm.into(),
      self.product_height_cm.into(),
      self.product_width_cm.into(),
      self.item_price.into(),
      self.freight_value.into(),
      self.item_gmv.into(),
      1_i64.into(),
    ]
  }
}

// ─── Join ────────────────────────────────────────────────────────────────────

/// One item with whatever each left join found for it.
#[derive(Debug, Clone, Copy)]
pub struct JoinedItem<'a> {
  pub item:        &'a OrderItem,
  pub order:       Option<&'a Order>,
  pub customer:    Option<&'a Customer>,
  pub product:     Option<&'a Product>,
  pub translation: Option<&'a CategoryTranslation>,
}

impl JoinedItem<'_> {
  fn to_fact(self) -> FactOrderItem {
    let JoinedItem {
      item,
      order,
      customer,
      product,
      translation,
    } = self;
    let purchased = order.and_then(Order::purchased_at);

    FactOrderItem {
      order_id: item.order_id.clone(),
      order_item_id: item.order_item_id,
      product_id: item.product_id.clone(),
      seller_id: item.seller_id.clone(),
      customer_id: order.and_then(|o| o.customer_id.clone()),
      customer_unique_id: customer.and_then(|c| c.customer_unique_id.clone()),
      order_purchase_ts: purchased,
      order_date: purchased.map(|ts| ts.date()),
      order_status: order.and_then(|o| o.order_status.clone()),
      customer_city: customer.and_then(|c| c.customer_city.clone()),
      customer_state: customer.and_then(|c| c.customer_state.clone()),
      product_category_name: product.and_then(|p| p.product_category_name.clone()),
      product_category_en: translation
        .and_then(|t| t.product_category_name_english.clone()),
      product_weight_g: product.and_then(|p| p.product_weight_g),
      product_length_cm: product.and_then(|p| p.product_length_cm),
      product_height_cm: product.and_then(|p| p.product_height_cm),
      product_width_cm: product.and_then(|p| p.product_width_cm),
      item_price: item.price,
      freight_value: item.freight_value,
      item_gmv: item.price.zip(item.freight_value).map(|(p, f)| p + f),
    }
  }
}

/// Left-join every item through orders, customers, products and category
/// translations. Output order follows `items`.
pub fn join_item_grain<'a>(
  items: &'a [OrderItem],
  orders: &'a [Order],
  customers: &'a [Customer],
  products: &'a [Product],
  translations: &'a [CategoryTranslation],
) -> Vec<JoinedItem<'a>> {
  let orders = &HashIndex::build(orders, |o| Some(o.order_id.as_str()));
  let customers = &HashIndex::build(customers, |c| Some(c.customer_id.as_str()));
  let products = &HashIndex::build(products, |p| Some(p.product_id.as_str()));
  let translations = &HashIndex::build(translations, |t| {
    Some(t.product_category_name.as_str())
  });

  items
    .iter()
    .flat_map(move |item| {
      orders
        .left(Some(item.order_id.as_str()))
        .map(move |order| (item, order))
    })
    .flat_map(move |(item, order)| {
      customers
        .left(order.and_then(|o| o.customer_id.as_deref()))
        .map(move |customer| (item, order, customer))
    })
    .flat_map(move |(item, order, customer)| {
      products
        .left(item.product_id.as_deref())
        .map(move |product| (item, order, customer, product))
    })
    .flat_map(move |(item, order, customer, product)| {
      translations
        .left(product.and_then(|p| p.product_category_name.as_deref()))
        .map(move |translation| JoinedItem {
          item,
          order,
          customer,
          product,
          translation,
        })
    })
    .collect()
}

// ─── Diagnostics ─────────────────────────────────────────────────────────────

/// Join coverage over the item-grain output. Advisory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinCoverage {
  pub total_items:               usize,
  pub items_without_orders:      usize,
  pub items_without_products:    usize,
  /// Items whose product has no English category, either because the
  /// product is unknown, has no category, or the category is untranslated.
  pub items_without_translation: usize,
}

impl JoinCoverage {
  pub fn compute(joined: &[JoinedItem<'_>]) -> Self {
    let mut coverage = Self {
      total_items: joined.len(),
      ..Self::default()
    };
    for j in joined {
      coverage.items_without_orders += usize::from(j.order.is_none());
      coverage.items_without_products += usize::from(j.product.is_none());
      coverage.items_without_translation += usize::from(
        j.translation
          .and_then(|t| t.product_category_name_english.as_ref())
          .is_none(),
      );
    }
    coverage
  }
}

/// The checked item-grain fact table and its diagnostics.
#[derive(Debug, Clone)]
pub struct ItemFacts {
  pub rows:        Vec<FactOrderItem>,
  pub coverage:    JoinCoverage,
  pub gmv_summary: Summary,
}

/// Join, derive and check `fact_order_items`.
///
/// Fails if `(order_id, order_item_id)` repeats in the output (duplicate
/// source items, or a lookup table with a repeated key) or if any `item_gmv`
/// is negative.
pub fn build_item_facts(
  items: &[OrderItem],
  orders: &[Order],
  customers: &[Customer],
  products: &[Product],
  translations: &[CategoryTranslation],
) -> Result<ItemFacts> {
  let joined = join_item_grain(items, orders, customers, products, translations);
  let coverage = JoinCoverage::compute(&joined);
  let rows: Vec<FactOrderItem> = joined.into_iter().map(JoinedItem::to_fact).collect();

  checks::ensure_unique(
    FactOrderItem::NAME,
    "(order_id, order_item_id)",
    rows.iter().map(|r| (r.order_id.as_str(), r.order_item_id)),
  )?;
  checks::ensure_non_negative(
    FactOrderItem::NAME,
    "item_gmv",
    rows
      .iter()
      .map(|r| ((r.order_id.as_str(), r.order_item_id), r.item_gmv)),
  )?;

  let gmv_summary = Summary::describe(rows.iter().filter_map(|r| r.item_gmv), &QUARTILES);
  tracing::info!("item_gmv: {gmv_summary}");
  tracing::info!(
    items_without_orders = coverage.items_without_orders,
    items_without_products = coverage.items_without_products,
    items_without_translation = coverage.items_without_translation,
    total_items = coverage.total_items,
    "fact_order_items join coverage"
  );

  Ok(ItemFacts {
    rows,
    coverage,
    gmv_summary,
  })
}
