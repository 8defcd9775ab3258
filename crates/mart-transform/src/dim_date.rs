//! `dim_date`: one calendar row per day spanned by the order purchases.

use chrono::{Datelike, NaiveDate, Weekday};
use mart_core::{
  Column,
  ColumnKind::{Date, Integer, Text},
  Error, Result, Tabular, Value,
  source::Order,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimDate {
  pub date_id:        NaiveDate,
  pub year:           i32,
  pub quarter:        u32,
  pub month_num:      u32,
  pub month_name:     String,
  /// `YYYY-MM`
  pub year_month:     String,
  /// ISO week number.
  pub week_of_year:   u32,
  /// ISO weekday, Monday = 1.
  pub day_of_week:    u32,
  pub day_name:       String,
  pub is_weekend:     bool,
  pub is_month_start: bool,
  pub is_month_end:   bool,
}

impl DimDate {
  pub fn for_day(day: NaiveDate) -> Self {
    let weekday = day.weekday();
    Self {
      date_id:        day,
      year:           day.year(),
      quarter:        (day.month() - 1) / 3 + 1,
      month_num:      day.month(),
      month_name:     day.format("%B").to_string(),
      year_month:     day.format("%Y-%m").to_string(),
      week_of_year:   day.iso_week().week(),
      day_of_week:    weekday.number_from_monday(),
      day_name:       day.format("%A").to_string(),
      is_weekend:     matches!(weekday, Weekday::Sat | Weekday::Sun),
      is_month_start: day.day() == 1,
      is_month_end:   day.succ_opt().is_none_or(|next| next.month() != day.month()),
    }
  }
}

impl Tabular for DimDate {
  const NAME: &'static str = "dim_date";

  fn columns() -> Vec<Column> {
    [
      ("date_id", Date),
      ("year", Integer),
      ("quarter", Integer),
      ("month_num", Integer),
      ("month_name", Text),
      ("year_month", Text),
      ("week_of_year", Integer),
      ("day_of_week", Integer),
      ("day_name", Text),
      ("is_weekend", Integer),
      ("is_month_start", Integer),
      ("is_month_end", Integer),
    ]
    .into_iter()
    .map(|(name, kind)| Column::new(name, kind))
    .collect()
  }

  fn row(&self) -> Vec<Value> {
    vec![
      self.date_id.into(),
      self.year.into(),
      self.quarter.into(),
      self.month_num.into(),
      self.month_name.as_str().into(),
      self.year_month.as_str().into(),
      self.week_of_year.into(),
      self.day_of_week.into(),
      self.day_name.as_str().into(),
      self.is_weekend.into(),
      self.is_month_start.into(),
      self.is_month_end.into(),
    ]
  }
}

/// Every day from `start` through `end` inclusive, ascending. Empty if
/// `start > end`.
pub fn calendar(start: NaiveDate, end: NaiveDate) -> Vec<DimDate> {
  start
    .iter_days()
    .take_while(|day| *day <= end)
    .map(DimDate::for_day)
    .collect()
}

/// Build the date dimension over `[min, max]` of the orders' purchase dates.
///
/// Unparseable timestamps are ignored; if none parse at all the range is
/// undefined and this fails with [`Error::EmptyDateRange`].
pub fn build_dim_date(orders: &[Order]) -> Result<Vec<DimDate>> {
  let mut days = orders
    .iter()
    .filter_map(Order::purchased_at)
    .map(|ts| ts.date());

  let first = days.next().ok_or(Error::EmptyDateRange)?;
  let (start, end) = days.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));

  let rows = calendar(start, end);
  tracing::info!(%start, %end, days = rows.len(), "built dim_date");
  Ok(rows)
}
