//! Permissive timestamp parsing and whole-day arithmetic.
//!
//! Source timestamps are naive local times (`2017-10-02 10:56:33`). A value
//! that does not parse becomes `None`; it never fails the row or the run.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};

/// Output format for timestamps in mart tables.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Output format for dates in mart tables.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const INPUT_FORMATS: &[&str] = &[
  "%Y-%m-%d %H:%M:%S",
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M",
];

/// Parse a single raw timestamp, returning `None` for blanks and garbage.
pub fn parse(raw: &str) -> Option<NaiveDateTime> {
  let s = raw.trim();
  if s.is_empty() {
    return None;
  }
  for format in INPUT_FORMATS {
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
      return Some(ts);
    }
  }
  // The offset is dropped without shifting, so the wall-clock reading lines
  // up with the naive values around it.
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.naive_local());
  }
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// [`parse`] over an optional raw column value.
pub fn parse_opt(raw: Option<&str>) -> Option<NaiveDateTime> {
  raw.and_then(parse)
}

/// Whole days from `earlier` to `later`, floored.
///
/// Twelve hours early is `-1`, twelve hours late is `0`.
pub fn whole_days(later: NaiveDateTime, earlier: NaiveDateTime) -> i64 {
  let delta = later - earlier;
  let days = delta.num_days();
  if delta < TimeDelta::days(days) { days - 1 } else { days }
}
