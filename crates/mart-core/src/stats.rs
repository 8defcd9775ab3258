//! Descriptive statistics over a numeric column.

use std::fmt;

use serde::Serialize;

/// Percentiles reported for fact-table diagnostics.
pub const QUARTILES: [f64; 3] = [0.25, 0.5, 0.75];

/// Percentiles reported by the audit for price and payment ranges.
pub const MEDIAN_AND_P99: [f64; 2] = [0.5, 0.99];

/// `n` as a percentage of `d`, or `0.0` when `d` is zero.
pub fn pct(n: usize, d: usize) -> f64 {
  if d == 0 {
    0.0
  } else {
    n as f64 / d as f64 * 100.0
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Percentile {
  /// Quantile in `[0, 1]`.
  pub quantile: f64,
  pub value:    f64,
}

/// Count, mean, sample standard deviation, min, percentiles and max of the
/// non-missing values. Every statistic except `count` is `None` when there
/// are no values; `std` is also `None` for a single value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
  pub count:       usize,
  pub mean:        Option<f64>,
  pub std:         Option<f64>,
  pub min:         Option<f64>,
  pub percentiles: Vec<Percentile>,
  pub max:         Option<f64>,
}

impl Summary {
  /// Summarise `values`, skipping non-finite entries. Percentiles use linear
  /// interpolation between closest ranks.
  pub fn describe<I>(values: I, quantiles: &[f64]) -> Self
  where
    I: IntoIterator<Item = f64>,
  {
    let mut sorted: Vec<f64> =
      values.into_iter().filter(|x| x.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    if count == 0 {
      return Self {
        count,
        mean: None,
        std: None,
        min: None,
        percentiles: Vec::new(),
        max: None,
      };
    }

    let n = count as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let std = (count > 1).then(|| {
      let ss: f64 = sorted.iter().map(|x| (x - mean).powi(2)).sum();
      (ss / (n - 1.0)).sqrt()
    });

    let percentiles = quantiles
      .iter()
      .map(|&q| Percentile {
        quantile: q,
        value:    interpolate(&sorted, q),
      })
      .collect();

    Self {
      count,
      mean: Some(mean),
      std,
      min: sorted.first().copied(),
      percentiles,
      max: sorted.last().copied(),
    }
  }
}

fn interpolate(sorted: &[f64], q: f64) -> f64 {
  let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
  let lo = pos.floor() as usize;
  let hi = pos.ceil() as usize;
  sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn fmt_stat(f: &mut fmt::Formatter<'_>, label: &str, v: Option<f64>) -> fmt::Result {
  match v {
    Some(v) => write!(f, " {label}={v:.2}"),
    None => write!(f, " {label}=-"),
  }
}

impl fmt::Display for Summary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "count={}", self.count)?;
    fmt_stat(f, "mean", self.mean)?;
    fmt_stat(f, "std", self.std)?;
    fmt_stat(f, "min", self.min)?;
    for p in &self.percentiles {
      fmt_stat(f, &format!("{}%", p.quantile * 100.0), Some(p.value))?;
    }
    fmt_stat(f, "max", self.max)
  }
}
