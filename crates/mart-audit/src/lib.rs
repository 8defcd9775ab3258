//! Data-quality audit of the raw Olist tables.
//!
//! The audit only observes: it never mutates its input and never fails on
//! bad data. Missing files are the caller's concern (see
//! [`mart_core::SourceLayout::require`]).
//!
//! # Quick start
//!
//! ```
//! use mart_audit::{AuditInput, AuditReport, ReportFormat};
//!
//! let report = AuditReport::compute(&AuditInput::default());
//! assert_eq!(report.counts.orders, 0);
//! let text = report.render(ReportFormat::Markdown).unwrap();
//! assert!(text.starts_with("# Data Quality Report"));
//! ```

mod audit;
mod report;

pub use audit::{
  AuditInput, AuditReport, JoinCoverage, KeyDuplicates, Measure,
  MissingTimestamps, Ranges, RowCounts, StatusCount, TimeLogic,
};
pub use report::ReportFormat;
