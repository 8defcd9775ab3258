//! Core types for the Olist mart pipeline.
//!
//! Holds the typed source entities, the output [`Relation`] representation,
//! and the [`TableSink`] trait that output backends implement. This crate
//! does no CSV or database I/O; `mart-csv` and `mart-store-sqlite` do.

pub mod error;
pub mod relation;
pub mod sink;
pub mod source;
pub mod stats;
pub mod timestamp;

pub use error::{Error, Result};
pub use relation::{Column, ColumnKind, Relation, Tabular, Value};
pub use sink::{IfExists, TableSink};
pub use source::{SourceLayout, SourceRecord, SourceTable};
