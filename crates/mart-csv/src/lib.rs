//! CSV codec for the mart pipeline.
//!
//! Reads raw Olist files into typed rows or untyped relations, and writes
//! mart relations back out as CSV. Synchronous; no database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use mart_core::{SourceLayout, SourceTable, source::Order};
//!
//! let layout = SourceLayout::new("data/raw");
//! layout.require(&[SourceTable::Orders]).unwrap();
//! let orders: Vec<Order> = mart_csv::read_source(&layout).unwrap();
//! println!("{} orders", orders.len());
//! ```

pub mod error;
mod read;
mod write;

pub use error::{Error, Result};
pub use read::{parse_records, parse_relation, read_relation, read_source};
pub use write::{CsvSink, write_relation};
