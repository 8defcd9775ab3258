//! SQLite backend for mart and raw tables.
//!
//! Implements [`mart_core::TableSink`] over a synchronous [`rusqlite`]
//! connection. Each table is written inside its own transaction, so a failed
//! write never leaves a half-loaded table behind.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
