//! Stages and configuration behind the `mart` binary.
//!
//! Each stage is independent; there is no orchestrating command. Run
//! `mart audit`, `mart fact-orders`, `mart fact-items`, `mart dim-date` and
//! `mart load-raw` in whatever order the job scheduler prefers.

pub mod config;
pub mod error;
pub mod stages;

pub use config::MartConfig;
pub use error::{Error, Result};
pub use stages::{
  Destination, Output, SinkKind, run_audit, run_dim_date, run_fact_items,
  run_fact_orders, run_load_raw,
};

#[cfg(test)]
mod tests;
