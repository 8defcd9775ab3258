//! Fact and dimension construction for the Olist mart.
//!
//! Pipeline per fact table:
//!   source rows
//!     └─ preagg: collapse payments / items to the order grain
//!          └─ join: left hash joins, never dropping a driving row
//!               └─ derive: timing, flags, revenue, GMV
//!                    └─ checks: grain uniqueness, non-negativity (fatal)
//!
//! Everything here is pure and synchronous: rows in, rows out. Loading and
//! writing live in `mart-csv` and `mart-store-sqlite`.

pub mod checks;
pub mod dim_date;
pub mod items;
pub mod join;
pub mod orders;
pub mod preagg;

pub use dim_date::{DimDate, build_dim_date};
pub use items::{FactOrderItem, ItemFacts, build_item_facts};
pub use orders::{FactOrder, OrderFacts, build_order_facts};
