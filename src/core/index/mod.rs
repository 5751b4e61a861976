//! C4.1 — local full-text prediction-market catalog.

pub mod model;
pub mod schema;
pub mod sqlite;

pub use sqlite::MarketIndex;
