//! C1 — processed-filing dedup ledger and scheduler event audit log.

pub mod model;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::SqliteConnection;

use crate::core::domain::filing::NewSchedulerEvent;
use crate::error::Result;

pub use sqlite::{create_pool, SqliteStateStore};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Deduplication and audit ledger for the polling engine. Implementations
/// must make `mark_processed` idempotent — calling it twice with the same
/// accession number is a no-op, never an error.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn is_processed(&self, accession: &str) -> Result<bool>;

    async fn mark_processed(&self, accession: &str, ticker: &str, filing_date: &str) -> Result<()>;

    async fn record_scheduler_event(&self, event: NewSchedulerEvent<'_>) -> Result<()>;

    async fn processed_count(&self) -> Result<i64>;
}
