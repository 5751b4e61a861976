//! SQLite-backed [`StateStore`] using Diesel + r2d2.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;

use super::model::{NewSchedulerEventRow, ProcessedFilingRow};
use super::schema::{processed_filings, scheduler_events};
use super::{DbPool, StateStore};
use crate::core::domain::filing::NewSchedulerEvent;
use crate::error::Result;

/// Build a connection pool for the processed-filing/scheduler-event
/// database, enabling WAL mode so concurrent worker reads never block the
/// writer (mirrors `original_source`'s `StateManager._init_db`).
pub fn create_pool(database_url: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder().max_size(5).build(manager)?;

    let mut conn = pool.get()?;
    sql_query("PRAGMA journal_mode=WAL").execute(&mut conn)?;

    Ok(pool)
}

/// SQLite-backed [`StateStore`]. Each call checks out its own pooled
/// connection and releases it on drop — the owned-per-task handle called
/// for in `SPEC_FULL.md` §4.3, replacing the original's thread-local one.
pub struct SqliteStateStore {
    pool: DbPool,
}

impl SqliteStateStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn is_processed(&self, accession: &str) -> Result<bool> {
        let mut conn = self.pool.get()?;
        let row: Option<ProcessedFilingRow> = processed_filings::table
            .find(accession)
            .first(&mut conn)
            .optional()?;
        Ok(row.is_some())
    }

    async fn mark_processed(&self, accession: &str, ticker: &str, filing_date: &str) -> Result<()> {
        let mut conn = self.pool.get()?;
        let row = ProcessedFilingRow {
            accession_number: accession.to_string(),
            ticker: ticker.to_string(),
            filing_date: filing_date.to_string(),
            processed_at: Utc::now().to_rfc3339(),
        };

        diesel::insert_into(processed_filings::table)
            .values(&row)
            .on_conflict(processed_filings::accession_number)
            .do_nothing()
            .execute(&mut conn)?;

        Ok(())
    }

    async fn record_scheduler_event(&self, event: NewSchedulerEvent<'_>) -> Result<()> {
        let mut conn = self.pool.get()?;
        let row = NewSchedulerEventRow {
            event_type: event.event_type.as_str(),
            job_id: event.job_id,
            scheduled_run_time: event.scheduled_run_time.map(|t| t.to_rfc3339()),
            exception: event.exception,
            traceback: event.traceback,
        };

        diesel::insert_into(scheduler_events::table)
            .values(&row)
            .execute(&mut conn)?;

        Ok(())
    }

    async fn processed_count(&self) -> Result<i64> {
        let mut conn = self.pool.get()?;
        let count: i64 = processed_filings::table.count().get_result(&mut conn)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::filing::SchedulerEventType;
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/state");

    fn setup_test_db() -> DbPool {
        let pool = create_pool(":memory:").expect("failed to create pool");
        let mut conn = pool.get().expect("failed to get connection");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("failed to run migrations");
        pool
    }

    #[tokio::test]
    async fn mark_processed_then_is_processed() {
        let store = SqliteStateStore::new(setup_test_db());
        assert!(!store.is_processed("0001-23-456789").await.unwrap());

        store
            .mark_processed("0001-23-456789", "AAPL", "2026-01-01")
            .await
            .unwrap();

        assert!(store.is_processed("0001-23-456789").await.unwrap());
        assert_eq!(store.processed_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn mark_processed_is_idempotent() {
        let store = SqliteStateStore::new(setup_test_db());
        store.mark_processed("acc-1", "AAPL", "2026-01-01").await.unwrap();
        store.mark_processed("acc-1", "AAPL", "2026-01-01").await.unwrap();
        assert_eq!(store.processed_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn record_scheduler_event_roundtrip() {
        let store = SqliteStateStore::new(setup_test_db());
        store
            .record_scheduler_event(NewSchedulerEvent {
                event_type: SchedulerEventType::Misfire,
                job_id: "poll-edgar",
                scheduled_run_time: Some(Utc::now()),
                exception: None,
                traceback: None,
            })
            .await
            .unwrap();
        // No direct read accessor is specified; absence of an error is the
        // assertion here — `is_processed`/`processed_count` remain unaffected.
        assert_eq!(store.processed_count().await.unwrap(), 0);
    }
}
