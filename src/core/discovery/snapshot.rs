//! Time-series persistence for macro-event probabilities, grounded on
//! `original_source`'s `macro_core/persistence/timeseries.py`. Colocated
//! with the market index database — see `SPEC_FULL.md` §6.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text};

use crate::core::domain::MacroProbabilitySnapshot;
use crate::core::index::model::{LatestSnapshotRow, NewSnapshotRow};
use crate::core::index::schema::macro_probabilities;
use crate::core::store::DbPool;
use crate::error::Result;

pub struct SnapshotStore {
    pool: DbPool,
}

impl SnapshotStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert one snapshot. Returns `false` instead of erroring when the
    /// `(event_id, timestamp)` pair already exists, matching the
    /// original's `try/except IntegrityError` returning `False`.
    pub fn save_snapshot(&self, snapshot: &MacroProbabilitySnapshot) -> Result<bool> {
        let mut conn = self.pool.get()?;
        let row = NewSnapshotRow {
            event_id: snapshot.event_id.clone(),
            event_title: snapshot.event_title.clone(),
            category: snapshot.category.clone(),
            sector: snapshot.sector.clone(),
            related_ticker: snapshot.related_ticker.clone(),
            probability_yes: snapshot.probability_yes,
            volume_usd: snapshot.volume_usd,
            source: snapshot.source.clone(),
            timestamp: snapshot.timestamp.to_rfc3339(),
        };

        match diesel::insert_into(macro_probabilities::table)
            .values(&row)
            .execute(&mut conn)
        {
            Ok(_) => Ok(true),
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            )) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Save a batch, counting how many were actually inserted (duplicates
    /// are skipped, not errors).
    pub fn save_batch(&self, snapshots: &[MacroProbabilitySnapshot]) -> Result<usize> {
        let mut saved = 0;
        for snapshot in snapshots {
            if self.save_snapshot(snapshot)? {
                saved += 1;
            }
        }
        Ok(saved)
    }

    /// History for one event over the last `days` days, newest first.
    pub fn event_history(&self, event_id: &str, days: i64) -> Result<Vec<MacroProbabilitySnapshot>> {
        let mut conn = self.pool.get()?;
        let cutoff = (Utc::now() - chrono::Duration::days(days)).to_rfc3339();

        let rows: Vec<LatestSnapshotRow> = sql_query(
            "SELECT event_id, event_title, category, sector, related_ticker, \
                    probability_yes, volume_usd, source, timestamp \
             FROM macro_probabilities \
             WHERE event_id = ? AND timestamp >= ? ORDER BY timestamp DESC",
        )
        .bind::<Text, _>(event_id)
        .bind::<Text, _>(cutoff)
        .load(&mut conn)?;

        rows.into_iter().map(Self::from_row).collect()
    }

    /// Most recent snapshot per event, across up to `limit` events,
    /// matching the original's `GROUP BY event_id ORDER BY timestamp DESC`
    /// shape.
    pub fn latest_probabilities(&self, limit: i64) -> Result<Vec<MacroProbabilitySnapshot>> {
        let mut conn = self.pool.get()?;

        let rows: Vec<LatestSnapshotRow> = sql_query(
            "SELECT event_id, event_title, category, sector, related_ticker, \
                    probability_yes, volume_usd, source, MAX(timestamp) as timestamp \
             FROM macro_probabilities GROUP BY event_id ORDER BY timestamp DESC LIMIT ?",
        )
        .bind::<BigInt, _>(limit)
        .load(&mut conn)?;

        rows.into_iter().map(Self::from_row).collect()
    }

    fn from_row(row: LatestSnapshotRow) -> Result<MacroProbabilitySnapshot> {
        let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&row.timestamp)
            .map_err(|e| crate::error::Error::Parse(e.to_string()))?
            .with_timezone(&Utc);

        Ok(MacroProbabilitySnapshot {
            event_id: row.event_id,
            event_title: row.event_title,
            category: row.category,
            sector: row.sector,
            related_ticker: row.related_ticker,
            probability_yes: row.probability_yes,
            volume_usd: row.volume_usd,
            source: row.source,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::create_pool;
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/market_index");

    fn setup_test_db() -> DbPool {
        let pool = create_pool(":memory:").expect("failed to create pool");
        let mut conn = pool.get().expect("failed to get connection");
        conn.run_pending_migrations(MIGRATIONS).expect("failed to run migrations");
        pool
    }

    fn snapshot(event_id: &str, prob: f64, ts: DateTime<Utc>) -> MacroProbabilitySnapshot {
        MacroProbabilitySnapshot {
            event_id: event_id.to_string(),
            event_title: "Will X happen".to_string(),
            category: Some("Macro".to_string()),
            sector: Some("Semiconductors".to_string()),
            related_ticker: Some("NVDA".to_string()),
            probability_yes: prob,
            volume_usd: 100.0,
            source: "polymarket".to_string(),
            timestamp: ts,
        }
    }

    #[test]
    fn save_snapshot_rejects_duplicate_timestamp() {
        let store = SnapshotStore::new(setup_test_db());
        let ts = Utc::now();

        assert!(store.save_snapshot(&snapshot("evt-1", 0.5, ts)).unwrap());
        assert!(!store.save_snapshot(&snapshot("evt-1", 0.6, ts)).unwrap());
    }

    #[test]
    fn event_history_orders_newest_first() {
        let store = SnapshotStore::new(setup_test_db());
        let t1 = Utc::now() - chrono::Duration::hours(2);
        let t2 = Utc::now() - chrono::Duration::hours(1);

        store.save_snapshot(&snapshot("evt-1", 0.4, t1)).unwrap();
        store.save_snapshot(&snapshot("evt-1", 0.5, t2)).unwrap();

        let history = store.event_history("evt-1", 7).unwrap();
        assert_eq!(history.len(), 2);
        assert!((history[0].probability_yes - 0.5).abs() < 1e-9);
        assert_eq!(history[0].related_ticker.as_deref(), Some("NVDA"));
    }

    #[test]
    fn save_batch_counts_only_newly_inserted_rows() {
        let store = SnapshotStore::new(setup_test_db());
        let ts = Utc::now();

        let saved = store
            .save_batch(&[snapshot("evt-1", 0.3, ts), snapshot("evt-1", 0.4, ts)])
            .unwrap();
        assert_eq!(saved, 1);
    }
}
