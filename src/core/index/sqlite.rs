//! Local full-text market catalog, mirroring `original_source`'s
//! `macro_core/persistence/index.py` line for line in behavior.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Integer, Text};

use super::model::{MarketMetadataRow, MatchedMetadataRow};
use super::schema::market_metadata;
use crate::core::domain::MarketMetadata;
use crate::core::store::DbPool;
use crate::error::Result;

pub struct MarketIndex {
    pool: DbPool,
    db_path: Option<PathBuf>,
}

impl MarketIndex {
    pub fn new(pool: DbPool, db_path: Option<impl AsRef<Path>>) -> Self {
        Self {
            pool,
            db_path: db_path.map(|p| p.as_ref().to_path_buf()),
        }
    }

    fn to_row(market: &MarketMetadata) -> MarketMetadataRow {
        MarketMetadataRow {
            event_id: market.event_id.clone(),
            market_id: market.market_id.clone(),
            title: market.title.clone(),
            description: market.description.clone(),
            tags: market.tags.join(","),
            slug: market.slug.clone(),
            volume_usd: market.volume_usd,
            end_date: market.end_date.clone(),
        }
    }

    fn from_row(row: MarketMetadataRow) -> MarketMetadata {
        MarketMetadata {
            event_id: row.event_id,
            market_id: row.market_id,
            title: row.title,
            description: row.description,
            tags: row.tags.split(',').filter(|t| !t.is_empty()).map(str::to_string).collect(),
            slug: row.slug,
            volume_usd: row.volume_usd,
            end_date: row.end_date,
        }
    }

    /// Upsert a batch of markets. Each row is inserted or updated
    /// (`volume_usd`/`title` refreshed on conflict), and the matching
    /// `market_fts` row is deleted and reinserted in the same
    /// transaction so catalog and index never diverge.
    pub fn upsert_markets(&self, markets: &[MarketMetadata]) -> Result<()> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, crate::error::Error, _>(|conn| {
            for market in markets {
                let row = Self::to_row(market);

                diesel::insert_into(market_metadata::table)
                    .values(&row)
                    .on_conflict(market_metadata::event_id)
                    .do_update()
                    .set((
                        market_metadata::volume_usd.eq(&row.volume_usd),
                        market_metadata::title.eq(&row.title),
                    ))
                    .execute(conn)?;

                sql_query("DELETE FROM market_fts WHERE event_id = ?")
                    .bind::<Text, _>(&market.event_id)
                    .execute(conn)?;

                sql_query(
                    "INSERT INTO market_fts (event_id, title, description, tags, slug) \
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind::<Text, _>(&market.event_id)
                .bind::<Text, _>(&market.title)
                .bind::<Text, _>(&market.description)
                .bind::<Text, _>(row.tags.clone())
                .bind::<Text, _>(&market.slug)
                .execute(conn)?;
            }
            Ok(())
        })?;

        Ok(())
    }

    /// Full-text search over `market_fts`, ordered by volume descending
    /// with an event-id tiebreak for deterministic ordering
    /// (`SPEC_FULL.md` §4.4 — beyond what the original guaranteed). Falls
    /// back to a `LIKE` substring scan on a `MATCH` syntax error, matching
    /// `_search_fallback`.
    pub fn search(&self, query: &str, limit: i64) -> Result<Vec<MarketMetadata>> {
        let mut conn = self.pool.get()?;

        let fts_query = format!("{}*", query.replace('"', ""));
        let matched: std::result::Result<Vec<MatchedMetadataRow>, diesel::result::Error> = sql_query(
            "SELECT m.event_id, m.market_id, m.title, m.description, m.tags, m.slug, \
                    m.volume_usd, m.end_date \
             FROM market_fts f JOIN market_metadata m ON m.event_id = f.event_id \
             WHERE market_fts MATCH ? \
             ORDER BY m.volume_usd DESC, m.event_id ASC LIMIT ?",
        )
        .bind::<Text, _>(fts_query)
        .bind::<Integer, _>(limit as i32)
        .load(&mut conn);

        let rows = match matched {
            Ok(rows) => rows,
            Err(_) => {
                let like = format!("%{query}%");
                sql_query(
                    "SELECT event_id, market_id, title, description, tags, slug, \
                            volume_usd, end_date \
                     FROM market_metadata WHERE title LIKE ? OR tags LIKE ? \
                     ORDER BY volume_usd DESC, event_id ASC LIMIT ?",
                )
                .bind::<Text, _>(like.clone())
                .bind::<Text, _>(like)
                .bind::<Integer, _>(limit as i32)
                .load(&mut conn)?
            }
        };

        Ok(rows
            .into_iter()
            .map(|r| MarketMetadata {
                event_id: r.event_id,
                market_id: r.market_id,
                title: r.title,
                description: r.description,
                tags: r.tags.split(',').filter(|t| !t.is_empty()).map(str::to_string).collect(),
                slug: r.slug,
                volume_usd: r.volume_usd,
                end_date: r.end_date,
            })
            .collect())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.get_count()? == 0)
    }

    /// Row count of the local catalog.
    pub fn get_count(&self) -> Result<i64> {
        let mut conn = self.pool.get()?;
        let count: i64 = market_metadata::table.count().get_result(&mut conn)?;
        Ok(count)
    }

    /// Catalog database file's modification time, matching the original's
    /// file-mtime approach — there is no in-database "last refreshed"
    /// column to diverge from. `None` for an in-memory database or one
    /// whose file cannot be stat'd.
    pub fn last_update_time(&self) -> Option<DateTime<Utc>> {
        let path = self.db_path.as_ref()?;
        let metadata = std::fs::metadata(path).ok()?;
        let modified = metadata.modified().ok()?;
        Some(DateTime::<Utc>::from(modified))
    }

    /// True if the catalog has never been updated, or was last updated
    /// more than `max_age_hours` ago.
    pub fn is_stale(&self, max_age_hours: i64) -> bool {
        match self.last_update_time() {
            Some(updated) => Utc::now() - updated > ChronoDuration::hours(max_age_hours),
            None => true,
        }
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

    fn sample(event_id: &str, title: &str, volume: f64) -> MarketMetadata {
        MarketMetadata {
            event_id: event_id.to_string(),
            market_id: Some(format!("{event_id}-market")),
            title: title.to_string(),
            description: "a market".to_string(),
            tags: vec!["macro".to_string()],
            slug: title.to_lowercase().replace(' ', "-"),
            volume_usd: volume,
            end_date: None,
        }
    }

    #[test]
    fn get_count_reflects_table_state() {
        let index = MarketIndex::new(setup_test_db(), None::<PathBuf>);
        assert_eq!(index.get_count().unwrap(), 0);
        index.upsert_markets(&[sample("evt-1", "Title", 1.0)]).unwrap();
        assert_eq!(index.get_count().unwrap(), 1);
    }

    #[test]
    fn missing_db_path_is_always_stale() {
        let index = MarketIndex::new(setup_test_db(), None::<PathBuf>);
        assert!(index.last_update_time().is_none());
        assert!(index.is_stale(9_999));
    }

    #[test]
    fn upsert_then_search_orders_by_volume_desc() {
        let index = MarketIndex::new(setup_test_db(), None::<PathBuf>);
        index
            .upsert_markets(&[
                sample("evt-1", "Will NVDA beat earnings", 1_000.0),
                sample("evt-2", "Will NVDA stock split", 5_000.0),
            ])
            .unwrap();

        let results = index.search("NVDA", 10).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].event_id, "evt-2");
    }

    #[test]
    fn upsert_is_idempotent_on_event_id() {
        let index = MarketIndex::new(setup_test_db(), None::<PathBuf>);
        index.upsert_markets(&[sample("evt-1", "Original title", 100.0)]).unwrap();
        index.upsert_markets(&[sample("evt-1", "Updated title", 200.0)]).unwrap();

        let results = index.search("title", 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Updated title");
        assert_eq!(results[0].volume_usd, 200.0);
    }

    #[test]
    fn is_empty_reflects_table_state() {
        let index = MarketIndex::new(setup_test_db(), None::<PathBuf>);
        assert!(index.is_empty().unwrap());
        index.upsert_markets(&[sample("evt-1", "Title", 1.0)]).unwrap();
        assert!(!index.is_empty().unwrap());
    }
}
