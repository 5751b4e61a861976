//! TTL-gated signal cache, grounded on `original_source`'s
//! `gravitic-nebula/core/persistence/engine.py` (`SignalStore`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;

use super::model::{EntityRow, NewEntityRow, NewSignalRow, SignalRow};
use super::schema::{entities, scraped_signals};
use crate::core::domain::entity::{SignalPayload, SignalRecord};
use crate::core::store::DbPool;
use crate::error::{Error, Result};

pub struct SignalStore {
    pool: DbPool,
    ttl_hours: i64,
}

impl SignalStore {
    pub fn new(pool: DbPool) -> Self {
        Self::with_ttl(pool, 24)
    }

    pub fn with_ttl(pool: DbPool, ttl_hours: i64) -> Self {
        Self { pool, ttl_hours }
    }

    fn find_entity(conn: &mut SqliteConnection, ticker: &str) -> Result<Option<EntityRow>> {
        Ok(entities::table
            .filter(entities::ticker.eq(ticker))
            .first(conn)
            .optional()?)
    }

    /// Latest cached signal for `ticker`/`provider`, or `None` on a cache
    /// miss — either no entity/signal exists yet, or the latest one has
    /// aged past the TTL (treated identically to "no signal" by callers).
    pub fn get_latest(&self, ticker: &str, provider: &str) -> Result<Option<SignalRecord>> {
        let mut conn = self.pool.get()?;

        let Some(entity) = Self::find_entity(&mut conn, ticker)? else {
            return Ok(None);
        };

        let row: Option<SignalRow> = scraped_signals::table
            .filter(scraped_signals::entity_id.eq(entity.id))
            .filter(scraped_signals::provider.eq(provider))
            .order(scraped_signals::timestamp.desc())
            .first(&mut conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&row.timestamp)
            .map_err(|e| Error::Parse(e.to_string()))?
            .with_timezone(&Utc);

        if Utc::now() - timestamp >= chrono::Duration::hours(self.ttl_hours) {
            return Ok(None);
        }

        let payload: SignalPayload = serde_json::from_str(&row.raw_payload)?;

        Ok(Some(SignalRecord {
            ticker: ticker.to_string(),
            provider: provider.to_string(),
            signal_value: row.signal_value,
            payload,
            timestamp,
        }))
    }

    /// Persist a freshly-fetched signal, creating the entity on first
    /// sight and refreshing `last_scraped_at`/`canonical_name`.
    pub fn save(&self, ticker: &str, canonical_name: Option<&str>, payload: &SignalPayload) -> Result<()> {
        let mut conn = self.pool.get()?;
        let now = Utc::now().to_rfc3339();

        let entity_id = match Self::find_entity(&mut conn, ticker)? {
            Some(entity) => {
                diesel::update(entities::table.find(entity.id))
                    .set((
                        entities::last_scraped_at.eq(&now),
                        entities::canonical_name.eq(canonical_name.unwrap_or(&entity.canonical_name)),
                    ))
                    .execute(&mut conn)?;
                entity.id
            }
            None => {
                let new_entity = NewEntityRow {
                    ticker,
                    canonical_name: canonical_name.unwrap_or(ticker),
                    last_scraped_at: Some(now.clone()),
                };
                diesel::insert_into(entities::table)
                    .values(&new_entity)
                    .execute(&mut conn)?;
                entities::table
                    .filter(entities::ticker.eq(ticker))
                    .select(entities::id)
                    .first(&mut conn)?
            }
        };

        let new_signal = NewSignalRow {
            entity_id,
            provider: payload.provider().to_string(),
            signal_value: payload.signal_value(),
            raw_payload: serde_json::to_string(payload)?,
            timestamp: now,
        };
        diesel::insert_into(scraped_signals::table)
            .values(&new_signal)
            .execute(&mut conn)?;

        Ok(())
    }
}

/// A provider of one signal category ("hiring", "shipping", "digital",
/// "social"). [`SignalStore::get_or_fetch`] is the only caller of
/// `SignalProvider::fetch` — a provider cannot bypass the
/// read-through-then-write-back discipline, an improvement the type
/// system enforces where the original could only document the convention.
#[async_trait]
pub trait SignalProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;
    async fn fetch(&self, ticker: &str) -> Result<SignalPayload>;
}

impl SignalStore {
    pub async fn get_or_fetch(&self, ticker: &str, provider: &dyn SignalProvider) -> Result<SignalPayload> {
        if let Some(record) = self.get_latest(ticker, provider.provider_name())? {
            return Ok(record.payload);
        }

        let payload = provider.fetch(ticker).await?;
        self.save(ticker, None, &payload)?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::create_pool;
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/signals");

    fn setup_test_db() -> DbPool {
        let pool = create_pool(":memory:").expect("failed to create pool");
        let mut conn = pool.get().expect("failed to get connection");
        conn.run_pending_migrations(MIGRATIONS).expect("failed to run migrations");
        pool
    }

    fn hiring_payload() -> SignalPayload {
        SignalPayload::Hiring {
            total_postings: 42,
            sample_titles: vec!["Senior Engineer".to_string()],
        }
    }

    #[test]
    fn cache_miss_before_any_save() {
        let store = SignalStore::new(setup_test_db());
        assert!(store.get_latest("AAPL", "hiring").unwrap().is_none());
    }

    #[test]
    fn save_then_get_latest_within_ttl() {
        let store = SignalStore::new(setup_test_db());
        store.save("AAPL", Some("Apple Inc."), &hiring_payload()).unwrap();

        let record = store.get_latest("AAPL", "hiring").unwrap().unwrap();
        assert_eq!(record.provider, "hiring");
        match record.payload {
            SignalPayload::Hiring { total_postings, .. } => assert_eq!(total_postings, 42),
            _ => panic!("wrong payload variant"),
        }
    }

    #[test]
    fn expired_signal_is_treated_as_cache_miss() {
        let store = SignalStore::with_ttl(setup_test_db(), 0);
        store.save("AAPL", None, &hiring_payload()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(store.get_latest("AAPL", "hiring").unwrap().is_none());
    }
}
