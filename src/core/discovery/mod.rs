//! C4.2/4.3 — ticker-driven discovery of prediction-market events, built
//! on top of `core::index` and this module's own `catalog` submodule.
//! Deliberately never depends on `core::adapter` or `core::scheduler` —
//! preserving the loose coupling DESIGN NOTES §9 calls for without a
//! Cargo workspace split (see `DESIGN.md`).

pub mod catalog;
pub mod keywords;
pub mod snapshot;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::core::domain::{MacroEvent, MarketMetadata};
use crate::core::index::MarketIndex;
use crate::error::Result;
use catalog::CatalogClient;

pub use snapshot::SnapshotStore;

/// External collaborator that drops non-investment-grade event titles.
/// LLM prompting is out of scope (`spec.md` §1); this trait is the seam a
/// caller plugs one into, grounded on `original_source`'s
/// `macro_core/scrapers/filter.py` (`LLMFilter`).
#[async_trait]
pub trait TitleFilter: Send + Sync {
    async fn filter(&self, titles: &[String]) -> Result<Vec<String>>;
}

/// What `fetch_macro_events` searches the local index for, per `spec.md`
/// §4.4.3's `fetch_macro_events(keywords?|ticker?, limit)`.
pub enum DiscoveryQuery<'a> {
    Ticker(&'a str),
    Keywords(&'a [String]),
}

pub struct DiscoveryEngine {
    index: Arc<MarketIndex>,
    catalog: Arc<CatalogClient>,
}

impl DiscoveryEngine {
    /// Construct the engine, optionally triggering a bulk catalog ingest
    /// when the local index is empty or stale, matching
    /// `original_source`'s `DiscoveryEngine.__init__`.
    pub async fn new(
        index: Arc<MarketIndex>,
        catalog: Arc<CatalogClient>,
        auto_ingest: bool,
        max_stale_hours: i64,
    ) -> Result<Self> {
        let engine = Self { index, catalog };

        if auto_ingest && (engine.index.is_empty()? || engine.index.is_stale(max_stale_hours)) {
            engine.catalog.ingest_all_markets(&engine.index, 20, 100).await?;
        }

        Ok(engine)
    }

    /// Expand `ticker` into its theme keywords, search the local index per
    /// keyword, dedup by `event_id` preserving first-seen order, then sort
    /// the combined result by volume descending and cap at `limit` —
    /// matching `original_source`'s `search_ticker` exactly. Falls back to
    /// searching the ticker symbol itself when no keywords are mapped.
    pub fn search_ticker(&self, ticker: &str, limit: usize) -> Result<Vec<MarketMetadata>> {
        let keywords = keywords::get_keywords_for_ticker(ticker);
        let mut results = self.search_keywords(keywords, limit)?;

        if results.is_empty() {
            results = self.search_keywords(&[ticker], limit)?;
        }

        Ok(results)
    }

    /// Union of `index.search` over each keyword, deduped by `event_id`
    /// (first-seen order), then sorted by volume descending and capped.
    fn search_keywords(&self, keywords: &[impl AsRef<str>], limit: usize) -> Result<Vec<MarketMetadata>> {
        let mut seen = HashSet::new();
        let mut results = Vec::new();

        for keyword in keywords {
            for market in self.index.search(keyword.as_ref(), limit as i64)? {
                if seen.insert(market.event_id.clone()) {
                    results.push(market);
                }
            }
        }

        results.sort_by(|a, b| {
            b.volume_usd
                .partial_cmp(&a.volume_usd)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        Ok(results)
    }

    pub fn sector_for_ticker(&self, ticker: &str) -> &'static str {
        keywords::get_sector_for_ticker(ticker)
    }

    /// Hydrate each metadata row that carries a `market_id` against the
    /// live pricing API, skipping rows with none and rows whose hydration
    /// call fails — a bad event never fails the whole batch
    /// (`spec.md` §4.4.3).
    pub async fn hydrate(&self, metadata: &[MarketMetadata]) -> Result<Vec<MacroEvent>> {
        let mut events = Vec::with_capacity(metadata.len());

        for market in metadata {
            let Some(market_id) = market.market_id.as_deref().filter(|id| !id.is_empty()) else {
                continue;
            };

            match self.catalog.get_event_by_id(market_id).await {
                Ok(Some(raw)) => events.push(CatalogClient::hydrate(&raw)),
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, market_id, "hydration call failed, skipping event");
                }
            }
        }

        Ok(events)
    }

    /// Local search + hydration: resolve `query` against the index,
    /// hydrate the matches, attach `sector`/`related_ticker` context
    /// uniformly, optionally drop events an external [`TitleFilter`]
    /// rejects, and cap at `limit` — `spec.md` §4.4.3.
    pub async fn fetch_macro_events(
        &self,
        query: DiscoveryQuery<'_>,
        limit: usize,
        title_filter: Option<&dyn TitleFilter>,
    ) -> Result<Vec<MacroEvent>> {
        let metadata = match query {
            DiscoveryQuery::Ticker(ticker) => self.search_ticker(ticker, limit)?,
            DiscoveryQuery::Keywords(keywords) => self.search_keywords(keywords, limit)?,
        };

        let mut events = self.hydrate(&metadata).await?;

        let (sector, related_ticker) = match query {
            DiscoveryQuery::Ticker(ticker) => {
                (Some(self.sector_for_ticker(ticker).to_string()), Some(ticker.to_string()))
            }
            DiscoveryQuery::Keywords(_) => (None, None),
        };
        for event in events.iter_mut() {
            event.sector = sector.clone();
            event.related_ticker = related_ticker.clone();
        }

        if let Some(filter) = title_filter {
            let titles: Vec<String> = events.iter().map(|e| e.title.clone()).collect();
            let kept: HashSet<String> = filter.filter(&titles).await?.into_iter().collect();
            events.retain(|e| kept.contains(&e.title));
        }

        events.truncate(limit);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::create_pool;
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/market_index");

    struct RejectAllFilter;

    #[async_trait]
    impl TitleFilter for RejectAllFilter {
        async fn filter(&self, _titles: &[String]) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn setup_engine() -> DiscoveryEngine {
        let pool = create_pool(":memory:").expect("failed to create pool");
        {
            let mut conn = pool.get().expect("failed to get connection");
            conn.run_pending_migrations(MIGRATIONS).expect("failed to run migrations");
        }
        let index = Arc::new(MarketIndex::new(pool, None::<std::path::PathBuf>));
        index
            .upsert_markets(&[MarketMetadata {
                event_id: "evt-1".to_string(),
                market_id: None,
                title: "Will NVDA beat earnings".to_string(),
                description: String::new(),
                tags: vec!["GPU".to_string()],
                slug: "will-nvda-beat-earnings".to_string(),
                volume_usd: 500.0,
                end_date: None,
            }])
            .unwrap();

        DiscoveryEngine {
            index,
            catalog: Arc::new(CatalogClient::new().unwrap()),
        }
    }

    #[test]
    fn search_ticker_falls_back_to_symbol_for_unmapped_ticker() {
        let engine = setup_engine();
        let results = engine.search_ticker("ZZZZ", 10).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn search_ticker_matches_mapped_keywords() {
        let engine = setup_engine();
        let results = engine.search_ticker("NVDA", 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].event_id, "evt-1");
    }

    #[tokio::test]
    async fn hydrate_skips_rows_without_a_market_id() {
        let engine = setup_engine();
        let metadata = engine.search_ticker("NVDA", 10).unwrap();
        let events = engine.hydrate(&metadata).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn fetch_macro_events_attaches_sector_and_ticker_context() {
        let engine = setup_engine();
        let events = engine.fetch_macro_events(DiscoveryQuery::Ticker("NVDA"), 10, None).await.unwrap();
        assert!(events.is_empty(), "no market_id on the fixture row, nothing to hydrate");
    }

    #[tokio::test]
    async fn fetch_macro_events_applies_title_filter() {
        let engine = setup_engine();
        let filter = RejectAllFilter;
        let events = engine
            .fetch_macro_events(DiscoveryQuery::Ticker("NVDA"), 10, Some(&filter))
            .await
            .unwrap();
        assert!(events.is_empty());
    }
}
