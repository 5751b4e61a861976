//! Pure fetcher for the prediction-market catalog API. Both
//! `DiscoveryEngine` (bulk ingest) and the hydration path depend on this
//! module; it depends on neither — the layering fix DESIGN NOTES §9 calls
//! for to break the ingest/discovery cycle.

use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use tracing::warn;

use crate::core::domain::{MacroEvent, MarketMetadata, Outcome};
use crate::core::index::MarketIndex;
use crate::error::Result;

const DEFAULT_BASE_URL: &str = "https://gamma-api.polymarket.com";
const SOURCE: &str = "polymarket";

#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub volume: Option<String>,
    pub outcomes: Option<String>,
    #[serde(rename = "outcomePrices")]
    pub outcome_prices: Option<String>,
    #[serde(default)]
    pub market_id: Option<String>,
    #[serde(default, rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl RawEvent {
    pub fn volume_usd(&self) -> f64 {
        self.volume.as_deref().and_then(|v| v.parse().ok()).unwrap_or(0.0)
    }

    pub fn to_metadata(&self) -> MarketMetadata {
        MarketMetadata {
            event_id: self.id.clone(),
            market_id: self.market_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            slug: self.slug.clone(),
            volume_usd: self.volume_usd(),
            end_date: self.end_date.clone(),
        }
    }
}

pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn fetch_page(&self, page: usize, limit_per_page: usize) -> Result<Vec<RawEvent>> {
        let offset = page * limit_per_page;
        let url = format!(
            "{}/events?limit={limit_per_page}&offset={offset}&order=volume&ascending=false",
            self.base_url
        );
        let events: Vec<RawEvent> = self.client.get(&url).send().await?.json().await?;
        Ok(events)
    }

    pub async fn get_event_by_id(&self, market_id: &str) -> Result<Option<RawEvent>> {
        if market_id.is_empty() {
            return Ok(None);
        }
        let url = format!("{}/events/{market_id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }

    /// Page through the catalog ordered by volume descending, upserting
    /// each page into `index`. Stops on the first page-fetch error but
    /// keeps whatever partial results were already ingested, matching
    /// `original_source`'s `_trigger_ingestion`/`ingest_all_markets`.
    pub async fn ingest_all_markets(
        &self,
        index: &MarketIndex,
        max_pages: usize,
        limit_per_page: usize,
    ) -> Result<usize> {
        let mut total = 0;

        for page in 0..max_pages {
            let events = match self.fetch_page(page, limit_per_page).await {
                Ok(events) => events,
                Err(e) => {
                    warn!(error = %e, page, "catalog page fetch failed, stopping ingest with partial results");
                    break;
                }
            };

            if events.is_empty() {
                break;
            }

            let metadata: Vec<MarketMetadata> = events.iter().map(RawEvent::to_metadata).collect();
            index.upsert_markets(&metadata)?;
            total += metadata.len();
        }

        Ok(total)
    }

    /// Parse `outcomes`/`outcomePrices` (each a JSON-encoded array of
    /// strings) into paired [`Outcome`]s and build a [`MacroEvent`].
    /// `probability_yes` defaults to `0.5` on any parse failure — a bad
    /// event never fails the whole batch, matching the original's
    /// `_parse_single_market`.
    pub fn hydrate(raw: &RawEvent) -> MacroEvent {
        let outcomes = Self::parse_pairs(raw);
        let probability_yes = outcomes.first().map(|o| o.probability).unwrap_or(0.5);

        MacroEvent {
            event_id: raw.id.clone(),
            market_id: raw.market_id.clone(),
            title: raw.title.clone(),
            category: raw.category.clone(),
            outcomes,
            probability_yes,
            related_ticker: None,
            sector: None,
            volume_usd: raw.volume_usd(),
            end_date: raw.end_date.clone(),
            source: SOURCE.to_string(),
            timestamp: Utc::now(),
        }
    }

    fn parse_pairs(raw: &RawEvent) -> Vec<Outcome> {
        let labels: Vec<String> = raw
            .outcomes
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default();
        let prices: Vec<String> = raw
            .outcome_prices
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default();

        labels
            .into_iter()
            .zip(prices)
            .map(|(label, price)| Outcome {
                label,
                probability: price.parse().unwrap_or(0.5),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_event(outcomes: &str, prices: &str) -> RawEvent {
        RawEvent {
            id: "evt-1".to_string(),
            title: "Will X happen".to_string(),
            description: String::new(),
            slug: "will-x-happen".to_string(),
            tags: vec![],
            volume: Some("1000.5".to_string()),
            outcomes: Some(outcomes.to_string()),
            outcome_prices: Some(prices.to_string()),
            market_id: Some("market-1".to_string()),
            end_date: Some("2026-12-31".to_string()),
            category: Some("Macro".to_string()),
        }
    }

    #[test]
    fn hydrates_multi_outcome_event() {
        let raw = raw_event(r#"["Yes", "No"]"#, r#"["0.62", "0.38"]"#);
        let event = CatalogClient::hydrate(&raw);

        assert_eq!(event.outcomes.len(), 2);
        assert_eq!(event.outcomes[0].label, "Yes");
        assert!((event.probability_yes - 0.62).abs() < 1e-9);
        assert!((event.volume_usd - 1000.5).abs() < 1e-9);
    }

    #[test]
    fn defaults_to_half_on_unparseable_outcomes() {
        let raw = raw_event("not json", "also not json");
        let event = CatalogClient::hydrate(&raw);

        assert!(event.outcomes.is_empty());
        assert_eq!(event.probability_yes, 0.5);
    }

    #[test]
    fn carries_market_id_category_and_end_date_through_to_the_hydrated_event() {
        let raw = raw_event(r#"["Yes", "No"]"#, r#"["0.62", "0.38"]"#);
        let event = CatalogClient::hydrate(&raw);

        assert_eq!(event.market_id.as_deref(), Some("market-1"));
        assert_eq!(event.category.as_deref(), Some("Macro"));
        assert_eq!(event.end_date.as_deref(), Some("2026-12-31"));
        assert_eq!(event.source, "polymarket");
    }
}
