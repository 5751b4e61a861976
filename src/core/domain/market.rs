//! Prediction-market catalog and hydration data model (C4).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row stored in the local market catalog (`core::index`). Deliberately
/// thin — only what `search`/staleness checks need, plus the few fields the
/// FTS table indexes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketMetadata {
    pub event_id: String,
    /// The addressable contract id used to hydrate this event against the
    /// live pricing API. `None` for a catalog row that has never resolved
    /// one (hydration is then skipped for that row — `spec.md` §4.4.3).
    pub market_id: Option<String>,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub slug: String,
    pub volume_usd: f64,
    pub end_date: Option<String>,
}

/// A single outcome of a multi-outcome market, paired from the catalog's
/// parallel `outcomes`/`outcomePrices` arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub label: String,
    pub probability: f64,
}

/// A hydrated prediction-market event: catalog metadata plus live pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroEvent {
    pub event_id: String,
    pub market_id: Option<String>,
    pub title: String,
    pub category: Option<String>,
    pub outcomes: Vec<Outcome>,
    /// Probability of the first outcome, or `0.5` when the underlying
    /// outcome/price arrays could not be parsed (see
    /// `core::discovery::catalog::hydrate`).
    pub probability_yes: f64,
    pub related_ticker: Option<String>,
    pub sector: Option<String>,
    pub volume_usd: f64,
    pub end_date: Option<String>,
    /// Upstream origin of this hydration, e.g. `"polymarket"` — carried
    /// through to the snapshot row so a multi-provider future can tell
    /// snapshots apart (`spec.md` §3/§6).
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

/// One point of a [`MacroEvent`]'s probability time series, persisted by
/// `core::discovery::snapshot::SnapshotStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroProbabilitySnapshot {
    pub event_id: String,
    pub event_title: String,
    pub category: Option<String>,
    pub sector: Option<String>,
    pub related_ticker: Option<String>,
    pub probability_yes: f64,
    pub volume_usd: f64,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

impl MacroEvent {
    /// The row this event contributes to the time-series store.
    pub fn to_snapshot(&self) -> MacroProbabilitySnapshot {
        MacroProbabilitySnapshot {
            event_id: self.event_id.clone(),
            event_title: self.title.clone(),
            category: self.category.clone(),
            sector: self.sector.clone(),
            related_ticker: self.related_ticker.clone(),
            probability_yes: self.probability_yes,
            volume_usd: self.volume_usd,
            source: self.source.clone(),
            timestamp: self.timestamp,
        }
    }
}
