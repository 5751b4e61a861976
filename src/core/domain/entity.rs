//! Entity resolution and alternative-data signal cache data model (C5).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A resolvable company/ticker known to the signal cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub ticker: String,
    pub canonical_name: String,
    pub last_scraped_at: Option<DateTime<Utc>>,
}

/// `SignalPayload` variants, grounded in
/// `original_source/gravitic-nebula/core/scrapers/{hiring,shipping,digital,social}.py`.
/// `spec.md` names only the four provider categories; the fields here fill
/// in the detail the distillation dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum SignalPayload {
    Hiring {
        total_postings: u32,
        sample_titles: Vec<String>,
    },
    Shipping {
        mmsi: Option<String>,
        vessel_status: Option<String>,
        bol_count: u32,
    },
    Digital {
        app_id: String,
        /// (date, rank) pairs, most recent last.
        rank_history: Vec<(String, u32)>,
    },
    Social {
        sentiment_score: f64,
        sample_size: u32,
        provider_variant: SocialVariant,
    },
}

impl SignalPayload {
    /// The `provider` discriminator kept in lockstep with the payload's
    /// tag, per `SPEC_FULL.md` §3.
    pub fn provider(&self) -> &'static str {
        match self {
            SignalPayload::Hiring { .. } => "hiring",
            SignalPayload::Shipping { .. } => "shipping",
            SignalPayload::Digital { .. } => "digital",
            SignalPayload::Social { .. } => "social",
        }
    }

    /// The single derived scalar `spec.md` §3/§6 stores alongside the full
    /// `raw_payload` blob — each provider's natural headline number.
    pub fn signal_value(&self) -> f64 {
        match self {
            SignalPayload::Hiring { total_postings, .. } => *total_postings as f64,
            SignalPayload::Shipping { bol_count, .. } => *bol_count as f64,
            SignalPayload::Digital { rank_history, .. } => {
                rank_history.last().map(|(_, rank)| *rank as f64).unwrap_or(0.0)
            }
            SignalPayload::Social { sentiment_score, .. } => *sentiment_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialVariant {
    Modern,
    Legacy,
}

/// A single cached fetch of a [`SignalPayload`] for an [`Entity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub ticker: String,
    pub provider: String,
    pub signal_value: f64,
    pub payload: SignalPayload,
    pub timestamp: DateTime<Utc>,
}
