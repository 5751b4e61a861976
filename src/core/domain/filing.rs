//! Filing ingestion data model (C1/C2).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single filing as returned by a [`crate::core::adapter::MarketAdapter`],
/// before any text has been fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filing {
    /// Unique identifier for the filing within its market (SEC accession
    /// number, NSE announcement id, ...).
    pub accession_number: String,
    pub ticker: String,
    pub filing_date: String,
    pub form_type: String,
    pub title: String,
    /// Link to the primary document, if the adapter can resolve one ahead
    /// of `get_filing_text`.
    pub url: Option<String>,
}

/// Row recorded once a filing has been run through the pipeline, whether or
/// not extraction succeeded (see `spec.md` §9's "mark processed even on
/// failure" note, preserved as-specified — see `DESIGN.md`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedFiling {
    pub accession_number: String,
    pub ticker: String,
    pub filing_date: String,
    pub processed_at: DateTime<Utc>,
}

/// Audit-log row for a scheduler lifecycle event (misfire, execution error,
/// ...). Mirrors `original_source`'s `scheduler_events` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerEvent {
    pub event_type: SchedulerEventType,
    pub job_id: String,
    pub scheduled_run_time: Option<DateTime<Utc>>,
    pub exception: Option<String>,
    pub traceback: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerEventType {
    Error,
    Misfire,
}

impl SchedulerEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerEventType::Error => "error",
            SchedulerEventType::Misfire => "misfire",
        }
    }
}

/// Construction helper for a [`SchedulerEvent`] that does not yet have an
/// owning lifetime tied to the store — kept separate from the persisted
/// row shape used by `core::store`'s diesel model.
pub struct NewSchedulerEvent<'a> {
    pub event_type: SchedulerEventType,
    pub job_id: &'a str,
    pub scheduled_run_time: Option<DateTime<Utc>>,
    pub exception: Option<&'a str>,
    pub traceback: Option<&'a str>,
}
