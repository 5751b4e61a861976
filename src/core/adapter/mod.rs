//! C2 — per-market filing adapters and the registry that routes tickers to
//! them.

pub mod edgar;
pub mod nse;
pub mod pdf;
pub mod registry;

use async_trait::async_trait;

use crate::core::domain::Filing;
use crate::error::Result;

pub use edgar::EdgarAdapter;
pub use nse::NseAdapter;
pub use registry::{AdapterRegistry, MarketKey};

/// A source of filings for one market. Deliberately narrow — two
/// operations, matching `spec.md` §4.2 exactly.
#[async_trait]
pub trait MarketAdapter: Send + Sync {
    /// Most recent filings for the given tickers, newest first, capped at
    /// `limit` per ticker.
    async fn get_latest_filings(&self, tickers: &[String], limit: usize) -> Result<Vec<Filing>>;

    /// Full text of a filing's primary document, with any exhibit content
    /// this adapter chooses to inline appended.
    async fn get_filing_text(&self, filing: &Filing) -> Result<String>;
}
