//! Scripted [`MarketAdapter`] for scheduler/worker tests, grounded on the
//! teacher's `testkit::stream::ScriptedStream`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::adapter::MarketAdapter;
use crate::core::domain::Filing;
use crate::error::Result;

/// Returns the same fixed batch of filings on every call, and fixed text
/// for every `get_filing_text` call — good enough for dedup/worker tests
/// that don't need per-ticker routing.
pub struct FakeAdapter {
    filings: Mutex<Vec<Filing>>,
    text: String,
    calls: AtomicUsize,
}

impl FakeAdapter {
    pub fn new(filings: Vec<Filing>) -> Self {
        Self {
            filings: Mutex::new(filings),
            text: "placeholder filing text".to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Number of times `get_latest_filings` has been called so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketAdapter for FakeAdapter {
    async fn get_latest_filings(&self, _tickers: &[String], limit: usize) -> Result<Vec<Filing>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let filings = self.filings.lock().expect("fake adapter lock poisoned");
        Ok(filings.iter().take(limit).cloned().collect())
    }

    async fn get_filing_text(&self, _filing: &Filing) -> Result<String> {
        Ok(self.text.clone())
    }
}

pub fn sample_filing(accession: &str, ticker: &str) -> Filing {
    Filing {
        accession_number: accession.to_string(),
        ticker: ticker.to_string(),
        filing_date: "2026-01-01".to_string(),
        form_type: "10-Q".to_string(),
        title: format!("{ticker} quarterly filing"),
        url: None,
    }
}
