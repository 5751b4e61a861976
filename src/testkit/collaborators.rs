//! Fake [`Extractor`]/[`Notifier`] that count and record invocations
//! instead of doing real work — the `CountingExtractor`/`RecordingNotifier`
//! a dedup/worker test needs to assert against.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::domain::Filing;
use crate::core::extractor::{Extractor, Report};
use crate::core::notifier::Notifier;
use crate::error::Result;

#[derive(Default)]
pub struct CountingExtractor {
    calls: AtomicUsize,
}

impl CountingExtractor {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for CountingExtractor {
    async fn extract(&self, _filing: &Filing, text: &str) -> Result<Report> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Report {
            kpis: Vec::new(),
            guidance: None,
            summary: format!("{} bytes extracted", text.len()),
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn sent_accessions(&self) -> Vec<String> {
        self.sent.lock().expect("recording notifier lock poisoned").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, filing: &Filing, _report_markdown: &str) -> Result<()> {
        self.sent
            .lock()
            .expect("recording notifier lock poisoned")
            .push(filing.accession_number.clone());
        Ok(())
    }
}
