//! Bounded worker pool that turns a batch of filings into written reports.
//!
//! Each permitted task checks out its own pooled `StateStore` connection —
//! the Rust rendering of the original's thread-local state-manager handle
//! (`original_source`'s `_get_state_manager`).

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, warn};

use crate::core::adapter::MarketAdapter;
use crate::core::domain::Filing;
use crate::core::extractor::{render_report_markdown, Extractor};
use crate::core::notifier::Notifier;
use crate::core::store::StateStore;

/// `min(32, cpu_count + 4)`, per `spec.md` §4.3.
pub fn worker_pool_size() -> usize {
    (num_cpus::get() + 4).min(32)
}

pub struct WorkerContext {
    pub store: Arc<dyn StateStore>,
    pub extractor: Arc<dyn Extractor>,
    pub notifier: Arc<dyn Notifier>,
    pub reports_dir: PathBuf,
}

/// Fetch the latest filings for one market's ticker group and fan them out
/// to the bounded worker pool.
pub async fn process_group(
    adapter: Arc<dyn MarketAdapter>,
    tickers: Vec<String>,
    limit: usize,
    ctx: Arc<WorkerContext>,
    semaphore: Arc<Semaphore>,
) {
    let filings = match adapter.get_latest_filings(&tickers, limit).await {
        Ok(filings) => filings,
        Err(e) => {
            error!(error = %e, "failed to fetch latest filings for market group");
            return;
        }
    };

    let mut handles = Vec::with_capacity(filings.len());
    for filing in filings {
        let adapter = adapter.clone();
        let ctx = ctx.clone();
        let semaphore = semaphore.clone();
        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("worker pool semaphore should never be closed");
            process_filing(adapter, filing, ctx).await;
        }));
    }

    for handle in handles {
        let _ = handle.await;
    }
}

/// Process a single filing: skip if already processed, otherwise fetch
/// text, extract, render, write, and notify. `mark_processed` is called
/// unconditionally at the end, whether or not extraction succeeded — see
/// `DESIGN.md`'s note on this preserved-as-specified behavior.
async fn process_filing(adapter: Arc<dyn MarketAdapter>, filing: Filing, ctx: Arc<WorkerContext>) {
    if filing.accession_number.is_empty() || filing.ticker.is_empty() {
        warn!(?filing, "skipping malformed filing missing accession number or ticker");
        return;
    }

    match ctx.store.is_processed(&filing.accession_number).await {
        Ok(true) => return,
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, accession = %filing.accession_number, "state store lookup failed");
            return;
        }
    }

    match adapter.get_filing_text(&filing).await {
        Ok(text) if !text.is_empty() => match ctx.extractor.extract(&filing, &text).await {
            Ok(report) => {
                let markdown = render_report_markdown(&filing, &report);
                let path = ctx
                    .reports_dir
                    .join(format!("{}_{}.md", filing.ticker, filing.accession_number));

                if let Err(e) = tokio::fs::write(&path, &markdown).await {
                    error!(error = %e, path = %path.display(), "failed to write report");
                } else if let Err(e) = ctx.notifier.notify(&filing, &markdown).await {
                    warn!(error = %e, accession = %filing.accession_number, "notifier failed");
                }
            }
            Err(e) => {
                error!(error = %e, accession = %filing.accession_number, "extraction failed");
            }
        },
        Ok(_) => {
            warn!(accession = %filing.accession_number, "filing text empty or unreadable, skipping extraction");
        }
        Err(e) => {
            error!(error = %e, accession = %filing.accession_number, "failed to fetch filing text");
        }
    }

    if let Err(e) = ctx
        .store
        .mark_processed(&filing.accession_number, &filing.ticker, &filing.filing_date)
        .await
    {
        error!(error = %e, accession = %filing.accession_number, "failed to mark filing processed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_pool_size_is_bounded() {
        assert!(worker_pool_size() <= 32);
        assert!(worker_pool_size() >= 5);
    }
}
