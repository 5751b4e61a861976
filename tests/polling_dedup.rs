//! Scenario 1 from `spec.md` §8: the same filing returned on two
//! consecutive polling cycles results in exactly one `processed_filings`
//! row, one extractor invocation, and one report file on disk.

use std::sync::Arc;

use filingwatch::core::adapter::{AdapterRegistry, MarketKey};
use filingwatch::core::scheduler::worker::WorkerContext;
use filingwatch::core::scheduler::PollingEngine;
use filingwatch::core::store::{SqliteStateStore, StateStore};
use filingwatch::testkit::adapter::{sample_filing, FakeAdapter};
use filingwatch::testkit::collaborators::{CountingExtractor, RecordingNotifier};
use filingwatch::testkit::db;

#[tokio::test]
async fn same_filing_across_two_cycles_is_processed_exactly_once() {
    let reports_dir = tempfile::tempdir().expect("failed to create temp reports dir");

    let state_store: Arc<dyn StateStore> = Arc::new(SqliteStateStore::new(db::state_pool()));
    let extractor = Arc::new(CountingExtractor::default());
    let notifier = Arc::new(RecordingNotifier::default());

    let filing = sample_filing("0001-26-000001", "NVDA");
    let adapter = Arc::new(FakeAdapter::new(vec![filing.clone()]));

    let mut registry = AdapterRegistry::new();
    registry.register(MarketKey::Edgar, adapter.clone());

    let worker_ctx = Arc::new(WorkerContext {
        store: state_store.clone(),
        extractor: extractor.clone(),
        notifier: notifier.clone(),
        reports_dir: reports_dir.path().to_path_buf(),
    });

    let engine = PollingEngine::new(
        Arc::new(registry),
        state_store.clone(),
        worker_ctx,
        vec!["NVDA".to_string()],
        20,
        None,
        std::time::Duration::from_secs(60),
    );

    engine.run_once().await;
    engine.run_once().await;

    assert_eq!(adapter.call_count(), 2, "each cycle should poll the adapter once");
    assert_eq!(extractor.calls(), 1, "the second cycle must skip the already-processed filing");
    assert_eq!(notifier.sent_accessions(), vec![filing.accession_number.clone()]);
    assert_eq!(state_store.processed_count().await.unwrap(), 1);

    let report_path = reports_dir.path().join(format!("{}_{}.md", filing.ticker, filing.accession_number));
    assert!(report_path.exists(), "expected a report file at {}", report_path.display());
}
