//! filingwatch — multi-market filing ingestion and prediction-market
//! discovery substrate.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── core/
//! │   ├── domain/     # Filing, MarketMetadata, MacroEvent, Entity, ...
//! │   ├── store/      # C1 — processed-filing dedup + scheduler audit log
//! │   ├── adapter/     # C2 — per-market filing clients + registry
//! │   ├── scheduler/   # C3 — polling engine, worker pool, cron
//! │   ├── index/        # C4.1 — local full-text market catalog
//! │   ├── discovery/    # C4.2/4.3 — ticker discovery, hydration, snapshots
//! │   ├── signals/       # C5 — TTL signal cache + hybrid entity resolver
//! │   ├── extractor.rs   # narrow contract for the external report extractor
//! │   ├── notifier.rs     # narrow contract for the external notifier
//! │   └── retry.rs         # generic retry/fallback policy
//! ├── app/              # configuration + orchestration context
//! ├── cli.rs            # clap CLI surface (single `run` subcommand)
//! └── main.rs           # binary entry point, wires app + cli + scheduler
//! ```

pub mod app;
pub mod cli;
pub mod core;
pub mod error;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use error::{Error, Result};
