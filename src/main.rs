use std::sync::Arc;

use clap::Parser;
use filingwatch::app::{init_logging, Config, Context};
use filingwatch::cli::{Cli, Commands, RunArgs};
use filingwatch::core::extractor::PlaceholderExtractor;
use filingwatch::core::notifier::NullNotifier;
use filingwatch::core::scheduler::cron::CronSpec;
use filingwatch::core::scheduler::worker::WorkerContext;
use filingwatch::core::scheduler::PollingEngine;
use filingwatch::error::Error;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let Commands::Run(args) = cli.command;

    if let Err(e) = args.validate() {
        eprintln!("Configuration error: {e}");
        std::process::exit(2);
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    init_logging(&config.log_level);
    info!("filingwatch starting");

    match run(config, args.simple, args.cron).await {
        Ok(()) => {
            info!("filingwatch stopped");
        }
        Err(e) => {
            error!(error = %e, "fatal error");
            std::process::exit(1);
        }
    }
}

/// Merge `RunArgs` CLI overrides onto the loaded file/env config, matching
/// `spec.md` §6's flag set and the teacher's `cli::run::execute` override
/// pattern.
fn load_config(args: &RunArgs) -> filingwatch::error::Result<Config> {
    let config_path = args.config.clone().or_else(Config::default_path);
    let mut config = Config::load(config_path.as_deref())?;

    if !args.tickers.is_empty() {
        config.tickers = args.tickers.clone();
    }
    config.interval_seconds = Some(args.interval * 60);
    if args.cron.is_some() {
        config.cron = args.cron.clone();
    }
    if let Some(max_workers) = args.max_workers {
        config.max_workers = Some(max_workers);
    }
    if let Some(grace) = args.misfire_grace_seconds {
        config.misfire_grace_seconds = grace;
    }
    if let Some(ref level) = args.log_level {
        config.log_level = level.clone();
    }

    if config.tickers.is_empty() {
        return Err(Error::Config("at least one ticker is required".to_string()));
    }

    Ok(config)
}

/// Build the context and drive the polling engine, either on the `--simple`
/// sleep loop or the cron schedule, until ctrl-c is received. The in-flight
/// cycle always drains before returning, per `spec.md` §5.
async fn run(config: Config, simple: bool, cron_expr: Option<String>) -> filingwatch::error::Result<()> {
    let tickers = config.tickers.clone();
    let reports_dir = config.reports_dir.clone();
    let interval = std::time::Duration::from_secs(config.interval_seconds.unwrap_or(300));
    let max_workers_override = config.max_workers;
    let misfire_grace = std::time::Duration::from_secs(config.misfire_grace_seconds);

    let ctx = Context::build(config)?;
    tokio::fs::create_dir_all(&reports_dir).await?;

    let worker_ctx = Arc::new(WorkerContext {
        store: ctx.state_store.clone(),
        extractor: Arc::new(PlaceholderExtractor),
        notifier: Arc::new(NullNotifier),
        reports_dir,
    });

    let limit = 20;
    let engine = PollingEngine::new(
        ctx.registry.clone(),
        ctx.state_store.clone(),
        worker_ctx,
        tickers,
        limit,
        max_workers_override,
        misfire_grace,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut engine_handle = tokio::spawn(async move { drive(engine, simple, cron_expr, interval, shutdown_rx).await });

    tokio::select! {
        result = &mut engine_handle => {
            return result.map_err(|e| Error::Config(e.to_string()))?;
        }
        _ = signal::ctrl_c() => {
            info!("shutdown signal received, waiting for the in-flight cycle to drain");
            let _ = shutdown_tx.send(true);
        }
    }

    engine_handle.await.map_err(|e| Error::Config(e.to_string()))?
}

async fn drive(
    engine: PollingEngine,
    simple: bool,
    cron_expr: Option<String>,
    interval: std::time::Duration,
    shutdown_rx: watch::Receiver<bool>,
) -> filingwatch::error::Result<()> {
    if simple {
        return engine.start_loop(interval, shutdown_rx).await;
    }

    if let Some(expr) = cron_expr {
        match CronSpec::parse(&expr) {
            Ok(spec) => return engine.start_scheduled(spec, shutdown_rx).await,
            Err(e) => {
                warn!(error = %e, cron = %expr, "failed to parse --cron expression, falling back to --interval");
            }
        }
    }

    engine.start_scheduled_interval(interval, shutdown_rx).await
}
