//! Command-line interface definitions, grounded on the teacher's
//! `cli/mod.rs` (`Parser`/`Subcommand` shape, a `run` subcommand carrying
//! its own args struct).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// filingwatch — multi-market filing ingestion and prediction-market
/// discovery daemon.
#[derive(Parser, Debug)]
#[command(name = "filingwatch", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the polling daemon for one or more tickers.
    Run(RunArgs),
}

/// Arguments for the `run` subcommand, mapping directly onto `spec.md`
/// §6's CLI surface.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Ticker symbols to poll. Suffix `.NS` routes to the Indian adapter;
    /// otherwise the default (EDGAR) adapter is used.
    #[arg(required = true)]
    pub tickers: Vec<String>,

    /// Path to the TOML config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Polling interval in minutes. Must be greater than zero.
    #[arg(long, default_value_t = 5)]
    pub interval: u64,

    /// Five-field cron expression. Falls back to `--interval` with a
    /// warning on parse error.
    #[arg(long)]
    pub cron: Option<String>,

    /// Run a single-threaded sleep loop instead of the cron scheduler, with
    /// no misfire tracking.
    #[arg(long)]
    pub simple: bool,

    /// DEBUG, INFO, WARNING, or ERROR. Defaults to env `LOG_LEVEL` or INFO.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override the default worker pool size (`min(32, cpu_count + 4)`).
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// Misfire grace period in seconds. Must be greater than zero when
    /// present.
    #[arg(long)]
    pub misfire_grace_seconds: Option<u64>,
}

impl RunArgs {
    /// Validate the flag combination that the CLI boundary is responsible
    /// for (`spec.md` §7: invalid CLI flags are configuration errors, exit
    /// code 2). Parsing of `--cron` itself is validated separately by
    /// `CronSpec::parse`, which falls back to `--interval` rather than
    /// failing, per `spec.md` §6.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.interval == 0 {
            return Err(crate::error::Error::Config(
                "--interval must be greater than 0".to_string(),
            ));
        }
        if let Some(grace) = self.misfire_grace_seconds {
            if grace == 0 {
                return Err(crate::error::Error::Config(
                    "--misfire-grace-seconds must be greater than 0 when present".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(interval: u64, misfire: Option<u64>) -> RunArgs {
        RunArgs {
            tickers: vec!["NVDA".to_string()],
            config: None,
            interval,
            cron: None,
            simple: false,
            log_level: None,
            max_workers: None,
            misfire_grace_seconds: misfire,
        }
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(args(0, None).validate().is_err());
    }

    #[test]
    fn zero_misfire_grace_is_rejected() {
        assert!(args(5, Some(0)).validate().is_err());
    }

    #[test]
    fn positive_values_pass_validation() {
        assert!(args(5, Some(30)).validate().is_ok());
    }

    #[test]
    fn cli_parses_run_subcommand_with_positional_tickers() {
        let cli = Cli::parse_from(["filingwatch", "run", "NVDA", "TATASTEEL.NS", "--simple"]);
        let Commands::Run(run_args) = cli.command;
        assert_eq!(run_args.tickers, vec!["NVDA", "TATASTEEL.NS"]);
        assert!(run_args.simple);
    }
}
