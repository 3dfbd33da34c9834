#![allow(clippy::type_complexity)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod models;
pub mod signal;
pub mod utils;

// The scanner tying the algorithms together
pub mod engine;

// Re-export commonly used types
pub use analysis::AnalysisError;
pub use data::{CandleSource, SnapshotSource};
pub use domain::{Candle, Timeframe};
pub use engine::{FailurePolicy, MarketReport, MarketScanner};
pub use models::{CandleSeries, FusedSignal, Trend, TrendAnalysis, Zone, ZoneStats};
pub use signal::{TradeResult, parse_trade_result};

// CLI argument parsing
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the per-timeframe candle snapshots
    #[arg(long, default_value_t = config::DATA.snapshot_dir.to_string())]
    pub data_dir: String,

    /// Instrument to analyse
    #[arg(long, default_value_t = config::DATA.default_symbol.to_string())]
    pub symbol: String,

    /// Abort if any timeframe fails instead of skipping it
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Run the k-means regime cross-check alongside the slope classifier
    #[arg(long, default_value_t = false)]
    pub regime: bool,

    /// Print the full report as JSON instead of text lines
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl Cli {
    pub fn failure_policy(&self) -> FailurePolicy {
        if self.strict {
            FailurePolicy::Strict
        } else {
            FailurePolicy::BestEffort
        }
    }

    /// Scanner configured from the command line
    pub fn scanner(&self) -> MarketScanner {
        let scanner = MarketScanner::default().with_policy(self.failure_policy());
        if self.regime {
            scanner.with_regime()
        } else {
            scanner
        }
    }
}

/// Load the snapshots for `args.symbol` and run the full scan.
pub async fn run_scan(args: &Cli) -> anyhow::Result<MarketReport> {
    let sources: Vec<Box<dyn CandleSource>> = vec![Box::new(SnapshotSource::new(&args.data_dir))];
    args.scanner().scan_sources(&sources, &args.symbol).await
}
