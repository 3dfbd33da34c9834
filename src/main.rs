use anyhow::{Context, Result};
use clap::Parser;
use tokio::runtime::Runtime;

use trend_scope::{Cli, run_scan};

fn main() -> Result<()> {
    // A. Init Logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    // C. Load and analyse
    let rt = Runtime::new().context("Failed to create Tokio runtime")?;
    let report = rt.block_on(run_scan(&args))?;

    // D. Output
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        for line in report.summary_lines() {
            println!("{}", line);
        }
    }

    if !report.failures.is_empty() {
        log::warn!(
            "⚠️  {} timeframe(s) skipped for {}",
            report.failures.len(),
            report.symbol
        );
    }
    Ok(())
}
