//! Candle data source configuration.

use crate::domain::Timeframe;

/// Configuration for loading candle series
pub struct DataConfig {
    /// Instrument analysed when none is given on the command line
    pub default_symbol: &'static str,
    /// Number of candles requested per timeframe
    pub lookback_candles: usize,
    /// Directory holding per-timeframe candle snapshots
    pub snapshot_dir: &'static str,
    /// Extension of snapshot files
    pub snapshot_ext: &'static str,
}

pub const DATA: DataConfig = DataConfig {
    default_symbol: "BTCUSDT",
    lookback_candles: 1000,
    snapshot_dir: "kline_data",
    snapshot_ext: "json",
};

/// Snapshot filename for a symbol and timeframe
/// Example: "BTCUSDT_15m.json"
pub fn snapshot_filename(symbol: &str, timeframe: Timeframe) -> String {
    format!("{}_{}.{}", symbol, timeframe.label(), DATA.snapshot_ext)
}
