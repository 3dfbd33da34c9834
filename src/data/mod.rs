// Candle loading from snapshot files
pub mod source;

// Re-export commonly used types
pub use source::{CandleSource, SnapshotSource, fetch_all_timeframes, fetch_series};
