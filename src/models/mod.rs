// Domain models for market-structure analysis
// These modules contain pure value objects independent of I/O and presentation

pub mod series;
pub mod trend;
pub mod zone;

// Re-export key types for convenience
pub use series::CandleSeries;
pub use trend::{FusedSignal, RegimeAnalysis, Trend, TrendAnalysis};
pub use zone::{Zone, ZoneKind, ZoneScan, ZoneStats};
