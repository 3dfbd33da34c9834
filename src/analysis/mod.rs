// Trend, regime, fusion and zone algorithms plus report assembly
mod error;
pub mod fusion;
pub mod regime;
pub mod report;
pub mod trend_detector;
pub mod zone_detector;
pub mod zone_stats;

// Re-export commonly used types
pub use error::AnalysisError;
pub use fusion::{FusionWeights, fuse, fuse_timeframes};
pub use regime::{RegimeParams, analyze_regime};
pub use report::{
    TrendReport, ZoneReport, ZoneStatus, assemble_trend_report, assemble_zone_report,
};
pub use trend_detector::{TrendParams, analyze_trend};
pub use zone_detector::{ZoneParams, find_accumulation_and_distribution};
pub use zone_stats::calculate_zone_stats;
