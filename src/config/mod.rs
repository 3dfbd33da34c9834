//! Configuration module for the trend-scope analysis engine.

pub mod analysis;
pub mod data;

mod debug; // Private: files go through crate::config::DEBUG_FLAGS
pub use debug::DEBUG_FLAGS;

// Re-export commonly used items
pub use analysis::{
    ANALYSIS, AnalysisConfig, FusionConfig, ReportConfig, TrendConfig, ZoneConfig,
};
pub use data::{DATA, DataConfig, snapshot_filename};
