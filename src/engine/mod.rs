pub mod core;
pub mod messages;

// Re-export key components
pub use core::{FailurePolicy, MarketReport, MarketScanner};
pub use messages::{TimeframeAnalysis, TimeframeFailure};
