use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisError;
use crate::domain::Timeframe;
use crate::models::{RegimeAnalysis, TrendAnalysis, ZoneScan};

/// Everything computed for one timeframe
#[derive(Debug, Clone, PartialEq)]
pub struct TimeframeAnalysis {
    pub trend: TrendAnalysis,
    pub zones: ZoneScan,
    /// Present only when the regime cross-check is enabled and had enough data
    pub regime: Option<RegimeAnalysis>,
}

/// The result returned by a timeframe job
#[derive(Debug, Clone)]
pub struct TimeframeOutcome {
    pub timeframe: Timeframe,
    pub duration_ms: u128,

    // Success: the per-timeframe analysis
    // Failure: the reason it could not be computed
    pub result: Result<TimeframeAnalysis, AnalysisError>,
}

/// A timeframe left out of the report, and why
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimeframeFailure {
    pub timeframe: Timeframe,
    pub reason: String,
}

impl std::fmt::Display for TimeframeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}: {}", self.timeframe.label(), self.reason)
    }
}
