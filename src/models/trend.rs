use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

/// Trend label. Variant order is the fusion tie-break priority: bull, then bear, then side.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bull,
    Bear,
    Side,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Trend::Bull => write!(f, "bull"),
            Trend::Bear => write!(f, "bear"),
            Trend::Side => write!(f, "side"),
        }
    }
}

/// Trend classification of the trailing window of one series
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TrendAnalysis {
    pub trend: Trend,
    /// R² of the trailing-window regression, in [0, 1]
    pub strength: f64,
    /// Regression slope in price units per candle
    pub slope: f64,
    /// Average True Range over the trailing window
    pub atr: f64,
    pub reversal_level: f64,
}

/// Weighted consensus across timeframes
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct FusedSignal {
    pub trend: Trend,
    pub strength: f64,
    pub reversal_level: f64,
}

/// Clustering-based regime cross-check for one series
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct RegimeAnalysis {
    /// Trailing-window metrics with the trend label taken from the regime clusters
    pub analysis: TrendAnalysis,
    /// Cluster the trailing window was assigned to
    pub cluster: usize,
    pub cluster_count: usize,
    /// Whether the regime label matches the slope-threshold label
    pub agrees_with_primary: bool,
}
