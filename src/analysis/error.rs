use std::fmt;

/// Failures surfaced by the analysis core. Every call is independent, so none of these is fatal
/// to the process; the caller decides whether to carry on with the remaining timeframes.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    EmptySeries { symbol: String },
    UnorderedSeries { symbol: String, index: usize },
    InsufficientData { required: usize, available: usize },
    InvalidTrendConfig { parameter: &'static str, value: f64 },
    InvalidZoneConfig { parameter: &'static str, value: f64 },
    EmptyFusionInput,
    WeightMismatch { analyses: usize, weights: usize },
    InvalidWeight { index: usize, value: f64 },
}

impl std::error::Error for AnalysisError {}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnalysisError::EmptySeries { symbol } => {
                write!(f, "candle series for {} is empty", symbol)
            }
            AnalysisError::UnorderedSeries { symbol, index } => write!(
                f,
                "candle series for {} is not strictly increasing in time at index {}",
                symbol, index
            ),
            AnalysisError::InsufficientData {
                required,
                available,
            } => write!(
                f,
                "insufficient data: {} candles required, only {} available",
                required, available
            ),
            AnalysisError::InvalidTrendConfig { parameter, value } => {
                write!(f, "invalid trend parameter {} = {}", parameter, value)
            }
            AnalysisError::InvalidZoneConfig { parameter, value } => write!(
                f,
                "invalid zone parameter {} = {} (must be positive)",
                parameter, value
            ),
            AnalysisError::EmptyFusionInput => write!(f, "no trend analyses to fuse"),
            AnalysisError::WeightMismatch { analyses, weights } => {
                write!(f, "{} analyses were given {} weights", analyses, weights)
            }
            AnalysisError::InvalidWeight { index, value } => write!(
                f,
                "fusion weight #{} is {} (weights must be positive and finite)",
                index, value
            ),
        }
    }
}
