use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisError;
use crate::domain::{Candle, Timeframe};

// ============================================================================
// CandleSeries: ordered OHLCV candles for one (symbol, interval)
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(try_from = "RawCandleSeries")]
pub struct CandleSeries {
    symbol: String,
    interval_minutes: i64,
    candles: Vec<Candle>,
}

// Wire shape of a series before validation
#[derive(Deserialize)]
struct RawCandleSeries {
    symbol: String,
    interval_minutes: i64,
    candles: Vec<Candle>,
}

impl TryFrom<RawCandleSeries> for CandleSeries {
    type Error = AnalysisError;

    fn try_from(raw: RawCandleSeries) -> Result<Self, Self::Error> {
        CandleSeries::new(raw.symbol, raw.interval_minutes, raw.candles)
    }
}

impl CandleSeries {
    /// Build a series from oldest-first candles.
    /// Rejects an empty series and any start time that does not strictly increase.
    /// Gaps between candles are allowed.
    pub fn new(
        symbol: impl Into<String>,
        interval_minutes: i64,
        candles: Vec<Candle>,
    ) -> Result<Self, AnalysisError> {
        let symbol = symbol.into();
        if candles.is_empty() {
            return Err(AnalysisError::EmptySeries { symbol });
        }
        if let Some(pos) = candles.windows(2).position(|w| w[1].start <= w[0].start) {
            return Err(AnalysisError::UnorderedSeries {
                symbol,
                index: pos + 1,
            });
        }
        Ok(Self {
            symbol,
            interval_minutes,
            candles,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval_minutes(&self) -> i64 {
        self.interval_minutes
    }

    pub fn timeframe(&self) -> Option<Timeframe> {
        Timeframe::from_minutes(self.interval_minutes)
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    // Never true for a constructed series, kept for the usual len/is_empty pairing
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    /// Start time (epoch ms) of the candle at `idx`
    pub fn start_time(&self, idx: usize) -> Option<i64> {
        self.candles.get(idx).map(|c| c.start)
    }

    /// The trailing `n` candles (or all of them if the series is shorter)
    pub fn most_recent(&self, n: usize) -> &[Candle] {
        let start = self.candles.len().saturating_sub(n);
        &self.candles[start..]
    }

    pub fn last_close(&self) -> f64 {
        self.candles.last().map(|c| c.close).unwrap_or(f64::NAN)
    }
}
