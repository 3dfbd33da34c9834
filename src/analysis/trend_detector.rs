//! Per-timeframe trend classification.
//!
//! The trailing `window_size` candles are regressed against a synthetic time index. The slope
//! decides the label, the R² becomes the strength, and the most recent local extremum of the
//! window (shifted by one ATR) becomes the level at which the trend is expected to stall.

use itertools::Itertools;

use crate::analysis::AnalysisError;
use crate::config::{ANALYSIS, DEBUG_FLAGS};
use crate::domain::Candle;
use crate::models::{CandleSeries, Trend, TrendAnalysis};
use crate::utils::maths_utils::{LinearFit, linear_regression, local_maxima, local_minima, mean};

/// Runtime parameters of the trend detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendParams {
    pub window_size: usize,
    pub slope_threshold: f64,
}

impl Default for TrendParams {
    fn default() -> Self {
        Self {
            window_size: ANALYSIS.trend.window_size,
            slope_threshold: ANALYSIS.trend.slope_threshold,
        }
    }
}

impl TrendParams {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        // One True Range sample needs two candles
        if self.window_size < 2 {
            return Err(AnalysisError::InvalidTrendConfig {
                parameter: "window_size",
                value: self.window_size as f64,
            });
        }
        if !self.slope_threshold.is_finite() || self.slope_threshold < 0.0 {
            return Err(AnalysisError::InvalidTrendConfig {
                parameter: "slope_threshold",
                value: self.slope_threshold,
            });
        }
        Ok(())
    }
}

/// Regression and volatility features of one window of candles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowFeatures {
    pub fit: LinearFit,
    pub atr: f64,
}

impl WindowFeatures {
    /// Feature row used by the regime clustering: [slope, R², ATR]
    pub fn as_row(&self) -> [f64; 3] {
        [self.fit.slope, self.fit.r_squared, self.atr]
    }
}

/// Regression of closes plus ATR over `window` (at least two candles).
/// Bar 0 has no previous close inside the window, so ATR averages `len - 1` True Ranges.
pub fn window_features(window: &[Candle]) -> WindowFeatures {
    let closes: Vec<f64> = window.iter().map(|c| c.close).collect();
    let fit = linear_regression(&closes);
    let true_ranges: Vec<f64> = window
        .iter()
        .tuple_windows()
        .map(|(prev, cur)| cur.true_range(prev.close))
        .collect();
    let atr = if true_ranges.is_empty() {
        0.0
    } else {
        mean(&true_ranges)
    };
    WindowFeatures { fit, atr }
}

pub fn classify_slope(slope: f64, slope_threshold: f64) -> Trend {
    if slope > slope_threshold {
        Trend::Bull
    } else if slope < -slope_threshold {
        Trend::Bear
    } else {
        Trend::Side
    }
}

/// Price level at which `trend` is expected to pause, from the local extrema of `closes`.
///
/// * bull: most recent local minimum minus ATR (last close minus ATR without one)
/// * bear: most recent local maximum plus ATR (last close plus ATR without one)
/// * side: whichever of the most recent local maximum/minimum is nearer to the last close,
///   the minimum winning ties; the one that exists if only one does; the last close otherwise
pub fn reversal_level(trend: Trend, closes: &[f64], atr: f64) -> f64 {
    let Some(&last_close) = closes.last() else {
        return f64::NAN;
    };
    let last_max = local_maxima(closes).last().map(|&i| closes[i]);
    let last_min = local_minima(closes).last().map(|&i| closes[i]);

    match trend {
        Trend::Bull => last_min.unwrap_or(last_close) - atr,
        Trend::Bear => last_max.unwrap_or(last_close) + atr,
        Trend::Side => match (last_max, last_min) {
            (Some(max), Some(min)) => {
                if (last_close - max).abs() < (last_close - min).abs() {
                    max
                } else {
                    min
                }
            }
            (Some(max), None) => max,
            (None, Some(min)) => min,
            (None, None) => last_close,
        },
    }
}

/// The trailing window of `series`, failing when the series is shorter than the window
pub(crate) fn trailing_window(
    series: &CandleSeries,
    window_size: usize,
) -> Result<&[Candle], AnalysisError> {
    if series.len() < window_size {
        return Err(AnalysisError::InsufficientData {
            required: window_size,
            available: series.len(),
        });
    }
    Ok(series.most_recent(window_size))
}

/// Builds the analysis record for the trailing window under an already decided label
pub(crate) fn analysis_for_label(
    trend: Trend,
    window: &[Candle],
    features: &WindowFeatures,
) -> TrendAnalysis {
    let closes: Vec<f64> = window.iter().map(|c| c.close).collect();
    TrendAnalysis {
        trend,
        strength: features.fit.r_squared,
        slope: features.fit.slope,
        atr: features.atr,
        reversal_level: reversal_level(trend, &closes, features.atr),
    }
}

/// Classify the current trend of `series` from its trailing window.
pub fn analyze_trend(
    series: &CandleSeries,
    params: &TrendParams,
) -> Result<TrendAnalysis, AnalysisError> {
    params.validate()?;
    let window = trailing_window(series, params.window_size)?;

    let features = window_features(window);
    let trend = classify_slope(features.fit.slope, params.slope_threshold);

    if DEBUG_FLAGS.print_trend_window {
        log::debug!(
            "[trend] {} {}m: slope {:.5}, r2 {:.4}, atr {:.5} -> {}",
            series.symbol(),
            series.interval_minutes(),
            features.fit.slope,
            features.fit.r_squared,
            features.atr,
            trend
        );
    }

    Ok(analysis_for_label(trend, window, &features))
}
