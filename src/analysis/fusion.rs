//! Multi-timeframe fusion of independent trend analyses into one consensus signal.

use strum::IntoEnumIterator;

use crate::analysis::AnalysisError;
use crate::config::ANALYSIS;
use crate::domain::Timeframe;
use crate::models::{FusedSignal, Trend, TrendAnalysis};
use crate::utils::maths_utils::{get_max, get_min, weighted_average};

fn validate_weights(analyses: &[TrendAnalysis], weights: &[f64]) -> Result<(), AnalysisError> {
    if analyses.is_empty() {
        return Err(AnalysisError::EmptyFusionInput);
    }
    if analyses.len() != weights.len() {
        return Err(AnalysisError::WeightMismatch {
            analyses: analyses.len(),
            weights: weights.len(),
        });
    }
    if let Some((index, &value)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w <= 0.0)
    {
        return Err(AnalysisError::InvalidWeight { index, value });
    }
    Ok(())
}

/// Label with the largest accumulated weight. Equal totals resolve in `Trend` declaration
/// order, so bull beats bear and bear beats side.
fn winning_trend(analyses: &[TrendAnalysis], weights: &[f64]) -> Trend {
    let mut best = Trend::Bull;
    let mut best_score = f64::NEG_INFINITY;
    for trend in Trend::iter() {
        let score: f64 = analyses
            .iter()
            .zip(weights)
            .filter(|(a, _)| a.trend == trend)
            .map(|(_, w)| w)
            .sum();
        if score > best_score {
            best = trend;
            best_score = score;
        }
    }
    best
}

/// Fuse `analyses` with the parallel positive `weights`.
///
/// * trend: weighted vote, ties broken bull > bear > side
/// * strength: weighted mean of the input strengths
/// * reversal level: lowest input level for bull, highest for bear, weighted mean for side
pub fn fuse(analyses: &[TrendAnalysis], weights: &[f64]) -> Result<FusedSignal, AnalysisError> {
    validate_weights(analyses, weights)?;

    let trend = winning_trend(analyses, weights);
    let strengths: Vec<f64> = analyses.iter().map(|a| a.strength).collect();
    let levels: Vec<f64> = analyses.iter().map(|a| a.reversal_level).collect();

    let reversal_level = match trend {
        Trend::Bull => get_min(&levels),
        Trend::Bear => get_max(&levels),
        Trend::Side => weighted_average(&levels, weights),
    };

    Ok(FusedSignal {
        trend,
        strength: weighted_average(&strengths, weights),
        reversal_level,
    })
}

/// Runtime fusion weight per timeframe, ordered 1m, 15m, 30m, 60m
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub timeframe_weights: [f64; 4],
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            timeframe_weights: ANALYSIS.fusion.timeframe_weights,
        }
    }
}

impl FusionWeights {
    pub fn weight_for(&self, timeframe: Timeframe) -> f64 {
        self.timeframe_weights[timeframe as usize]
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if let Some((index, &value)) = self
            .timeframe_weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w <= 0.0)
        {
            return Err(AnalysisError::InvalidWeight { index, value });
        }
        Ok(())
    }
}

/// Fuse per-timeframe analyses, each weighted by its timeframe's entry in `weights`
pub fn fuse_timeframes(
    analyses: &[(Timeframe, TrendAnalysis)],
    weights: &FusionWeights,
) -> Result<FusedSignal, AnalysisError> {
    weights.validate()?;
    let per_analysis: Vec<f64> = analyses
        .iter()
        .map(|(tf, _)| weights.weight_for(*tf))
        .collect();
    let analyses: Vec<TrendAnalysis> = analyses.iter().map(|(_, a)| *a).collect();
    fuse(&analyses, &per_analysis)
}
