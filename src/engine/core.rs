use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use anyhow::{Result, bail};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::{
    AnalysisError, FusionWeights, RegimeParams, TrendParams, TrendReport, ZoneParams, ZoneReport,
    analyze_regime, analyze_trend, assemble_trend_report, assemble_zone_report,
    find_accumulation_and_distribution, fuse_timeframes,
};
use crate::config::{ANALYSIS, DEBUG_FLAGS, ReportConfig};
use crate::data::{CandleSource, fetch_all_timeframes};
use crate::domain::Timeframe;
use crate::models::{CandleSeries, FusedSignal, RegimeAnalysis};

use super::messages::{TimeframeAnalysis, TimeframeFailure, TimeframeOutcome};

/// What to do when a single timeframe cannot be analysed
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the whole scan on the first failed timeframe
    Strict,
    /// Skip failed timeframes and report them; fail only if every timeframe fails
    #[default]
    BestEffort,
}

/// Everything a scan produced for one symbol
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MarketReport {
    pub symbol: String,
    pub trend: TrendReport,
    pub zones: ZoneReport,
    pub regimes: BTreeMap<Timeframe, RegimeAnalysis>,
    pub failures: Vec<TimeframeFailure>,
}

impl MarketReport {
    pub fn final_signal(&self) -> FusedSignal {
        self.trend.final_signal
    }

    /// Plain-text summary: one trend line per timeframe, the fused signal, then the zone lines
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (tf, entry) in &self.trend.timeframes {
            let a = &entry.analysis;
            let mut line = format!(
                "{} - trend {}, strength {:.2}, slope {:.5}, atr {:.5}, reversal level {:.2}",
                tf.label(),
                a.trend,
                a.strength,
                a.slope,
                a.atr,
                a.reversal_level
            );
            if let Some(regime) = self.regimes.get(tf) {
                line.push_str(&format!(
                    ", regime {} (cluster {}/{}{})",
                    regime.analysis.trend,
                    regime.cluster + 1,
                    regime.cluster_count,
                    if regime.agrees_with_primary { "" } else { ", disagrees" }
                ));
            }
            lines.push(line);
        }
        let signal = self.final_signal();
        lines.push(format!(
            "final - trend {}, strength {:.2}, reversal level {:.2}",
            signal.trend, signal.strength, signal.reversal_level
        ));
        lines.extend(self.zones.lines.iter().cloned());
        for failure in &self.failures {
            lines.push(format!("skipped {}", failure));
        }
        lines
    }
}

/// Runs the per-timeframe analyses in parallel and assembles the fused report
#[derive(Debug, Clone, Copy)]
pub struct MarketScanner {
    pub trend: TrendParams,
    pub zones: ZoneParams,
    pub fusion: FusionWeights,
    /// `None` disables the regime cross-check
    pub regime: Option<RegimeParams>,
    pub report: ReportConfig,
    pub policy: FailurePolicy,
}

impl Default for MarketScanner {
    fn default() -> Self {
        Self {
            trend: TrendParams::default(),
            zones: ZoneParams::default(),
            fusion: FusionWeights::default(),
            regime: None,
            report: ANALYSIS.report,
            policy: FailurePolicy::default(),
        }
    }
}

impl MarketScanner {
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enable the regime cross-check using the scanner's own trend parameters
    pub fn with_regime(mut self) -> Self {
        self.regime = Some(RegimeParams {
            trend: self.trend,
            ..RegimeParams::default()
        });
        self
    }

    pub fn with_fusion_weights(mut self, fusion: FusionWeights) -> Self {
        self.fusion = fusion;
        self
    }

    fn analyze_timeframe(
        &self,
        timeframe: Timeframe,
        series: &CandleSeries,
    ) -> Result<TimeframeAnalysis, AnalysisError> {
        let trend = analyze_trend(series, &self.trend)?;
        let zones = find_accumulation_and_distribution(series, &self.zones)?;

        // The cross-check never fails the timeframe
        let regime = match &self.regime {
            Some(params) => match analyze_regime(series, params) {
                Ok(regime) => Some(regime),
                Err(e) => {
                    log::warn!("⚠️  Regime check skipped for {}: {}", timeframe.label(), e);
                    None
                }
            },
            None => None,
        };

        Ok(TimeframeAnalysis {
            trend,
            zones,
            regime,
        })
    }

    fn run_job(&self, timeframe: Timeframe, series: &CandleSeries) -> TimeframeOutcome {
        let start = Instant::now();
        let result = self.analyze_timeframe(timeframe, series);
        TimeframeOutcome {
            timeframe,
            duration_ms: start.elapsed().as_millis(),
            result,
        }
    }

    /// Analyse every timeframe of `series` and fuse the results.
    pub fn run(&self, series: &[(Timeframe, CandleSeries)]) -> Result<MarketReport> {
        self.run_with_failures(series, Vec::new())
    }

    fn run_with_failures(
        &self,
        series: &[(Timeframe, CandleSeries)],
        mut failures: Vec<TimeframeFailure>,
    ) -> Result<MarketReport> {
        let Some((_, first)) = series.first() else {
            bail!("No timeframes to analyse");
        };
        let symbol = first.symbol().to_string();
        self.fusion.validate()?;
        check_timeframes(series)?;

        let outcomes: Vec<TimeframeOutcome> = series
            .par_iter()
            .map(|(tf, s)| self.run_job(*tf, s))
            .collect();

        let mut succeeded = Vec::new();
        for (outcome, (_, s)) in outcomes.into_iter().zip(series) {
            if DEBUG_FLAGS.print_scanner_timings {
                log::info!(
                    "{} {}: analysed {} candles in {}ms",
                    symbol,
                    outcome.timeframe.label(),
                    s.len(),
                    outcome.duration_ms
                );
            }
            match outcome.result {
                Ok(analysis) => succeeded.push((outcome.timeframe, s, analysis)),
                Err(e) => {
                    if self.policy == FailurePolicy::Strict {
                        return Err(anyhow::Error::new(e).context(format!(
                            "{} {} analysis failed",
                            symbol,
                            outcome.timeframe.label()
                        )));
                    }
                    log::warn!(
                        "⚠️  Skipping {} {}: {}",
                        symbol,
                        outcome.timeframe.label(),
                        e
                    );
                    failures.push(TimeframeFailure {
                        timeframe: outcome.timeframe,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if succeeded.is_empty() {
            let reasons: Vec<String> = failures.iter().map(|f| f.to_string()).collect();
            bail!(
                "Every timeframe failed for {}: {}",
                symbol,
                reasons.join(", ")
            );
        }

        let for_fusion: Vec<_> = succeeded.iter().map(|(tf, _, a)| (*tf, a.trend)).collect();
        let final_signal = fuse_timeframes(&for_fusion, &self.fusion)?;

        let trend_inputs: Vec<_> = succeeded
            .iter()
            .map(|(tf, s, a)| (*tf, *s, a.trend))
            .collect();
        let zone_inputs: Vec<_> = succeeded
            .iter()
            .map(|(tf, s, a)| (*tf, *s, a.zones.clone()))
            .collect();
        let regimes = succeeded
            .iter()
            .filter_map(|(tf, _, a)| a.regime.map(|r| (*tf, r)))
            .collect();

        failures.sort_by_key(|f| f.timeframe);

        Ok(MarketReport {
            symbol,
            trend: assemble_trend_report(&trend_inputs, final_signal, &self.report),
            zones: assemble_zone_report(&zone_inputs, &self.report),
            regimes,
            failures,
        })
    }

    /// Load every timeframe of `symbol` from `sources`, then run the scan.
    /// Load failures follow the same policy as analysis failures.
    pub async fn scan_sources(
        &self,
        sources: &[Box<dyn CandleSource>],
        symbol: &str,
    ) -> Result<MarketReport> {
        let mut loaded = Vec::new();
        let mut failures = Vec::new();
        for (timeframe, result) in fetch_all_timeframes(sources, symbol).await {
            match result {
                Ok(series) => loaded.push((timeframe, series)),
                Err(e) => {
                    if self.policy == FailurePolicy::Strict {
                        return Err(e.context(format!(
                            "Could not load {} {}",
                            symbol,
                            timeframe.label()
                        )));
                    }
                    log::warn!(
                        "⚠️  Could not load {} {}: {:#}",
                        symbol,
                        timeframe.label(),
                        e
                    );
                    failures.push(TimeframeFailure {
                        timeframe,
                        reason: format!("{:#}", e),
                    });
                }
            }
        }

        if loaded.is_empty() {
            bail!("No timeframe of {} could be loaded", symbol);
        }
        self.run_with_failures(&loaded, failures)
    }
}

/// Each timeframe at most once, and every series sampled at the interval of its key
fn check_timeframes(series: &[(Timeframe, CandleSeries)]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for (tf, s) in series {
        if !seen.insert(*tf) {
            bail!("Timeframe {} was given more than once", tf.label());
        }
        if s.timeframe() != Some(*tf) {
            bail!(
                "{} series has {}m candles but was given as {}",
                s.symbol(),
                s.interval_minutes(),
                tf.label()
            );
        }
    }
    Ok(())
}
