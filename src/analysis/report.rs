//! Report assembly: structured payloads and text lines handed to the presentation and
//! summarisation layers. Nothing here knows about charts, messaging or persistence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::zone_stats::calculate_zone_stats;
use crate::config::ReportConfig;
use crate::domain::{Candle, Timeframe};
use crate::models::{CandleSeries, FusedSignal, TrendAnalysis, ZoneKind, ZoneScan, ZoneStats};
use crate::utils::time_utils::{epoch_ms_to_labelled, epoch_ms_to_utc};

// ============================================================================
// Trend payload
// ============================================================================

/// Compact candle for the summarisation payload
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimplifiedCandle {
    /// "epoch_ms | YYYY-MM-DD HH:MM:SS"
    pub time: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl From<&Candle> for SimplifiedCandle {
    fn from(candle: &Candle) -> Self {
        Self {
            time: epoch_ms_to_labelled(candle.start),
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
        }
    }
}

/// The last `max_len` candles of `series` in compact form, oldest first
pub fn simplify_candles(series: &CandleSeries, max_len: usize) -> Vec<SimplifiedCandle> {
    series.most_recent(max_len).iter().map(Into::into).collect()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimeframeTrend {
    pub analysis: TrendAnalysis,
    pub klines: Vec<SimplifiedCandle>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrendReport {
    pub timeframes: BTreeMap<Timeframe, TimeframeTrend>,
    pub final_signal: FusedSignal,
}

/// Combine per-timeframe analyses and the fused signal into the trend payload
pub fn assemble_trend_report(
    analyses: &[(Timeframe, &CandleSeries, TrendAnalysis)],
    final_signal: FusedSignal,
    config: &ReportConfig,
) -> TrendReport {
    let timeframes = analyses
        .iter()
        .map(|(tf, series, analysis)| {
            (
                *tf,
                TimeframeTrend {
                    analysis: *analysis,
                    klines: simplify_candles(series, config.simplified_candles),
                },
            )
        })
        .collect();

    TrendReport {
        timeframes,
        final_signal,
    }
}

// ============================================================================
// Zone payload
// ============================================================================

/// What the zone scan says about a timeframe as a whole
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ZoneStatus {
    DistributionAfterAccumulation,
    Accumulating,
    Distributing,
    NoSignificantZones,
}

impl ZoneStatus {
    pub fn from_scan(scan: &ZoneScan) -> Self {
        match (scan.accumulation.is_empty(), scan.distribution.is_empty()) {
            (false, false) => ZoneStatus::DistributionAfterAccumulation,
            (false, true) => ZoneStatus::Accumulating,
            (true, false) => ZoneStatus::Distributing,
            (true, true) => ZoneStatus::NoSignificantZones,
        }
    }
}

impl std::fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ZoneStatus::DistributionAfterAccumulation => {
                write!(f, "distribution after accumulation")
            }
            ZoneStatus::Accumulating => write!(f, "accumulating"),
            ZoneStatus::Distributing => write!(f, "distributing"),
            ZoneStatus::NoSignificantZones => write!(f, "no significant zones"),
        }
    }
}

/// Zone statistics plus what the chart layer needs to place and extend the zone
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ZoneEntry {
    #[serde(flatten)]
    pub stats: ZoneStats,
    /// Start time (epoch ms) of the first candle in the zone
    pub start_time: i64,
    /// Start time (epoch ms) of the last candle in the zone
    pub end_time: i64,
    /// Number of candles the forecast price is projected past the zone
    pub forecast_len: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimeframeZones {
    pub status: ZoneStatus,
    pub accumulation: Vec<ZoneEntry>,
    pub distribution: Vec<ZoneEntry>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ZoneReport {
    pub timeframes: BTreeMap<Timeframe, TimeframeZones>,
    pub lines: Vec<String>,
}

fn zone_entries(
    series: &CandleSeries,
    stats: Vec<ZoneStats>,
    config: &ReportConfig,
) -> Vec<ZoneEntry> {
    stats
        .into_iter()
        .map(|stats| {
            let len = stats.end_idx - stats.start_idx;
            ZoneEntry {
                start_time: series.start_time(stats.start_idx).unwrap_or_default(),
                end_time: series.start_time(stats.end_idx - 1).unwrap_or_default(),
                forecast_len: (len as f64 * config.forecast_multiplier) as usize,
                stats,
            }
        })
        .collect()
}

/// Statistics and status for one timeframe's zone scan
pub fn summarize_zones(
    series: &CandleSeries,
    scan: &ZoneScan,
    config: &ReportConfig,
) -> TimeframeZones {
    let closes = series.closes();
    let volumes = series.volumes();
    let accumulation = calculate_zone_stats(&closes, &volumes, &scan.accumulation);
    let distribution = calculate_zone_stats(&closes, &volumes, &scan.distribution);

    TimeframeZones {
        status: ZoneStatus::from_scan(scan),
        accumulation: zone_entries(series, accumulation, config),
        distribution: zone_entries(series, distribution, config),
    }
}

fn zone_line(kind: ZoneKind, ordinal: usize, entry: &ZoneEntry) -> String {
    format!(
        "  {} {}: {} -> {}, avg price {:.2}, total volume {:.2}, forecast {:.2}",
        kind,
        ordinal,
        epoch_ms_to_utc(entry.start_time),
        epoch_ms_to_utc(entry.end_time),
        entry.stats.avg_price,
        entry.stats.sum_volume,
        entry.stats.forecast_price
    )
}

/// Human-readable lines for one timeframe: a summary line, then one line per zone
pub fn zone_report_lines(timeframe: Timeframe, zones: &TimeframeZones) -> Vec<String> {
    let mut lines = vec![format!(
        "{} - {}, accumulation zones: {}, distribution zones: {}",
        timeframe.label(),
        zones.status,
        zones.accumulation.len(),
        zones.distribution.len()
    )];
    for (idx, entry) in zones.accumulation.iter().enumerate() {
        lines.push(zone_line(ZoneKind::Accumulation, idx + 1, entry));
    }
    for (idx, entry) in zones.distribution.iter().enumerate() {
        lines.push(zone_line(ZoneKind::Distribution, idx + 1, entry));
    }
    lines
}

/// Combine per-timeframe zone scans into the zone payload and its text lines
pub fn assemble_zone_report(
    scans: &[(Timeframe, &CandleSeries, ZoneScan)],
    config: &ReportConfig,
) -> ZoneReport {
    let mut timeframes = BTreeMap::new();
    let mut lines = Vec::new();
    for (tf, series, scan) in scans {
        let zones = summarize_zones(series, scan, config);
        lines.extend(zone_report_lines(*tf, &zones));
        timeframes.insert(*tf, zones);
    }
    ZoneReport { timeframes, lines }
}
