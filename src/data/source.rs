use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde::Deserialize;
use strum::IntoEnumIterator;

use crate::config::{DATA, DEBUG_FLAGS, snapshot_filename};
use crate::domain::{Candle, Timeframe};
use crate::models::CandleSeries;

#[async_trait]
pub trait CandleSource: Send + Sync {
    // Either produce an ordered series OR return an anyhow::Error
    async fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<CandleSeries>;

    /// A unique identifier for this implementation (so that afterwards we know which one we used).
    fn signature(&self) -> &'static str;
}

/// Exchange kline row: `[start, open, high, low, close, volume, turnover]`, all strings.
type RawKline = Vec<String>;

#[derive(Deserialize)]
struct KlineResult {
    list: Vec<RawKline>,
}

#[derive(Deserialize)]
struct KlineResponse {
    result: KlineResult,
}

/// Every layout a snapshot file may hold
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Candles(Vec<Candle>),
    Series(CandleSeries),
    KlineList(Vec<RawKline>),
    Response(KlineResponse),
}

fn parse_field<T: std::str::FromStr>(row: &RawKline, idx: usize, name: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = row
        .get(idx)
        .ok_or_else(|| anyhow!("kline row has no {} field (index {})", name, idx))?;
    raw.parse::<T>()
        .with_context(|| format!("kline {} field {:?} is not a number", name, raw))
}

impl TryFrom<&RawKline> for Candle {
    type Error = anyhow::Error;

    fn try_from(row: &RawKline) -> Result<Self> {
        let volume: f64 = parse_field(row, 5, "volume")?;
        let close: f64 = parse_field(row, 4, "close")?;
        let turnover = match row.get(6) {
            Some(_) => parse_field(row, 6, "turnover")?,
            None => volume * close,
        };
        Ok(Candle {
            start: parse_field(row, 0, "start")?,
            open: parse_field(row, 1, "open")?,
            high: parse_field(row, 2, "high")?,
            low: parse_field(row, 3, "low")?,
            close,
            volume,
            turnover,
            confirm: true,
        })
    }
}

/// Exchange lists arrive newest first; the series wants oldest first
fn candles_from_kline_list(rows: &[RawKline]) -> Result<Vec<Candle>> {
    rows.iter().rev().map(Candle::try_from).collect()
}

/// Turn the raw bytes of a snapshot into an ordered series trimmed to `lookback` candles
pub fn parse_snapshot(
    bytes: &[u8],
    symbol: &str,
    timeframe: Timeframe,
    lookback: usize,
) -> Result<CandleSeries> {
    let file: SnapshotFile = serde_json::from_slice(bytes)
        .context("Snapshot is not a recognised candle layout")?;

    let mut candles = match file {
        SnapshotFile::Candles(candles) => candles,
        SnapshotFile::Series(series) => series.candles().to_vec(),
        SnapshotFile::KlineList(rows) => candles_from_kline_list(&rows)?,
        SnapshotFile::Response(response) => candles_from_kline_list(&response.result.list)?,
    };

    if candles.len() > lookback {
        candles.drain(..candles.len() - lookback);
    }

    Ok(CandleSeries::new(symbol, timeframe.interval_minutes(), candles)?)
}

/// Reads `<dir>/<SYMBOL>_<label>.json` snapshots written by a collector or an earlier run.
pub struct SnapshotSource {
    pub dir: PathBuf,
    pub lookback: usize,
}

impl SnapshotSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lookback: DATA.lookback_candles,
        }
    }

    pub fn path_for(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.dir.join(snapshot_filename(symbol, timeframe))
    }
}

#[async_trait]
impl CandleSource for SnapshotSource {
    fn signature(&self) -> &'static str {
        "Local Snapshot"
    }

    async fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<CandleSeries> {
        let path = self.path_for(symbol, timeframe);

        let start_time = DEBUG_FLAGS.print_data_sources.then(|| {
            log::info!("Reading snapshot from: {:?}...", path);
            std::time::Instant::now()
        });

        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read snapshot: {:?}", path))?;
        let series = parse_snapshot(&bytes, symbol, timeframe, self.lookback)
            .with_context(|| format!("Failed to parse snapshot: {:?}", path))?;

        if let Some(start) = start_time {
            log::info!(
                "✅ Snapshot loaded: {} candles for {} {} in {:.3}s",
                series.len(),
                symbol,
                timeframe.label(),
                start.elapsed().as_secs_f64()
            );
        }
        Ok(series)
    }
}

/// Try each source in order until one produces the series.
pub async fn fetch_series(
    sources: &[Box<dyn CandleSource>],
    symbol: &str,
    timeframe: Timeframe,
) -> Result<(CandleSeries, &'static str)> {
    for source in sources {
        match source.fetch(symbol, timeframe).await {
            Ok(series) => return Ok((series, source.signature())),
            Err(e) => {
                log::info!(
                    "{} could not provide {} {}: {:#}",
                    source.signature(),
                    symbol,
                    timeframe.label(),
                    e
                );
                // Continue to the next source
            }
        }
    }
    bail!(
        "All sources failed to provide {} {}",
        symbol,
        timeframe.label()
    )
}

/// Fetch every supported timeframe for `symbol`, ascending. Failures are returned per timeframe.
pub async fn fetch_all_timeframes(
    sources: &[Box<dyn CandleSource>],
    symbol: &str,
) -> Vec<(Timeframe, Result<CandleSeries>)> {
    let mut fetched = Vec::new();
    for timeframe in Timeframe::iter() {
        let result = fetch_series(sources, symbol, timeframe).await;
        if let Ok((series, signature)) = &result {
            log::info!(
                "{} {}: {} candles via {}",
                symbol,
                timeframe.label(),
                series.len(),
                signature
            );
        }
        fetched.push((timeframe, result.map(|(series, _)| series)));
    }
    fetched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kline_row(start: i64, close: f64) -> Vec<String> {
        vec![
            start.to_string(),
            format!("{}", close - 0.5),
            format!("{}", close + 1.0),
            format!("{}", close - 1.0),
            format!("{}", close),
            "12.5".to_string(),
            "1250".to_string(),
        ]
    }

    #[test]
    fn kline_list_is_reversed_to_oldest_first() {
        // Newest first, as the exchange returns it
        let rows = vec![kline_row(120_000, 3.0), kline_row(60_000, 2.0), kline_row(0, 1.0)];
        let bytes = serde_json::to_vec(&rows).unwrap();
        let series = parse_snapshot(&bytes, "BTCUSDT", Timeframe::M1, 1000).unwrap();
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.candles()[0].turnover, 1250.0);
        assert_eq!(series.candles()[2].start, 120_000);
    }

    #[test]
    fn exchange_response_envelope_is_accepted() {
        let json = serde_json::json!({
            "retCode": 0,
            "result": { "category": "linear", "list": [kline_row(60_000, 2.0), kline_row(0, 1.0)] }
        });
        let bytes = serde_json::to_vec(&json).unwrap();
        let series = parse_snapshot(&bytes, "BTCUSDT", Timeframe::M15, 1000).unwrap();
        assert_eq!(series.closes(), vec![1.0, 2.0]);
        assert_eq!(series.interval_minutes(), 15);
    }

    #[test]
    fn own_candle_layout_is_accepted_and_trimmed() {
        let candles: Vec<Candle> = (0..10)
            .map(|i| Candle::new(i * 60_000, 1.0, 2.0, 0.5, i as f64, 3.0))
            .collect();
        let bytes = serde_json::to_vec(&candles).unwrap();
        let series = parse_snapshot(&bytes, "ETHUSDT", Timeframe::M1, 4).unwrap();
        assert_eq!(series.closes(), vec![6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn malformed_numbers_are_reported() {
        let mut row = kline_row(0, 1.0);
        row[4] = "n/a".to_string();
        let bytes = serde_json::to_vec(&vec![row]).unwrap();
        let err = parse_snapshot(&bytes, "BTCUSDT", Timeframe::M1, 1000).unwrap_err();
        assert!(format!("{:#}", err).contains("close"));
    }

    #[test]
    fn unordered_snapshot_is_rejected() {
        // Oldest first in a kline list ends up newest first after the reversal
        let rows = vec![kline_row(0, 1.0), kline_row(60_000, 2.0)];
        let bytes = serde_json::to_vec(&rows).unwrap();
        assert!(parse_snapshot(&bytes, "BTCUSDT", Timeframe::M1, 1000).is_err());
    }

    #[tokio::test]
    async fn snapshot_source_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![kline_row(60_000, 2.0), kline_row(0, 1.0)];
        let source = SnapshotSource::new(dir.path());
        tokio::fs::write(
            source.path_for("BTCUSDT", Timeframe::H1),
            serde_json::to_vec(&rows).unwrap(),
        )
        .await
        .unwrap();

        let series = source.fetch("BTCUSDT", Timeframe::H1).await.unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.interval_minutes(), 60);
        assert!(source.fetch("BTCUSDT", Timeframe::M1).await.is_err());
    }

    #[tokio::test]
    async fn fallback_chain_uses_the_next_source() {
        let empty = tempfile::tempdir().unwrap();
        let filled = tempfile::tempdir().unwrap();
        let rows = vec![kline_row(0, 1.0)];
        for tf in [Timeframe::M1, Timeframe::M30] {
            let path = filled.path().join(snapshot_filename("BTCUSDT", tf));
            tokio::fs::write(path, serde_json::to_vec(&rows).unwrap())
                .await
                .unwrap();
        }

        let sources: Vec<Box<dyn CandleSource>> = vec![
            Box::new(SnapshotSource::new(empty.path())),
            Box::new(SnapshotSource::new(filled.path())),
        ];
        let fetched = fetch_all_timeframes(&sources, "BTCUSDT").await;

        let timeframes: Vec<Timeframe> = fetched.iter().map(|(tf, _)| *tf).collect();
        assert_eq!(
            timeframes,
            vec![Timeframe::M1, Timeframe::M15, Timeframe::M30, Timeframe::H1]
        );
        assert!(fetched[0].1.is_ok());
        assert!(fetched[1].1.is_err());
        assert!(fetched[2].1.is_ok());
        assert!(fetched[3].1.is_err());
    }
}
