use std::path::Path;

use trend_scope::config::snapshot_filename;
use trend_scope::engine::FailurePolicy;
use trend_scope::{Candle, Cli, Timeframe, Trend, run_scan};

// Gentle triangle wave around 100
const TIGHT: [f64; 8] = [100.0, 100.2, 100.4, 100.2, 100.0, 99.8, 99.6, 99.8];

/// Noisy thin market with a quiet high-volume run over bars 40..70
fn one_minute_candles() -> Vec<Candle> {
    (0..100usize)
        .map(|i| {
            let (close, volume) = if (40..70).contains(&i) {
                (TIGHT[(i - 40) % TIGHT.len()], 4.0)
            } else if i % 2 == 0 {
                (95.0, 1.0)
            } else {
                (105.0, 1.0)
            };
            Candle::new(i as i64 * 60_000, close, close + 0.1, close - 0.1, close, volume)
        })
        .collect()
}

fn rising_candles(n: usize, interval_minutes: i64) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let c = 1000.0 + 5.0 * i as f64;
            Candle::new(i as i64 * interval_minutes * 60_000, c, c + 1.0, c - 1.0, c, 50.0)
        })
        .collect()
}

/// Exchange layout: string rows, newest first
fn as_kline_list(candles: &[Candle]) -> Vec<Vec<String>> {
    candles
        .iter()
        .rev()
        .map(|c| {
            vec![
                c.start.to_string(),
                c.open.to_string(),
                c.high.to_string(),
                c.low.to_string(),
                c.close.to_string(),
                c.volume.to_string(),
                c.turnover.to_string(),
            ]
        })
        .collect()
}

fn write_snapshot(dir: &Path, timeframe: Timeframe, json: Vec<u8>) {
    std::fs::write(dir.join(snapshot_filename("BTCUSDT", timeframe)), json).unwrap();
}

fn cli(dir: &Path, strict: bool) -> Cli {
    Cli {
        data_dir: dir.to_string_lossy().into_owned(),
        symbol: "BTCUSDT".to_string(),
        strict,
        regime: true,
        json: false,
    }
}

fn populate(dir: &Path) {
    write_snapshot(
        dir,
        Timeframe::M1,
        serde_json::to_vec(&one_minute_candles()).unwrap(),
    );
    write_snapshot(
        dir,
        Timeframe::M30,
        serde_json::to_vec(&rising_candles(60, 30)).unwrap(),
    );
    write_snapshot(
        dir,
        Timeframe::H1,
        serde_json::to_vec(&as_kline_list(&rising_candles(80, 60))).unwrap(),
    );
    // No 15m snapshot
}

#[tokio::test]
async fn best_effort_scan_reports_missing_timeframe() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());

    let args = cli(dir.path(), false);
    assert_eq!(args.failure_policy(), FailurePolicy::BestEffort);
    let report = run_scan(&args).await.unwrap();

    assert_eq!(report.symbol, "BTCUSDT");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].timeframe, Timeframe::M15);

    // Two heavy rising timeframes outvote the choppy 1m one
    let signal = report.final_signal();
    assert_eq!(signal.trend, Trend::Bull);
    assert!(signal.strength > 0.5);

    let h1 = &report.trend.timeframes[&Timeframe::H1];
    assert_eq!(h1.analysis.trend, Trend::Bull);
    assert_eq!(h1.klines.len(), 50);
    assert!(h1.klines[0].time.starts_with(&(30 * 60 * 60_000i64).to_string()));

    let m1 = &report.zones.timeframes[&Timeframe::M1];
    assert_eq!(m1.accumulation.len(), 1);
    assert_eq!(m1.distribution.len(), 1);
    assert_eq!(m1.accumulation[0].stats.start_idx, 40);
    assert_eq!(m1.accumulation[0].stats.end_idx, 60);
    assert_eq!(m1.distribution[0].stats.end_idx, 70);
    assert!(report.zones.lines.contains(
        &"1m - distribution after accumulation, accumulation zones: 1, distribution zones: 1"
            .to_string()
    ));

    // 80 hourly candles are plenty for the regime check
    assert!(report.regimes.contains_key(&Timeframe::H1));

    let lines = report.summary_lines();
    assert!(lines.iter().any(|l| l.starts_with("final - trend bull")));
    assert!(lines.iter().any(|l| l.starts_with("skipped 15m")));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["trend"]["final_signal"]["trend"], "bull");
    assert_eq!(json["failures"][0]["timeframe"], "15m");
}

#[tokio::test]
async fn strict_scan_fails_on_missing_timeframe() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());

    let err = run_scan(&cli(dir.path(), true)).await.unwrap_err();
    assert!(format!("{:#}", err).contains("15m"));
}

#[tokio::test]
async fn empty_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(run_scan(&cli(dir.path(), false)).await.is_err());
}
