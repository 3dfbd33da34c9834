//! Accumulation/distribution zone scan.
//!
//! A single left-to-right pass with a cursor that only moves forward:
//! 1. A window qualifies as accumulation when its closes barely move (stdev/mean below the
//!    threshold) while its mean volume clearly beats the series-wide mean.
//! 2. From the end of an accumulation window we look for the first bar-to-bar move larger than
//!    a multiple of the window's stdev. The span up to that move is the distribution zone.
//! 3. The cursor skips past whatever was consumed, so zones of one kind never overlap.

use crate::analysis::AnalysisError;
use crate::config::{ANALYSIS, DEBUG_FLAGS};
use crate::models::{CandleSeries, Zone, ZoneScan};
use crate::utils::maths_utils::{mean, population_std};

/// Runtime parameters of the zone scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneParams {
    pub window_size: usize,
    pub price_std_threshold: f64,
    pub volume_multiplier: f64,
    pub breakout_multiplier: f64,
}

impl Default for ZoneParams {
    fn default() -> Self {
        Self {
            window_size: ANALYSIS.zones.window_size,
            price_std_threshold: ANALYSIS.zones.price_std_threshold,
            volume_multiplier: ANALYSIS.zones.volume_multiplier,
            breakout_multiplier: ANALYSIS.zones.breakout_multiplier,
        }
    }
}

impl ZoneParams {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.window_size == 0 {
            return Err(AnalysisError::InvalidZoneConfig {
                parameter: "window_size",
                value: 0.0,
            });
        }
        let checks = [
            ("price_std_threshold", self.price_std_threshold),
            ("volume_multiplier", self.volume_multiplier),
            ("breakout_multiplier", self.breakout_multiplier),
        ];
        for (parameter, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalysisError::InvalidZoneConfig { parameter, value });
            }
        }
        Ok(())
    }
}

/// Offset (into the bar-to-bar differences after `from`) of the first move above `threshold`
fn find_breakout(closes: &[f64], from: usize, threshold: f64) -> Option<usize> {
    closes
        .get(from..)?
        .windows(2)
        .position(|w| (w[1] - w[0]).abs() > threshold)
}

/// Scan `closes`/`volumes` (equal length, oldest first) for accumulation and distribution zones.
pub fn scan_zones(closes: &[f64], volumes: &[f64], params: &ZoneParams) -> ZoneScan {
    debug_assert_eq!(closes.len(), volumes.len());
    let mut scan = ZoneScan::default();
    let n = closes.len();
    let w = params.window_size;
    if n < w {
        return scan;
    }

    let avg_volume = mean(volumes);
    let mut i = 0;
    while i + w <= n {
        let window = &closes[i..i + w];
        let window_std = population_std(window);
        let dispersion = window_std / mean(window);
        let window_volume = mean(&volumes[i..i + w]);

        let is_accumulation = dispersion < params.price_std_threshold
            && window_volume > avg_volume * params.volume_multiplier;
        if !is_accumulation {
            i += 1;
            continue;
        }

        scan.accumulation.push(Zone::new(i, i + w));

        let threshold = window_std * params.breakout_multiplier;
        match find_breakout(closes, i + w, threshold) {
            Some(offset) => {
                let end = i + w + offset + 1;
                if DEBUG_FLAGS.print_zone_scan {
                    log::debug!(
                        "[zones] accumulation [{}, {}) broke out at offset {} -> distribution [{}, {})",
                        i,
                        i + w,
                        offset,
                        i,
                        end
                    );
                }
                scan.distribution.push(Zone::new(i, end));
                i = end;
            }
            None => {
                if DEBUG_FLAGS.print_zone_scan {
                    log::debug!("[zones] accumulation [{}, {}) without breakout", i, i + w);
                }
                i += w;
            }
        }
    }

    scan
}

/// Zone scan over a candle series. A series shorter than the window yields no zones.
pub fn find_accumulation_and_distribution(
    series: &CandleSeries,
    params: &ZoneParams,
) -> Result<ZoneScan, AnalysisError> {
    params.validate()?;
    Ok(scan_zones(&series.closes(), &series.volumes(), params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Candle;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // Gentle triangle wave around 100 (stdev/mean about 0.0025, steps of 0.2)
    const TIGHT: [f64; 8] = [100.0, 100.2, 100.4, 100.2, 100.0, 99.8, 99.6, 99.8];

    fn noisy(i: usize) -> f64 {
        if i % 2 == 0 { 95.0 } else { 105.0 }
    }

    /// Noisy low-volume bars with a tight high-volume run over `tight`
    fn build(n: usize, tight: std::ops::Range<usize>) -> (Vec<f64>, Vec<f64>) {
        let mut closes = Vec::with_capacity(n);
        let mut volumes = Vec::with_capacity(n);
        for i in 0..n {
            if tight.contains(&i) {
                closes.push(TIGHT[(i - tight.start) % TIGHT.len()]);
                volumes.push(4.0);
            } else {
                closes.push(noisy(i));
                volumes.push(1.0);
            }
        }
        (closes, volumes)
    }

    #[test]
    fn detects_accumulation_and_its_breakout() {
        let (closes, volumes) = build(100, 40..70);
        let scan = scan_zones(&closes, &volumes, &ZoneParams::default());
        assert_eq!(scan.accumulation, vec![Zone::new(40, 60)]);
        // First big move is bar 69 -> 70, offset 9 after the window
        assert_eq!(scan.distribution, vec![Zone::new(40, 70)]);
    }

    #[test]
    fn breakout_offset_sets_distribution_end() {
        // Window [10, 30), three more quiet bars, then the jump from bar 33 to 34
        let k = 3;
        let (closes, volumes) = build(60, 10..34);
        let scan = scan_zones(&closes, &volumes, &ZoneParams::default());
        assert_eq!(scan.accumulation[0], Zone::new(10, 30));
        assert_eq!(scan.distribution[0], Zone::new(10, 30 + k + 1));
    }

    #[test]
    fn accumulation_at_series_end_has_no_distribution() {
        // The tight run ends exactly at the end of the series
        let (closes, volumes) = build(50, 30..50);
        let scan = scan_zones(&closes, &volumes, &ZoneParams::default());
        assert_eq!(scan.accumulation, vec![Zone::new(30, 50)]);
        assert!(scan.distribution.is_empty());
    }

    #[test]
    fn breakout_on_the_last_bar_is_found() {
        // Quiet until the second-to-last bar, then the final bar jumps
        let (mut closes, volumes) = build(52, 30..52);
        closes[51] = 120.0;
        let scan = scan_zones(&closes, &volumes, &ZoneParams::default());
        assert_eq!(scan.accumulation, vec![Zone::new(30, 50)]);
        assert_eq!(scan.distribution, vec![Zone::new(30, 51)]);
    }

    #[test]
    fn quiet_but_thin_market_is_not_accumulation() {
        // Tight prices everywhere with uniform volume: never above 1.2x the mean
        let closes: Vec<f64> = (0..80).map(|i| TIGHT[i % TIGHT.len()]).collect();
        let volumes = vec![5.0; 80];
        assert!(scan_zones(&closes, &volumes, &ZoneParams::default()).is_empty());
    }

    #[test]
    fn short_series_yields_no_zones() {
        let scan = scan_zones(&[100.0; 19], &[1.0; 19], &ZoneParams::default());
        assert!(scan.is_empty());
    }

    #[test]
    fn zones_are_disjoint_and_ordered_on_random_walks() {
        let params = ZoneParams {
            window_size: 10,
            price_std_threshold: 0.01,
            volume_multiplier: 1.0,
            breakout_multiplier: 1.5,
        };
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut price = 100.0;
            let mut closes = Vec::new();
            let mut volumes = Vec::new();
            for _ in 0..400 {
                price += rng.gen_range(-0.5..0.5);
                closes.push(price);
                volumes.push(rng.gen_range(0.5..3.0));
            }
            let scan = scan_zones(&closes, &volumes, &params);
            for zones in [&scan.accumulation, &scan.distribution] {
                for zone in zones.iter() {
                    assert!(zone.end_idx > zone.start_idx);
                    assert!(zone.end_idx <= closes.len());
                }
                for pair in zones.windows(2) {
                    assert!(pair[0].start_idx <= pair[1].start_idx);
                    assert!(pair[0].end_idx <= pair[1].start_idx);
                }
            }
        }
    }

    #[test]
    fn non_positive_parameters_are_rejected() {
        let candles = (0..5)
            .map(|i| Candle::new(i * 60_000, 1.0, 1.0, 1.0, 1.0, 1.0))
            .collect();
        let series = CandleSeries::new("BTCUSDT", 1, candles).unwrap();
        let params = ZoneParams {
            breakout_multiplier: 0.0,
            ..Default::default()
        };
        assert_eq!(
            find_accumulation_and_distribution(&series, &params),
            Err(AnalysisError::InvalidZoneConfig {
                parameter: "breakout_multiplier",
                value: 0.0
            })
        );
        let params = ZoneParams {
            window_size: 0,
            ..Default::default()
        };
        assert!(find_accumulation_and_distribution(&series, &params).is_err());
    }
}
