use crate::models::{Zone, ZoneStats};
use crate::utils::maths_utils::mean;

/// Average close, total volume and volume-weighted forecast price of each zone.
///
/// forecast = avg + Σ (close_i - avg) * volume_i / total_volume, i.e. the average pulled toward
/// the closes that traded the most. With zero or uniform volume the forecast is the average.
pub fn calculate_zone_stats(closes: &[f64], volumes: &[f64], zones: &[Zone]) -> Vec<ZoneStats> {
    zones
        .iter()
        .map(|zone| {
            let zone_closes = &closes[zone.start_idx..zone.end_idx];
            let zone_volumes = &volumes[zone.start_idx..zone.end_idx];
            let avg_price = mean(zone_closes);
            let sum_volume: f64 = zone_volumes.iter().sum();

            let uniform_volume = zone_volumes.windows(2).all(|w| w[0] == w[1]);
            let forecast_price = if sum_volume > 0.0 && !uniform_volume {
                avg_price
                    + zone_closes
                        .iter()
                        .zip(zone_volumes)
                        .map(|(c, v)| (c - avg_price) * (v / sum_volume))
                        .sum::<f64>()
            } else {
                avg_price
            };

            ZoneStats {
                start_idx: zone.start_idx,
                end_idx: zone.end_idx,
                avg_price,
                sum_volume,
                forecast_price,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_volume_forecast_equals_average() {
        let closes = [10.0, 11.0, 12.0, 13.0];
        let volumes = [2.0, 2.0, 2.0, 2.0];
        let stats = calculate_zone_stats(&closes, &volumes, &[Zone::new(0, 4)]);
        assert_eq!(stats[0].avg_price, 11.5);
        assert_eq!(stats[0].sum_volume, 8.0);
        assert_eq!(stats[0].forecast_price, stats[0].avg_price);
    }

    #[test]
    fn forecast_leans_toward_heavy_volume() {
        let closes = [10.0, 20.0];
        let volumes = [1.0, 3.0];
        let stats = calculate_zone_stats(&closes, &volumes, &[Zone::new(0, 2)]);
        assert_eq!(stats[0].avg_price, 15.0);
        // 15 + (-5 * 0.25) + (5 * 0.75)
        assert!((stats[0].forecast_price - 17.5).abs() < 1e-12);
    }

    #[test]
    fn zero_volume_zone_forecasts_the_average() {
        let stats = calculate_zone_stats(&[1.0, 2.0, 3.0], &[0.0; 3], &[Zone::new(1, 3)]);
        assert_eq!(stats[0].start_idx, 1);
        assert_eq!(stats[0].end_idx, 3);
        assert_eq!(stats[0].sum_volume, 0.0);
        assert_eq!(stats[0].forecast_price, 2.5);
    }
}
