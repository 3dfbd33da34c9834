//! Regime cross-check: clusters every sliding window of a series in [slope, R², ATR] space
//! and labels the current window by where its cluster sits in the slope ordering.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::analysis::AnalysisError;
use crate::analysis::trend_detector::{
    TrendParams, analysis_for_label, classify_slope, trailing_window, window_features,
};
use crate::config::{ANALYSIS, DEBUG_FLAGS};
use crate::models::{CandleSeries, RegimeAnalysis, Trend};
use crate::utils::maths_utils::squared_distance;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeParams {
    pub trend: TrendParams,
    pub n_clusters: usize,
    pub seed: u64,
    pub max_iterations: usize,
}

impl Default for RegimeParams {
    fn default() -> Self {
        Self {
            trend: TrendParams::default(),
            n_clusters: ANALYSIS.trend.n_clusters,
            seed: ANALYSIS.trend.cluster_seed,
            max_iterations: ANALYSIS.trend.cluster_max_iterations,
        }
    }
}

/// Seeded k-means (k-means++ initialisation, Lloyd iterations)
#[derive(Debug, Clone, Copy)]
pub struct KMeans {
    pub n_clusters: usize,
    pub max_iterations: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clustering<const D: usize> {
    pub centroids: Vec<[f64; D]>,
    /// Cluster of each input row
    pub labels: Vec<usize>,
    pub iterations: usize,
}

impl KMeans {
    /// Cluster `rows`. Caller guarantees `1 <= n_clusters <= rows.len()`.
    pub fn fit<const D: usize>(&self, rows: &[[f64; D]]) -> Clustering<D> {
        debug_assert!(self.n_clusters >= 1 && self.n_clusters <= rows.len());
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = self.init_plus_plus(rows, &mut rng);
        let mut labels = assign(rows, &centroids);
        let mut iterations = 0;

        while iterations < self.max_iterations {
            iterations += 1;
            centroids = update_centroids(rows, &labels, &centroids);
            let new_labels = assign(rows, &centroids);
            if new_labels == labels {
                break;
            }
            labels = new_labels;
        }

        Clustering {
            centroids,
            labels,
            iterations,
        }
    }

    fn init_plus_plus<const D: usize>(
        &self,
        rows: &[[f64; D]],
        rng: &mut StdRng,
    ) -> Vec<[f64; D]> {
        let mut centroids = Vec::with_capacity(self.n_clusters);
        centroids.push(rows[rng.gen_range(0..rows.len())]);

        while centroids.len() < self.n_clusters {
            let distances: Vec<f64> = rows
                .iter()
                .map(|row| {
                    centroids
                        .iter()
                        .map(|c| squared_distance(row, c))
                        .fold(f64::INFINITY, f64::min)
                })
                .collect();
            let total: f64 = distances.iter().sum();

            let next = if total > 0.0 && total.is_finite() {
                let target = rng.r#gen::<f64>() * total;
                let mut cumulative = 0.0;
                distances
                    .iter()
                    .position(|d| {
                        cumulative += d;
                        cumulative >= target
                    })
                    .unwrap_or(rows.len() - 1)
            } else {
                // Every row already coincides with a centroid
                rng.gen_range(0..rows.len())
            };
            centroids.push(rows[next]);
        }
        centroids
    }
}

fn assign<const D: usize>(rows: &[[f64; D]], centroids: &[[f64; D]]) -> Vec<usize> {
    rows.iter()
        .map(|row| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (j, c) in centroids.iter().enumerate() {
                let dist = squared_distance(row, c);
                if dist < best_dist {
                    best_dist = dist;
                    best = j;
                }
            }
            best
        })
        .collect()
}

// Empty clusters keep their previous centroid
fn update_centroids<const D: usize>(
    rows: &[[f64; D]],
    labels: &[usize],
    previous: &[[f64; D]],
) -> Vec<[f64; D]> {
    let mut sums = vec![[0.0; D]; previous.len()];
    let mut counts = vec![0usize; previous.len()];
    for (row, &label) in rows.iter().zip(labels) {
        counts[label] += 1;
        for (acc, v) in sums[label].iter_mut().zip(row) {
            *acc += v;
        }
    }
    sums.iter()
        .zip(&counts)
        .zip(previous)
        .map(|((sum, &count), prev)| {
            if count == 0 {
                *prev
            } else {
                sum.map(|s| s / count as f64)
            }
        })
        .collect()
}

/// Label the current window by its regime cluster: the cluster with the highest mean slope is
/// bull, the lowest is bear, any other is side. With a single cluster the highest check wins.
pub fn regime_trend<const D: usize>(clustering: &Clustering<D>, current: usize) -> Trend {
    // Slope is feature 0
    let mut order: Vec<usize> = (0..clustering.centroids.len()).collect();
    order.sort_by(|&a, &b| clustering.centroids[a][0].total_cmp(&clustering.centroids[b][0]));
    match (order.first(), order.last()) {
        (_, Some(&highest)) if highest == current => Trend::Bull,
        (Some(&lowest), _) if lowest == current => Trend::Bear,
        _ => Trend::Side,
    }
}

/// Regime-consistency cross-check of `series`. Needs one sliding window per cluster at least.
pub fn analyze_regime(
    series: &CandleSeries,
    params: &RegimeParams,
) -> Result<RegimeAnalysis, AnalysisError> {
    params.trend.validate()?;
    if params.n_clusters == 0 {
        return Err(AnalysisError::InvalidTrendConfig {
            parameter: "n_clusters",
            value: 0.0,
        });
    }

    let window_size = params.trend.window_size;
    let required = window_size + params.n_clusters - 1;
    if series.len() < required {
        return Err(AnalysisError::InsufficientData {
            required,
            available: series.len(),
        });
    }

    let features: Vec<_> = series
        .candles()
        .windows(window_size)
        .map(window_features)
        .collect();
    let rows: Vec<[f64; 3]> = features.iter().map(|f| f.as_row()).collect();

    let kmeans = KMeans {
        n_clusters: params.n_clusters,
        max_iterations: params.max_iterations,
        seed: params.seed,
    };
    let clustering = kmeans.fit(&rows);

    // The last sliding window is the trailing window
    let current = clustering.labels[clustering.labels.len() - 1];
    let trend = regime_trend(&clustering, current);

    if DEBUG_FLAGS.print_clustering {
        log::debug!(
            "[regime] {} {}m: {} windows, {} iterations, current cluster {} -> {}",
            series.symbol(),
            series.interval_minutes(),
            rows.len(),
            clustering.iterations,
            current,
            trend
        );
    }

    let window = trailing_window(series, window_size)?;
    let current_features = &features[features.len() - 1];
    let analysis = analysis_for_label(trend, window, current_features);
    let primary = classify_slope(current_features.fit.slope, params.trend.slope_threshold);

    Ok(RegimeAnalysis {
        analysis,
        cluster: current,
        cluster_count: params.n_clusters,
        agrees_with_primary: primary == trend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Candle;

    fn series_from_closes(closes: &[f64]) -> CandleSeries {
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(i as i64 * 60_000, c, c + 0.5, c - 0.5, c, 100.0))
            .collect();
        CandleSeries::new("ETHUSDT", 15, candles).unwrap()
    }

    #[test]
    fn kmeans_separates_obvious_groups() {
        let rows = [[0.0, 0.0], [0.1, 0.0], [10.0, 10.0], [10.1, 9.9], [-10.0, 5.0], [-9.9, 5.1]];
        let kmeans = KMeans {
            n_clusters: 3,
            max_iterations: 100,
            seed: 7,
        };
        let clustering = kmeans.fit(&rows);
        assert_eq!(clustering.labels[0], clustering.labels[1]);
        assert_eq!(clustering.labels[2], clustering.labels[3]);
        assert_eq!(clustering.labels[4], clustering.labels[5]);
        assert_ne!(clustering.labels[0], clustering.labels[2]);
        assert_ne!(clustering.labels[0], clustering.labels[4]);
        assert_ne!(clustering.labels[2], clustering.labels[4]);
    }

    #[test]
    fn kmeans_is_reproducible_for_a_fixed_seed() {
        let rows: Vec<[f64; 3]> = (0..50)
            .map(|i| [(i as f64 * 0.37).sin(), (i as f64 * 0.11).cos(), i as f64 * 0.01])
            .collect();
        let kmeans = KMeans {
            n_clusters: 4,
            max_iterations: 300,
            seed: 42,
        };
        assert_eq!(kmeans.fit(&rows), kmeans.fit(&rows));
    }

    #[test]
    fn kmeans_handles_duplicate_points() {
        let rows = [[1.0, 1.0]; 5];
        let kmeans = KMeans {
            n_clusters: 3,
            max_iterations: 10,
            seed: 1,
        };
        let clustering = kmeans.fit(&rows);
        assert_eq!(clustering.labels.len(), 5);
        assert_eq!(clustering.centroids.len(), 3);
    }

    #[test]
    fn regime_label_follows_centroid_slope_ordering() {
        let clustering = Clustering {
            centroids: vec![[0.0, 0.5, 1.0], [2.0, 0.9, 1.0], [-2.0, 0.9, 1.0]],
            labels: vec![0, 1, 2],
            iterations: 1,
        };
        assert_eq!(regime_trend(&clustering, 1), Trend::Bull);
        assert_eq!(regime_trend(&clustering, 2), Trend::Bear);
        assert_eq!(regime_trend(&clustering, 0), Trend::Side);
    }

    #[test]
    fn regime_after_decline_then_rally_is_bull() {
        // Flat, then a steep decline, then a steep rally ending the series
        let mut closes: Vec<f64> = vec![500.0; 80];
        closes.extend((1..=80).map(|i| 500.0 - 3.0 * i as f64));
        closes.extend((1..=80).map(|i| 260.0 + 3.0 * i as f64));
        let series = series_from_closes(&closes);
        let regime = analyze_regime(&series, &RegimeParams::default()).unwrap();
        assert_eq!(regime.analysis.trend, Trend::Bull);
        assert!(regime.agrees_with_primary);
        assert_eq!(regime.cluster_count, 3);
    }

    #[test]
    fn regime_requires_a_window_per_cluster() {
        let series = series_from_closes(&[1.0; 41]);
        let err = analyze_regime(&series, &RegimeParams::default()).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientData {
                required: 42,
                available: 41
            }
        );
    }

    #[test]
    fn zero_clusters_is_a_config_error() {
        let series = series_from_closes(&[1.0; 60]);
        let params = RegimeParams {
            n_clusters: 0,
            ..Default::default()
        };
        assert!(matches!(
            analyze_regime(&series, &params),
            Err(AnalysisError::InvalidTrendConfig { .. })
        ));
    }
}
