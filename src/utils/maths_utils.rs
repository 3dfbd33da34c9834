use argminmax::ArgMinMax;
use statrs::statistics::Statistics;

/// Ordinary least-squares fit of `y` against the synthetic index 0..n-1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, 0.0 when `y` has no variance
    pub r_squared: f64,
}

/// Fit `y = intercept + slope * t` with `t = 0, 1, .., n-1`.
pub fn linear_regression(y: &[f64]) -> LinearFit {
    let n = y.len();
    if n == 0 {
        return LinearFit {
            slope: 0.0,
            intercept: 0.0,
            r_squared: 0.0,
        };
    }

    let n_f = n as f64;
    let mean_t = (n_f - 1.0) / 2.0;
    let mean_y = mean(y);

    let mut s_tt = 0.0;
    let mut s_ty = 0.0;
    for (t, &value) in y.iter().enumerate() {
        let dt = t as f64 - mean_t;
        s_tt += dt * dt;
        s_ty += dt * (value - mean_y);
    }

    let slope = if s_tt > 0.0 { s_ty / s_tt } else { 0.0 };
    let intercept = mean_y - slope * mean_t;

    let ss_tot: f64 = y.iter().map(|v| (v - mean_y).powi(2)).sum();
    // Anything below accumulated rounding noise of the mean counts as a flat series
    let noise_floor = n_f * (4.0 * f64::EPSILON * mean_y.abs()).powi(2);
    let r_squared = if ss_tot <= noise_floor {
        0.0
    } else {
        let ss_res: f64 = y
            .iter()
            .enumerate()
            .map(|(t, v)| (v - (intercept + slope * t as f64)).powi(2))
            .sum();
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    LinearFit {
        slope,
        intercept,
        r_squared,
    }
}

/// Arithmetic mean (NaN for an empty slice)
pub fn mean(values: &[f64]) -> f64 {
    values.iter().mean()
}

/// Population standard deviation (divides by n, not n - 1)
pub fn population_std(values: &[f64]) -> f64 {
    values.iter().population_std_dev()
}

/// Weighted mean of `values`. Caller guarantees equal lengths and a positive weight sum.
pub fn weighted_average(values: &[f64], weights: &[f64]) -> f64 {
    debug_assert_eq!(values.len(), weights.len());
    let total_weight: f64 = weights.iter().sum();
    let weighted_sum: f64 = values.iter().zip(weights).map(|(v, w)| v * w).sum();
    weighted_sum / total_weight
}

pub fn get_max(vec: &[f64]) -> f64 {
    let max_index: usize = vec.argmax();
    vec[max_index]
}

pub fn get_min(vec: &[f64]) -> f64 {
    let min_index: usize = vec.argmin();
    vec[min_index]
}

/// Indices strictly greater than both neighbours. The first and last index never qualify.
pub fn local_maxima(values: &[f64]) -> Vec<usize> {
    values
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > w[0] && w[1] > w[2])
        .map(|(i, _)| i + 1)
        .collect()
}

/// Indices strictly less than both neighbours. The first and last index never qualify.
pub fn local_minima(values: &[f64]) -> Vec<usize> {
    values
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] < w[0] && w[1] < w[2])
        .map(|(i, _)| i + 1)
        .collect()
}

/// Squared Euclidean distance between two feature rows
pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn regression_recovers_exact_line() {
        let y: Vec<f64> = (0..10).map(|t| 3.0 + 2.5 * t as f64).collect();
        let fit = linear_regression(&y);
        assert!(approx_eq(fit.slope, 2.5));
        assert!(approx_eq(fit.intercept, 3.0));
        assert!(approx_eq(fit.r_squared, 1.0));
    }

    #[test]
    fn regression_on_flat_series_has_zero_r_squared() {
        let fit = linear_regression(&[0.1; 40]);
        assert!(approx_eq(fit.slope, 0.0));
        assert_eq!(fit.r_squared, 0.0);
    }

    #[test]
    fn regression_on_noise_is_weak() {
        let fit = linear_regression(&[1.0, -1.0, 1.0, -1.0, 1.0, -1.0]);
        assert!(fit.r_squared < 0.2);
    }

    #[test]
    fn std_is_population_std() {
        // Population std of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 2
        assert!(approx_eq(
            population_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]),
            2.0
        ));
    }

    #[test]
    fn extrema_require_strict_neighbours() {
        let values = [1.0, 3.0, 2.0, 2.0, 0.5, 4.0, 4.0, 1.0];
        assert_eq!(local_maxima(&values), vec![1]);
        assert_eq!(local_minima(&values), vec![4]);
        // Endpoints never count
        assert!(local_maxima(&[5.0, 1.0, 5.0]).is_empty());
        assert!(local_minima(&[1.0, 2.0]).is_empty());
    }

    #[test]
    fn weighted_average_and_min_max() {
        assert!(approx_eq(weighted_average(&[1.0, 3.0], &[3.0, 1.0]), 1.5));
        assert_eq!(get_min(&[3.0, -1.0, 2.0]), -1.0);
        assert_eq!(get_max(&[3.0, -1.0, 2.0]), 3.0);
    }
}
