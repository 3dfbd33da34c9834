//! Analysis and computation configuration

/// Settings for the per-timeframe trend detector
#[derive(Debug, Clone, Copy)]
pub struct TrendConfig {
    // Trailing window used for the regression, ATR and local extrema
    pub window_size: usize,
    // Absolute slope (price units per candle) above which a trend is directional
    pub slope_threshold: f64,
    // Number of k-means clusters for the regime cross-check
    pub n_clusters: usize,
    // Fixed seed so the regime cross-check is reproducible
    pub cluster_seed: u64,
    pub cluster_max_iterations: usize,
}

/// Settings for the accumulation/distribution zone scan
#[derive(Debug, Clone, Copy)]
pub struct ZoneConfig {
    pub window_size: usize,
    // Max stdev/mean of window closes for a window to count as consolidation
    pub price_std_threshold: f64,
    // Window mean volume must exceed global mean volume by this factor
    pub volume_multiplier: f64,
    // Bar-to-bar move, in units of accumulation-window stdev, that marks a breakout
    pub breakout_multiplier: f64,
}

/// Multi-timeframe fusion weights, ordered 1m, 15m, 30m, 60m
#[derive(Debug, Clone, Copy)]
pub struct FusionConfig {
    pub timeframe_weights: [f64; 4],
}

/// Settings for the payloads handed to the presentation/summarisation layer
#[derive(Debug, Clone, Copy)]
pub struct ReportConfig {
    // Number of most recent candles attached to each timeframe in the trend payload
    pub simplified_candles: usize,
    // Forecast projection length relative to the zone length
    pub forecast_multiplier: f64,
}

/// The Master Analysis Configuration
#[derive(Debug, Clone, Copy)]
pub struct AnalysisConfig {
    pub trend: TrendConfig,
    pub zones: ZoneConfig,
    pub fusion: FusionConfig,
    pub report: ReportConfig,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    trend: TrendConfig {
        window_size: 40,
        slope_threshold: 0.5,
        n_clusters: 3,
        cluster_seed: 42,
        cluster_max_iterations: 300,
    },

    zones: ZoneConfig {
        window_size: 20,
        price_std_threshold: 0.005,
        volume_multiplier: 1.2,
        breakout_multiplier: 1.5,
    },

    // Slower timeframes carry more conviction
    fusion: FusionConfig {
        timeframe_weights: [1.0, 2.0, 3.0, 4.0],
    },

    report: ReportConfig {
        simplified_candles: 50,
        forecast_multiplier: 0.5,
    },
};
