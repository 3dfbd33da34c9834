//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so release
//! builds remain quiet.

/// Emit every accumulation window and breakout found during the zone scan.
pub const PRINT_ZONE_SCAN: bool = false;

/// Emit the per-window regression/ATR values of the trailing trend window.
pub const PRINT_TREND_WINDOW: bool = false;

/// Emit k-means convergence details for the regime cross-check.
pub const PRINT_CLUSTERING: bool = false;

/// Emit timing of each timeframe job in the scanner.
pub const PRINT_SCANNER_TIMINGS: bool = true;

/// Emit which snapshot source produced each series.
pub const PRINT_DATA_SOURCES: bool = true;

pub struct DebugFlags {
    pub print_zone_scan: bool,
    pub print_trend_window: bool,
    pub print_clustering: bool,
    pub print_scanner_timings: bool,
    pub print_data_sources: bool,
}

pub const DEBUG_FLAGS: DebugFlags = DebugFlags {
    print_zone_scan: PRINT_ZONE_SCAN,
    print_trend_window: PRINT_TREND_WINDOW,
    print_clustering: PRINT_CLUSTERING,
    print_scanner_timings: PRINT_SCANNER_TIMINGS,
    print_data_sources: PRINT_DATA_SOURCES,
};
