use serde::{Deserialize, Serialize};

/// Half-open index range `[start_idx, end_idx)` into a series' candles
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct Zone {
    pub start_idx: usize,
    pub end_idx: usize,
}

impl Zone {
    pub fn new(start_idx: usize, end_idx: usize) -> Self {
        debug_assert!(end_idx > start_idx, "zone must be non-empty");
        Self { start_idx, end_idx }
    }

    pub fn len(&self) -> usize {
        self.end_idx - self.start_idx
    }

    pub fn is_empty(&self) -> bool {
        self.end_idx <= self.start_idx
    }

    /// Index of the last candle inside the zone
    pub fn last_idx(&self) -> usize {
        self.end_idx - 1
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    /// Low-volatility, above-average-volume consolidation
    Accumulation,
    /// Span from an accumulation window through its breakout bar
    Distribution,
}

impl std::fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ZoneKind::Accumulation => write!(f, "Accumulation"),
            ZoneKind::Distribution => write!(f, "Distribution"),
        }
    }
}

/// Result of one zone scan, both lists in scan order
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ZoneScan {
    pub accumulation: Vec<Zone>,
    pub distribution: Vec<Zone>,
}

impl ZoneScan {
    pub fn is_empty(&self) -> bool {
        self.accumulation.is_empty() && self.distribution.is_empty()
    }
}

/// Price/volume summary of one zone
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ZoneStats {
    pub start_idx: usize,
    pub end_idx: usize,
    pub avg_price: f64,
    pub sum_volume: f64,
    /// Average price nudged toward the closes that carried the most volume
    pub forecast_price: f64,
}
