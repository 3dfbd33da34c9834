use serde::{Deserialize, Serialize};

// A single closed (or still forming, see `confirm`) price/volume bar
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    /// Open time as epoch milliseconds
    pub start: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,

    pub volume: f64,
    #[serde(default)]
    pub turnover: f64,
    /// Whether the exchange considers this candle closed
    #[serde(default = "default_confirm")]
    pub confirm: bool,
}

fn default_confirm() -> bool {
    true
}

impl Candle {
    // A constructor for convenience
    pub fn new(start: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Candle {
            start,
            open,
            high,
            low,
            close,
            volume,
            turnover: volume * close,
            confirm: true,
        }
    }

    /// True Range against the previous candle's close:
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        (self.high - self.low)
            .max((self.high - prev_close).abs())
            .max((self.low - prev_close).abs())
    }
}
