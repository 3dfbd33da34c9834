use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::utils::TimeUtils;

/// The candle intervals analysed side by side, fastest first.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, EnumIter,
)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "60m")]
    H1,
}

impl Timeframe {
    pub fn interval_minutes(&self) -> i64 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M15 => 15,
            Timeframe::M30 => 30,
            Timeframe::H1 => 60,
        }
    }

    pub fn interval_ms(&self) -> i64 {
        self.interval_minutes() * TimeUtils::MS_IN_MIN
    }

    // Label used in reports and snapshot filenames (the 1h bar is reported as "60m")
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "60m",
        }
    }

    pub fn from_minutes(minutes: i64) -> Option<Self> {
        match minutes {
            1 => Some(Timeframe::M1),
            15 => Some(Timeframe::M15),
            30 => Some(Timeframe::M30),
            60 => Some(Timeframe::H1),
            _ => None,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} ({})",
            self.label(),
            TimeUtils::interval_to_string(self.interval_ms())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn minutes_round_trip_through_lookup() {
        for tf in Timeframe::iter() {
            assert_eq!(Timeframe::from_minutes(tf.interval_minutes()), Some(tf));
        }
        assert_eq!(Timeframe::from_minutes(5), None);
    }

    #[test]
    fn hourly_bar_is_labelled_in_minutes() {
        assert_eq!(Timeframe::H1.label(), "60m");
        assert_eq!(Timeframe::H1.to_string(), "60m (1h)");
    }
}
