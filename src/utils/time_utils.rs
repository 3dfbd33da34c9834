use chrono::DateTime;

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const MS_IN_MIN: i64 = Self::MS_IN_S * 60;
    pub const MS_IN_15_MIN: i64 = Self::MS_IN_S * 60 * 15;
    pub const MS_IN_30_MIN: i64 = Self::MS_IN_S * 60 * 30;
    pub const MS_IN_H: i64 = Self::MS_IN_MIN * 60;
    pub const MS_IN_D: i64 = Self::MS_IN_H * 24;
    pub const REPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Convert interval in milliseconds to an exchange-style shorthand (e.g. `30m`, `1h`).
    pub fn interval_to_string(interval_ms: i64) -> &'static str {
        match interval_ms {
            Self::MS_IN_MIN => "1m",
            Self::MS_IN_15_MIN => "15m",
            Self::MS_IN_30_MIN => "30m",
            Self::MS_IN_H => "1h",
            Self::MS_IN_D => "1d",
            _ => "unknown",
        }
    }
}

/// UTC display string for an epoch-millisecond timestamp.
/// Out-of-range timestamps fall back to the raw millisecond value.
pub fn epoch_ms_to_utc(epoch_ms: i64) -> String {
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(dt) => dt.format(TimeUtils::REPORT_TIME_FORMAT).to_string(),
        None => epoch_ms.to_string(),
    }
}

/// "timestamp | datetime" form used for candle times in the trend payload
pub fn epoch_ms_to_labelled(epoch_ms: i64) -> String {
    format!("{} | {}", epoch_ms, epoch_ms_to_utc(epoch_ms))
}
