use anyhow::Result;
use hifitime::Epoch;

/// Milliseconds since the Unix epoch, the resolution used by the data source.
pub type Timestamp = i64;

pub trait TimestampExt {
    fn now_unix_milliseconds() -> Result<Timestamp>;
    fn to_epoch(self) -> Epoch;
    /// Start of a history window of the given length ending at `self`,
    /// without overflowing on very long windows.
    fn window_start(self, window: std::time::Duration) -> Timestamp;
}

impl TimestampExt for Timestamp {
    fn now_unix_milliseconds() -> Result<Timestamp> {
        let now = Epoch::now()?;
        Ok(now.to_unix_milliseconds().floor() as i64)
    }

    fn to_epoch(self) -> Epoch {
        Epoch::from_unix_milliseconds(self as f64)
    }

    fn window_start(self, window: std::time::Duration) -> Timestamp {
        let window = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        self.saturating_sub(window)
    }
}
