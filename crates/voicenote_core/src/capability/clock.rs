//! Wall clock used for note ids and display timestamps.

use chrono::Local;

/// Display format matching `M/D/YYYY, h:mm:ss AM|PM`.
const DISPLAY_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

pub trait Clock: Send {
    /// Current Unix time in epoch milliseconds.
    fn now_epoch_ms(&self) -> i64;
    /// Current local time formatted for display.
    fn display_timestamp(&self) -> String;
}

/// Clock backed by the system local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_ms(&self) -> i64 {
        Local::now().timestamp_millis()
    }

    fn display_timestamp(&self) -> String {
        Local::now().format(DISPLAY_FORMAT).to_string()
    }
}
