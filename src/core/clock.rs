//! Timestamp sources for captured events
//!
//! Wall-clock milliseconds come from chrono. The nanosecond counter is
//! monotonic and only meaningful relative to other readings in the same
//! process.

use chrono::Utc;
use std::sync::OnceLock;
use std::time::Instant;

static ORIGIN: OnceLock<Instant> = OnceLock::new();

/// Monotonic nanosecond clock anchored at first use
#[derive(Debug, Clone, Copy, Default)]
pub struct NanoClock;

impl NanoClock {
    /// Nanoseconds elapsed since the process-wide origin
    pub fn nanos(&self) -> i64 {
        let origin = ORIGIN.get_or_init(Instant::now);
        i64::try_from(origin.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn current_time_millis() -> i64 {
    Utc::now().timestamp_millis()
}
