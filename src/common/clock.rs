use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Latest timestamp handed out by any [`SystemClock`] in this process
static HIGH_WATER_MILLIS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Source of error timestamps
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock truncated to milliseconds that never runs backwards.
///
/// Readings are clamped to the latest value handed out process-wide, so
/// neither a system clock step back nor a second responder can reorder
/// timestamps of sequential errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now().timestamp_millis();
        let previous = HIGH_WATER_MILLIS.fetch_max(wall, Ordering::AcqRel);
        let millis = previous.max(wall);
        DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
    }
}
