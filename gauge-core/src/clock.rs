use dashboard::TimeUnit;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Largest distance from the epoch a server timestamp may have, in
/// milliseconds (about 273,790 years).
pub const MAX_TIMESTAMP_MS: i64 = 8_640_000_000_000_000;

/// Local wall clock in epoch milliseconds.
pub trait WallClock {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Clock that only moves when told to. Clones share the same instant, so a
/// test or a replay driver can keep a handle while the dispatcher owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_millis)),
        }
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl WallClock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Local and server time sampled at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    pub local_ms: i64,
    /// `None` until the first server timestamp has been seen.
    pub server_ms: Option<i64>,
}

/// Estimates the server's current time from the most recent server
/// timestamp plus local time elapsed since it arrived.
///
/// Raw server timestamps are normalized to epoch milliseconds at this
/// boundary: `raw * unit_scale + time_offset_ms`. Everything downstream of the
/// clock works in milliseconds.
#[derive(Debug, Clone)]
pub struct ClockSync<C> {
    clock: C,
    unit: TimeUnit,
    time_offset_ms: i64,
    offset_ms: Option<i64>,
}

impl<C: WallClock> ClockSync<C> {
    pub fn new(clock: C, unit: TimeUnit, time_offset_ms: i64) -> Self {
        Self {
            clock,
            unit,
            time_offset_ms,
            offset_ms: None,
        }
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn time_offset_ms(&self) -> i64 {
        self.time_offset_ms
    }

    /// Epoch milliseconds of a raw server timestamp, or `None` when it is not
    /// a finite time within [`MAX_TIMESTAMP_MS`] of the epoch.
    pub fn to_millis(&self, raw: f64) -> Option<i64> {
        let scaled = (raw * self.unit.millis_scale() as f64).round();
        if !scaled.is_finite() || scaled.abs() > MAX_TIMESTAMP_MS as f64 {
            return None;
        }
        (scaled as i64)
            .checked_add(self.time_offset_ms)
            .filter(|ms| ms.abs() <= MAX_TIMESTAMP_MS)
    }

    /// Re-derives the local/server offset from a fresh server timestamp and
    /// returns the timestamp in milliseconds. Later timestamps replace the
    /// estimate even if they run backwards. Unusable timestamps leave the
    /// clock as it was.
    pub fn sync(&mut self, raw_server_time: f64) -> Option<i64> {
        let server_ms = self.to_millis(raw_server_time)?;
        self.sync_millis(server_ms).then_some(server_ms)
    }

    /// Same as [`sync`](Self::sync) for a timestamp already in milliseconds.
    pub fn sync_millis(&mut self, server_ms: i64) -> bool {
        let Some(offset) = self.clock.now_millis().checked_sub(server_ms) else {
            log::debug!("ignoring server time {server_ms}");
            return false;
        };
        if self.offset_ms.is_none() {
            log::info!("clock synchronized, offset {offset} ms");
        }
        self.offset_ms = Some(offset);
        true
    }

    pub fn is_synced(&self) -> bool {
        self.offset_ms.is_some()
    }

    pub fn offset_ms(&self) -> Option<i64> {
        self.offset_ms
    }

    pub fn local_now(&self) -> i64 {
        self.clock.now_millis()
    }

    pub fn server_now(&self) -> Option<i64> {
        self.offset_ms
            .and_then(|offset| self.clock.now_millis().checked_sub(offset))
    }

    pub fn short_now(&self) -> Option<i64> {
        self.server_now()
            .and_then(|now| now.checked_sub(self.time_offset_ms))
    }

    pub fn moment(&self) -> Moment {
        let local_ms = self.clock.now_millis();
        Moment {
            local_ms,
            server_ms: self
                .offset_ms
                .and_then(|offset| local_ms.checked_sub(offset)),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
