//! Gridline spacing and value bounds for history gauges.
//!
//! Time steps come from a fixed ascending list of human durations and value
//! steps from a "nice number" list; in both cases the first candidate that
//! keeps the gridline count under its cap wins.

use crate::buffer::MAX_WINDOW_MS;

pub const MAX_TIME_GRIDLINES: i64 = 10;
pub const MAX_VALUE_GRIDLINES: f64 = 5.0;

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeStep {
    pub millis: i64,
    pub label: &'static str,
}

pub const TIME_STEPS: [TimeStep; 11] = [
    TimeStep { millis: SECOND_MS, label: "sec" },
    TimeStep { millis: MINUTE_MS, label: "min" },
    TimeStep { millis: 10 * MINUTE_MS, label: "10min" },
    TimeStep { millis: 20 * MINUTE_MS, label: "20min" },
    TimeStep { millis: 30 * MINUTE_MS, label: "30min" },
    TimeStep { millis: HOUR_MS, label: "hour" },
    TimeStep { millis: 2 * HOUR_MS, label: "2hour" },
    TimeStep { millis: 3 * HOUR_MS, label: "3hour" },
    TimeStep { millis: 6 * HOUR_MS, label: "6hour" },
    TimeStep { millis: 12 * HOUR_MS, label: "12hour" },
    TimeStep { millis: DAY_MS, label: "day" },
];

const VALUE_STEPS: [f64; 9] = [0.1, 0.5, 1.0, 5.0, 10.0, 50.0, 100.0, 200.0, 500.0];

/// Unit that time gridlines are anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorUnit {
    Second,
    Hour,
    Day,
}

impl AnchorUnit {
    pub fn millis(self) -> i64 {
        match self {
            AnchorUnit::Second => SECOND_MS,
            AnchorUnit::Hour => HOUR_MS,
            AnchorUnit::Day => DAY_MS,
        }
    }
}

impl TimeStep {
    pub fn anchor_unit(&self) -> AnchorUnit {
        if self.millis < MINUTE_MS {
            AnchorUnit::Second
        } else if self.millis < HOUR_MS {
            AnchorUnit::Hour
        } else {
            AnchorUnit::Day
        }
    }
}

/// Smallest step with `window_ms / step <= 10`; windows longer than ten days
/// fall back to the day step.
pub fn time_step_for(window_ms: i64) -> TimeStep {
    TIME_STEPS
        .iter()
        .copied()
        .find(|step| window_ms <= step.millis * MAX_TIME_GRIDLINES)
        .unwrap_or(TIME_STEPS[TIME_STEPS.len() - 1])
}

fn value_step_candidates() -> impl Iterator<Item = f64> {
    VALUE_STEPS
        .into_iter()
        .chain(std::iter::successors(Some(5_000.0), |step| Some(step * 10.0)))
}

/// Smallest step with `range / step <= 5`. Degenerate ranges (zero, negative
/// or non-finite) get the smallest candidate.
pub fn value_step_for(range: f64) -> f64 {
    if !range.is_finite() || range <= 0.0 {
        return VALUE_STEPS[0];
    }
    value_step_candidates()
        .find(|step| range <= step * MAX_VALUE_GRIDLINES)
        .unwrap_or(f64::MAX)
}

/// Rounds `now_ms` down to the start of the step's anchor unit in a zone
/// `zone_offset_ms` east of UTC (whole second, top of the hour, or midnight).
pub fn anchor_time(now_ms: i64, step: TimeStep, zone_offset_ms: i64) -> i64 {
    let unit = step.anchor_unit().millis();
    let local = now_ms + zone_offset_ms;
    local - local.rem_euclid(unit) - zone_offset_ms
}

/// Bounds pushed by the server or configured on the gauge. Each side that is
/// set overrides the buffer-derived extent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PinnedBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PinnedBounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            min: min.filter(|v| v.is_finite()),
            max: max.filter(|v| v.is_finite()),
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.min.is_some() && self.max.is_some()
    }

    /// Final `(min, max)` for the axis. No data and no pins gives `(0, 0)`.
    pub fn resolve(&self, extent: Option<(f64, f64)>) -> (f64, f64) {
        let min = self.min.or(extent.map(|(min, _)| min)).unwrap_or(0.0);
        let max = self.max.or(extent.map(|(_, max)| max)).unwrap_or(0.0);
        if min <= max {
            (min, max)
        } else {
            (max, min)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisState {
    pub min: f64,
    pub max: f64,
    pub value_step: f64,
    pub time_step: TimeStep,
    pub anchor_time: i64,
    pub window_ms: i64,
}

impl AxisState {
    pub fn compute(window_ms: i64, min: f64, max: f64, now_ms: i64, zone_offset_ms: i64) -> Self {
        let min = if min.is_finite() { min } else { 0.0 };
        let max = if max.is_finite() { max } else { min };
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let window_ms = window_ms.clamp(1, MAX_WINDOW_MS);
        let time_step = time_step_for(window_ms);
        Self {
            min,
            max,
            value_step: value_step_for(max - min),
            time_step,
            anchor_time: anchor_time(now_ms, time_step, zone_offset_ms),
            window_ms,
        }
    }

    pub fn value_range(&self) -> f64 {
        self.max - self.min
    }

    /// Times of the gridlines inside `[now - window, now]`, oldest first.
    pub fn time_gridlines(&self, now_ms: i64) -> Vec<i64> {
        let step = self.time_step.millis;
        let start = now_ms.saturating_sub(self.window_ms);
        let since_anchor = start.saturating_sub(self.anchor_time);
        let first_index =
            since_anchor.div_euclid(step) + i64::from(since_anchor.rem_euclid(step) != 0);
        let mut lines = Vec::new();
        let mut next = first_index
            .checked_mul(step)
            .and_then(|offset| self.anchor_time.checked_add(offset));
        while let Some(t) = next {
            if t > now_ms || lines.len() > MAX_TIME_GRIDLINES as usize {
                break;
            }
            lines.push(t);
            next = t.checked_add(step);
        }
        lines
    }

    /// Values of the gridlines at multiples of the step inside `[min, max]`.
    pub fn value_gridlines(&self) -> Vec<f64> {
        let step = self.value_step;
        if step <= 0.0 || !step.is_finite() || !self.value_range().is_finite() {
            return Vec::new();
        }
        let tolerance = step * 1e-9;
        let mut lines = Vec::new();
        let mut index = (self.min / step).ceil();
        loop {
            let value = index * step;
            if value > self.max + tolerance || lines.len() > MAX_VALUE_GRIDLINES as usize {
                break;
            }
            lines.push(value);
            index += 1.0;
        }
        lines
    }

    fn differs(&self, window_ms: i64, min: f64, max: f64) -> bool {
        fn close(a: f64, b: f64) -> bool {
            (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
        }
        self.window_ms != window_ms.max(1) || !close(self.min, min) || !close(self.max, max)
    }
}

/// Holds the current axis and recomputes it only when the window or the
/// value extent actually changes.
#[derive(Debug, Clone, Default)]
pub struct AxisScaler {
    state: Option<AxisState>,
    zone_offset_ms: i64,
}

impl AxisScaler {
    pub fn new(zone_offset_ms: i64) -> Self {
        Self {
            state: None,
            zone_offset_ms,
        }
    }

    pub fn state(&self) -> Option<&AxisState> {
        self.state.as_ref()
    }

    pub fn zone_offset_ms(&self) -> i64 {
        self.zone_offset_ms
    }

    /// Returns whether the axis was recomputed.
    pub fn update(&mut self, window_ms: i64, extent: (f64, f64), now_ms: i64) -> bool {
        let (min, max) = extent;
        let stale = match &self.state {
            None => true,
            Some(state) => state.differs(window_ms, min, max),
        };
        if stale {
            self.state = Some(AxisState::compute(
                window_ms,
                min,
                max,
                now_ms,
                self.zone_offset_ms,
            ));
        }
        stale
    }

    pub fn reset(&mut self) {
        self.state = None;
    }
}
