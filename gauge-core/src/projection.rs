use crate::axis::AxisState;
use crate::buffer::SampleBuffer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Drawing area of a gauge. The history strip fills the whole box with the
/// newest instant on the right edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(100.0, 40.0)
    }
}

/// Number of trailing points drawn as the live cursor.
pub const CURSOR_POINTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Projection {
    pub points: Vec<Point>,
    pub cursor: Vec<Point>,
    /// X coordinates of the time gridlines.
    pub time_grid: Vec<f64>,
    /// Y coordinates of the value gridlines.
    pub value_grid: Vec<f64>,
}

/// X of `time` in a strip whose right edge is `now`.
pub fn project_time(time: i64, now: i64, window_ms: i64, width: f64) -> f64 {
    let window = window_ms.max(1) as f64;
    (window - (now - time) as f64) / window * width
}

/// Y of `value` with larger values higher up. A zero-width range puts every
/// value on the middle line.
pub fn project_value(value: f64, min: f64, max: f64, height: f64) -> f64 {
    let range = max - min;
    if !range.is_finite() || range <= f64::EPSILON || !value.is_finite() {
        return height / 2.0;
    }
    (max - value) / range * height
}

/// Maps the buffer into viewport coordinates. Pure: the same buffer, axis and
/// `now` always give the same projection.
pub fn project(buffer: &SampleBuffer, axis: &AxisState, now: i64, viewport: Viewport) -> Projection {
    let points: Vec<Point> = buffer
        .iter()
        .map(|sample| {
            Point::new(
                project_time(sample.time, now, axis.window_ms, viewport.width),
                project_value(sample.value, axis.min, axis.max, viewport.height),
            )
        })
        .collect();
    let cursor = points[points.len().saturating_sub(CURSOR_POINTS)..].to_vec();
    let time_grid = axis
        .time_gridlines(now)
        .into_iter()
        .map(|t| project_time(t, now, axis.window_ms, viewport.width))
        .collect();
    let value_grid = axis
        .value_gridlines()
        .into_iter()
        .map(|v| project_value(v, axis.min, axis.max, viewport.height))
        .collect();
    Projection {
        points,
        cursor,
        time_grid,
        value_grid,
    }
}
