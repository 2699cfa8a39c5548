//! Backend-neutral drawing vocabulary.
//!
//! Gauges describe a frame as a list of [`DrawCommand`]s in viewport
//! coordinates (origin top-left, y down). Turning the commands into pixels
//! is the job of whoever consumes them.

use crate::axis::AxisState;
use crate::projection::{Point, Projection, Viewport};

pub const PADDING: f64 = 5.0;
pub const LABEL_SIZE: f64 = 0.5;
pub const VALUE_SIZE: f64 = 2.0;
pub const AXIS_LABEL_SIZE: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Blue,
    Red,
    Black,
    Magenta,
    Orange,
    Green,
    Gray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Title,
    Unit,
    Value,
    SecondValue,
    ValueStep,
    TimeStep,
    Row,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    TimeGrid,
    ValueGrid,
    History,
    Cursor,
    Needle,
    Course,
    Boat,
    Shaft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeRole {
    CourseMarker,
    WindTip,
    WindTail,
    WindArrow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Frame {
        width: f64,
        height: f64,
    },
    Text {
        role: TextRole,
        at: Point,
        content: String,
        anchor: TextAnchor,
        /// Font size in em.
        size: f64,
        /// Clockwise degrees around `at`.
        rotation: f64,
    },
    Polyline {
        role: LineRole,
        points: Vec<Point>,
    },
    Polygon {
        role: ShapeRole,
        points: Vec<Point>,
        fill: Color,
    },
}

impl DrawCommand {
    pub fn text(
        role: TextRole,
        at: Point,
        content: impl Into<String>,
        anchor: TextAnchor,
        size: f64,
    ) -> Self {
        DrawCommand::Text {
            role,
            at,
            content: content.into(),
            anchor,
            size,
            rotation: 0.0,
        }
    }

    pub fn line(role: LineRole, from: Point, to: Point) -> Self {
        DrawCommand::Polyline {
            role,
            points: vec![from, to],
        }
    }
}

pub fn frame(viewport: Viewport) -> DrawCommand {
    DrawCommand::Frame {
        width: viewport.width,
        height: viewport.height,
    }
}

pub fn title(title: &str) -> DrawCommand {
    DrawCommand::text(
        TextRole::Title,
        Point::new(PADDING, PADDING * 2.0),
        title,
        TextAnchor::Start,
        LABEL_SIZE,
    )
}

pub fn unit(viewport: Viewport, unit: &str) -> DrawCommand {
    DrawCommand::text(
        TextRole::Unit,
        Point::new(viewport.width - PADDING, PADDING * 2.0),
        unit,
        TextAnchor::End,
        LABEL_SIZE,
    )
}

pub fn value(viewport: Viewport, value: &str) -> DrawCommand {
    DrawCommand::text(
        TextRole::Value,
        Point::new(viewport.width - PADDING, viewport.height - 5.0),
        value,
        TextAnchor::End,
        VALUE_SIZE,
    )
}

/// Upper line of a two-row gauge; the lower line uses [`value`]'s slot.
pub fn first_row(viewport: Viewport, value: &str) -> DrawCommand {
    DrawCommand::text(
        TextRole::Value,
        Point::new(viewport.width - PADDING, viewport.height / 2.0),
        value,
        TextAnchor::End,
        VALUE_SIZE / 2.0,
    )
}

pub fn second_row(viewport: Viewport, value: &str) -> DrawCommand {
    DrawCommand::text(
        TextRole::SecondValue,
        Point::new(viewport.width - PADDING, viewport.height - 5.0),
        value,
        TextAnchor::End,
        VALUE_SIZE / 2.0,
    )
}

/// Labels shared by the text-like gauges. Empty labels are left out.
pub fn labels(viewport: Viewport, title_text: &str, unit_text: &str) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(2);
    if !title_text.is_empty() {
        commands.push(title(title_text));
    }
    if !unit_text.is_empty() {
        commands.push(unit(viewport, unit_text));
    }
    commands
}

/// Gridlines, axis step labels, the sample polyline and the live cursor.
pub fn history(
    axis: &AxisState,
    projection: &Projection,
    viewport: Viewport,
    unit_text: &str,
) -> Vec<DrawCommand> {
    let mut commands = Vec::new();
    for x in &projection.time_grid {
        commands.push(DrawCommand::line(
            LineRole::TimeGrid,
            Point::new(*x, 0.0),
            Point::new(*x, viewport.height),
        ));
    }
    for y in &projection.value_grid {
        commands.push(DrawCommand::line(
            LineRole::ValueGrid,
            Point::new(0.0, *y),
            Point::new(viewport.width, *y),
        ));
    }
    let step_label = if unit_text.is_empty() {
        axis.value_step.to_string()
    } else {
        format!("{} {}", axis.value_step, unit_text)
    };
    commands.push(DrawCommand::Text {
        role: TextRole::ValueStep,
        at: Point::new(3.0, viewport.height / 2.0),
        content: step_label,
        anchor: TextAnchor::Middle,
        size: AXIS_LABEL_SIZE,
        rotation: -90.0,
    });
    commands.push(DrawCommand::text(
        TextRole::TimeStep,
        Point::new(viewport.width / 2.0, viewport.height - 1.0),
        axis.time_step.label,
        TextAnchor::Middle,
        AXIS_LABEL_SIZE,
    ));
    if !projection.points.is_empty() {
        commands.push(DrawCommand::Polyline {
            role: LineRole::History,
            points: projection.points.clone(),
        });
    }
    if projection.cursor.len() > 1 {
        commands.push(DrawCommand::Polyline {
            role: LineRole::Cursor,
            points: projection.cursor.clone(),
        });
    }
    commands
}

/// Rotates `point` clockwise by `degrees` around `center` in screen
/// coordinates.
pub fn rotate(point: Point, degrees: f64, center: Point) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
}

/// Scales a shape drawn around the origin, rotates it, then moves it to
/// `center`.
pub fn place(shape: &[Point], scale: f64, degrees: f64, center: Point) -> Vec<Point> {
    let origin = Point::new(0.0, 0.0);
    shape
        .iter()
        .map(|p| {
            let turned = rotate(Point::new(p.x * scale, p.y * scale), degrees, origin);
            Point::new(turned.x + center.x, turned.y + center.y)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SampleBuffer;
    use crate::projection::project;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn rotation_is_clockwise_on_screen() {
        let center = Point::new(0.0, 0.0);
        let up = Point::new(0.0, -1.0);
        assert!(close(rotate(up, 90.0, center), Point::new(1.0, 0.0)));
        assert!(close(rotate(up, 180.0, center), Point::new(0.0, 1.0)));
        assert!(close(rotate(up, -90.0, center), Point::new(-1.0, 0.0)));
    }

    #[test]
    fn place_scales_before_moving() {
        let placed = place(&[Point::new(0.0, -10.0)], 0.5, 0.0, Point::new(50.0, 50.0));
        assert!(close(placed[0], Point::new(50.0, 45.0)));
    }

    #[test]
    fn history_frame_labels_steps() {
        let mut buffer = SampleBuffer::new(60_000);
        buffer.push(0, 0.0);
        buffer.push(30_000, 20.0);
        let axis = AxisState::compute(60_000, 0.0, 20.0, 30_000, 0);
        let projection = project(&buffer, &axis, 30_000, Viewport::default());
        let commands = history(&axis, &projection, Viewport::default(), "m");

        let labels: Vec<&str> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["5 m", "min"]);
        assert!(commands.iter().any(|c| matches!(
            c,
            DrawCommand::Polyline { role: LineRole::History, points } if points.len() == 2
        )));
    }

    #[test]
    fn empty_labels_are_skipped() {
        assert!(labels(Viewport::default(), "", "").is_empty());
        assert_eq!(labels(Viewport::default(), "Depth", "").len(), 1);
    }
}
