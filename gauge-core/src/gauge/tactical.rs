use super::GaugeBehavior;
use crate::clock::Moment;
use crate::message::PropertyUpdate;
use crate::projection::{Point, Viewport};
use crate::render::{self, Color, DrawCommand, LineRole, ShapeRole, TextAnchor, TextRole};
use dashboard::TACTICAL_PROPERTIES;

/// Color band of the wind arrow. Each threshold is exclusive, so a speed
/// exactly on a boundary stays in the lower band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindTier {
    Light,
    Moderate,
    Fresh,
    Strong,
    Gale,
    Storm,
}

impl WindTier {
    pub fn from_knots(knots: f64) -> Self {
        if knots > 50.0 {
            WindTier::Storm
        } else if knots > 40.0 {
            WindTier::Gale
        } else if knots > 20.0 {
            WindTier::Strong
        } else if knots > 15.0 {
            WindTier::Fresh
        } else if knots > 10.0 {
            WindTier::Moderate
        } else {
            WindTier::Light
        }
    }

    pub fn color(self) -> Color {
        match self {
            WindTier::Storm => Color::Black,
            WindTier::Gale => Color::Magenta,
            WindTier::Strong => Color::Red,
            WindTier::Fresh => Color::Orange,
            WindTier::Moderate => Color::Green,
            WindTier::Light => Color::Gray,
        }
    }
}

/// Number of distinct barb shapes; shape `i` stands for about `5 * i` knots.
pub const WIND_ARROW_SHAPES: usize = 20;

const SLOT_TOP: f64 = -34.0;
const SLOT_GAP: f64 = 7.0;

fn staff() -> Vec<Point> {
    vec![
        Point::new(-1.0, 0.0),
        Point::new(-1.0, SLOT_TOP),
        Point::new(1.0, SLOT_TOP),
        Point::new(1.0, 0.0),
    ]
}

fn pennant() -> Vec<Point> {
    vec![
        Point::new(-1.0, SLOT_TOP),
        Point::new(-1.0, SLOT_TOP - 10.0),
        Point::new(17.0, SLOT_TOP - 10.0),
        Point::new(1.0, SLOT_TOP + 1.0),
    ]
}

fn barb(y: f64, reach: f64) -> Vec<Point> {
    let rise = if reach > 11.0 { 10.0 } else { 5.0 };
    vec![
        Point::new(1.0, y),
        Point::new(reach, y - rise),
        Point::new(reach, y - rise + 1.0),
        Point::new(1.0, y + 1.0),
    ]
}

/// Barb shape index for a wind speed, clamped to the shape table.
pub fn wind_arrow_index(knots: f64) -> usize {
    if !knots.is_finite() || knots <= 0.0 {
        return 0;
    }
    ((knots / 5.0).round() as usize).min(WIND_ARROW_SHAPES - 1)
}

/// Polygons of the wind barb for `knots`, pointing up from the origin. Each
/// index step adds half a barb; ten steps make a pennant.
pub fn wind_arrow(knots: f64) -> Vec<Vec<Point>> {
    let index = wind_arrow_index(knots);
    if index == 0 {
        return Vec::new();
    }
    let mut shapes = vec![staff()];
    let mut slot = 0;
    if index >= 10 {
        shapes.push(pennant());
        slot = 1;
    }
    let rest = index % 10;
    for _ in 0..rest / 2 {
        shapes.push(barb(SLOT_TOP + SLOT_GAP * slot as f64, 18.0));
        slot += 1;
    }
    if rest % 2 == 1 {
        let slot = slot.max(1);
        shapes.push(barb(SLOT_TOP + SLOT_GAP * slot as f64, 11.0));
    }
    shapes
}

fn hull() -> Vec<Point> {
    [
        (-20.0, 40.0),
        (20.0, 40.0),
        (22.0, 10.0),
        (18.0, -15.0),
        (0.0, -40.0),
        (-18.0, -15.0),
        (-22.0, 10.0),
        (-20.0, 40.0),
    ]
    .into_iter()
    .map(|(x, y)| Point::new(x, y))
    .collect()
}

/// Sailing display: boat heading, course over ground, apparent and true wind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TacticalGauge {
    pub speed_over_ground: Option<f64>,
    pub true_heading: Option<f64>,
    pub true_wind_speed: Option<f64>,
    pub true_wind_angle: Option<f64>,
    pub relative_wind_angle: Option<f64>,
    pub track_made_good: Option<f64>,
    pub magnetic_variation: Option<f64>,
}

impl TacticalGauge {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, name: &str) -> Option<&mut Option<f64>> {
        match name {
            "speedOverGround" => Some(&mut self.speed_over_ground),
            "trueHeading" => Some(&mut self.true_heading),
            "trueWindSpeed" => Some(&mut self.true_wind_speed),
            "trueWindAngle" => Some(&mut self.true_wind_angle),
            "relativeWindAngle" => Some(&mut self.relative_wind_angle),
            "trackMadeGood" => Some(&mut self.track_made_good),
            "magneticVariation" => Some(&mut self.magnetic_variation),
            _ => None,
        }
    }

    pub fn wind_tier(&self) -> Option<WindTier> {
        self.true_wind_speed.map(WindTier::from_knots)
    }
}

impl GaugeBehavior for TacticalGauge {
    fn properties(&self) -> Vec<String> {
        TACTICAL_PROPERTIES.iter().map(|p| p.to_string()).collect()
    }

    fn on_update(&mut self, update: &PropertyUpdate, _moment: &Moment) -> bool {
        let (Some(name), Some(value)) = (
            update.name.as_deref(),
            update.value.as_ref().and_then(|v| v.as_f64()),
        ) else {
            return false;
        };
        match self.slot(name) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    fn on_tick(&mut self, _moment: &Moment) {}

    fn render(&self, _moment: &Moment, viewport: Viewport) -> Vec<DrawCommand> {
        let center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
        let radius = viewport.width.min(viewport.height) / 2.0;
        let heading = self.true_heading.unwrap_or(0.0);
        let mut commands = Vec::new();

        commands.push(DrawCommand::Polyline {
            role: LineRole::Boat,
            points: render::place(&hull(), radius / 80.0, heading, center),
        });

        if let Some(cog) = self.track_made_good {
            let marker = [
                Point::new(2.0, -25.0),
                Point::new(0.0, -34.0),
                Point::new(-2.0, -25.0),
            ];
            commands.push(DrawCommand::Polygon {
                role: ShapeRole::CourseMarker,
                points: render::place(&marker, radius / 40.0, cog, center),
                fill: Color::Red,
            });
        }

        if let Some(angle) = self.relative_wind_angle {
            let turn = heading + angle;
            let scale = radius / 50.0;
            let tip = [
                Point::new(-3.0, -15.0),
                Point::new(0.0, -25.0),
                Point::new(3.0, -15.0),
            ];
            let tail = [
                Point::new(-3.0, 25.0),
                Point::new(-3.0, 20.0),
                Point::new(0.0, 15.0),
                Point::new(3.0, 20.0),
                Point::new(3.0, 25.0),
            ];
            commands.push(DrawCommand::Polygon {
                role: ShapeRole::WindTip,
                points: render::place(&tip, scale, turn, center),
                fill: Color::Red,
            });
            commands.push(DrawCommand::Polyline {
                role: LineRole::Shaft,
                points: render::place(
                    &[Point::new(0.0, 15.0), Point::new(0.0, -15.0)],
                    scale,
                    turn,
                    center,
                ),
            });
            commands.push(DrawCommand::Polygon {
                role: ShapeRole::WindTail,
                points: render::place(&tail, scale, turn, center),
                fill: Color::Red,
            });
        }

        if let (Some(angle), Some(speed)) = (self.true_wind_angle, self.true_wind_speed) {
            let fill = WindTier::from_knots(speed).color();
            for shape in wind_arrow(speed) {
                commands.push(DrawCommand::Polygon {
                    role: ShapeRole::WindArrow,
                    points: render::place(&shape, radius / 50.0, heading + angle, center),
                    fill,
                });
            }
        }

        if let Some(sog) = self.speed_over_ground {
            commands.push(DrawCommand::text(
                TextRole::Value,
                Point::new(center.x, viewport.height - render::PADDING),
                format!("{sog:.1}"),
                TextAnchor::Middle,
                render::LABEL_SIZE,
            ));
        }
        if let Some(variation) = self.magnetic_variation {
            commands.push(DrawCommand::text(
                TextRole::Unit,
                Point::new(viewport.width - render::PADDING, render::PADDING * 2.0),
                format!("var {variation:.1}"),
                TextAnchor::End,
                render::LABEL_SIZE,
            ));
        }
        commands
    }
}
