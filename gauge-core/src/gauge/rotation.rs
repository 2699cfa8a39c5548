use super::GaugeBehavior;
use crate::clock::Moment;
use crate::message::PropertyUpdate;
use crate::projection::{Point, Viewport};
use crate::render::{self, DrawCommand, LineRole, PADDING};
use dashboard::RotationStyle;

/// Largest roll the inclinometer scale can show, either side.
pub const MAX_ROLL: f64 = 45.0;

/// Holds the last angle of one property and draws a needle turned by it.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationGauge {
    property: String,
    style: RotationStyle,
    angle: Option<f64>,
}

impl RotationGauge {
    pub fn new(property: impl Into<String>, style: RotationStyle) -> Self {
        Self {
            property: property.into(),
            style,
            angle: None,
        }
    }

    pub fn style(&self) -> RotationStyle {
        self.style
    }

    /// Angle the needle is drawn at, after clamping.
    pub fn angle(&self) -> Option<f64> {
        self.angle
    }

    fn needle(&self, viewport: Viewport) -> (Point, Point) {
        match self.style {
            RotationStyle::Compass => {
                let radius = (viewport.width.min(viewport.height) / 2.0 - PADDING).max(0.0);
                let center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
                (center, Point::new(center.x, center.y - radius))
            }
            RotationStyle::Rudder | RotationStyle::Inclinometer => (
                Point::new(viewport.width / 2.0, PADDING),
                Point::new(viewport.width / 2.0, viewport.height - PADDING),
            ),
        }
    }
}

impl GaugeBehavior for RotationGauge {
    fn properties(&self) -> Vec<String> {
        vec![self.property.clone()]
    }

    fn on_update(&mut self, update: &PropertyUpdate, _moment: &Moment) -> bool {
        if !update.is_named(&self.property) {
            return false;
        }
        let Some(angle) = update.value.as_ref().and_then(|v| v.as_f64()) else {
            return false;
        };
        self.angle = Some(match self.style {
            RotationStyle::Inclinometer => angle.clamp(-MAX_ROLL, MAX_ROLL),
            RotationStyle::Rudder | RotationStyle::Compass => angle,
        });
        true
    }

    fn on_tick(&mut self, _moment: &Moment) {}

    fn render(&self, _moment: &Moment, viewport: Viewport) -> Vec<DrawCommand> {
        let mut commands = vec![render::frame(viewport)];
        if let Some(angle) = self.angle {
            let (pivot, tip) = self.needle(viewport);
            commands.push(DrawCommand::line(
                LineRole::Needle,
                pivot,
                render::rotate(tip, angle, pivot),
            ));
        }
        commands
    }
}
