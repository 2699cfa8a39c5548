use gauge_core::render::{Color as GaugeColor, LineRole, TextAnchor, TextRole};
use gauge_core::{DrawCommand, GaugeFrame, GaugeStatus, Point, Viewport};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};
use std::path::{Path, PathBuf};

/// Pixels per viewport unit.
const SCALE: f64 = 4.0;
/// Viewport units per em.
const EM_UNITS: f64 = 16.0;
const PASSIVE_ALPHA: f64 = 0.35;

#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    #[error("drawing failed: {0}")]
    Drawing(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn drawing_error<E: std::fmt::Display>(err: E) -> SnapshotError {
    SnapshotError::Drawing(err.to_string())
}

fn pixel(point: Point) -> (i32, i32) {
    (
        (point.x * SCALE).round() as i32,
        (point.y * SCALE).round() as i32,
    )
}

fn palette(color: GaugeColor) -> RGBColor {
    match color {
        GaugeColor::Blue => RGBColor(0, 0, 255),
        GaugeColor::Red => RGBColor(255, 0, 0),
        GaugeColor::Black => RGBColor(0, 0, 0),
        GaugeColor::Magenta => RGBColor(255, 0, 255),
        GaugeColor::Orange => RGBColor(255, 165, 0),
        GaugeColor::Green => RGBColor(0, 128, 0),
        GaugeColor::Gray => RGBColor(128, 128, 128),
    }
}

fn line_color(role: LineRole) -> RGBColor {
    match role {
        LineRole::TimeGrid | LineRole::ValueGrid => RGBColor(200, 200, 200),
        LineRole::History => palette(GaugeColor::Blue),
        LineRole::Cursor | LineRole::Needle => palette(GaugeColor::Red),
        LineRole::Course => palette(GaugeColor::Magenta),
        LineRole::Boat | LineRole::Shaft => palette(GaugeColor::Black),
    }
}

fn text_color(role: TextRole) -> RGBColor {
    match role {
        TextRole::Title | TextRole::Unit | TextRole::ValueStep | TextRole::TimeStep => {
            RGBColor(80, 80, 80)
        }
        TextRole::Value | TextRole::SecondValue | TextRole::Row => RGBColor(0, 0, 0),
    }
}

fn quarter_turn(rotation: f64) -> FontTransform {
    match ((rotation / 90.0).round() as i64).rem_euclid(4) {
        1 => FontTransform::Rotate90,
        2 => FontTransform::Rotate180,
        3 => FontTransform::Rotate270,
        _ => FontTransform::None,
    }
}

fn text_pos(anchor: TextAnchor) -> Pos {
    let h = match anchor {
        TextAnchor::Start => HPos::Left,
        TextAnchor::Middle => HPos::Center,
        TextAnchor::End => HPos::Right,
    };
    Pos::new(h, VPos::Bottom)
}

fn frame_viewport(frame: &GaugeFrame, fallback: Viewport) -> Viewport {
    frame
        .commands
        .iter()
        .find_map(|command| match command {
            DrawCommand::Frame { width, height } => Some(Viewport::new(*width, *height)),
            _ => None,
        })
        .unwrap_or(fallback)
}

/// Renders one gauge frame to an SVG document. Passive gauges are drawn
/// faded.
pub fn render_frame(frame: &GaugeFrame, fallback: Viewport) -> Result<String, SnapshotError> {
    let viewport = frame_viewport(frame, fallback);
    let size = (
        (viewport.width * SCALE).ceil().max(1.0) as u32,
        (viewport.height * SCALE).ceil().max(1.0) as u32,
    );
    let alpha = if frame.status == GaugeStatus::Passive {
        PASSIVE_ALPHA
    } else {
        1.0
    };

    let mut document = String::new();
    {
        let root = SVGBackend::with_string(&mut document, size).into_drawing_area();
        root.fill(&WHITE).map_err(drawing_error)?;

        for command in &frame.commands {
            match command {
                DrawCommand::Frame { width, height } => {
                    let corner = pixel(Point::new(*width, *height));
                    root.draw(&Rectangle::new(
                        [(0, 0), (corner.0 - 1, corner.1 - 1)],
                        &RGBColor(160, 160, 160).mix(alpha),
                    ))
                    .map_err(drawing_error)?;
                }
                DrawCommand::Polyline { role, points } => {
                    let path: Vec<(i32, i32)> = points.iter().copied().map(pixel).collect();
                    let style = ShapeStyle::from(&line_color(*role).mix(alpha)).stroke_width(1);
                    root.draw(&PathElement::new(path, style))
                        .map_err(drawing_error)?;
                }
                DrawCommand::Polygon { points, fill, .. } => {
                    let outline: Vec<(i32, i32)> = points.iter().copied().map(pixel).collect();
                    root.draw(&Polygon::new(outline, palette(*fill).mix(alpha).filled()))
                        .map_err(drawing_error)?;
                }
                DrawCommand::Text {
                    role,
                    at,
                    content,
                    anchor,
                    size,
                    rotation,
                } => {
                    if content.is_empty() {
                        continue;
                    }
                    let px = (size * EM_UNITS * SCALE).max(1.0);
                    let style = FontDesc::new(FontFamily::SansSerif, px, FontStyle::Normal)
                        .color(&text_color(*role).mix(alpha))
                        .pos(text_pos(*anchor))
                        .transform(quarter_turn(*rotation));
                    root.draw(&Text::new(content.clone(), pixel(*at), style))
                        .map_err(drawing_error)?;
                }
            }
        }
        root.present().map_err(drawing_error)?;
    }
    Ok(document)
}

/// Writes `<prefix>-<gauge id>.svg` into `dir` and returns its path.
pub fn write_frame(
    dir: &Path,
    prefix: &str,
    frame: &GaugeFrame,
    fallback: Viewport,
) -> Result<PathBuf, SnapshotError> {
    let document = render_frame(frame, fallback)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{prefix}-{}.svg", file_safe(&frame.id)));
    std::fs::write(&path, document)?;
    log::debug!("wrote {}", path.display());
    Ok(path)
}

fn file_safe(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
