use super::GaugeBehavior;
use crate::clock::Moment;
use crate::message::{PropertyUpdate, PropertyValue};
use crate::projection::Viewport;
use crate::render::{self, DrawCommand};

#[derive(Debug, Clone, PartialEq)]
pub struct TextRow {
    pub property: String,
    pub value: Option<PropertyValue>,
}

impl TextRow {
    fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: None,
        }
    }

    pub fn display(&self) -> String {
        self.value.as_ref().map(ToString::to_string).unwrap_or_default()
    }
}

/// Shows the last value of one property, or of two properties on two lines.
#[derive(Debug, Clone, PartialEq)]
pub struct TextGauge {
    rows: Vec<TextRow>,
    title: String,
    unit: String,
}

impl TextGauge {
    pub fn single(property: impl Into<String>) -> Self {
        Self {
            rows: vec![TextRow::new(property)],
            title: String::new(),
            unit: String::new(),
        }
    }

    pub fn two_row(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            rows: vec![TextRow::new(first), TextRow::new(second)],
            title: String::new(),
            unit: String::new(),
        }
    }

    pub fn rows(&self) -> &[TextRow] {
        &self.rows
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn is_two_row(&self) -> bool {
        self.rows.len() > 1
    }

    pub(crate) fn into_parts(self) -> (Vec<TextRow>, String, String) {
        (self.rows, self.title, self.unit)
    }
}

impl GaugeBehavior for TextGauge {
    fn properties(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.property.clone()).collect()
    }

    fn on_update(&mut self, update: &PropertyUpdate, _moment: &Moment) -> bool {
        let mut touched = false;
        if let Some(title) = &update.meta.title {
            self.title = title.clone();
            touched = true;
        }
        if let Some(unit) = &update.meta.unit {
            self.unit = unit.clone();
            touched = true;
        }
        if let (Some(name), Some(value)) = (&update.name, &update.value) {
            for row in self.rows.iter_mut().filter(|row| &row.property == name) {
                row.value = Some(value.clone());
                touched = true;
            }
        }
        touched
    }

    fn on_tick(&mut self, _moment: &Moment) {}

    fn render(&self, _moment: &Moment, viewport: Viewport) -> Vec<DrawCommand> {
        let mut commands = vec![render::frame(viewport)];
        commands.extend(render::labels(viewport, &self.title, &self.unit));
        match self.rows.as_slice() {
            [single] => commands.push(render::value(viewport, &single.display())),
            [first, second, ..] => {
                commands.push(render::first_row(viewport, &first.display()));
                commands.push(render::second_row(viewport, &second.display()));
            }
            [] => {}
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TextRole;

    fn update(name: &str, value: PropertyValue) -> PropertyUpdate {
        PropertyUpdate {
            name: Some(name.to_string()),
            value: Some(value),
            time_ms: Some(0),
            ..PropertyUpdate::default()
        }
    }

    fn moment() -> Moment {
        Moment {
            local_ms: 0,
            server_ms: Some(0),
        }
    }

    #[test]
    fn two_rows_update_independently() {
        let mut gauge = TextGauge::two_row("latitude", "longitude");
        assert!(gauge.on_update(
            &update("longitude", PropertyValue::Text("24 E".into())),
            &moment()
        ));
        assert_eq!(gauge.rows()[0].value, None);
        assert_eq!(gauge.rows()[1].display(), "24 E");
    }

    #[test]
    fn unknown_property_is_ignored() {
        let mut gauge = TextGauge::single("depthOfWater");
        assert!(!gauge.on_update(&update("roll", PropertyValue::Number(3.0)), &moment()));
        assert_eq!(gauge.rows()[0].value, None);
    }

    #[test]
    fn renders_value_and_labels() {
        let mut gauge = TextGauge::single("speedOverGround");
        let meta = PropertyUpdate {
            meta: crate::message::GaugeMeta {
                title: Some("SOG".into()),
                unit: Some("kn".into()),
                ..Default::default()
            },
            ..PropertyUpdate::default()
        };
        assert!(gauge.on_update(&meta, &moment()));
        gauge.on_update(
            &update("speedOverGround", PropertyValue::Number(6.5)),
            &moment(),
        );
        let commands = gauge.render(&moment(), Viewport::default());
        let texts: Vec<(TextRole, &str)> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { role, content, .. } => Some((*role, content.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(
            texts,
            vec![
                (TextRole::Title, "SOG"),
                (TextRole::Unit, "kn"),
                (TextRole::Value, "6.5")
            ]
        );
    }
}
