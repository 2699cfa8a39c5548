use super::GaugeBehavior;
use crate::clock::Moment;
use crate::message::PropertyUpdate;
use crate::projection::{Point, Viewport};
use crate::render::{self, DrawCommand, TextAnchor, TextRole, LABEL_SIZE, PADDING};
use dashboard::AIS_PROPERTY;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Vessels not heard from for a day are dropped from the table.
pub const STALE_AFTER_MS: i64 = 86_400_000;

const ROW_HEIGHT: f64 = 6.0;
const TIME_COLUMN: &str = "time";

/// Age as `Ns`, `Nm Ns` or `Nh Nm Ns`. Negative ages show as `0s`.
pub fn format_age(age_ms: i64) -> String {
    let total = age_ms.max(0) / 1_000;
    let (hours, minutes, seconds) = (total / 3_600, total / 60 % 60, total % 60);
    if total < 60 {
        format!("{seconds}s")
    } else if total < 3_600 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{hours}h {minutes}m {seconds}s")
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AisRow {
    pub mmsi: String,
    pub fields: Map<String, Value>,
    pub time_ms: Option<i64>,
}

/// Vessel list keyed by MMSI. Updates merge into the existing row.
#[derive(Debug, Clone, PartialEq)]
pub struct AisTable {
    columns: Vec<String>,
    rows: BTreeMap<String, AisRow>,
}

impl AisTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: BTreeMap::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, mmsi: &str) -> Option<&AisRow> {
        self.rows.get(mmsi)
    }

    /// Removes rows older than [`STALE_AFTER_MS`] and returns how many went.
    pub fn clear_olds(&mut self, now_ms: i64) -> usize {
        let before = self.rows.len();
        self.rows
            .retain(|_, row| row.time_ms.map_or(true, |t| now_ms - t <= STALE_AFTER_MS));
        before - self.rows.len()
    }

    /// Display cells of one row, with the time column shown as an age.
    pub fn cells(&self, mmsi: &str, now_ms: Option<i64>) -> Option<Vec<String>> {
        let row = self.rows.get(mmsi)?;
        Some(
            self.columns
                .iter()
                .map(|column| match (column.as_str(), row.time_ms, now_ms) {
                    (TIME_COLUMN, Some(time), Some(now)) => format_age(now - time),
                    (TIME_COLUMN, _, _) => String::new(),
                    ("mmsi", _, _) => row.mmsi.clone(),
                    (name, _, _) => row.fields.get(name).map(cell_text).unwrap_or_default(),
                })
                .collect(),
        )
    }
}

impl GaugeBehavior for AisTable {
    fn properties(&self) -> Vec<String> {
        vec![AIS_PROPERTY.to_string()]
    }

    fn on_update(&mut self, update: &PropertyUpdate, _moment: &Moment) -> bool {
        let mmsi = match update.fields.get("mmsi") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return false,
        };
        let row = self.rows.entry(mmsi.clone()).or_insert_with(|| {
            log::debug!("new vessel {mmsi}");
            AisRow {
                mmsi: mmsi.clone(),
                fields: Map::new(),
                time_ms: None,
            }
        });
        for (key, value) in &update.fields {
            if !value.is_null() {
                row.fields.insert(key.clone(), value.clone());
            }
        }
        if update.time_ms.is_some() {
            row.time_ms = update.time_ms;
        }
        true
    }

    fn on_tick(&mut self, moment: &Moment) {
        if let Some(now) = moment.server_ms {
            let removed = self.clear_olds(now);
            if removed > 0 {
                log::debug!("dropped {removed} stale vessels");
            }
        }
    }

    fn render(&self, moment: &Moment, viewport: Viewport) -> Vec<DrawCommand> {
        let mut commands = vec![render::frame(viewport)];
        for (index, mmsi) in self.rows.keys().enumerate() {
            let Some(cells) = self.cells(mmsi, moment.server_ms) else {
                continue;
            };
            commands.push(DrawCommand::text(
                TextRole::Row,
                Point::new(PADDING, PADDING * 2.0 + ROW_HEIGHT * index as f64),
                cells.join("  "),
                TextAnchor::Start,
                LABEL_SIZE,
            ));
        }
        commands
    }
}
