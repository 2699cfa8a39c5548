use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub mod validation;
pub use validation::{validate_dashboard, validate_gauge, GaugeRuleError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub settings: DashboardSettings,
    #[serde(default)]
    pub gauges: Vec<GaugeDefinition>,
}

/// Unit of the `time` field the server attaches to every sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    #[default]
    Millis,
    Seconds,
}

impl TimeUnit {
    /// Multiplier from this unit to milliseconds.
    pub fn millis_scale(self) -> i64 {
        match self {
            TimeUnit::Millis => 1,
            TimeUnit::Seconds => 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub tick_ms: u64,
    pub passive_after_ms: i64,
    pub time_unit: TimeUnit,
    pub time_offset_ms: i64,
    pub zone_offset_minutes: i32,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            tick_ms: 1_000,
            passive_after_ms: 2_000,
            time_unit: TimeUnit::Millis,
            time_offset_ms: 0,
            zone_offset_minutes: 0,
            viewport_width: 100.0,
            viewport_height: 40.0,
        }
    }
}

impl DashboardSettings {
    pub fn zone_offset_ms(&self) -> i64 {
        i64::from(self.zone_offset_minutes) * 60_000
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeDefinition {
    pub id: String,
    #[serde(flatten)]
    pub kind: GaugeKindDefinition,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationStyle {
    Inclinometer,
    Rudder,
    #[default]
    Compass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GaugeKindDefinition {
    Text {
        property: String,
    },
    TwoRow {
        property1: String,
        property2: String,
    },
    Rotation {
        property: String,
        #[serde(default)]
        style: RotationStyle,
    },
    History {
        property: String,
        #[serde(default)]
        reset_property: Option<String>,
        #[serde(default = "default_window_ms")]
        window_ms: i64,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Tactical,
    Ais {
        #[serde(default = "default_ais_columns")]
        columns: Vec<String>,
    },
}

fn default_window_ms() -> i64 {
    60_000
}

fn default_ais_columns() -> Vec<String> {
    ["mmsi", "name", "distance", "time"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

pub const TACTICAL_PROPERTIES: [&str; 7] = [
    "speedOverGround",
    "trueHeading",
    "trueWindSpeed",
    "trueWindAngle",
    "relativeWindAngle",
    "trackMadeGood",
    "magneticVariation",
];

pub const AIS_PROPERTY: &str = "ais";

impl GaugeKindDefinition {
    /// Property names the gauge subscribes to, in subscription order.
    pub fn properties(&self) -> Vec<String> {
        match self {
            GaugeKindDefinition::Text { property }
            | GaugeKindDefinition::Rotation { property, .. } => vec![property.clone()],
            GaugeKindDefinition::TwoRow {
                property1,
                property2,
            } => vec![property1.clone(), property2.clone()],
            GaugeKindDefinition::History {
                property,
                reset_property,
                ..
            } => {
                let mut props = vec![property.clone()];
                if let Some(reset) = reset_property {
                    props.push(reset.clone());
                }
                props
            }
            GaugeKindDefinition::Tactical => {
                TACTICAL_PROPERTIES.iter().map(|p| p.to_string()).collect()
            }
            GaugeKindDefinition::Ais { .. } => vec![AIS_PROPERTY.to_string()],
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DashboardError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("toml write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
    #[error("unsupported dashboard file format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Json,
    Toml,
}

fn file_format(path: &Path) -> Result<FileFormat, DashboardError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(FileFormat::Json),
        Some("toml") => Ok(FileFormat::Toml),
        other => Err(DashboardError::UnsupportedFormat(
            other.unwrap_or("").to_string(),
        )),
    }
}

impl DashboardDefinition {
    pub fn from_json_str(data: &str) -> Result<Self, DashboardError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn from_toml_str(data: &str) -> Result<Self, DashboardError> {
        Ok(toml::from_str(data)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), DashboardError> {
        let path = path.as_ref();
        let data = match file_format(path)? {
            FileFormat::Json => serde_json::to_string_pretty(self)?,
            FileFormat::Toml => toml::to_string_pretty(self)?,
        };
        fs::write(path, data)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, DashboardError> {
        let path = path.as_ref();
        let format = file_format(path)?;
        let data = fs::read_to_string(path)?;
        match format {
            FileFormat::Json => Self::from_json_str(&data),
            FileFormat::Toml => Self::from_toml_str(&data),
        }
    }

    pub fn gauge(&self, id: &str) -> Option<&GaugeDefinition> {
        self.gauges.iter().find(|gauge| gauge.id == id)
    }
}
