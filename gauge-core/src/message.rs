use crate::buffer::{Sample, MAX_WINDOW_MS};
use crate::clock::{ClockSync, WallClock};
use serde_json::{Map, Value};
use std::fmt;

#[derive(thiserror::Error, Debug)]
pub enum MessageError {
    #[error("invalid json payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload is not a json object")]
    NotAnObject,
}

/// Value of a property as the server sent it.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
}

impl PropertyValue {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(PropertyValue::Number),
            Value::String(s) => Some(PropertyValue::Text(s.clone())),
            Value::Bool(b) => Some(PropertyValue::Text(b.to_string())),
            _ => None,
        }
    }

    /// Numeric reading; numeric strings count too.
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::Text(s) => s.trim().parse().ok(),
        };
        n.filter(|n: &f64| n.is_finite())
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Number(n) => write!(f, "{n}"),
            PropertyValue::Text(s) => f.write_str(s),
        }
    }
}

/// Label and history configuration pushed alongside the data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GaugeMeta {
    pub title: Option<String>,
    pub unit: Option<String>,
    pub history_ms: Option<i64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl GaugeMeta {
    pub fn is_empty(&self) -> bool {
        *self == GaugeMeta::default()
    }

    /// History length when the push turns history on, capped at
    /// [`MAX_WINDOW_MS`].
    pub fn history_window(&self) -> Option<i64> {
        self.history_ms
            .filter(|ms| *ms > 0)
            .map(|ms| ms.min(MAX_WINDOW_MS))
    }
}

/// One inbound payload with every recognized field pulled out. Fields of the
/// wrong type are dropped one by one; the rest of the message still counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PushMessage {
    pub name: Option<String>,
    pub value: Option<PropertyValue>,
    pub time: Option<f64>,
    pub title: Option<String>,
    pub unit: Option<String>,
    pub history: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// `(time, value)` pairs from a flattened `historyData` array.
    pub history_data: Option<Vec<(f64, f64)>>,
    pub fields: Map<String, Value>,
}

fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    n.filter(|n: &f64| n.is_finite())
}

fn string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|v| !v.is_null())
}

fn pairs(value: &Value) -> Option<Vec<(f64, f64)>> {
    let items = value.as_array()?;
    Some(
        items
            .chunks_exact(2)
            .filter_map(|pair| Some((number(&pair[0])?, number(&pair[1])?)))
            .collect(),
    )
}

impl PushMessage {
    pub fn parse(data: &str) -> Result<Self, MessageError> {
        match serde_json::from_str::<Value>(data)? {
            Value::Object(fields) => Ok(Self::from_fields(fields)),
            _ => Err(MessageError::NotAnObject),
        }
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        let get = |key| field(&fields, key);
        Self {
            name: get("name").and_then(string),
            value: get("value").and_then(PropertyValue::from_json),
            time: get("time").and_then(number),
            title: get("title").and_then(string),
            unit: get("unit").and_then(string),
            history: get("history").and_then(number),
            min: get("min").and_then(number),
            max: get("max").and_then(number),
            history_data: get("historyData").and_then(pairs),
            fields,
        }
    }

    /// Normalizes every timestamp and duration to milliseconds.
    pub fn into_update<C: WallClock>(self, clock: &ClockSync<C>) -> PropertyUpdate {
        let scale = clock.unit().millis_scale() as f64;
        PropertyUpdate {
            time_ms: self.time.and_then(|t| clock.to_millis(t)),
            backfill: self.history_data.map(|pairs| {
                pairs
                    .into_iter()
                    .filter_map(|(t, v)| clock.to_millis(t).map(|time| Sample::new(time, v)))
                    .collect()
            }),
            meta: GaugeMeta {
                title: self.title,
                unit: self.unit,
                history_ms: self.history.map(|h| (h * scale).round() as i64),
                min: self.min,
                max: self.max,
            },
            name: self.name,
            value: self.value,
            fields: self.fields,
        }
    }
}

/// A push message after timestamp normalization, as the gauges see it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyUpdate {
    pub name: Option<String>,
    pub value: Option<PropertyValue>,
    pub time_ms: Option<i64>,
    pub meta: GaugeMeta,
    pub backfill: Option<Vec<Sample>>,
    pub fields: Map<String, Value>,
}

impl PropertyUpdate {
    pub fn is_named(&self, property: &str) -> bool {
        self.name.as_deref() == Some(property)
    }

    /// Whether configuration and backfill in this update belong to
    /// `property`: unnamed pushes address the whole gauge.
    pub fn addresses(&self, property: &str) -> bool {
        self.name.is_none() || self.is_named(property)
    }

    /// Numeric value of a timed sample of `property`.
    pub fn sample_of(&self, property: &str) -> Option<Sample> {
        if !self.is_named(property) {
            return None;
        }
        Some(Sample::new(self.time_ms?, self.value.as_ref()?.as_f64()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use dashboard::TimeUnit;

    #[test]
    fn parses_sample_fields() {
        let msg = PushMessage::parse(r#"{"name":"depth","value":5.2,"time":1000}"#).unwrap();
        assert_eq!(msg.name.as_deref(), Some("depth"));
        assert_eq!(msg.value, Some(PropertyValue::Number(5.2)));
        assert_eq!(msg.time, Some(1000.0));
        assert!(msg.history_data.is_none());
    }

    #[test]
    fn wrong_typed_fields_are_dropped_individually() {
        let msg = PushMessage::parse(r#"{"name":"depth","value":{"x":1},"time":"soon"}"#).unwrap();
        assert_eq!(msg.name.as_deref(), Some("depth"));
        assert_eq!(msg.value, None);
        assert_eq!(msg.time, None);
    }

    #[test]
    fn zero_value_is_kept() {
        let msg = PushMessage::parse(r#"{"name":"roll","value":0,"time":5}"#).unwrap();
        assert_eq!(msg.value.and_then(|v| v.as_f64()), Some(0.0));
    }

    #[test]
    fn rejects_non_objects() {
        assert!(matches!(
            PushMessage::parse("[1,2]"),
            Err(MessageError::NotAnObject)
        ));
        assert!(matches!(PushMessage::parse("{"), Err(MessageError::Json(_))));
    }

    #[test]
    fn history_data_is_paired() {
        let msg = PushMessage::parse(r#"{"historyData":[1,2.5,2,"x",3,4.5,9]}"#).unwrap();
        assert_eq!(msg.history_data, Some(vec![(1.0, 2.5), (3.0, 4.5)]));
    }

    #[test]
    fn update_normalizes_seconds() {
        let clock = ClockSync::new(ManualClock::new(0), TimeUnit::Seconds, 500);
        let msg = PushMessage::parse(
            r#"{"name":"eta","value":"12:00","time":2,"history":60,"historyData":[1,7]}"#,
        )
        .unwrap();
        let update = msg.into_update(&clock);
        assert_eq!(update.time_ms, Some(2_500));
        assert_eq!(update.meta.history_ms, Some(60_000));
        assert_eq!(update.backfill, Some(vec![Sample::new(1_500, 7.0)]));
        assert_eq!(update.value.as_ref().map(ToString::to_string).as_deref(), Some("12:00"));
        assert_eq!(update.sample_of("eta"), None);
    }

    #[test]
    fn huge_history_and_bad_times_are_contained() {
        let clock = ClockSync::new(ManualClock::new(0), TimeUnit::Millis, 0);
        let msg = PushMessage::parse(
            r#"{"name":"depth","value":1,"time":-1e300,"history":1e17,"historyData":[1e300,2,10,3]}"#,
        )
        .unwrap();
        let update = msg.into_update(&clock);
        assert_eq!(update.time_ms, None);
        assert_eq!(update.meta.history_window(), Some(MAX_WINDOW_MS));
        assert_eq!(update.backfill, Some(vec![Sample::new(10, 3.0)]));
    }
}
