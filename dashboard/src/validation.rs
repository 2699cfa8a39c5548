use crate::{DashboardDefinition, GaugeDefinition, GaugeKindDefinition};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GaugeRuleError {
    #[error("gauge id must not be empty")]
    EmptyId,
    #[error("gauge id '{0}' is used more than once")]
    DuplicateId(String),
    #[error("gauge '{0}' has an empty property name")]
    EmptyProperty(String),
    #[error("gauge '{0}' must have a positive history window")]
    InvalidWindow(String),
    #[error("gauge '{0}' has min greater than max")]
    InvalidBounds(String),
    #[error("tick interval must be positive")]
    InvalidTick,
}

pub fn validate_gauge(gauge: &GaugeDefinition) -> Result<(), GaugeRuleError> {
    if gauge.id.trim().is_empty() {
        return Err(GaugeRuleError::EmptyId);
    }
    if gauge
        .kind
        .properties()
        .iter()
        .any(|property| property.trim().is_empty())
    {
        return Err(GaugeRuleError::EmptyProperty(gauge.id.clone()));
    }
    if let GaugeKindDefinition::History {
        window_ms, min, max, ..
    } = &gauge.kind
    {
        if *window_ms <= 0 {
            return Err(GaugeRuleError::InvalidWindow(gauge.id.clone()));
        }
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(GaugeRuleError::InvalidBounds(gauge.id.clone()));
            }
        }
    }
    Ok(())
}

pub fn validate_dashboard(definition: &DashboardDefinition) -> Result<(), GaugeRuleError> {
    if definition.settings.tick_ms == 0 {
        return Err(GaugeRuleError::InvalidTick);
    }
    let mut seen = HashSet::new();
    for gauge in &definition.gauges {
        validate_gauge(gauge)?;
        if !seen.insert(gauge.id.as_str()) {
            return Err(GaugeRuleError::DuplicateId(gauge.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DashboardSettings, RotationStyle};

    fn text(id: &str, property: &str) -> GaugeDefinition {
        GaugeDefinition {
            id: id.to_string(),
            kind: GaugeKindDefinition::Text {
                property: property.to_string(),
            },
        }
    }

    fn dashboard(gauges: Vec<GaugeDefinition>) -> DashboardDefinition {
        DashboardDefinition {
            name: "test".to_string(),
            description: String::new(),
            settings: DashboardSettings::default(),
            gauges,
        }
    }

    #[test]
    fn accepts_distinct_gauges() {
        let def = dashboard(vec![
            text("0", "depth"),
            GaugeDefinition {
                id: "1".to_string(),
                kind: GaugeKindDefinition::Rotation {
                    property: "roll".to_string(),
                    style: RotationStyle::Inclinometer,
                },
            },
        ]);
        assert_eq!(validate_dashboard(&def), Ok(()));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let def = dashboard(vec![text("0", "depth"), text("0", "speed")]);
        assert_eq!(
            validate_dashboard(&def),
            Err(GaugeRuleError::DuplicateId("0".to_string()))
        );
    }

    #[test]
    fn rejects_empty_property() {
        let def = dashboard(vec![text("2", " ")]);
        assert_eq!(
            validate_dashboard(&def),
            Err(GaugeRuleError::EmptyProperty("2".to_string()))
        );
    }

    #[test]
    fn rejects_bad_history_settings() {
        let window = GaugeDefinition {
            id: "h".to_string(),
            kind: GaugeKindDefinition::History {
                property: "depth".to_string(),
                reset_property: None,
                window_ms: 0,
                min: None,
                max: None,
            },
        };
        assert_eq!(
            validate_gauge(&window),
            Err(GaugeRuleError::InvalidWindow("h".to_string()))
        );

        let bounds = GaugeDefinition {
            id: "b".to_string(),
            kind: GaugeKindDefinition::History {
                property: "depth".to_string(),
                reset_property: None,
                window_ms: 1_000,
                min: Some(10.0),
                max: Some(2.0),
            },
        };
        assert_eq!(
            validate_gauge(&bounds),
            Err(GaugeRuleError::InvalidBounds("b".to_string()))
        );
    }

    #[test]
    fn rejects_zero_tick() {
        let mut def = dashboard(Vec::new());
        def.settings.tick_ms = 0;
        assert_eq!(validate_dashboard(&def), Err(GaugeRuleError::InvalidTick));
    }
}
