use super::text::TextRow;
use super::GaugeBehavior;
use crate::axis::{AxisScaler, AxisState, PinnedBounds};
use crate::buffer::SampleBuffer;
use crate::clock::Moment;
use crate::message::{PropertyUpdate, PropertyValue};
use crate::projection::{self, Projection, Viewport};
use crate::render::{self, DrawCommand};

/// Text gauge with a scrolling strip chart of the recent values behind it.
#[derive(Debug, Clone)]
pub struct HistoryGauge {
    property: String,
    reset_property: Option<String>,
    title: String,
    unit: String,
    last_value: Option<PropertyValue>,
    buffer: SampleBuffer,
    pinned: PinnedBounds,
    scaler: AxisScaler,
}

impl HistoryGauge {
    pub fn new(
        property: impl Into<String>,
        reset_property: Option<String>,
        window_ms: i64,
        pinned: PinnedBounds,
        zone_offset_ms: i64,
    ) -> Self {
        Self {
            property: property.into(),
            reset_property,
            title: String::new(),
            unit: String::new(),
            last_value: None,
            buffer: SampleBuffer::new(window_ms),
            pinned,
            scaler: AxisScaler::new(zone_offset_ms),
        }
    }

    /// Turns a single-row text gauge into a history gauge, keeping its labels
    /// and last value.
    pub(crate) fn from_text(
        row: TextRow,
        title: String,
        unit: String,
        window_ms: i64,
        zone_offset_ms: i64,
    ) -> Self {
        let mut gauge = Self::new(
            row.property,
            None,
            window_ms,
            PinnedBounds::default(),
            zone_offset_ms,
        );
        gauge.title = title;
        gauge.unit = unit;
        gauge.last_value = row.value;
        gauge
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn pinned(&self) -> PinnedBounds {
        self.pinned
    }

    pub fn axis(&self) -> Option<&AxisState> {
        self.scaler.state()
    }

    pub fn last_value(&self) -> Option<&PropertyValue> {
        self.last_value.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Value bounds the axis is built from.
    pub fn extent(&self) -> (f64, f64) {
        self.pinned.resolve(self.buffer.extent())
    }

    fn refresh_axis(&mut self, moment: &Moment) -> bool {
        match moment.server_ms {
            Some(now) => {
                let extent = self.extent();
                self.scaler.update(self.buffer.window_ms(), extent, now)
            }
            None => false,
        }
    }

    /// Current strip chart in viewport coordinates, or `None` before the
    /// clock has been synchronized.
    pub fn projection(&self, moment: &Moment, viewport: Viewport) -> Option<Projection> {
        let now = moment.server_ms?;
        let axis = self.scaler.state()?;
        Some(projection::project(&self.buffer, axis, now, viewport))
    }

    fn apply_meta(&mut self, update: &PropertyUpdate) -> bool {
        let meta = &update.meta;
        let mut touched = false;
        if let Some(title) = &meta.title {
            self.title = title.clone();
            touched = true;
        }
        if let Some(unit) = &meta.unit {
            self.unit = unit.clone();
            touched = true;
        }
        if let Some(window) = meta.history_window() {
            self.buffer.set_window_ms(window);
            touched = true;
        }
        if meta.min.is_some() || meta.max.is_some() {
            self.pinned = PinnedBounds::new(
                meta.min.or(self.pinned.min),
                meta.max.or(self.pinned.max),
            );
            touched = true;
        }
        touched
    }
}

impl GaugeBehavior for HistoryGauge {
    fn properties(&self) -> Vec<String> {
        let mut properties = vec![self.property.clone()];
        properties.extend(self.reset_property.iter().cloned());
        properties
    }

    fn on_update(&mut self, update: &PropertyUpdate, moment: &Moment) -> bool {
        let owned = update.addresses(&self.property);
        let mut touched = owned && self.apply_meta(update);

        if let Some(backfill) = update.backfill.as_ref().filter(|_| owned) {
            self.buffer.replace_all(backfill.iter().copied());
            log::info!(
                "history of '{}' backfilled with {} samples",
                self.property,
                self.buffer.len()
            );
            touched = true;
        }

        if let Some(reset) = &self.reset_property {
            if update.is_named(reset) {
                log::debug!("'{}' changed, clearing history of '{}'", reset, self.property);
                self.buffer.clear();
                touched = true;
            }
        }

        if update.is_named(&self.property) {
            if let Some(value) = &update.value {
                self.last_value = Some(value.clone());
                touched = true;
            }
            if let Some(sample) = update.sample_of(&self.property) {
                if self.buffer.accepts(sample.time) {
                    self.buffer.push(sample.time, sample.value);
                } else {
                    log::debug!(
                        "dropping out-of-order sample of '{}' at {}",
                        self.property,
                        sample.time
                    );
                }
            }
        }

        if touched {
            self.refresh_axis(moment);
        }
        touched
    }

    fn on_tick(&mut self, moment: &Moment) {
        if let Some(now) = moment.server_ms {
            self.buffer.retain_window(now);
        }
        self.refresh_axis(moment);
    }

    fn render(&self, moment: &Moment, viewport: Viewport) -> Vec<DrawCommand> {
        let mut commands = vec![render::frame(viewport)];
        if let (Some(axis), Some(projection)) =
            (self.scaler.state(), self.projection(moment, viewport))
        {
            commands.extend(render::history(axis, &projection, viewport, &self.unit));
        }
        commands.extend(render::labels(viewport, &self.title, &self.unit));
        if let Some(value) = &self.last_value {
            commands.push(render::value(viewport, &value.to_string()));
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Sample;
    use crate::message::GaugeMeta;
    use crate::render::LineRole;

    fn at(server_ms: i64) -> Moment {
        Moment {
            local_ms: server_ms,
            server_ms: Some(server_ms),
        }
    }

    fn sample(name: &str, time: i64, value: f64) -> PropertyUpdate {
        PropertyUpdate {
            name: Some(name.to_string()),
            value: Some(PropertyValue::Number(value)),
            time_ms: Some(time),
            ..PropertyUpdate::default()
        }
    }

    fn gauge() -> HistoryGauge {
        HistoryGauge::new("depthOfWater", None, 60_000, PinnedBounds::default(), 0)
    }

    #[test]
    fn samples_drive_extent_and_axis() {
        let mut g = gauge();
        for (t, v) in [(0, 5.0), (1_000, 5.2), (2_000, 4.9)] {
            assert!(g.on_update(&sample("depthOfWater", t, v), &at(t)));
        }
        assert_eq!(g.buffer().len(), 3);
        assert_eq!(g.extent(), (4.9, 5.2));
        let axis = g.axis().unwrap();
        assert_eq!(axis.value_step, 0.1);
        assert_eq!(axis.time_step.label, "min");
    }

    #[test]
    fn out_of_order_sample_is_dropped() {
        let mut g = gauge();
        g.on_update(&sample("depthOfWater", 5_000, 1.0), &at(5_000));
        assert!(g.on_update(&sample("depthOfWater", 4_000, 9.0), &at(5_000)));
        assert_eq!(g.buffer().len(), 1);
        assert_eq!(g.last_value(), Some(&PropertyValue::Number(9.0)));
    }

    #[test]
    fn pushed_bounds_are_authoritative() {
        let mut g = gauge();
        let config = PropertyUpdate {
            meta: GaugeMeta {
                title: Some("Depth".into()),
                unit: Some("m".into()),
                history_ms: Some(600_000),
                min: Some(0.0),
                max: Some(20.0),
            },
            ..PropertyUpdate::default()
        };
        assert!(g.on_update(&config, &at(0)));
        g.on_update(&sample("depthOfWater", 0, 35.0), &at(0));
        assert_eq!(g.extent(), (0.0, 20.0));
        assert_eq!(g.buffer().window_ms(), 600_000);
        assert_eq!(g.axis().unwrap().value_step, 5.0);
    }

    #[test]
    fn reset_property_clears_history() {
        let mut g = HistoryGauge::new(
            "estimatedTimeOfArrival",
            Some("toWaypoint".to_string()),
            60_000,
            PinnedBounds::default(),
            0,
        );
        g.on_update(&sample("estimatedTimeOfArrival", 0, 30.0), &at(0));
        g.on_update(&sample("estimatedTimeOfArrival", 1_000, 29.0), &at(1_000));
        let mut waypoint = sample("toWaypoint", 2_000, 0.0);
        waypoint.value = Some(PropertyValue::Text("WP2".into()));
        assert!(g.on_update(&waypoint, &at(2_000)));
        assert!(g.buffer().is_empty());
        assert_eq!(g.properties(), vec!["estimatedTimeOfArrival", "toWaypoint"]);
    }

    #[test]
    fn reset_property_metadata_is_not_taken() {
        let mut g = HistoryGauge::new(
            "estimatedTimeOfArrival",
            Some("toWaypoint".to_string()),
            60_000,
            PinnedBounds::default(),
            0,
        );
        let own = PropertyUpdate {
            name: Some("estimatedTimeOfArrival".to_string()),
            meta: GaugeMeta {
                title: Some("ETA".into()),
                ..GaugeMeta::default()
            },
            ..PropertyUpdate::default()
        };
        g.on_update(&own, &at(0));
        let waypoint = PropertyUpdate {
            name: Some("toWaypoint".to_string()),
            meta: GaugeMeta {
                title: Some("Waypoint".into()),
                history_ms: Some(5_000),
                min: Some(1.0),
                ..GaugeMeta::default()
            },
            backfill: Some(vec![Sample::new(0, 4.0)]),
            ..PropertyUpdate::default()
        };
        g.on_update(&waypoint, &at(1_000));
        assert_eq!(g.title(), "ETA");
        assert_eq!(g.buffer().window_ms(), 60_000);
        assert_eq!(g.pinned(), PinnedBounds::default());
        assert!(g.buffer().is_empty());
    }

    #[test]
    fn one_sided_push_keeps_other_pin() {
        let mut g = HistoryGauge::new(
            "depthOfWater",
            None,
            60_000,
            PinnedBounds::new(Some(0.0), Some(20.0)),
            0,
        );
        let lower = PropertyUpdate {
            meta: GaugeMeta {
                min: Some(2.0),
                ..GaugeMeta::default()
            },
            ..PropertyUpdate::default()
        };
        assert!(g.on_update(&lower, &at(0)));
        assert_eq!(g.pinned(), PinnedBounds::new(Some(2.0), Some(20.0)));
    }

    #[test]
    fn backfill_is_projected_whole() {
        let mut g = gauge();
        let backfill = PropertyUpdate {
            backfill: Some((0..30).map(|i| Sample::new(i * 1_000, i as f64)).collect()),
            ..PropertyUpdate::default()
        };
        g.on_update(&backfill, &at(29_000));
        let projection = g.projection(&at(29_000), Viewport::default()).unwrap();
        assert_eq!(projection.points.len(), 30);
    }

    #[test]
    fn nothing_is_projected_before_sync() {
        let mut g = gauge();
        let unsynced = Moment {
            local_ms: 0,
            server_ms: None,
        };
        g.on_update(&sample("depthOfWater", 0, 1.0), &unsynced);
        assert!(g.projection(&unsynced, Viewport::default()).is_none());
        let commands = g.render(&unsynced, Viewport::default());
        assert!(!commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Polyline { role: LineRole::History, .. })));
    }

    #[test]
    fn tick_evicts_against_server_time() {
        let mut g = HistoryGauge::new("depthOfWater", None, 10_000, PinnedBounds::default(), 0);
        for i in 0..100 {
            g.on_update(&sample("depthOfWater", i * 1_000, 1.0), &at(i * 1_000));
        }
        g.on_tick(&at(100_000));
        assert_eq!(g.buffer().len(), 10);
        assert!(g.buffer().iter().all(|s| s.time >= 90_000));
    }
}
