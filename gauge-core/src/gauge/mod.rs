pub mod ais;
pub mod history;
pub mod rotation;
pub mod tactical;
pub mod text;

pub use ais::AisTable;
pub use history::HistoryGauge;
pub use rotation::RotationGauge;
pub use tactical::{TacticalGauge, WindTier};
pub use text::TextGauge;

use crate::axis::PinnedBounds;
use crate::clock::Moment;
use crate::message::PropertyUpdate;
use crate::projection::Viewport;
use crate::render::DrawCommand;
use connection::SubscriptionRequest;
use dashboard::{DashboardSettings, GaugeDefinition, GaugeKindDefinition};

/// Visual freshness of a gauge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GaugeStatus {
    #[default]
    Uninitialized,
    Active,
    Passive,
}

/// Capability shared by every gauge kind.
pub trait GaugeBehavior {
    /// Property names to subscribe to.
    fn properties(&self) -> Vec<String>;
    /// Applies an update; returns whether the gauge used any of it.
    fn on_update(&mut self, update: &PropertyUpdate, moment: &Moment) -> bool;
    fn on_tick(&mut self, moment: &Moment);
    fn render(&self, moment: &Moment, viewport: Viewport) -> Vec<DrawCommand>;
}

#[derive(Debug, Clone)]
pub enum GaugeKind {
    Text(TextGauge),
    Rotation(RotationGauge),
    History(HistoryGauge),
    Composite(TacticalGauge),
    Table(AisTable),
}

impl GaugeKind {
    pub fn from_definition(kind: &GaugeKindDefinition, settings: &DashboardSettings) -> Self {
        match kind {
            GaugeKindDefinition::Text { property } => GaugeKind::Text(TextGauge::single(property)),
            GaugeKindDefinition::TwoRow {
                property1,
                property2,
            } => GaugeKind::Text(TextGauge::two_row(property1, property2)),
            GaugeKindDefinition::Rotation { property, style } => {
                GaugeKind::Rotation(RotationGauge::new(property, *style))
            }
            GaugeKindDefinition::History {
                property,
                reset_property,
                window_ms,
                min,
                max,
            } => GaugeKind::History(HistoryGauge::new(
                property,
                reset_property.clone(),
                *window_ms,
                PinnedBounds::new(*min, *max),
                settings.zone_offset_ms(),
            )),
            GaugeKindDefinition::Tactical => GaugeKind::Composite(TacticalGauge::new()),
            GaugeKindDefinition::Ais { columns } => {
                GaugeKind::Table(AisTable::new(columns.clone()))
            }
        }
    }

    fn behavior(&self) -> &dyn GaugeBehavior {
        match self {
            GaugeKind::Text(gauge) => gauge,
            GaugeKind::Rotation(gauge) => gauge,
            GaugeKind::History(gauge) => gauge,
            GaugeKind::Composite(gauge) => gauge,
            GaugeKind::Table(gauge) => gauge,
        }
    }

    fn behavior_mut(&mut self) -> &mut dyn GaugeBehavior {
        match self {
            GaugeKind::Text(gauge) => gauge,
            GaugeKind::Rotation(gauge) => gauge,
            GaugeKind::History(gauge) => gauge,
            GaugeKind::Composite(gauge) => gauge,
            GaugeKind::Table(gauge) => gauge,
        }
    }

    /// A single-row text gauge becomes a history gauge once the server
    /// configures a positive history length for it.
    fn upgrade_for(&mut self, update: &PropertyUpdate, zone_offset_ms: i64) {
        let Some(window) = update.meta.history_window() else {
            return;
        };
        let GaugeKind::Text(text) = self else {
            return;
        };
        if text.is_two_row() {
            return;
        }
        if !text.rows().iter().any(|row| update.addresses(&row.property)) {
            return;
        }
        let (mut rows, title, unit) = text.clone().into_parts();
        let Some(row) = rows.pop() else {
            return;
        };
        log::info!("'{}' switches to history mode ({} ms)", row.property, window);
        *self = GaugeKind::History(HistoryGauge::from_text(
            row,
            title,
            unit,
            window,
            zone_offset_ms,
        ));
    }
}

impl GaugeBehavior for GaugeKind {
    fn properties(&self) -> Vec<String> {
        self.behavior().properties()
    }

    fn on_update(&mut self, update: &PropertyUpdate, moment: &Moment) -> bool {
        self.behavior_mut().on_update(update, moment)
    }

    fn on_tick(&mut self, moment: &Moment) {
        self.behavior_mut().on_tick(moment)
    }

    fn render(&self, moment: &Moment, viewport: Viewport) -> Vec<DrawCommand> {
        self.behavior().render(moment, viewport)
    }
}

/// One configured gauge: its kind plus the active/passive bookkeeping.
#[derive(Debug, Clone)]
pub struct Gauge {
    id: String,
    kind: GaugeKind,
    status: GaugeStatus,
    refreshed_at: Option<i64>,
    passive_after_ms: i64,
    zone_offset_ms: i64,
}

impl Gauge {
    pub fn new(id: impl Into<String>, kind: GaugeKind, settings: &DashboardSettings) -> Self {
        Self {
            id: id.into(),
            kind,
            status: GaugeStatus::Uninitialized,
            refreshed_at: None,
            passive_after_ms: settings.passive_after_ms,
            zone_offset_ms: settings.zone_offset_ms(),
        }
    }

    pub fn from_definition(definition: &GaugeDefinition, settings: &DashboardSettings) -> Self {
        Self::new(
            definition.id.clone(),
            GaugeKind::from_definition(&definition.kind, settings),
            settings,
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &GaugeKind {
        &self.kind
    }

    pub fn status(&self) -> GaugeStatus {
        self.status
    }

    pub fn refreshed_at(&self) -> Option<i64> {
        self.refreshed_at
    }

    pub fn subscription(&self) -> SubscriptionRequest {
        SubscriptionRequest::new(self.id.clone(), self.kind.properties())
    }

    /// Routes an update into the gauge. Any update the gauge uses makes it
    /// active again.
    pub fn handle(&mut self, update: &PropertyUpdate, moment: &Moment) -> bool {
        self.kind.upgrade_for(update, self.zone_offset_ms);
        let used = self.kind.on_update(update, moment);
        if used {
            self.refreshed_at = Some(moment.local_ms);
            if self.status != GaugeStatus::Active {
                log::debug!("gauge '{}' active", self.id);
                self.status = GaugeStatus::Active;
            }
        }
        used
    }

    pub fn tick(&mut self, moment: &Moment) {
        self.kind.on_tick(moment);
        if self.status != GaugeStatus::Active {
            return;
        }
        if let Some(refreshed) = self.refreshed_at {
            if moment.local_ms - refreshed > self.passive_after_ms {
                log::debug!("gauge '{}' passive", self.id);
                self.status = GaugeStatus::Passive;
            }
        }
    }

    pub fn render(&self, moment: &Moment, viewport: Viewport) -> Vec<DrawCommand> {
        self.kind.render(moment, viewport)
    }
}
