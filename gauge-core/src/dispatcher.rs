use crate::clock::{ClockSync, Moment, WallClock};
use crate::gauge::{Gauge, GaugeStatus};
use crate::message::PushMessage;
use crate::projection::Viewport;
use crate::render::DrawCommand;
use connection::{ServerEvent, SubscriptionRequest};
use dashboard::DashboardDefinition;

/// Rendered output of one gauge.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeFrame {
    pub id: String,
    pub status: GaugeStatus,
    pub commands: Vec<DrawCommand>,
}

/// Owns the gauges of a dashboard and the shared clock, and routes each
/// server event to the gauge it was subscribed for.
pub struct Dispatcher<C> {
    gauges: Vec<Gauge>,
    clock: ClockSync<C>,
    viewport: Viewport,
}

impl<C: WallClock> Dispatcher<C> {
    pub fn new(definition: &DashboardDefinition, clock: C) -> Self {
        let settings = &definition.settings;
        Self {
            gauges: definition
                .gauges
                .iter()
                .map(|gauge| Gauge::from_definition(gauge, settings))
                .collect(),
            clock: ClockSync::new(clock, settings.time_unit, settings.time_offset_ms),
            viewport: Viewport::new(settings.viewport_width, settings.viewport_height),
        }
    }

    pub fn subscriptions(&self) -> Vec<SubscriptionRequest> {
        self.gauges.iter().map(Gauge::subscription).collect()
    }

    pub fn gauges(&self) -> &[Gauge] {
        &self.gauges
    }

    pub fn gauge(&self, id: &str) -> Option<&Gauge> {
        self.gauges.iter().find(|gauge| gauge.id() == id)
    }

    pub fn clock(&self) -> &ClockSync<C> {
        &self.clock
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn moment(&self) -> Moment {
        self.clock.moment()
    }

    /// Handles one event. Returns whether a gauge used it; unknown events,
    /// unknown properties and malformed payloads are dropped.
    pub fn dispatch(&mut self, event: &ServerEvent) -> bool {
        let Some(index) = self.gauges.iter().position(|g| g.id() == event.event) else {
            log::trace!("no gauge for event '{}'", event.event);
            return false;
        };
        let message = match PushMessage::parse(&event.data) {
            Ok(message) => message,
            Err(err) => {
                log::debug!("dropping payload for '{}': {}", event.event, err);
                return false;
            }
        };

        if let (Some(_), Some(time)) = (&message.name, message.time) {
            self.clock.sync(time);
        }
        let update = message.into_update(&self.clock);
        if !self.clock.is_synced() {
            // until a live sample arrives the newest backfilled sample is the
            // best server time there is
            let newest = update
                .backfill
                .as_ref()
                .and_then(|samples| samples.iter().map(|s| s.time).max());
            if let Some(newest) = newest {
                self.clock.sync_millis(newest);
            }
        }

        let moment = self.clock.moment();
        let gauge = &mut self.gauges[index];
        let used = gauge.handle(&update, &moment);
        if !used {
            log::trace!(
                "gauge '{}' ignored property {:?}",
                event.event,
                update.name.as_deref().unwrap_or("")
            );
        }
        used
    }

    /// Periodic tick: evicts stale history, refreshes axes, passivates idle
    /// gauges.
    pub fn tick(&mut self) {
        let moment = self.clock.moment();
        for gauge in &mut self.gauges {
            gauge.tick(&moment);
        }
    }

    pub fn render(&self, id: &str) -> Option<GaugeFrame> {
        let moment = self.clock.moment();
        self.gauge(id).map(|gauge| self.frame(gauge, &moment))
    }

    pub fn render_all(&self) -> Vec<GaugeFrame> {
        let moment = self.clock.moment();
        self.gauges
            .iter()
            .map(|gauge| self.frame(gauge, &moment))
            .collect()
    }

    fn frame(&self, gauge: &Gauge, moment: &Moment) -> GaugeFrame {
        GaugeFrame {
            id: gauge.id().to_string(),
            status: gauge.status(),
            commands: gauge.render(moment, self.viewport),
        }
    }
}
