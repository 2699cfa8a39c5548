#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeState {
    pub tick_count: u64,
    pub events_used: u64,
    pub events_dropped: u64,
    pub transport_closed: bool,
}

impl RuntimeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn update_tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
    }

    pub fn record_event(&mut self, used: bool) {
        if used {
            self.events_used += 1;
        } else {
            self.events_dropped += 1;
        }
    }
}
