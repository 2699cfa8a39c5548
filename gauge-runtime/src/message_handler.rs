use dashboard::DashboardDefinition;
use gauge_core::GaugeFrame;
use std::sync::mpsc::Sender;

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeFrame {
    pub tick: u64,
    pub server_time: Option<i64>,
    pub frames: Vec<GaugeFrame>,
}

impl RuntimeFrame {
    pub fn gauge(&self, id: &str) -> Option<&GaugeFrame> {
        self.frames.iter().find(|frame| frame.id == id)
    }
}

#[derive(Debug, Clone)]
pub enum RuntimeMessage {
    UpdateDashboard(DashboardDefinition),
    Snapshot(Sender<RuntimeFrame>),
    Shutdown,
}
