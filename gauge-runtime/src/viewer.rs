use crate::message_handler::{RuntimeFrame, RuntimeMessage};
use crate::runtime::spawn_runtime;
use connection::{Connection, ServerEvent};
use dashboard::DashboardDefinition;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

pub struct ViewerService {
    control_tx: Sender<RuntimeMessage>,
    frame_rx: Receiver<RuntimeFrame>,
}

impl ViewerService {
    pub fn new(
        definition: DashboardDefinition,
        connection: Box<dyn Connection<ServerEvent>>,
    ) -> Result<Self, String> {
        let (control_tx, frame_rx) = spawn_runtime(definition, connection)?;
        Ok(Self {
            control_tx,
            frame_rx,
        })
    }

    pub fn load_dashboard(&self, definition: DashboardDefinition) {
        let _ = self
            .control_tx
            .send(RuntimeMessage::UpdateDashboard(definition));
    }

    pub fn poll_frame(&self) -> Option<RuntimeFrame> {
        self.frame_rx.try_iter().last()
    }

    pub fn snapshot(&self, timeout: Duration) -> Option<RuntimeFrame> {
        // queued frames are older than the answer
        self.frame_rx.try_iter().for_each(drop);
        let (reply_tx, reply_rx) = mpsc::channel();
        self.control_tx
            .send(RuntimeMessage::Snapshot(reply_tx))
            .ok()?;
        reply_rx.recv_timeout(timeout).ok()
    }

    pub fn run_for_duration(&self, duration: Duration) -> Result<Option<RuntimeFrame>, String> {
        let start = Instant::now();
        let mut latest = None;
        while start.elapsed() < duration {
            if let Some(frame) = self.poll_frame() {
                latest = Some(frame);
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        Ok(latest)
    }

    pub fn run_for_ticks(&self, ticks: u64) -> Result<RuntimeFrame, String> {
        loop {
            let frame = self
                .frame_rx
                .recv()
                .map_err(|_| "runtime stopped before reaching the tick".to_string())?;
            if frame.tick >= ticks {
                return Ok(frame);
            }
        }
    }

    pub fn shutdown(&self) {
        let _ = self.control_tx.send(RuntimeMessage::Shutdown);
    }
}

impl Drop for ViewerService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
