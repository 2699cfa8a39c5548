use crate::message_handler::{RuntimeFrame, RuntimeMessage};
use crate::state_manager::RuntimeState;
use connection::{Connection, ServerEvent};
use dashboard::{validate_dashboard, DashboardDefinition};
use gauge_core::{Dispatcher, SystemClock, WallClock};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

pub struct GaugeRuntime<C> {
    dispatcher: Dispatcher<C>,
    connection: Box<dyn Connection<ServerEvent>>,
    state: RuntimeState,
    tick_period: Duration,
}

fn subscribe_all<C: WallClock>(
    dispatcher: &Dispatcher<C>,
    connection: &dyn Connection<ServerEvent>,
) -> Result<(), String> {
    for request in dispatcher.subscriptions() {
        let event = request.event.clone();
        connection
            .subscribe(request)
            .map_err(|err| format!("subscribing gauge '{event}' failed: {err}"))?;
    }
    Ok(())
}

impl<C: WallClock> GaugeRuntime<C> {
    pub fn new(
        definition: &DashboardDefinition,
        clock: C,
        connection: Box<dyn Connection<ServerEvent>>,
    ) -> Result<Self, String> {
        validate_dashboard(definition).map_err(|err| err.to_string())?;
        let dispatcher = Dispatcher::new(definition, clock);
        subscribe_all(&dispatcher, connection.as_ref())?;
        log::info!(
            "dashboard '{}' started with {} gauges",
            definition.name,
            definition.gauges.len()
        );
        Ok(Self {
            dispatcher,
            connection,
            state: RuntimeState::new(),
            tick_period: Duration::from_millis(definition.settings.tick_ms),
        })
    }

    pub fn replace_dashboard(
        &mut self,
        definition: &DashboardDefinition,
        clock: C,
    ) -> Result<(), String> {
        validate_dashboard(definition).map_err(|err| err.to_string())?;
        let dispatcher = Dispatcher::new(definition, clock);
        subscribe_all(&dispatcher, self.connection.as_ref())?;
        log::info!("dashboard replaced by '{}'", definition.name);
        self.dispatcher = dispatcher;
        self.tick_period = Duration::from_millis(definition.settings.tick_ms);
        self.state.clear();
        Ok(())
    }

    pub fn dispatcher(&self) -> &Dispatcher<C> {
        &self.dispatcher
    }

    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    pub fn dispatch(&mut self, event: &ServerEvent) -> bool {
        let used = self.dispatcher.dispatch(event);
        self.state.record_event(used);
        used
    }

    pub fn drain(&mut self) -> usize {
        let mut drained = 0;
        loop {
            match self.connection.try_recv() {
                Ok(Some(event)) => {
                    self.dispatch(&event);
                    drained += 1;
                }
                Ok(None) => break,
                Err(err) => {
                    if !self.state.transport_closed {
                        log::warn!("event stream unavailable: {err}");
                        self.state.transport_closed = true;
                    }
                    break;
                }
            }
        }
        drained
    }

    pub fn tick(&mut self) -> RuntimeFrame {
        self.drain();
        self.dispatcher.tick();
        self.state.update_tick();
        self.frame()
    }

    pub fn frame(&self) -> RuntimeFrame {
        RuntimeFrame {
            tick: self.state.tick_count,
            server_time: self.dispatcher.clock().server_now(),
            frames: self.dispatcher.render_all(),
        }
    }
}

enum Control {
    Continue,
    Stop,
}

fn handle_control<C: WallClock + Clone>(
    runtime: &mut GaugeRuntime<C>,
    control_rx: &Receiver<RuntimeMessage>,
    clock: &C,
) -> Control {
    loop {
        match control_rx.try_recv() {
            Ok(RuntimeMessage::UpdateDashboard(definition)) => {
                if let Err(err) = runtime.replace_dashboard(&definition, clock.clone()) {
                    log::warn!("dashboard update rejected: {err}");
                }
            }
            Ok(RuntimeMessage::Snapshot(reply)) => {
                let _ = reply.send(runtime.frame());
            }
            Ok(RuntimeMessage::Shutdown) => return Control::Stop,
            Err(TryRecvError::Empty) => return Control::Continue,
            Err(TryRecvError::Disconnected) => return Control::Stop,
        }
    }
}

pub fn run_runtime_current<C: WallClock + Clone>(
    mut runtime: GaugeRuntime<C>,
    clock: C,
    control_rx: Receiver<RuntimeMessage>,
    frame_tx: Sender<RuntimeFrame>,
) -> Result<(), String> {
    loop {
        if let Control::Stop = handle_control(&mut runtime, &control_rx, &clock) {
            break;
        }
        let frame = runtime.tick();
        if frame_tx.send(frame).is_err() {
            break;
        }
        thread::sleep(runtime.tick_period());
    }
    log::info!("runtime stopped after {} ticks", runtime.state().tick_count);
    Ok(())
}

pub fn spawn_runtime(
    definition: DashboardDefinition,
    connection: Box<dyn Connection<ServerEvent>>,
) -> Result<(Sender<RuntimeMessage>, Receiver<RuntimeFrame>), String> {
    let (control_tx, control_rx) = mpsc::channel::<RuntimeMessage>();
    let (frame_tx, frame_rx) = mpsc::channel::<RuntimeFrame>();
    let runtime = GaugeRuntime::new(&definition, SystemClock, connection)?;

    thread::Builder::new()
        .name("gauge-runtime".to_string())
        .spawn(move || {
            if let Err(err) = run_runtime_current(runtime, SystemClock, control_rx, frame_tx) {
                log::warn!("runtime exited: {err}");
            }
        })
        .map_err(|err| format!("failed to start runtime thread: {err}"))?;

    Ok((control_tx, frame_rx))
}
