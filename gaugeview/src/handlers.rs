use crate::commands::Commands;
use crate::output::*;
use crate::svg::write_frame;
use connection::{read_recorded_events, InProcessConnection, RecordedEvent, ServerEvent};
use dashboard::{validate_dashboard, DashboardDefinition};
use gauge_core::{Dispatcher, ManualClock, SystemClock, Viewport};
use gauge_runtime::{GaugeRuntime, RuntimeFrame, ViewerService};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc::Sender;
use std::thread;

pub fn handle_command(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Check { dashboard } => {
            let definition = load_dashboard(&dashboard)?;
            print_info(&format!(
                "Dashboard '{}' is valid ({} gauges)",
                definition.name,
                definition.gauges.len()
            ));
        }
        Commands::Subscriptions { dashboard } => {
            let definition = load_dashboard(&dashboard)?;
            let dispatcher = Dispatcher::new(&definition, SystemClock);
            print_subscriptions(&dispatcher.subscriptions())?;
        }
        Commands::Replay {
            dashboard,
            events,
            out,
            every_ms,
        } => {
            let definition = load_dashboard(&dashboard)?;
            let file = File::open(&events)
                .map_err(|err| format!("cannot open {}: {err}", events.display()))?;
            let recorded = read_recorded_events(BufReader::new(file))?;
            let written = replay(&definition, &recorded, &out, every_ms)?;
            print_info(&format!(
                "Replayed {} events, wrote {written} snapshots to {}",
                recorded.len(),
                out.display()
            ));
        }
        Commands::Live {
            dashboard,
            ticks,
            out,
        } => {
            let definition = load_dashboard(&dashboard)?;
            let frame = live(definition.clone(), ticks)?;
            print_frames(frame.tick, frame.server_time, &frame.frames);
            if let Some(dir) = out {
                let viewport = viewport_of(&definition);
                for gauge in &frame.frames {
                    write_frame(&dir, "live", gauge, viewport)?;
                }
            }
        }
    }
    Ok(())
}

fn load_dashboard(path: &Path) -> Result<DashboardDefinition, String> {
    let definition = DashboardDefinition::load_from_file(path)
        .map_err(|err| format!("failed to load {}: {err}", path.display()))?;
    validate_dashboard(&definition).map_err(|err| err.to_string())?;
    Ok(definition)
}

fn viewport_of(definition: &DashboardDefinition) -> Viewport {
    Viewport::new(
        definition.settings.viewport_width,
        definition.settings.viewport_height,
    )
}

/// Plays the recording against a manual clock that follows the recorded
/// arrival times, ticking every `tick_ms`. Returns the number of files
/// written.
fn replay(
    definition: &DashboardDefinition,
    recorded: &[RecordedEvent],
    out: &Path,
    every_ms: Option<u64>,
) -> Result<usize, Box<dyn std::error::Error>> {
    let clock = ManualClock::new(0);
    let mut runtime = GaugeRuntime::new(
        definition,
        clock.clone(),
        Box::new(InProcessConnection::<ServerEvent>::new()),
    )?;
    let viewport = viewport_of(definition);
    let tick_ms = definition.settings.tick_ms.max(1);
    let end = recorded.last().map(|r| r.at_ms).unwrap_or(0);

    let mut pending = recorded.iter().peekable();
    let mut next_snapshot = every_ms;
    let mut written = 0;
    let mut now = 0;
    loop {
        now += tick_ms;
        while let Some(event) = pending.next_if(|event| event.at_ms <= now) {
            clock.set(event.at_ms as i64);
            runtime.dispatch(&event.event);
        }
        clock.set(now as i64);
        let current = runtime.tick();

        if let (Some(period), Some(due)) = (every_ms, next_snapshot) {
            if now >= due {
                let prefix = format!("{now:010}");
                for gauge in &current.frames {
                    write_frame(out, &prefix, gauge, viewport)?;
                    written += 1;
                }
                next_snapshot = Some(due + period.max(1));
            }
        }
        if now >= end {
            break;
        }
    }

    for gauge in &runtime.frame().frames {
        write_frame(out, "final", gauge, viewport)?;
        written += 1;
    }
    let state = runtime.state();
    log::info!(
        "replay finished: {} events used, {} dropped",
        state.events_used,
        state.events_dropped
    );
    Ok(written)
}

fn forward_stdin(sender: Sender<ServerEvent>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                log::warn!("stdin closed: {err}");
                return;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match RecordedEvent::parse_line(trimmed) {
            Ok(recorded) => {
                if sender.send(recorded.event).is_err() {
                    return;
                }
            }
            Err(err) => print_error(&format!("skipping line: {err}")),
        }
    }
}

/// Runs the dashboard on the system clock with events read from stdin and
/// returns the frame of tick `ticks`.
fn live(definition: DashboardDefinition, ticks: u64) -> Result<RuntimeFrame, String> {
    let connection = InProcessConnection::new();
    let sender = connection.sender();
    thread::Builder::new()
        .name("gaugeview-stdin".to_string())
        .spawn(move || forward_stdin(sender))
        .map_err(|err| format!("failed to start stdin reader: {err}"))?;

    let viewer = ViewerService::new(definition, Box::new(connection))?;
    let frame = viewer.run_for_ticks(ticks)?;
    viewer.shutdown();
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard::{DashboardSettings, GaugeDefinition, GaugeKindDefinition};

    fn definition() -> DashboardDefinition {
        DashboardDefinition {
            name: "replay".to_string(),
            description: String::new(),
            settings: DashboardSettings {
                tick_ms: 100,
                ..DashboardSettings::default()
            },
            gauges: vec![GaugeDefinition {
                id: "0".to_string(),
                kind: GaugeKindDefinition::Text {
                    property: "speedOverGround".to_string(),
                },
            }],
        }
    }

    fn event(at_ms: u64, value: f64, time: i64) -> RecordedEvent {
        RecordedEvent {
            at_ms,
            event: ServerEvent::new(
                "0",
                format!(r#"{{"name":"speedOverGround","value":{value},"time":{time}}}"#),
            ),
        }
    }

    #[test]
    fn replay_writes_final_snapshot_per_gauge() {
        let dir = tempfile::tempdir().unwrap();
        let recorded = vec![event(0, 5.5, 1_000), event(150, 6.25, 1_150)];
        let written = replay(&definition(), &recorded, dir.path(), None).unwrap();
        assert_eq!(written, 1);
        let svg = std::fs::read_to_string(dir.path().join("final-0.svg")).unwrap();
        assert!(svg.contains("6.25"));
    }

    #[test]
    fn replay_writes_periodic_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let recorded = vec![event(0, 5.5, 1_000), event(450, 6.0, 1_450)];
        let written = replay(&definition(), &recorded, dir.path(), Some(200)).unwrap();
        // ticks 100..=500, snapshots at 200 and 400, then the final one
        assert_eq!(written, 3);
        assert!(dir.path().join("0000000200-0.svg").exists());
        assert!(dir.path().join("0000000400-0.svg").exists());
    }

    #[test]
    fn invalid_dashboard_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_dashboard(&path).unwrap_err().contains("failed to load"));
    }
}
