use std::io::Write;
use std::process::{Command, Stdio};

const DASHBOARD: &str = r#"{
  "name": "bridge",
  "settings": { "tick_ms": 100 },
  "gauges": [
    { "id": "0", "kind": "history", "property": "depthOfWater" },
    { "id": "1", "kind": "two_row", "property1": "latitude", "property2": "longitude" },
    { "id": "2", "kind": "tactical" }
  ]
}"#;

fn write_dashboard(dir: &std::path::Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("dashboard.json");
    std::fs::write(&path, contents).expect("write dashboard");
    path
}

#[test]
fn check_accepts_valid_dashboard() {
    let exe = env!("CARGO_BIN_EXE_gaugeview");
    let dir = tempfile::tempdir().expect("tempdir");
    let dashboard = write_dashboard(dir.path(), DASHBOARD);

    let output = Command::new(exe)
        .arg("check")
        .arg(&dashboard)
        .output()
        .expect("run gaugeview");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("[gaugeview][INFO] Dashboard 'bridge' is valid (3 gauges)"));
}

#[test]
fn check_rejects_duplicate_ids() {
    let exe = env!("CARGO_BIN_EXE_gaugeview");
    let dir = tempfile::tempdir().expect("tempdir");
    let dashboard = write_dashboard(
        dir.path(),
        r#"{"name":"dup","gauges":[
            {"id":"0","kind":"text","property":"a"},
            {"id":"0","kind":"text","property":"b"}]}"#,
    );

    let output = Command::new(exe)
        .arg("check")
        .arg(&dashboard)
        .output()
        .expect("run gaugeview");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("[gaugeview][ERROR]"));
}

#[test]
fn subscriptions_print_one_request_per_gauge() {
    let exe = env!("CARGO_BIN_EXE_gaugeview");
    let dir = tempfile::tempdir().expect("tempdir");
    let dashboard = write_dashboard(dir.path(), DASHBOARD);

    let output = Command::new(exe)
        .arg("subscriptions")
        .arg(&dashboard)
        .output()
        .expect("run gaugeview");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let requests: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0]["event"], "0");
}

#[test]
fn replay_writes_svg_snapshots() {
    let exe = env!("CARGO_BIN_EXE_gaugeview");
    let dir = tempfile::tempdir().expect("tempdir");
    let dashboard = write_dashboard(dir.path(), DASHBOARD);
    let events = dir.path().join("events.jsonl");
    let mut file = std::fs::File::create(&events).expect("events file");
    for i in 0..5 {
        writeln!(
            file,
            r#"{{"at_ms":{},"event":"0","data":{{"name":"depthOfWater","value":{},"time":{}}}}}"#,
            i * 100,
            10.0 + i as f64,
            1_700_000_000_000i64 + i * 100
        )
        .expect("write event");
    }
    drop(file);
    let out = dir.path().join("svg");

    let output = Command::new(exe)
        .arg("replay")
        .arg(&dashboard)
        .arg(&events)
        .arg("--out")
        .arg(&out)
        .output()
        .expect("run gaugeview");
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Replayed 5 events, wrote 3 snapshots"));
    for id in ["0", "1", "2"] {
        let svg = std::fs::read_to_string(out.join(format!("final-{id}.svg"))).expect("snapshot");
        assert!(svg.contains("<svg"));
    }
}

#[test]
fn live_reads_events_from_stdin() {
    let exe = env!("CARGO_BIN_EXE_gaugeview");
    let dir = tempfile::tempdir().expect("tempdir");
    let dashboard = write_dashboard(dir.path(), DASHBOARD);

    let mut child = Command::new(exe)
        .arg("live")
        .arg(&dashboard)
        .args(["--ticks", "3"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("run gaugeview");
    {
        let stdin = child.stdin.as_mut().expect("stdin");
        let _ = writeln!(
            stdin,
            r#"{{"event":"1","data":{{"name":"latitude","value":"60 10.5 N"}}}}"#
        );
    }
    let output = child.wait_with_output().expect("wait gaugeview");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[gaugeview][INFO] tick 3"));
    assert!(stdout.contains("0 - Uninitialized"));
}
