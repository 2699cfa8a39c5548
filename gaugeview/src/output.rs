use connection::SubscriptionRequest;
use gauge_core::GaugeFrame;

pub fn print_info(message: &str) {
    println!("[gaugeview][INFO] {message}");
}

pub fn print_error(message: &str) {
    eprintln!("[gaugeview][ERROR]: {message}");
}

pub fn print_subscriptions(requests: &[SubscriptionRequest]) -> Result<(), serde_json::Error> {
    if requests.is_empty() {
        print_info("No gauges defined");
        return Ok(());
    }
    for request in requests {
        println!("{}", serde_json::to_string(request)?);
    }
    Ok(())
}

pub fn print_frames(tick: u64, server_time: Option<i64>, frames: &[GaugeFrame]) {
    match server_time {
        Some(time) => print_info(&format!("tick {tick}, server time {time}")),
        None => print_info(&format!("tick {tick}, not synced")),
    }
    for frame in frames {
        println!(
            "{} - {:?} ({} commands)",
            frame.id,
            frame.status,
            frame.commands.len()
        );
    }
}
