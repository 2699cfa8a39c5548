use connection::{
    read_recorded_events, Connection, ConnectionConfig, ConnectionFactory, ConnectionKind,
    InProcessConnection, PropertySelector, RecordedEvent, ServerEvent, SubscriptionRequest,
};

fn create_connection(kind: ConnectionKind) -> Box<dyn Connection<ServerEvent>> {
    let config = ConnectionConfig { kind };
    ConnectionFactory::create(&config)
}

#[test]
fn config_default_is_inprocess() {
    let config = ConnectionConfig::default();
    assert!(matches!(config.kind, ConnectionKind::InProcess));
}

#[test]
fn in_process_send_recv() {
    let conn = create_connection(ConnectionKind::InProcess);
    assert!(conn.try_recv().unwrap().is_none());
    conn.send(ServerEvent::new("1", "{}")).unwrap();
    assert_eq!(conn.try_recv().unwrap(), Some(ServerEvent::new("1", "{}")));
    assert!(conn.try_recv().unwrap().is_none());
}

#[test]
fn in_process_is_fifo() {
    let conn = InProcessConnection::new();
    conn.send(1).unwrap();
    conn.send(2).unwrap();
    conn.send(3).unwrap();
    assert_eq!(conn.try_recv().unwrap(), Some(1));
    assert_eq!(conn.try_recv().unwrap(), Some(2));
    assert_eq!(conn.try_recv().unwrap(), Some(3));
    assert!(conn.try_recv().unwrap().is_none());
}

#[test]
fn sender_handle_feeds_from_another_thread() {
    let conn = InProcessConnection::new();
    let sender = conn.sender();
    std::thread::spawn(move || {
        sender.send(ServerEvent::new("7", "{\"name\":\"depth\"}")).unwrap();
    })
    .join()
    .unwrap();
    let received = conn.try_recv().unwrap().unwrap();
    assert_eq!(received.event, "7");
}

#[test]
fn subscriptions_are_recorded() {
    let conn: InProcessConnection<ServerEvent> = InProcessConnection::new();
    conn.subscribe(SubscriptionRequest::new("0", vec!["depth".to_string()]))
        .unwrap();
    conn.subscribe(SubscriptionRequest::new(
        "1",
        vec!["roll".to_string(), "pitch".to_string()],
    ))
    .unwrap();
    let subs = conn.subscriptions();
    assert_eq!(subs.len(), 2);
    assert_eq!(subs[0].property, PropertySelector::One("depth".to_string()));
    assert_eq!(subs[1].property.names(), vec!["roll", "pitch"]);
}

#[test]
fn subscription_serializes_like_the_wire_format() {
    let single = SubscriptionRequest::new("3", vec!["depth".to_string()]);
    assert_eq!(
        serde_json::to_value(&single).unwrap(),
        serde_json::json!({"event": "3", "property": "depth"})
    );
    let many = SubscriptionRequest::new("4", vec!["a".to_string(), "b".to_string()]);
    assert_eq!(
        serde_json::to_value(&many).unwrap(),
        serde_json::json!({"event": "4", "property": ["a", "b"]})
    );
}

#[test]
fn recorded_events_accept_string_and_inline_payloads() {
    let input = "\
{\"at_ms\": 2000, \"event\": \"1\", \"data\": {\"name\": \"depth\", \"value\": 4.2}}

{\"at_ms\": 1000, \"event\": \"0\", \"data\": \"{\\\"name\\\":\\\"roll\\\"}\"}
";
    let events = read_recorded_events(input.as_bytes()).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].at_ms, 1000);
    assert_eq!(events[0].event.data, "{\"name\":\"roll\"}");
    let inline: serde_json::Value = serde_json::from_str(&events[1].event.data).unwrap();
    assert_eq!(inline["value"], serde_json::json!(4.2));
}

#[test]
fn recorded_events_report_bad_lines() {
    let err = read_recorded_events("not json\n".as_bytes()).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    assert!(err.to_string().starts_with("line 1"));
}

#[test]
fn single_line_defaults_arrival_time() {
    let recorded =
        RecordedEvent::parse_line(r#"{"event":"2","data":{"name":"roll","value":-3}}"#).unwrap();
    assert_eq!(recorded.at_ms, 0);
    assert_eq!(recorded.event.event, "2");
    assert!(RecordedEvent::parse_line(r#"{"data":{}}"#).is_err());
}
