use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionKind {
    #[default]
    InProcess,
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionConfig {
    pub kind: ConnectionKind,
}

#[derive(thiserror::Error, Debug)]
pub enum ConnectionError {
    #[error("send failed")]
    SendFailed,
    #[error("receive failed")]
    RecvFailed,
}

/// One server-sent event: the event name is the gauge id the subscription
/// was registered under, the data is the raw JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEvent {
    pub event: String,
    pub data: String,
}

impl ServerEvent {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }
}

/// Property selector of a subscription: a single name or a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertySelector {
    One(String),
    Many(Vec<String>),
}

impl PropertySelector {
    pub fn names(&self) -> Vec<&str> {
        match self {
            PropertySelector::One(name) => vec![name.as_str()],
            PropertySelector::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Outbound request sent once per gauge at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub event: String,
    pub property: PropertySelector,
}

impl SubscriptionRequest {
    pub fn new(event: impl Into<String>, mut properties: Vec<String>) -> Self {
        let property = if properties.len() == 1 {
            PropertySelector::One(properties.remove(0))
        } else {
            PropertySelector::Many(properties)
        };
        Self {
            event: event.into(),
            property,
        }
    }
}

pub trait Connection<T>: Send {
    fn send(&self, value: T) -> Result<(), ConnectionError>;
    fn try_recv(&self) -> Result<Option<T>, ConnectionError>;

    /// Registers interest in a gauge's properties. Transports without a
    /// subscription handshake accept every request.
    fn subscribe(&self, _request: SubscriptionRequest) -> Result<(), ConnectionError> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct InProcessConnection<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
    subscriptions: Mutex<Vec<SubscriptionRequest>>,
}

impl<T> Default for InProcessConnection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InProcessConnection<T> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Producer handle for feeding events from another thread.
    pub fn sender(&self) -> Sender<T> {
        self.sender.clone()
    }

    pub fn subscriptions(&self) -> Vec<SubscriptionRequest> {
        self.subscriptions
            .lock()
            .map(|subs| subs.clone())
            .unwrap_or_default()
    }
}

impl<T: Send + 'static> Connection<T> for InProcessConnection<T> {
    fn send(&self, value: T) -> Result<(), ConnectionError> {
        self.sender
            .send(value)
            .map_err(|_| ConnectionError::SendFailed)
    }

    fn try_recv(&self) -> Result<Option<T>, ConnectionError> {
        match self.receiver.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(ConnectionError::RecvFailed),
        }
    }

    fn subscribe(&self, request: SubscriptionRequest) -> Result<(), ConnectionError> {
        let mut subs = self
            .subscriptions
            .lock()
            .map_err(|_| ConnectionError::SendFailed)?;
        log::debug!("subscribing {} to {:?}", request.event, request.property);
        subs.push(request);
        Ok(())
    }
}

pub struct ConnectionFactory;

impl ConnectionFactory {
    pub fn create<T: Send + 'static>(config: &ConnectionConfig) -> Box<dyn Connection<T>> {
        match config.kind {
            ConnectionKind::InProcess => Box::new(InProcessConnection::new()),
        }
    }
}

/// A server event captured with the local time (milliseconds since the
/// start of the recording) at which it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub at_ms: u64,
    pub event: ServerEvent,
}

#[derive(Deserialize)]
struct RecordedLine {
    #[serde(default)]
    at_ms: u64,
    event: String,
    data: serde_json::Value,
}

impl RecordedEvent {
    /// Parses one recording line. `data` may be the raw payload string or an
    /// inline JSON object.
    pub fn parse_line(line: &str) -> Result<Self, serde_json::Error> {
        let parsed: RecordedLine = serde_json::from_str(line)?;
        let data = match parsed.data {
            serde_json::Value::String(raw) => raw,
            other => other.to_string(),
        };
        Ok(Self {
            at_ms: parsed.at_ms,
            event: ServerEvent::new(parsed.event, data),
        })
    }
}

/// Reads a JSON-lines recording. Blank lines are skipped; events are returned
/// ordered by arrival time.
pub fn read_recorded_events<R: BufRead>(reader: R) -> Result<Vec<RecordedEvent>, std::io::Error> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let recorded = RecordedEvent::parse_line(trimmed).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("line {}: {e}", idx + 1),
            )
        })?;
        events.push(recorded);
    }
    events.sort_by_key(|recorded| recorded.at_ms);
    Ok(events)
}
