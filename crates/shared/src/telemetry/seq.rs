//! Seq log sink.
//!
//! Events are encoded as CLEF (Compact Log Event Format) lines, queued on a
//! bounded channel and posted in batches to Seq's raw ingestion endpoint by
//! a background task. Delivery is best-effort: nothing here can fail or block
//! the code that emitted the event. When the queue is full, new events are
//! dropped, and every POST is bounded by a timeout so a stalled sink only
//! costs the batch in flight.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

const INGEST_PATH: &str = "/api/events/raw?clef";
const CLEF_CONTENT_TYPE: &str = "application/vnd.serilog.clef";
const MAX_BATCH: usize = 256;

/// Events held while the shipper is busy. Anything beyond is dropped.
pub const QUEUE_CAPACITY: usize = 8192;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Targets of the shipper's own HTTP stack. Forwarding them would loop.
const SELF_TARGETS: &[&str] = &["reqwest", "hyper", "h2", "rustls"];

/// Tracing layer forwarding events to Seq.
pub struct SeqLayer {
    sender: mpsc::Sender<String>,
    app: &'static str,
}

impl SeqLayer {
    /// Creates the layer and spawns the task shipping to `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn spawn(base_url: &str, app: &'static str) -> Result<Self, reqwest::Error> {
        let client = http_client(REQUEST_TIMEOUT, CONNECT_TIMEOUT)?;
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        tokio::spawn(ship(client, ingest_url(base_url), receiver));
        Ok(Self::new(sender, app))
    }

    /// Creates the layer over an existing channel.
    #[must_use]
    pub fn new(sender: mpsc::Sender<String>, app: &'static str) -> Self {
        Self { sender, app }
    }
}

impl<S: Subscriber> Layer<S> for SeqLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if SELF_TARGETS
            .iter()
            .any(|prefix| metadata.target().starts_with(prefix))
        {
            return;
        }

        let mut record = ClefRecord::new(Utc::now(), *metadata.level(), metadata.target(), self.app);
        event.record(&mut record);

        // Full queue or stopped shipper: the event is lost.
        let _ = self.sender.try_send(record.to_line());
    }
}

/// Raw ingestion URL for a Seq server.
#[must_use]
pub fn ingest_url(base_url: &str) -> String {
    format!("{}{INGEST_PATH}", base_url.trim_end_matches('/'))
}

/// Seq level name for a tracing level.
#[must_use]
pub fn seq_level(level: Level) -> &'static str {
    match level {
        Level::TRACE => "Verbose",
        Level::DEBUG => "Debug",
        Level::INFO => "Information",
        Level::WARN => "Warning",
        Level::ERROR => "Error",
    }
}

/// A single event in CLEF.
#[derive(Debug, Clone)]
pub struct ClefRecord {
    timestamp: DateTime<Utc>,
    level: Level,
    message: String,
    properties: Map<String, Value>,
}

impl ClefRecord {
    /// Starts a record with the common properties set.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, level: Level, target: &str, app: &str) -> Self {
        let mut properties = Map::new();
        properties.insert("app".to_string(), Value::from(app));
        properties.insert("target".to_string(), Value::from(target));

        Self {
            timestamp,
            level,
            message: String::new(),
            properties,
        }
    }

    /// Encodes the record as one line of JSON.
    #[must_use]
    pub fn to_line(&self) -> String {
        let mut object = self.properties.clone();
        object.insert(
            "@t".to_string(),
            Value::from(self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        object.insert("@m".to_string(), Value::from(self.message.as_str()));
        object.insert("@l".to_string(), Value::from(seq_level(self.level)));
        Value::Object(object).to_string()
    }

    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
        } else {
            self.properties.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for ClefRecord {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }
}

fn http_client(timeout: Duration, connect_timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .build()
}

async fn ship(client: reqwest::Client, url: String, mut receiver: mpsc::Receiver<String>) {
    let mut batch = Vec::with_capacity(MAX_BATCH);

    while receiver.recv_many(&mut batch, MAX_BATCH).await > 0 {
        let body = batch.join("\n");
        batch.clear();

        // A batch the sink refuses, or does not answer in time, is dropped.
        let _ = client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, CLEF_CONTENT_TYPE)
            .body(body)
            .send()
            .await;
    }
}
