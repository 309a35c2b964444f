//! Analytics collaborators that receive the form-submitted event.
//!
//! Delivery is fire-and-forget: sinks log their own failures and never
//! report back to the wizard.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("http transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write event log: {0}")]
    Io(#[from] std::io::Error),
}

pub trait AnalyticsSink {
    fn track(&self, event: &str, properties: Value);

    fn identify(&self, user_id: &str, traits: Value);
}

/// Writes events to the application log only.
#[derive(Debug, Default)]
pub struct LogSink;

impl AnalyticsSink for LogSink {
    fn track(&self, event: &str, properties: Value) {
        log::info!("analytics track '{}': {}", event, properties);
    }

    fn identify(&self, user_id: &str, traits: Value) {
        log::info!("analytics identify '{}': {}", user_id, traits);
    }
}

/// Appends one JSON object per event to a file.
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, record: &Value) -> Result<(), AnalyticsError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    fn append_or_log(&self, record: Value) {
        if let Err(e) = self.append(&record) {
            log::error!("could not record analytics event to {}: {}", self.path.display(), e);
        }
    }
}

impl AnalyticsSink for JsonLinesSink {
    fn track(&self, event: &str, properties: Value) {
        self.append_or_log(json!({ "type": "track", "event": event, "properties": properties }));
    }

    fn identify(&self, user_id: &str, traits: Value) {
        self.append_or_log(json!({ "type": "identify", "userId": user_id, "traits": traits }));
    }
}

pub const DEFAULT_SEGMENT_ENDPOINT: &str = "https://api.segment.io";

/// Posts events to a Segment-compatible HTTP API.
///
/// Calls are queued to a single worker thread and delivered in the order
/// they were made, so a submission's track always lands before its
/// identify. Dropping the sink closes the queue and waits for the worker
/// to drain it, so the final event survives a quit.
pub struct SegmentSink {
    endpoint: String,
    anonymous_id: String,
    outbox: Option<Sender<(String, Value)>>,
    worker: Option<JoinHandle<()>>,
}

impl SegmentSink {
    pub fn new(endpoint: impl Into<String>, write_key: impl Into<String>) -> Result<Self, AnalyticsError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        let write_key = write_key.into();

        Self::with_delivery(endpoint, move |url, body| {
            let result = client
                .post(&url)
                .basic_auth(&write_key, Some(""))
                .json(&body)
                .send()
                .and_then(|response| response.error_for_status());
            match result {
                Ok(_) => log::debug!("delivered analytics call to {}", url),
                Err(e) => log::error!("analytics delivery to {} failed: {}", url, AnalyticsError::from(e)),
            }
        })
    }

    /// Builds a sink whose worker hands each queued `(url, body)` to `deliver`.
    pub fn with_delivery<F>(endpoint: impl Into<String>, mut deliver: F) -> Result<Self, AnalyticsError>
    where
        F: FnMut(String, Value) + Send + 'static,
    {
        let (outbox, inbox) = mpsc::channel::<(String, Value)>();
        let worker = thread::Builder::new()
            .name("segment-delivery".to_string())
            .spawn(move || {
                for (url, body) in inbox {
                    deliver(url, body);
                }
            })?;
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            anonymous_id: format!("signup-wizard-{}-{}", std::process::id(), nanos),
            outbox: Some(outbox),
            worker: Some(worker),
        })
    }

    pub fn track_url(&self) -> String {
        format!("{}/v1/track", self.endpoint)
    }

    pub fn identify_url(&self) -> String {
        format!("{}/v1/identify", self.endpoint)
    }

    pub fn track_payload(&self, event: &str, properties: Value) -> Value {
        json!({
            "anonymousId": self.anonymous_id,
            "event": event,
            "properties": properties,
        })
    }

    pub fn identify_payload(&self, user_id: &str, traits: Value) -> Value {
        json!({
            "anonymousId": self.anonymous_id,
            "userId": user_id,
            "traits": traits,
        })
    }

    fn send(&self, url: String, body: Value) {
        let Some(outbox) = &self.outbox else {
            return;
        };
        if let Err(mpsc::SendError((url, _))) = outbox.send((url, body)) {
            log::error!("analytics worker has stopped; dropped call to {}", url);
        }
    }
}

impl AnalyticsSink for SegmentSink {
    fn track(&self, event: &str, properties: Value) {
        self.send(self.track_url(), self.track_payload(event, properties));
    }

    fn identify(&self, user_id: &str, traits: Value) {
        self.send(self.identify_url(), self.identify_payload(user_id, traits));
    }
}

impl Drop for SegmentSink {
    fn drop(&mut self) {
        drop(self.outbox.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("analytics delivery thread panicked");
            }
        }
    }
}
