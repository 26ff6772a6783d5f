//! Fire-and-forget fit telemetry
//!
//! Records are handed to a background worker over a channel. The caller
//! never waits and never sees a failure: sink errors are logged and the
//! record is dropped. No retry, no backpressure.

use crate::fit::FitTier;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    pub tier: FitTier,
    pub garment_id: String,
    pub latency_ms: u32,
    pub degraded: bool,
    #[serde(default)]
    pub details: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Telemetry transport failed: {0}")]
    Transport(String),
}

/// Destination for fit telemetry (HTTP endpoint, queue, log, ...)
pub trait TelemetrySink: Send + 'static {
    fn send(&mut self, record: &TelemetryRecord) -> Result<(), TelemetryError>;
}

/// Sink that writes every record to the trace log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn send(&mut self, record: &TelemetryRecord) -> Result<(), TelemetryError> {
        tracing::info!(
            tier = %record.tier,
            garment_id = %record.garment_id,
            latency_ms = record.latency_ms,
            degraded = record.degraded,
            details = %record.details,
            "fit telemetry"
        );
        Ok(())
    }
}

/// Background forwarder around a `TelemetrySink`
#[derive(Debug)]
pub struct TelemetryForwarder {
    sender: Option<Sender<TelemetryRecord>>,
    worker: Option<JoinHandle<()>>,
}

impl TelemetryForwarder {
    /// Start the worker thread. If the thread cannot be spawned the
    /// forwarder is created disabled and every record is dropped.
    pub fn spawn(mut sink: impl TelemetrySink) -> Self {
        let (sender, receiver) = mpsc::channel::<TelemetryRecord>();

        let spawned = thread::Builder::new().name("fit-telemetry".to_string()).spawn(move || {
            for record in receiver {
                if let Err(err) = sink.send(&record) {
                    tracing::warn!(
                        garment_id = %record.garment_id,
                        tier = %record.tier,
                        error = %err,
                        "failed to forward fit telemetry, dropping record"
                    );
                }
            }
        });

        match spawned {
            Ok(worker) => Self { sender: Some(sender), worker: Some(worker) },
            Err(err) => {
                tracing::warn!(error = %err, "telemetry worker unavailable, telemetry disabled");
                Self::disabled()
            }
        }
    }

    /// Forwarder that drops everything
    pub fn disabled() -> Self {
        Self { sender: None, worker: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Queue a record; returns immediately
    pub fn forward(&self, record: TelemetryRecord) {
        let Some(sender) = &self.sender else {
            return;
        };
        if let Err(mpsc::SendError(record)) = sender.send(record) {
            tracing::warn!(
                garment_id = %record.garment_id,
                "telemetry worker stopped, dropping record"
            );
        }
    }

    /// Close the channel and wait for queued records to drain
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("telemetry worker panicked");
            }
        }
    }
}

impl Drop for TelemetryForwarder {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CollectingSink {
        seen: Arc<Mutex<Vec<TelemetryRecord>>>,
        fail_on: Option<String>,
    }

    impl TelemetrySink for CollectingSink {
        fn send(&mut self, record: &TelemetryRecord) -> Result<(), TelemetryError> {
            if self.fail_on.as_deref() == Some(record.garment_id.as_str()) {
                return Err(TelemetryError::Transport("connection refused".into()));
            }
            self.seen.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn record(id: &str) -> TelemetryRecord {
        TelemetryRecord {
            tier: FitTier::L1,
            garment_id: id.to_string(),
            latency_ms: 48,
            degraded: false,
            details: serde_json::json!({ "solverIterations": 8 }),
        }
    }

    #[test]
    fn test_records_delivered_in_order() {
        let sink = CollectingSink::default();
        let seen = sink.seen.clone();

        let forwarder = TelemetryForwarder::spawn(sink);
        assert!(forwarder.is_enabled());
        forwarder.forward(record("a"));
        forwarder.forward(record("b"));
        forwarder.shutdown();

        let ids: Vec<_> = seen.lock().unwrap().iter().map(|r| r.garment_id.clone()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_sink_failure_is_swallowed() {
        let sink = CollectingSink { fail_on: Some("bad".into()), ..Default::default() };
        let seen = sink.seen.clone();

        let forwarder = TelemetryForwarder::spawn(sink);
        forwarder.forward(record("bad"));
        forwarder.forward(record("good"));
        forwarder.shutdown();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].garment_id, "good");
    }

    #[test]
    fn test_disabled_forwarder_drops() {
        let forwarder = TelemetryForwarder::disabled();
        assert!(!forwarder.is_enabled());
        forwarder.forward(record("ignored"));
    }

    #[test]
    fn test_record_wire_format() {
        let json = serde_json::to_value(record("tee")).unwrap();
        assert_eq!(json["garmentId"], "tee");
        assert_eq!(json["latencyMs"], 48);
        assert_eq!(json["tier"], "L1");
    }

    #[test]
    fn test_log_sink_accepts() {
        assert!(LogSink.send(&record("tee")).is_ok());
    }
}
