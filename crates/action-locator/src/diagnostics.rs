//! Best-effort diagnostics attachments
//!
//! The engine reports named JSON payloads (`selector_attempts`,
//! `find_backoff_step`, `exists_result`, ...) to an optional sink. A sink
//! failure or panic is logged and dropped; it never changes a resolution
//! outcome.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// Receiver for diagnostics attachments
pub trait DiagnosticsSink: Send + Sync {
    fn attach(&self, name: &str, payload: &Value) -> anyhow::Result<()>;
}

/// Forwards attachments to an optional sink, swallowing every failure
#[derive(Clone, Default)]
pub struct DiagnosticsRecorder {
    sink: Option<Arc<dyn DiagnosticsSink>>,
}

impl fmt::Debug for DiagnosticsRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticsRecorder")
            .field("enabled", &self.sink.is_some())
            .finish()
    }
}

impl DiagnosticsRecorder {
    /// Recorder that drops everything
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn new(sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn record<T: Serialize + ?Sized>(&self, name: &str, payload: &T) {
        let Some(sink) = &self.sink else {
            return;
        };
        let value = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(err) => {
                debug!(attachment = name, error = %err, "diagnostics payload not serializable");
                return;
            }
        };
        match panic::catch_unwind(AssertUnwindSafe(|| sink.attach(name, &value))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                debug!(attachment = name, error = %err, "diagnostics attach failed");
            }
            Err(_) => {
                warn!(attachment = name, "diagnostics sink panicked; continuing");
            }
        }
    }
}

/// A recorded attachment
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub name: String,
    pub payload: Value,
    pub recorded_at: DateTime<Utc>,
}

/// Collects attachments in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    attachments: RwLock<Vec<Attachment>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attachments(&self) -> Vec<Attachment> {
        self.attachments.read().clone()
    }

    /// Names in recording order
    pub fn names(&self) -> Vec<String> {
        self.attachments
            .read()
            .iter()
            .map(|a| a.name.clone())
            .collect()
    }

    /// Payloads of every attachment called `name`
    pub fn payloads(&self, name: &str) -> Vec<Value> {
        self.attachments
            .read()
            .iter()
            .filter(|a| a.name == name)
            .map(|a| a.payload.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.attachments.write().clear();
    }
}

impl DiagnosticsSink for MemorySink {
    fn attach(&self, name: &str, payload: &Value) -> anyhow::Result<()> {
        self.attachments.write().push(Attachment {
            name: name.to_string(),
            payload: payload.clone(),
            recorded_at: Utc::now(),
        });
        Ok(())
    }
}

/// Emits each attachment as a `debug!` event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn attach(&self, name: &str, payload: &Value) -> anyhow::Result<()> {
        let body = serde_json::to_string(payload)?;
        debug!(target: "locator::diagnostics", attachment = name, payload = %body, "diagnostics attachment");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FailingSink;

    impl DiagnosticsSink for FailingSink {
        fn attach(&self, _name: &str, _payload: &Value) -> anyhow::Result<()> {
            anyhow::bail!("report store unavailable")
        }
    }

    struct PanickingSink;

    impl DiagnosticsSink for PanickingSink {
        fn attach(&self, _name: &str, _payload: &Value) -> anyhow::Result<()> {
            panic!("sink bug")
        }
    }

    #[test]
    fn memory_sink_keeps_order() {
        let sink = Arc::new(MemorySink::new());
        let recorder = DiagnosticsRecorder::new(sink.clone());
        recorder.record("resolve_meta", &json!({"strategy": "css"}));
        recorder.record("find_attempts", &json!({"attempts": []}));
        assert_eq!(sink.names(), vec!["resolve_meta", "find_attempts"]);
        assert_eq!(sink.payloads("resolve_meta")[0]["strategy"], "css");
        sink.clear();
        assert!(sink.attachments().is_empty());
    }

    #[test]
    fn sink_failures_are_swallowed() {
        let recorder = DiagnosticsRecorder::new(Arc::new(FailingSink));
        recorder.record("find_failed", &json!({"selector": "#x"}));
        assert!(recorder.is_enabled());
    }

    #[test]
    fn sink_panics_are_contained() {
        let recorder = DiagnosticsRecorder::new(Arc::new(PanickingSink));
        recorder.record("find_failed", &json!({"selector": "#x"}));
        recorder.record("exists_result", &json!({"attempts": []}));
        assert!(recorder.is_enabled());
    }

    #[test]
    fn disabled_recorder_is_silent() {
        let recorder = DiagnosticsRecorder::disabled();
        recorder.record("exists_result", &json!({}));
        assert!(!recorder.is_enabled());
    }

    #[test]
    fn tracing_sink_accepts_payloads() {
        assert!(TracingSink.attach("resolve_meta", &json!({"k": 1})).is_ok());
    }
}
