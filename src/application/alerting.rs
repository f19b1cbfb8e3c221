//! AlertTrigger - condition-gated, fire-and-forget alerts.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::domain::alerting::{AlertEvent, AlertKind};
use crate::ports::AlertSink;

/// Forwards an alert to the sink when a condition holds.
///
/// Never fails and never retries: delivery errors are logged and dropped so
/// the calling workflow's result is unaffected.
#[derive(Clone)]
pub struct AlertTrigger {
    sink: Arc<dyn AlertSink>,
    source: String,
}

impl AlertTrigger {
    pub fn new(sink: Arc<dyn AlertSink>) -> Self {
        Self {
            sink,
            source: String::from("unknown"),
        }
    }

    /// Copy of this trigger that tags alerts with `source`.
    pub fn with_source(&self, source: impl Into<String>) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            source: source.into(),
        }
    }

    /// Raises an alert iff `condition` holds.
    ///
    /// Returns true when an alert was raised (delivery attempted), whether
    /// or not the sink accepted it.
    pub async fn maybe_alert(&self, condition: bool, kind: AlertKind, payload: JsonValue) -> bool {
        if !condition {
            return false;
        }

        let alert = AlertEvent::new(kind, self.source.clone(), payload);
        if let Err(error) = self.sink.deliver(&alert).await {
            tracing::error!(
                alert = %kind,
                workflow = %self.source,
                error = %error,
                "Alert delivery failed"
            );
        }
        true
    }
}
