use async_trait::async_trait;

use crate::domain::alerting::{AlertEvent, AlertKind};
use crate::domain::foundation::DomainError;
use crate::ports::AlertSink;

/// Writes alerts to the log at WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAlertSink;

impl TracingAlertSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AlertSink for TracingAlertSink {
    async fn deliver(&self, alert: &AlertEvent) -> Result<(), DomainError> {
        match alert.kind {
            AlertKind::Risk => tracing::warn!(
                alert = %alert.kind,
                workflow = %alert.workflow,
                payload = %alert.payload,
                "High risk detected"
            ),
            AlertKind::Concern => tracing::warn!(
                alert = %alert.kind,
                workflow = %alert.workflow,
                payload = %alert.payload,
                "Areas of concern detected"
            ),
        }
        Ok(())
    }
}
