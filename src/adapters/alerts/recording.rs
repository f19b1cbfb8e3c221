use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::alerting::{AlertEvent, AlertKind};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::AlertSink;

/// Keeps every delivered alert in memory. Can be switched to fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingAlertSink {
    alerts: Arc<Mutex<Vec<AlertEvent>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose deliveries all fail.
    pub fn failing() -> Self {
        let sink = Self::default();
        sink.set_failing(true);
        sink
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AlertEvent>> {
        self.alerts.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn alerts(&self) -> Vec<AlertEvent> {
        self.lock().clone()
    }

    pub fn alerts_of_kind(&self, kind: AlertKind) -> Vec<AlertEvent> {
        self.lock().iter().filter(|a| a.kind == kind).cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }
}

#[async_trait]
impl AlertSink for RecordingAlertSink {
    async fn deliver(&self, alert: &AlertEvent) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::AlertDeliveryFailed,
                "alert sink unavailable",
            ));
        }
        self.lock().push(alert.clone());
        Ok(())
    }
}
