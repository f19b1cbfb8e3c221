//! AlertSink port - Destination for one-way workflow alerts.

use async_trait::async_trait;

use crate::domain::alerting::AlertEvent;
use crate::domain::foundation::DomainError;

/// Port for delivering alerts (log, pager, notification service).
///
/// Delivery is attempted once. Callers swallow errors, so implementations
/// should not retry internally either.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, alert: &AlertEvent) -> Result<(), DomainError>;
}
