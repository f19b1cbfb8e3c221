//! Alerting domain - One-way notifications raised mid-workflow.

mod alert;

pub use alert::{AlertEvent, AlertKind};
