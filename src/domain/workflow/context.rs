use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::domain::foundation::{RunId, WorkflowEvent};

/// Errors reading prior step outputs.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("step '{step}' has not produced an output")]
    MissingOutput { step: String },

    #[error("output of step '{step}' has an unexpected shape: {source}")]
    Decode {
        step: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Accumulated state visible to a step: the triggering event plus every
/// prior step's output, in execution order.
#[derive(Debug, Clone)]
pub struct StepContext {
    run_id: RunId,
    event: WorkflowEvent,
    outputs: Vec<(String, JsonValue)>,
}

impl StepContext {
    pub fn new(run_id: RunId, event: WorkflowEvent) -> Self {
        Self {
            run_id,
            event,
            outputs: Vec::new(),
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn event(&self) -> &WorkflowEvent {
        &self.event
    }

    /// Raw output of a prior step.
    pub fn output(&self, step: &str) -> Option<&JsonValue> {
        self.outputs
            .iter()
            .find(|(name, _)| name == step)
            .map(|(_, value)| value)
    }

    /// Output of a prior step decoded as `T`.
    pub fn output_as<T: DeserializeOwned>(&self, step: &str) -> Result<T, ContextError> {
        let value = self.output(step).ok_or_else(|| ContextError::MissingOutput {
            step: step.to_string(),
        })?;
        serde_json::from_value(value.clone()).map_err(|source| ContextError::Decode {
            step: step.to_string(),
            source,
        })
    }

    /// Step names in the order their outputs were recorded.
    pub fn completed_steps(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|(name, _)| name.as_str())
    }

    pub(crate) fn record(&mut self, step: impl Into<String>, output: JsonValue) {
        self.outputs.push((step.into(), output));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> StepContext {
        let event = WorkflowEvent::new("mood/updated", json!({}));
        StepContext::new(RunId::from_string("wf:1"), event)
    }

    #[test]
    fn outputs_are_visible_by_name_in_order() {
        let mut ctx = context();
        ctx.record("first", json!(1));
        ctx.record("second", json!("two"));

        assert_eq!(ctx.output("first"), Some(&json!(1)));
        assert_eq!(ctx.output_as::<String>("second").unwrap(), "two");
        assert_eq!(ctx.completed_steps().collect::<Vec<_>>(), vec!["first", "second"]);
    }

    #[test]
    fn missing_output_is_an_error() {
        let err = context().output_as::<String>("nope").unwrap_err();
        assert!(matches!(err, ContextError::MissingOutput { step } if step == "nope"));
    }

    #[test]
    fn wrong_shape_is_a_decode_error() {
        let mut ctx = context();
        ctx.record("count", json!("not a number"));
        assert!(matches!(
            ctx.output_as::<u32>("count"),
            Err(ContextError::Decode { .. })
        ));
    }
}
