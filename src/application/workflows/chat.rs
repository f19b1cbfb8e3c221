//! `process-chat-message`: analyse a chat message, fold the analysis into
//! conversation memory, raise a risk alert when warranted, and reply.
//!
//! Every step is guarded. A failed model call degrades to a safe default so
//! the user always gets a reply; anything that still escapes (checkpoint
//! store, corrupt step output) is caught by `recover`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::application::workflow::{GuardedStep, NamedStep, Workflow, WorkflowError, WorkflowOutput};
use crate::application::{AlertTrigger, CompletionClient};
use crate::domain::alerting::AlertKind;
use crate::domain::extraction::extract_as;
use crate::domain::foundation::WorkflowEvent;
use crate::domain::therapy::{
    prompts, ChatMessagePayload, ChatTurnResult, MessageAnalysis, TherapyMemory, RESPONSE_ON_EMPTY,
    RESPONSE_ON_ERROR, SESSION_MESSAGE,
};
use crate::domain::workflow::{StepContext, StepOutcome};

use super::{step_metadata, WorkflowDeps};

const WORKFLOW_ID: &str = "process-chat-message";

const ANALYZE_MESSAGE: &str = "analyze-message";
const UPDATE_MEMORY: &str = "update-memory";
const TRIGGER_RISK_ALERT: &str = "trigger-risk-alert";
const GENERATE_RESPONSE: &str = "generate-response";

pub struct ProcessChatMessage {
    completion: Arc<CompletionClient>,
    alerts: AlertTrigger,
    risk_threshold: f64,
}

impl ProcessChatMessage {
    pub fn new(deps: WorkflowDeps) -> Self {
        Self {
            completion: deps.completion,
            alerts: deps.alerts.with_source(WORKFLOW_ID),
            risk_threshold: deps.risk_threshold,
        }
    }
}

impl Workflow for ProcessChatMessage {
    fn id(&self) -> &'static str {
        WORKFLOW_ID
    }

    fn trigger(&self) -> &'static str {
        SESSION_MESSAGE
    }

    fn steps(&self) -> Vec<NamedStep> {
        vec![
            NamedStep::guarded(
                ANALYZE_MESSAGE,
                AnalyzeMessage {
                    completion: Arc::clone(&self.completion),
                },
            ),
            NamedStep::guarded(UPDATE_MEMORY, UpdateMemory),
            NamedStep::guarded(
                TRIGGER_RISK_ALERT,
                TriggerRiskAlert {
                    alerts: self.alerts.clone(),
                    threshold: self.risk_threshold,
                },
            ),
            NamedStep::guarded(
                GENERATE_RESPONSE,
                GenerateResponse {
                    completion: Arc::clone(&self.completion),
                },
            ),
        ]
    }

    fn finish(&self, ctx: &StepContext) -> Result<WorkflowOutput, WorkflowError> {
        let response: String = ctx.output_as(GENERATE_RESPONSE)?;
        let analysis: MessageAnalysis = ctx.output_as(ANALYZE_MESSAGE)?;
        let memory: TherapyMemory = ctx.output_as(UPDATE_MEMORY)?;
        Ok(ChatTurnResult::new(response, analysis, &memory).into())
    }

    fn recover(&self, event: &WorkflowEvent, _error: &WorkflowError) -> Option<WorkflowOutput> {
        Some(ChatTurnResult::last_resort(event.field("memory").cloned()).into())
    }
}

/// Payload for guarded steps; an unusable payload reads as empty.
fn payload(ctx: &StepContext) -> ChatMessagePayload {
    ChatMessagePayload::from_event(ctx.event()).unwrap_or_default()
}

/// Analysis recorded by `analyze-message`, neutral if unreadable.
fn recorded_analysis(ctx: &StepContext) -> MessageAnalysis {
    ctx.output_as(ANALYZE_MESSAGE)
        .unwrap_or_else(|_| MessageAnalysis::neutral())
}

struct AnalyzeMessage {
    completion: Arc<CompletionClient>,
}

#[async_trait]
impl GuardedStep for AnalyzeMessage {
    async fn run(&self, ctx: &StepContext) -> StepOutcome {
        let neutral = MessageAnalysis::neutral();

        let payload = match ChatMessagePayload::from_event(ctx.event()) {
            Ok(payload) => payload,
            Err(error) => return StepOutcome::degraded(&neutral, error.to_string()),
        };

        let prompt = prompts::message_analysis(&payload.message, &payload.memory(), &payload.goals);
        let metadata = step_metadata(ctx, WORKFLOW_ID, ANALYZE_MESSAGE);

        match self.completion.complete_for(&prompt, metadata).await {
            Ok(raw) => match extract_as::<MessageAnalysis>(Some(&raw)) {
                (analysis, true) => StepOutcome::completed(&analysis),
                (_, false) => StepOutcome::degraded(&neutral, "no analysis object in model output"),
            },
            Err(error) => {
                tracing::error!(error = %error, "Message analysis failed, using neutral analysis");
                StepOutcome::degraded(&neutral, error.to_string())
            }
        }
    }
}

/// Derives the new memory from the event's memory and the analysis, so a
/// replayed run produces the same memory.
struct UpdateMemory;

#[async_trait]
impl GuardedStep for UpdateMemory {
    async fn run(&self, ctx: &StepContext) -> StepOutcome {
        let memory = payload(ctx).memory();
        StepOutcome::completed(&memory.merged_with(&recorded_analysis(ctx)))
    }
}

struct TriggerRiskAlert {
    alerts: AlertTrigger,
    threshold: f64,
}

#[async_trait]
impl GuardedStep for TriggerRiskAlert {
    async fn run(&self, ctx: &StepContext) -> StepOutcome {
        let analysis = recorded_analysis(ctx);
        let alerted = self
            .alerts
            .maybe_alert(
                analysis.exceeds_risk(self.threshold),
                AlertKind::Risk,
                json!({
                    "message": payload(ctx).message,
                    "risk": analysis.risk_level,
                }),
            )
            .await;
        StepOutcome::completed(&json!({ "alerted": alerted }))
    }
}

struct GenerateResponse {
    completion: Arc<CompletionClient>,
}

#[async_trait]
impl GuardedStep for GenerateResponse {
    async fn run(&self, ctx: &StepContext) -> StepOutcome {
        let payload = payload(ctx);
        let analysis = recorded_analysis(ctx);
        let memory: TherapyMemory = ctx
            .output_as(UPDATE_MEMORY)
            .unwrap_or_else(|_| payload.memory());

        let prompt = prompts::therapeutic_response(
            payload.system_prompt.as_deref(),
            &payload.message,
            &analysis,
            &memory,
            &payload.goals,
        );
        let metadata = step_metadata(ctx, WORKFLOW_ID, GENERATE_RESPONSE);

        match self.completion.complete_for(&prompt, metadata).await {
            Ok(text) if text.is_empty() => {
                StepOutcome::degraded(&RESPONSE_ON_EMPTY, "model returned no content")
            }
            Ok(text) => StepOutcome::completed(&text),
            Err(error) => {
                tracing::error!(error = %error, "Response generation failed, using fallback reply");
                StepOutcome::degraded(&RESPONSE_ON_ERROR, error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::alerts::RecordingAlertSink;
    use crate::adapters::checkpoint::InMemoryCheckpointStore;
    use crate::adapters::storage::InMemoryTherapyRepository;
    use crate::adapters::{MockAIProvider, MockError};
    use crate::application::workflow::WorkflowRunner;
    use crate::domain::therapy::RiskLevel;
    use crate::domain::workflow::StepStatus;
    use serde_json::Value as JsonValue;

    struct Harness {
        provider: MockAIProvider,
        sink: RecordingAlertSink,
        workflow: ProcessChatMessage,
        runner: WorkflowRunner,
    }

    fn harness(provider: MockAIProvider) -> Harness {
        let sink = RecordingAlertSink::new();
        let deps = WorkflowDeps::new(
            Arc::new(CompletionClient::with_provider_default(Arc::new(provider.clone()))),
            Arc::new(InMemoryTherapyRepository::new()),
            AlertTrigger::new(Arc::new(sink.clone())),
        );
        Harness {
            provider,
            sink,
            workflow: ProcessChatMessage::new(deps),
            runner: WorkflowRunner::new(Arc::new(InMemoryCheckpointStore::new())),
        }
    }

    fn message_event(data: JsonValue) -> WorkflowEvent {
        WorkflowEvent::new(SESSION_MESSAGE, data)
    }

    #[tokio::test]
    async fn happy_path_returns_reply_analysis_and_memory() {
        let h = harness(
            MockAIProvider::new()
                .with_response(
                    r#"```json
{"emotionalState": "anxious", "themes": ["work"], "riskLevel": 2, "recommendedApproach": "cbt", "progressIndicators": []}
```"#,
                )
                .with_response("  That sounds stressful.  "),
        );

        let run = h
            .runner
            .run(&h.workflow, message_event(json!({"message": "Work is too much"})))
            .await
            .unwrap();
        let result = run.output.as_chat().unwrap();

        assert_eq!(result.response, "That sounds stressful.");
        assert_eq!(result.analysis.as_ref().unwrap().emotional_state, "anxious");
        let memory = result.memory();
        assert_eq!(memory.user_profile.emotional_state, vec!["anxious"]);
        assert_eq!(memory.session_context.conversation_themes, vec!["work"]);
        assert_eq!(memory.user_profile.risk_level, 2.0);
        assert_eq!(h.sink.count(), 0);
        assert_eq!(run.report.degraded_steps().count(), 0);
    }

    #[tokio::test]
    async fn analysis_failure_degrades_to_neutral_and_still_replies() {
        let h = harness(
            MockAIProvider::new()
                .with_error(MockError::Unavailable {
                    message: "down".into(),
                })
                .with_response("I'm listening."),
        );

        let run = h
            .runner
            .run(&h.workflow, message_event(json!({"message": "hi"})))
            .await
            .unwrap();
        let result = run.output.as_chat().unwrap();
        let analysis = result.analysis.as_ref().unwrap();

        assert_eq!(analysis.emotional_state, "neutral");
        assert_eq!(analysis.risk_level, Some(RiskLevel::Number(0.0)));
        assert_eq!(result.response, "I'm listening.");
        assert!(matches!(
            run.report.status_of(ANALYZE_MESSAGE),
            Some(StepStatus::Degraded { .. })
        ));
    }

    #[tokio::test]
    async fn unparseable_analysis_degrades_to_neutral() {
        let h = harness(
            MockAIProvider::new()
                .with_response("I cannot produce JSON today")
                .with_response("ok"),
        );

        let run = h
            .runner
            .run(&h.workflow, message_event(json!({"message": "hi"})))
            .await
            .unwrap();

        assert_eq!(
            run.output.as_chat().unwrap().analysis,
            Some(MessageAnalysis::neutral())
        );
    }

    #[tokio::test]
    async fn response_fallbacks_for_error_and_empty_content() {
        let analysis = r#"{"emotionalState": "sad", "riskLevel": 1}"#;

        let failing = harness(
            MockAIProvider::new()
                .with_response(analysis)
                .with_error(MockError::Timeout { timeout_secs: 30 }),
        );
        let run = failing
            .runner
            .run(&failing.workflow, message_event(json!({"message": "hi"})))
            .await
            .unwrap();
        assert_eq!(run.output.as_chat().unwrap().response, RESPONSE_ON_ERROR);

        let empty = harness(MockAIProvider::new().with_response(analysis).with_empty_response());
        let run = empty
            .runner
            .run(&empty.workflow, message_event(json!({"message": "hi"})))
            .await
            .unwrap();
        assert_eq!(run.output.as_chat().unwrap().response, RESPONSE_ON_EMPTY);
        assert!(matches!(
            run.report.status_of(GENERATE_RESPONSE),
            Some(StepStatus::Degraded { .. })
        ));
    }

    #[tokio::test]
    async fn risk_alert_fires_only_above_threshold() {
        for (risk, expected) in [(4.0, 0), (4.1, 1)] {
            let h = harness(
                MockAIProvider::new()
                    .with_response(json!({"emotionalState": "low", "riskLevel": risk}).to_string())
                    .with_response("reply"),
            );
            h.runner
                .run(&h.workflow, message_event(json!({"message": "I feel hopeless"})))
                .await
                .unwrap();

            assert_eq!(h.sink.count(), expected, "risk {}", risk);
        }
    }

    #[tokio::test]
    async fn risk_alert_carries_message_and_level() {
        let h = harness(
            MockAIProvider::new()
                .with_response(r#"{"riskLevel": 8}"#)
                .with_response("reply"),
        );
        h.runner
            .run(&h.workflow, message_event(json!({"message": "I can't go on"})))
            .await
            .unwrap();

        let alerts = h.sink.alerts_of_kind(AlertKind::Risk);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].workflow, WORKFLOW_ID);
        assert_eq!(alerts[0].payload, json!({"message": "I can't go on", "risk": 8.0}));
    }

    #[tokio::test]
    async fn quoted_risk_level_still_raises_alert() {
        let h = harness(
            MockAIProvider::new()
                .with_response(r#"{"emotionalState": "hopeless", "riskLevel": "8"}"#)
                .with_response("reply"),
        );
        let run = h
            .runner
            .run(
                &h.workflow,
                message_event(json!({
                    "message": "nothing matters",
                    "memory": {"userProfile": {"riskLevel": 2}}
                })),
            )
            .await
            .unwrap();

        let alerts = h.sink.alerts_of_kind(AlertKind::Risk);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].payload["risk"], "8");
        assert_eq!(run.output.as_chat().unwrap().memory().user_profile.risk_level, 2.0);
    }

    #[tokio::test]
    async fn analysis_prompt_embeds_message_and_goals() {
        let h = harness(MockAIProvider::new().with_response("{}").with_response("ok"));
        h.runner
            .run(
                &h.workflow,
                message_event(json!({"message": "sleep is bad", "goals": ["sleep better"]})),
            )
            .await
            .unwrap();

        let calls = h.provider.get_calls();
        assert_eq!(calls.len(), 2);
        let prompt = calls[0].last_user_message().unwrap();
        assert!(prompt.contains("sleep is bad"));
        assert!(prompt.contains("sleep better"));
    }

    #[test]
    fn recovery_returns_original_memory() {
        let h = harness(MockAIProvider::new());
        let memory = json!({"userProfile": {"riskLevel": 3}, "extra": 1});
        let event = message_event(json!({"message": "hi", "memory": memory}));
        let error = WorkflowError::Output(crate::domain::workflow::ContextError::MissingOutput {
            step: GENERATE_RESPONSE.into(),
        });

        let output = h.workflow.recover(&event, &error).unwrap();
        let result = output.as_chat().unwrap();

        assert!(result.is_last_resort());
        assert_eq!(result.updated_memory, memory);
    }
}
