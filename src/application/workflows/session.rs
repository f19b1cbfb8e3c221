//! `analyze-therapy-session`: analyse a finished session's notes or
//! transcript, store the analysis, and flag areas of concern.
//!
//! Model and storage failures abort the run so the scheduler can re-deliver.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::application::workflow::{
    FallibleStep, GuardedStep, NamedStep, StepError, Workflow, WorkflowError, WorkflowOutput,
};
use crate::application::{AlertTrigger, CompletionClient};
use crate::domain::alerting::AlertKind;
use crate::domain::extraction::extract_as;
use crate::domain::foundation::Timestamp;
use crate::domain::therapy::{
    prompts, SessionAnalysis, SessionAnalysisResult, SessionCreatedPayload, SESSION_CREATED,
};
use crate::domain::workflow::{StepContext, StepOutcome};
use crate::ports::{Collection, RecordKey, TherapyRepository};

use super::{step_metadata, WorkflowDeps};

const WORKFLOW_ID: &str = "analyze-therapy-session";

const GET_SESSION_CONTENT: &str = "get-session-content";
const ANALYZE_SESSION: &str = "analyze-session";
const STORE_ANALYSIS: &str = "store-analysis";
const TRIGGER_ALERT: &str = "trigger-alert";

pub struct AnalyzeTherapySession {
    completion: Arc<CompletionClient>,
    repository: Arc<dyn TherapyRepository>,
    alerts: AlertTrigger,
}

impl AnalyzeTherapySession {
    pub fn new(deps: WorkflowDeps) -> Self {
        Self {
            completion: deps.completion,
            repository: deps.repository,
            alerts: deps.alerts.with_source(WORKFLOW_ID),
        }
    }
}

impl Workflow for AnalyzeTherapySession {
    fn id(&self) -> &'static str {
        WORKFLOW_ID
    }

    fn trigger(&self) -> &'static str {
        SESSION_CREATED
    }

    fn steps(&self) -> Vec<NamedStep> {
        vec![
            NamedStep::fallible(GET_SESSION_CONTENT, GetSessionContent),
            NamedStep::fallible(
                ANALYZE_SESSION,
                AnalyzeSession {
                    completion: Arc::clone(&self.completion),
                },
            ),
            NamedStep::fallible(
                STORE_ANALYSIS,
                StoreAnalysis {
                    repository: Arc::clone(&self.repository),
                },
            ),
            NamedStep::guarded(
                TRIGGER_ALERT,
                TriggerConcernAlert {
                    alerts: self.alerts.clone(),
                },
            ),
        ]
    }

    fn finish(&self, ctx: &StepContext) -> Result<WorkflowOutput, WorkflowError> {
        let analysis: SessionAnalysis = ctx.output_as(ANALYZE_SESSION)?;
        Ok(SessionAnalysisResult::completed(analysis).into())
    }
}

fn decode_payload(ctx: &StepContext) -> Result<SessionCreatedPayload, StepError> {
    SessionCreatedPayload::from_event(ctx.event()).map_err(StepError::InvalidPayload)
}

struct GetSessionContent;

#[async_trait]
impl FallibleStep for GetSessionContent {
    async fn run(&self, ctx: &StepContext) -> Result<StepOutcome, StepError> {
        Ok(StepOutcome::completed(&decode_payload(ctx)?.content()))
    }
}

struct AnalyzeSession {
    completion: Arc<CompletionClient>,
}

#[async_trait]
impl FallibleStep for AnalyzeSession {
    async fn run(&self, ctx: &StepContext) -> Result<StepOutcome, StepError> {
        let content: String = ctx.output_as(GET_SESSION_CONTENT)?;
        let metadata = step_metadata(ctx, WORKFLOW_ID, ANALYZE_SESSION);

        let raw = self
            .completion
            .complete_for(&prompts::session_analysis(&content), metadata)
            .await?;

        // An unreadable answer is an empty analysis, not a failure.
        let (analysis, _) = extract_as::<SessionAnalysis>(Some(&raw));
        Ok(StepOutcome::completed(&analysis))
    }
}

struct StoreAnalysis {
    repository: Arc<dyn TherapyRepository>,
}

#[async_trait]
impl FallibleStep for StoreAnalysis {
    async fn run(&self, ctx: &StepContext) -> Result<StepOutcome, StepError> {
        let payload = decode_payload(ctx)?;
        let analysis: SessionAnalysis = ctx.output_as(ANALYZE_SESSION)?;

        let id = payload
            .session_id
            .clone()
            .unwrap_or_else(|| ctx.event().id.to_string());
        let key = RecordKey::new(Collection::SessionAnalyses, id);
        let document = json!({
            "sessionId": payload.session_id,
            "userId": payload.user_id,
            "analysis": analysis,
            "storedAt": Timestamp::now(),
        });

        self.repository
            .put(&key, document)
            .await
            .map_err(StepError::Persistence)?;

        tracing::info!(key = %key, "Session analysis stored");
        Ok(StepOutcome::completed(&json!({ "key": key.to_string() })))
    }
}

struct TriggerConcernAlert {
    alerts: AlertTrigger,
}

#[async_trait]
impl GuardedStep for TriggerConcernAlert {
    async fn run(&self, ctx: &StepContext) -> StepOutcome {
        let analysis: SessionAnalysis = ctx.output_as(ANALYZE_SESSION).unwrap_or_default();
        let session_id = ctx.event().field("sessionId").cloned();

        let alerted = self
            .alerts
            .maybe_alert(
                analysis.has_concerns(),
                AlertKind::Concern,
                json!({
                    "sessionId": session_id,
                    "concerns": analysis.areas_of_concern,
                }),
            )
            .await;
        StepOutcome::completed(&json!({ "alerted": alerted }))
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
    use crate::domain::foundation::WorkflowEvent;
    use serde_json::Value as JsonValue;

    const ANALYSIS: &str = r#"Here is the analysis:
{"themes": ["grief"], "emotionalState": "sad", "areasOfConcern": ["isolation"], "recommendations": ["reach out"], "progressIndicators": []}"#;

    struct Harness {
        provider: MockAIProvider,
        repository: InMemoryTherapyRepository,
        sink: RecordingAlertSink,
        workflow: AnalyzeTherapySession,
        runner: WorkflowRunner,
    }

    fn harness(provider: MockAIProvider) -> Harness {
        let repository = InMemoryTherapyRepository::new();
        let sink = RecordingAlertSink::new();
        let deps = WorkflowDeps::new(
            Arc::new(CompletionClient::with_provider_default(Arc::new(provider.clone()))),
            Arc::new(repository.clone()),
            AlertTrigger::new(Arc::new(sink.clone())),
        );
        Harness {
            provider,
            repository,
            sink,
            workflow: AnalyzeTherapySession::new(deps),
            runner: WorkflowRunner::new(Arc::new(InMemoryCheckpointStore::new())),
        }
    }

    fn session_event(data: JsonValue) -> WorkflowEvent {
        WorkflowEvent::new(SESSION_CREATED, data)
    }

    #[tokio::test]
    async fn analyses_stores_and_alerts_on_concerns() {
        let h = harness(MockAIProvider::new().with_response(ANALYSIS));

        let run = h
            .runner
            .run(
                &h.workflow,
                session_event(json!({"sessionId": "s-1", "userId": "u-1", "notes": "We talked about loss."})),
            )
            .await
            .unwrap();
        let result = run.output.as_session_analysis().unwrap();

        assert_eq!(result.message, "Session analysis completed");
        assert_eq!(result.analysis.areas_of_concern, vec!["isolation"]);

        let stored = h.repository.documents_in(Collection::SessionAnalyses).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["sessionId"], "s-1");
        assert_eq!(stored[0]["analysis"]["themes"], json!(["grief"]));

        let alerts = h.sink.alerts_of_kind(AlertKind::Concern);
        assert_eq!(alerts.len(), 1);
        assert_eq!(
            alerts[0].payload,
            json!({"sessionId": "s-1", "concerns": ["isolation"]})
        );
    }

    #[tokio::test]
    async fn no_concerns_means_no_alert() {
        let h = harness(MockAIProvider::new().with_response(r#"{"themes": ["sleep"], "areasOfConcern": []}"#));

        h.runner
            .run(&h.workflow, session_event(json!({"sessionId": "s-2", "transcript": "..."})))
            .await
            .unwrap();

        assert_eq!(h.sink.count(), 0);
    }

    #[tokio::test]
    async fn completion_failure_fails_the_run() {
        let h = harness(MockAIProvider::new().with_error(MockError::AuthenticationFailed));

        let err = h
            .runner
            .run(&h.workflow, session_event(json!({"sessionId": "s-3", "notes": "n"})))
            .await
            .unwrap_err();

        assert_eq!(err.failed_step(), Some(ANALYZE_SESSION));
        assert!(h.repository.is_empty().await);
        assert_eq!(h.sink.count(), 0);
    }

    #[tokio::test]
    async fn storage_failure_fails_the_run() {
        let h = harness(MockAIProvider::new().with_response(ANALYSIS));
        h.repository.fail_writes(true);

        let err = h
            .runner
            .run(&h.workflow, session_event(json!({"sessionId": "s-4", "notes": "n"})))
            .await
            .unwrap_err();

        assert_eq!(err.failed_step(), Some(STORE_ANALYSIS));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn empty_notes_fall_back_to_transcript_in_prompt() {
        let h = harness(MockAIProvider::new().with_response("{}"));

        let run = h
            .runner
            .run(
                &h.workflow,
                session_event(json!({"notes": "", "transcript": "Client described panic attacks."})),
            )
            .await
            .unwrap();

        let prompt = h.provider.get_calls()[0].last_user_message().unwrap().to_string();
        assert!(prompt.contains("Client described panic attacks."));
        assert_eq!(
            run.output.as_session_analysis().unwrap().analysis,
            SessionAnalysis::default()
        );
    }

    #[tokio::test]
    async fn non_object_payload_is_rejected() {
        let h = harness(MockAIProvider::new());

        let err = h
            .runner
            .run(&h.workflow, session_event(json!(["not", "an", "object"])))
            .await
            .unwrap_err();

        assert_eq!(err.failed_step(), Some(GET_SESSION_CONTENT));
        assert_eq!(h.provider.call_count(), 0);
    }
}
