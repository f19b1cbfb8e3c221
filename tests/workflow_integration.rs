//! Integration tests for the therapy workflows.
//!
//! These tests drive events through the public router the way the worker
//! does:
//! 1. Chat messages thread memory across turns and raise risk alerts
//! 2. Session analysis and recommendations store results or fail the run
//! 3. Re-delivered events replay from checkpoints instead of re-running steps
//! 4. The router consumes events published on the in-memory bus
//!
//! Uses the mock provider and in-memory adapters, no network access.

use serde_json::{json, Map, Value as JsonValue};
use std::sync::Arc;
use std::time::Duration;

use therapy_workflows::adapters::{
    FileCheckpointStore, InMemoryCheckpointStore, InMemoryEventBus, InMemoryTherapyRepository,
    MockAIProvider, MockError, RecordingAlertSink,
};
use therapy_workflows::application::{
    therapy_router, AlertTrigger, CompletionClient, DispatchOutcome, EventEmitter, EventRouter,
    WorkflowDeps, WorkflowRun,
};
use therapy_workflows::domain::alerting::AlertKind;
use therapy_workflows::domain::foundation::{EventId, WorkflowEvent};
use therapy_workflows::domain::therapy::{
    Difficulty, RiskLevel, MOOD_UPDATED, RESPONSE_ON_ERROR, SESSION_CREATED, SESSION_MESSAGE,
};
use therapy_workflows::domain::workflow::StepStatus;
use therapy_workflows::ports::{CheckpointStore, Collection, EventSubscriber};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    router: Arc<EventRouter>,
    provider: MockAIProvider,
    repository: InMemoryTherapyRepository,
    alerts: RecordingAlertSink,
}

impl TestApp {
    fn new(provider: MockAIProvider) -> Self {
        Self::with_checkpoints(provider, Arc::new(InMemoryCheckpointStore::new()))
    }

    fn with_checkpoints(provider: MockAIProvider, checkpoints: Arc<dyn CheckpointStore>) -> Self {
        let repository = InMemoryTherapyRepository::new();
        let alerts = RecordingAlertSink::new();
        let deps = WorkflowDeps::new(
            Arc::new(CompletionClient::new(Arc::new(provider.clone()), "llama3-70b-8192")),
            Arc::new(repository.clone()),
            AlertTrigger::new(Arc::new(alerts.clone())),
        );

        Self {
            router: Arc::new(therapy_router(deps, checkpoints)),
            provider,
            repository,
            alerts,
        }
    }

    async fn run(&self, event: WorkflowEvent) -> WorkflowRun {
        match self.router.dispatch(event).await {
            Ok(DispatchOutcome::Handled { run, .. }) => run,
            other => panic!("expected a handled run, got {:?}", other),
        }
    }
}

fn analysis_json(emotion: &str, themes: &[&str], risk: f64) -> String {
    json!({
        "emotionalState": emotion,
        "themes": themes,
        "riskLevel": risk,
        "recommendedApproach": "supportive",
        "progressIndicators": []
    })
    .to_string()
}

fn chat_event(message: &str, memory: Option<JsonValue>) -> WorkflowEvent {
    let mut data = json!({ "message": message, "goals": ["feel calmer"] });
    if let Some(memory) = memory {
        data["memory"] = memory;
    }
    WorkflowEvent::new(SESSION_MESSAGE, data)
}

// =============================================================================
// Chat Workflow
// =============================================================================

#[tokio::test]
async fn memory_threads_themes_across_turns() {
    let app = TestApp::new(
        MockAIProvider::new()
            .with_response(analysis_json("anxious", &["x"], 1.0))
            .with_response("First reply")
            .with_response(analysis_json("calmer", &["y"], 2.0))
            .with_response("Second reply"),
    );

    let first = app.run(chat_event("hello", None)).await;
    let memory = first.output.as_chat().unwrap().updated_memory.clone();

    let second = app.run(chat_event("still here", Some(memory))).await;
    let result = second.output.as_chat().unwrap();
    let memory = result.memory();

    assert_eq!(result.response, "Second reply");
    assert_eq!(memory.session_context.conversation_themes, vec!["x", "y"]);
    assert_eq!(memory.user_profile.emotional_state, vec!["anxious", "calmer"]);
    assert_eq!(memory.user_profile.risk_level, 2.0);
}

#[tokio::test]
async fn risk_alert_threshold_is_strict() {
    let at_threshold = TestApp::new(
        MockAIProvider::new()
            .with_response(analysis_json("low", &[], 4.0))
            .with_response("reply"),
    );
    at_threshold.run(chat_event("rough day", None)).await;
    assert_eq!(at_threshold.alerts.count(), 0);

    let above = TestApp::new(
        MockAIProvider::new()
            .with_response(analysis_json("low", &[], 4.1))
            .with_response("reply"),
    );
    above.run(chat_event("rough day", None)).await;
    assert_eq!(above.alerts.alerts_of_kind(AlertKind::Risk).len(), 1);
}

#[tokio::test]
async fn provider_outage_still_produces_a_reply() {
    let app = TestApp::new(
        MockAIProvider::new()
            .with_error(MockError::Unavailable {
                message: "503".into(),
            })
            .with_error(MockError::Network {
                message: "reset".into(),
            }),
    );

    let run = app.run(chat_event("are you there?", None)).await;
    let result = run.output.as_chat().unwrap();
    let analysis = result.analysis.as_ref().unwrap();

    assert_eq!(result.response, RESPONSE_ON_ERROR);
    assert_eq!(analysis.emotional_state, "neutral");
    assert_eq!(analysis.risk_level, Some(RiskLevel::Number(0.0)));
    assert_eq!(
        run.report.degraded_steps().collect::<Vec<_>>(),
        vec!["analyze-message", "generate-response"]
    );
    assert_eq!(app.alerts.count(), 0);
}

#[tokio::test]
async fn chat_output_serializes_in_wire_shape() {
    let app = TestApp::new(
        MockAIProvider::new()
            .with_response(analysis_json("hopeful", &["family"], 0.5))
            .with_response("Glad to hear it."),
    );

    let run = app.run(chat_event("good news", None)).await;
    let value = serde_json::to_value(&run.output).unwrap();

    assert_eq!(value["response"], "Glad to hear it.");
    assert_eq!(value["analysis"]["emotionalState"], "hopeful");
    assert_eq!(
        value["updatedMemory"]["sessionContext"]["conversationThemes"],
        json!(["family"])
    );
}

#[tokio::test]
async fn redelivered_chat_event_replays_without_side_effects() {
    let app = TestApp::new(
        MockAIProvider::new()
            .with_response(analysis_json("distressed", &["loss"], 9.0))
            .with_response("I'm so sorry."),
    );
    let event = chat_event("I lost my job", None).with_id(EventId::from_string("evt-chat-1"));

    let first = app.run(event.clone()).await;
    let second = app.run(event).await;

    assert_eq!(app.provider.call_count(), 2);
    assert_eq!(app.alerts.count(), 1);
    assert_eq!(second.report.replayed_count(), 4);
    assert_eq!(first.output, second.output);
}

#[tokio::test]
async fn caller_memory_keys_survive_a_turn() {
    let app = TestApp::new(
        MockAIProvider::new()
            .with_response(analysis_json("sad", &["grief"], 1.0))
            .with_response("I'm here."),
    );
    let memory = json!({
        "lastSummary": "first session",
        "userProfile": {"name": "Sam", "emotionalState": ["tired"]},
        "sessionContext": {"conversationThemes": []}
    });

    let run = app.run(chat_event("miss my dad", Some(memory))).await;
    let updated = &run.output.as_chat().unwrap().updated_memory;

    assert_eq!(updated["lastSummary"], "first session");
    assert_eq!(updated["userProfile"]["name"], "Sam");
    assert_eq!(updated["userProfile"]["emotionalState"], json!(["tired", "sad"]));
    assert_eq!(updated["sessionContext"]["conversationThemes"], json!(["grief"]));
}

#[tokio::test]
async fn lookalike_event_ids_keep_separate_file_checkpoints() {
    let dir = tempfile::tempdir().unwrap();
    let app = TestApp::with_checkpoints(
        MockAIProvider::new()
            .with_response(analysis_json("calm", &[], 1.0))
            .with_response("first reply")
            .with_response(analysis_json("calm", &[], 1.0))
            .with_response("second reply"),
        Arc::new(FileCheckpointStore::new(dir.path())),
    );

    let first = app
        .run(chat_event("hello", None).with_id(EventId::from_string("evt.1")))
        .await;
    let second = app
        .run(chat_event("hello again", None).with_id(EventId::from_string("evt_1")))
        .await;

    assert_eq!(first.output.as_chat().unwrap().response, "first reply");
    assert_eq!(second.output.as_chat().unwrap().response, "second reply");
    assert_eq!(second.report.replayed_count(), 0);
    assert_eq!(app.provider.call_count(), 4);
}

// =============================================================================
// Session Analysis Workflow
// =============================================================================

#[tokio::test]
async fn session_analysis_failure_returns_error() {
    let app = TestApp::new(MockAIProvider::new().with_error(MockError::AuthenticationFailed));

    let result = app
        .router
        .dispatch(WorkflowEvent::new(
            SESSION_CREATED,
            json!({"sessionId": "s-1", "notes": "Discussed sleep."}),
        ))
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.failed_step(), Some("analyze-session"));
    assert!(!err.is_retryable());
    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn session_retry_resumes_from_file_checkpoints() {
    let dir = tempfile::tempdir().unwrap();
    let event = WorkflowEvent::new(
        SESSION_CREATED,
        json!({"sessionId": "s-7", "userId": "u-7", "transcript": "Talked about burnout."}),
    )
    .with_id(EventId::from_string("evt-session-7"));

    let crashed = TestApp::with_checkpoints(
        MockAIProvider::new().with_error(MockError::Timeout { timeout_secs: 60 }),
        Arc::new(FileCheckpointStore::new(dir.path())),
    );
    let err = crashed.router.dispatch(event.clone()).await.unwrap_err();
    assert!(err.is_retryable());

    let restarted = TestApp::with_checkpoints(
        MockAIProvider::new()
            .with_response(r#"{"themes": ["burnout"], "areasOfConcern": ["exhaustion"]}"#),
        Arc::new(FileCheckpointStore::new(dir.path())),
    );
    let run = restarted.run(event).await;

    assert_eq!(
        run.report.status_of("get-session-content"),
        Some(&StepStatus::Replayed)
    );
    assert_eq!(run.report.status_of("analyze-session"), Some(&StepStatus::Completed));
    assert_eq!(restarted.provider.call_count(), 1);
    assert_eq!(
        restarted.repository.documents_in(Collection::SessionAnalyses).await.len(),
        1
    );
    assert_eq!(restarted.alerts.alerts_of_kind(AlertKind::Concern).len(), 1);
}

// =============================================================================
// Recommendations Workflow
// =============================================================================

#[tokio::test]
async fn mood_update_produces_walk_recommendation() {
    let app = TestApp::new(MockAIProvider::new().with_response(
        r#"Sure! ```json
{"activities": [{"name": "Walk", "reason": "fresh air", "benefit": "lower stress", "difficulty": "easy", "duration": "15 min"}]}
```"#,
    ));

    let run = app
        .run(WorkflowEvent::new(
            MOOD_UPDATED,
            json!({"userId": "u-1", "recentMoods": [2, 3], "preferences": {"outdoor": true}}),
        ))
        .await;
    let recommendations = &run.output.as_recommendations().unwrap().recommendations;

    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations.activities[0].name, "Walk");
    assert_eq!(recommendations.activities[0].difficulty, Some(Difficulty::Easy));
    assert_eq!(
        app.repository
            .documents_in(Collection::ActivityRecommendations)
            .await
            .len(),
        1
    );
}

// =============================================================================
// Routing & Concurrency
// =============================================================================

#[tokio::test]
async fn unknown_events_are_ignored() {
    let app = TestApp::new(MockAIProvider::new());

    let outcome = app
        .router
        .dispatch(WorkflowEvent::new("activity/completed", json!({})))
        .await
        .unwrap();

    assert!(!outcome.is_handled());
    assert_eq!(app.provider.call_count(), 0);
}

#[tokio::test]
async fn independent_events_run_concurrently() {
    let app = TestApp::new(MockAIProvider::new().with_delay(Duration::from_millis(20)));

    let results = app
        .router
        .dispatch_all(vec![
            chat_event("hi", None),
            WorkflowEvent::new(SESSION_CREATED, json!({"sessionId": "s-2", "notes": "n"})),
            WorkflowEvent::new(MOOD_UPDATED, json!({"userId": "u-2"})),
        ])
        .await;

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.as_ref().map_or(false, |o| o.is_handled())));
    assert_eq!(app.provider.call_count(), 4);
}

#[tokio::test]
async fn one_off_events_do_not_accumulate_checkpoints() {
    let store = InMemoryCheckpointStore::new();
    let app = TestApp::with_checkpoints(MockAIProvider::new(), Arc::new(store.clone()));

    for n in 0..20 {
        let outcome = app
            .router
            .dispatch_once(chat_event(&format!("message {}", n), None))
            .await
            .unwrap();
        assert!(outcome.is_handled());
    }

    assert_eq!(store.run_count().await, 0);
}

#[tokio::test]
async fn router_consumes_events_from_the_bus() {
    let app = TestApp::new(MockAIProvider::new().with_response(
        r#"{"activities": [{"name": "Stretch", "difficulty": "Medium"}]}"#,
    ));
    let bus = Arc::new(InMemoryEventBus::new());
    bus.subscribe_all(&app.router.topics(), app.router.clone());
    let emitter = EventEmitter::new(bus.clone());

    let mut mood = Map::new();
    mood.insert("userId".into(), json!("u-3"));
    mood.insert("mood".into(), json!(2));
    emitter.mood_updated(&mood).await.unwrap();

    assert!(bus.has_event(MOOD_UPDATED));
    let stored = app
        .repository
        .documents_in(Collection::ActivityRecommendations)
        .await;
    assert_eq!(stored.len(), 1);
    assert_eq!(
        stored[0]["recommendations"]["activities"][0]["difficulty"],
        "medium"
    );
}
