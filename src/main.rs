//! Worker binary: reads newline-delimited JSON events from stdin, runs the
//! matching workflow for each, and writes one JSON result line per event.
//!
//! Input line: `{"name": "mood/updated", "data": {...}, "id": "optional"}`.
//! Re-sending a line with the same `id` resumes that run from its
//! checkpoints. A line without `id` cannot be re-sent, so its checkpoints
//! are dropped once the run ends.

use std::error::Error;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use therapy_workflows::adapters::{
    FileCheckpointStore, InMemoryCheckpointStore, InMemoryTherapyRepository, OpenAIConfig,
    OpenAIProvider, TracingAlertSink,
};
use therapy_workflows::application::{
    therapy_router, AlertTrigger, CompletionClient, DispatchOutcome, EventRouter, WorkflowDeps,
};
use therapy_workflows::config::{AiConfig, AiProvider, AppConfig};
use therapy_workflows::domain::foundation::{EventId, WorkflowEvent};
use therapy_workflows::ports::CheckpointStore;
use therapy_workflows::telemetry;

#[derive(Debug, Deserialize)]
struct InboundEvent {
    name: String,
    #[serde(default)]
    data: JsonValue,
    id: Option<String>,
}

impl InboundEvent {
    fn into_event(self) -> WorkflowEvent {
        let event = WorkflowEvent::new(self.name, self.data);
        let event = match self.id {
            Some(id) => event.with_id(EventId::from_string(id)),
            None => event,
        };
        match event.field("userId").and_then(JsonValue::as_str).map(str::to_string) {
            Some(user_id) => event.with_user_id(user_id),
            None => event,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::load()?;
    telemetry::init(&config.logging)?;
    config.validate()?;

    let router = build_router(&config, checkpoint_store(&config))?;
    tracing::info!(
        topics = ?router.topics(),
        model = %config.ai.model,
        "Workflow worker ready, reading events from stdin"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let result = process_line(&router, &line).await;
        stdout.write_all(result.to_string().as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    tracing::info!("Input closed, worker exiting");
    Ok(())
}

fn build_router(
    config: &AppConfig,
    checkpoints: Arc<dyn CheckpointStore>,
) -> Result<EventRouter, Box<dyn Error + Send + Sync>> {
    let provider = OpenAIProvider::new(provider_config(&config.ai))?;
    let completion = Arc::new(CompletionClient::new(Arc::new(provider), config.ai.model.clone()));

    let deps = WorkflowDeps::new(
        completion,
        Arc::new(InMemoryTherapyRepository::new()),
        AlertTrigger::new(Arc::new(TracingAlertSink::new())),
    )
    .with_risk_threshold(config.workflow.risk_alert_threshold);

    Ok(therapy_router(deps, checkpoints))
}

fn checkpoint_store(config: &AppConfig) -> Arc<dyn CheckpointStore> {
    match &config.workflow.checkpoint_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Using file checkpoints");
            Arc::new(FileCheckpointStore::new(dir.clone()))
        }
        None => Arc::new(InMemoryCheckpointStore::with_max_runs(
            config.workflow.checkpoint_max_runs,
        )),
    }
}

fn provider_config(ai: &AiConfig) -> OpenAIConfig {
    let api_key = ai.api_key().unwrap_or_default();
    let mut provider = match ai.provider {
        AiProvider::Groq => OpenAIConfig::groq(api_key),
        AiProvider::OpenAI => OpenAIConfig::new(api_key),
    }
    .with_model(ai.model.clone())
    .with_timeout(ai.timeout())
    .with_max_retries(ai.max_retries);

    if let Some(url) = &ai.base_url {
        provider = provider.with_base_url(url.clone());
    }
    provider
}

async fn process_line(router: &EventRouter, line: &str) -> JsonValue {
    let inbound: InboundEvent = match serde_json::from_str(line) {
        Ok(inbound) => inbound,
        Err(error) => {
            tracing::warn!(error = %error, "Skipping malformed input line");
            return json!({ "error": format!("malformed event: {}", error) });
        }
    };

    let resumable = inbound.id.is_some();
    let event = inbound.into_event();
    let event_id = event.id.to_string();
    let event_name = event.name.clone();

    let outcome = if resumable {
        router.dispatch(event).await
    } else {
        router.dispatch_once(event).await
    };

    match outcome {
        Ok(DispatchOutcome::Handled { workflow_id, run }) => json!({
            "eventId": event_id,
            "event": event_name,
            "workflow": workflow_id,
            "output": run.output,
            "report": run.report,
        }),
        Ok(DispatchOutcome::Unhandled { .. }) => json!({
            "eventId": event_id,
            "event": event_name,
            "handled": false,
        }),
        Err(error) => json!({
            "eventId": event_id,
            "event": event_name,
            "error": error.to_string(),
            "retryable": error.is_retryable(),
        }),
    }
}
