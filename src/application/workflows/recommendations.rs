//! `generate-activity-recommendations`: suggest activities after a mood
//! update and store them for the user.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::application::workflow::{
    FallibleStep, NamedStep, StepError, Workflow, WorkflowError, WorkflowOutput,
};
use crate::application::CompletionClient;
use crate::domain::extraction::extract_as;
use crate::domain::foundation::Timestamp;
use crate::domain::therapy::{
    prompts, ActivityRecommendations, MoodUpdatedPayload, RecommendationsResult, UserContext,
    MOOD_UPDATED,
};
use crate::domain::workflow::{StepContext, StepOutcome};
use crate::ports::{Collection, RecordKey, TherapyRepository};

use super::{step_metadata, WorkflowDeps};

const WORKFLOW_ID: &str = "generate-activity-recommendations";

const GET_USER_CONTEXT: &str = "get-user-context";
const GENERATE_RECS: &str = "generate-recs";
const STORE_RECOMMENDATIONS: &str = "store-recommendations";

pub struct GenerateActivityRecommendations {
    completion: Arc<CompletionClient>,
    repository: Arc<dyn TherapyRepository>,
}

impl GenerateActivityRecommendations {
    pub fn new(deps: WorkflowDeps) -> Self {
        Self {
            completion: deps.completion,
            repository: deps.repository,
        }
    }
}

impl Workflow for GenerateActivityRecommendations {
    fn id(&self) -> &'static str {
        WORKFLOW_ID
    }

    fn trigger(&self) -> &'static str {
        MOOD_UPDATED
    }

    fn steps(&self) -> Vec<NamedStep> {
        vec![
            NamedStep::fallible(GET_USER_CONTEXT, GetUserContext),
            NamedStep::fallible(
                GENERATE_RECS,
                GenerateRecommendations {
                    completion: Arc::clone(&self.completion),
                },
            ),
            NamedStep::fallible(
                STORE_RECOMMENDATIONS,
                StoreRecommendations {
                    repository: Arc::clone(&self.repository),
                },
            ),
        ]
    }

    fn finish(&self, ctx: &StepContext) -> Result<WorkflowOutput, WorkflowError> {
        let recommendations: ActivityRecommendations = ctx.output_as(GENERATE_RECS)?;
        Ok(RecommendationsResult::generated(recommendations).into())
    }
}

struct GetUserContext;

#[async_trait]
impl FallibleStep for GetUserContext {
    async fn run(&self, ctx: &StepContext) -> Result<StepOutcome, StepError> {
        let payload = MoodUpdatedPayload::from_event(ctx.event()).map_err(StepError::InvalidPayload)?;
        Ok(StepOutcome::completed(&payload.user_context()))
    }
}

struct GenerateRecommendations {
    completion: Arc<CompletionClient>,
}

#[async_trait]
impl FallibleStep for GenerateRecommendations {
    async fn run(&self, ctx: &StepContext) -> Result<StepOutcome, StepError> {
        let context: UserContext = ctx.output_as(GET_USER_CONTEXT)?;
        let metadata = step_metadata(ctx, WORKFLOW_ID, GENERATE_RECS);

        let raw = self
            .completion
            .complete_for(&prompts::activity_recommendations(&context), metadata)
            .await?;

        let (recommendations, _) = extract_as::<ActivityRecommendations>(Some(&raw));
        tracing::debug!(count = recommendations.len(), "Activity recommendations parsed");
        Ok(StepOutcome::completed(&recommendations))
    }
}

struct StoreRecommendations {
    repository: Arc<dyn TherapyRepository>,
}

#[async_trait]
impl FallibleStep for StoreRecommendations {
    async fn run(&self, ctx: &StepContext) -> Result<StepOutcome, StepError> {
        let recommendations: ActivityRecommendations = ctx.output_as(GENERATE_RECS)?;
        let user_id = ctx
            .event()
            .field("userId")
            .and_then(|v| v.as_str())
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        let id = user_id
            .clone()
            .unwrap_or_else(|| ctx.event().id.to_string());
        let key = RecordKey::new(Collection::ActivityRecommendations, id);
        let document = json!({
            "userId": user_id,
            "recommendations": recommendations,
            "storedAt": Timestamp::now(),
        });

        self.repository
            .put(&key, document)
            .await
            .map_err(StepError::Persistence)?;

        tracing::info!(key = %key, "Recommendations stored");
        Ok(StepOutcome::completed(&json!({ "key": key.to_string() })))
    }
}
