//! Therapy domain - Memory, analyses, payloads and prompts.
//!
//! Everything the three therapy workflows read from events, send to the
//! model, and hand back to the caller.

mod analysis;
mod lenient;
mod memory;
mod outbound;
mod payloads;
pub mod prompts;
mod recommendations;
mod results;

pub use analysis::{MessageAnalysis, RiskLevel, SessionAnalysis};
pub use memory::{SessionContext, TherapyMemory, UserProfile};
pub use outbound::{OutboundEvents, ACTIVITY_COMPLETED, MOOD_UPDATED, SESSION_CREATED};
pub use payloads::{ChatMessagePayload, MoodUpdatedPayload, SessionCreatedPayload, UserContext};
pub use recommendations::{ActivityRecommendation, ActivityRecommendations, Difficulty};
pub use results::{
    ChatTurnResult, RecommendationsResult, SessionAnalysisResult, RESPONSE_LAST_RESORT,
    RESPONSE_ON_EMPTY, RESPONSE_ON_ERROR,
};

/// Event consumed by `process-chat-message`.
pub const SESSION_MESSAGE: &str = "therapy/session.message";
