use serde::Serialize;

use crate::domain::therapy::{ChatTurnResult, RecommendationsResult, SessionAnalysisResult};

/// Final result of one of the therapy workflows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WorkflowOutput {
    Chat(ChatTurnResult),
    SessionAnalysis(SessionAnalysisResult),
    Recommendations(RecommendationsResult),
}

impl WorkflowOutput {
    pub fn as_chat(&self) -> Option<&ChatTurnResult> {
        match self {
            WorkflowOutput::Chat(result) => Some(result),
            _ => None,
        }
    }

    pub fn as_session_analysis(&self) -> Option<&SessionAnalysisResult> {
        match self {
            WorkflowOutput::SessionAnalysis(result) => Some(result),
            _ => None,
        }
    }

    pub fn as_recommendations(&self) -> Option<&RecommendationsResult> {
        match self {
            WorkflowOutput::Recommendations(result) => Some(result),
            _ => None,
        }
    }
}

impl From<ChatTurnResult> for WorkflowOutput {
    fn from(result: ChatTurnResult) -> Self {
        WorkflowOutput::Chat(result)
    }
}

impl From<SessionAnalysisResult> for WorkflowOutput {
    fn from(result: SessionAnalysisResult) -> Self {
        WorkflowOutput::SessionAnalysis(result)
    }
}

impl From<RecommendationsResult> for WorkflowOutput {
    fn from(result: RecommendationsResult) -> Self {
        WorkflowOutput::Recommendations(result)
    }
}
