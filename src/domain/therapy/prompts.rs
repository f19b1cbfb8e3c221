//! Prompt templates for each model-calling step.

use serde_json::{json, Value as JsonValue};

use super::{MessageAnalysis, TherapyMemory, UserContext};

/// Asks the model to analyse one chat message as JSON.
pub fn message_analysis(message: &str, memory: &TherapyMemory, goals: &[JsonValue]) -> String {
    let context = json!({ "memory": memory, "goals": goals });
    format!(
        r#"Analyze this therapy message and return ONLY a valid JSON.

Message: {message}
Context: {context}

JSON format:
{{
  "emotionalState": "string",
  "themes": ["string"],
  "riskLevel": number,
  "recommendedApproach": "string",
  "progressIndicators": ["string"]
}}"#
    )
}

/// Asks the model for the therapeutic reply itself.
pub fn therapeutic_response(
    system_prompt: Option<&str>,
    message: &str,
    analysis: &MessageAnalysis,
    memory: &TherapyMemory,
    goals: &[JsonValue],
) -> String {
    let mut prompt = String::new();
    if let Some(system_prompt) = system_prompt {
        prompt.push_str(system_prompt);
        prompt.push_str("\n\n");
    }
    prompt.push_str(&format!(
        "Generate a therapeutic response.\n\nMessage: {}\nAnalysis: {}\nMemory: {}\nGoals: {}\n",
        message,
        to_json(analysis),
        to_json(memory),
        JsonValue::Array(goals.to_vec()),
    ));
    prompt
}

/// Asks the model to analyse a full session transcript or notes.
pub fn session_analysis(content: &str) -> String {
    format!(
        r#"Analyze the following therapy session:

{content}

Return JSON:
{{
  "themes": ["string"],
  "emotionalState": "string",
  "areasOfConcern": ["string"],
  "recommendations": ["string"],
  "progressIndicators": ["string"]
}}"#
    )
}

/// Asks the model for personalised activity suggestions.
pub fn activity_recommendations(context: &UserContext) -> String {
    format!(
        r#"Generate personalized activity suggestions.

User Context: {}

Return JSON:
{{
  "activities": [
    {{
      "name": "string",
      "reason": "string",
      "benefit": "string",
      "difficulty": "easy | medium | hard",
      "duration": "string"
    }}
  ]
}}"#,
        to_json(context)
    )
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_prompt_embeds_message_and_goals() {
        let prompt = message_analysis(
            "I can't sleep",
            &TherapyMemory::default(),
            &[json!("sleep better")],
        );

        assert!(prompt.contains("Message: I can't sleep"));
        assert!(prompt.contains("\"goals\":[\"sleep better\"]"));
        assert!(prompt.contains("\"riskLevel\": number"));
    }

    #[test]
    fn response_prompt_leads_with_system_prompt() {
        let prompt = therapeutic_response(
            Some("You are a CBT therapist."),
            "hello",
            &MessageAnalysis::neutral(),
            &TherapyMemory::default(),
            &[],
        );

        assert!(prompt.starts_with("You are a CBT therapist."));
        assert!(prompt.contains("\"emotionalState\":\"neutral\""));
        assert!(prompt.contains("Goals: []"));
    }

    #[test]
    fn response_prompt_without_system_prompt() {
        let prompt = therapeutic_response(
            None,
            "hello",
            &MessageAnalysis::neutral(),
            &TherapyMemory::default(),
            &[],
        );
        assert!(prompt.starts_with("Generate a therapeutic response."));
    }

    #[test]
    fn session_prompt_embeds_content() {
        let prompt = session_analysis("Client discussed work stress.");
        assert!(prompt.contains("Client discussed work stress."));
        assert!(prompt.contains("areasOfConcern"));
    }

    #[test]
    fn recommendation_prompt_embeds_context() {
        let context = UserContext {
            recent_moods: Some(json!([{"score": 2}])),
            ..Default::default()
        };
        let prompt = activity_recommendations(&context);
        assert!(prompt.contains(r#"User Context: {"recentMoods":[{"score":2}]}"#));
    }
}
