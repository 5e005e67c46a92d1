use log::{debug, error};

use crate::model::{CompletionProvider, MODEL_ID, TEMPERATURE};
use crate::web::models::{MentorRequest, MentorResponse, Message, Role};
use crate::web::utc_timestamp;

pub const MENTOR_MAX_TOKENS: u32 = 500;
pub const HISTORY_LIMIT: usize = 10;
const MAX_SUGGESTIONS: usize = 3;

const MENTOR_SYSTEM_PROMPT: &str = "You are an AI Mentor for a hackathon platform. Your role is to:
1. Guide participants through hackathon rules and requirements
2. Help with submission preparation and validation
3. Provide constructive feedback and suggestions
4. Answer questions about the hackathon process
5. Be encouraging, helpful, and professional

Keep responses concise (2-3 paragraphs max) and actionable. Always provide specific, helpful suggestions.";

const GENERIC_SUGGESTIONS: [&str; 3] = [
    "Review hackathon requirements",
    "Prepare your project documentation",
    "Test your submission before finalizing",
];

// Checked in order; each matching group contributes both of its suggestions.
const KEYWORD_SUGGESTIONS: [(&[&str], [&str; 2]); 3] = [
    (
        &["submission"],
        ["Review submission requirements", "Check file upload guidelines"],
    ),
    (
        &["rule", "requirement"],
        ["Read hackathon guidelines", "Contact organizers if unclear"],
    ),
    (
        &["help", "stuck"],
        ["Check FAQ section", "Review example submissions"],
    ),
];

pub async fn mentor(
    provider: Option<&dyn CompletionProvider>,
    request: &MentorRequest,
) -> MentorResponse {
    let Some(provider) = provider else {
        return unconfigured();
    };

    let messages = build_messages(request);
    debug!("Mentor conversation has {} messages", messages.len());

    match provider
        .complete(&messages, MODEL_ID, TEMPERATURE, MENTOR_MAX_TOKENS)
        .await
    {
        Ok(reply) => MentorResponse {
            response: reply,
            suggestions: suggestions_for(&request.message),
            timestamp: utc_timestamp(),
        },
        Err(e) => {
            error!("Mentor completion failed: {}", e);
            failed(&e.to_string())
        }
    }
}

pub fn build_messages(request: &MentorRequest) -> Vec<Message> {
    let history = request.history();
    let recent = &history[history.len().saturating_sub(HISTORY_LIMIT)..];

    let mut messages = Vec::with_capacity(recent.len() + 2);
    messages.push(Message::new(Role::System, MENTOR_SYSTEM_PROMPT));
    messages.extend(
        recent
            .iter()
            .map(|turn| Message::new(Role::from_history(&turn.role), turn.content.clone())),
    );

    let mut content = request.message.clone();
    if let Some(context) = request.context.as_ref().filter(|c| !c.is_empty()) {
        match serde_json::to_string_pretty(context) {
            Ok(pretty) => content.push_str(&format!("\n\nContext: {}", pretty)),
            Err(e) => debug!("Skipping unserializable context: {}", e),
        }
    }
    if let Some(hackathon_id) = request.hackathon_id.as_deref().filter(|id| !id.is_empty()) {
        content.push_str(&format!("\n\nHackathon ID: {}", hackathon_id));
    }
    messages.push(Message::new(Role::User, content));

    messages
}

// Keyed on the user's message, not the reply
pub fn suggestions_for(message: &str) -> Vec<String> {
    let lowered = message.to_lowercase();
    let matched: Vec<String> = KEYWORD_SUGGESTIONS
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .flat_map(|(_, pair)| pair.iter().map(|s| s.to_string()))
        .take(MAX_SUGGESTIONS)
        .collect();

    if matched.is_empty() {
        GENERIC_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
    } else {
        matched
    }
}

pub fn unconfigured() -> MentorResponse {
    MentorResponse {
        response: "I'm your AI Mentor! I can help you with hackathon rules, submission requirements, and provide feedback. Please configure the OpenAI API key to enable full functionality.".to_string(),
        suggestions: vec![
            "Review hackathon requirements".to_string(),
            "Check submission guidelines".to_string(),
            "Prepare your project documentation".to_string(),
        ],
        timestamp: utc_timestamp(),
    }
}

pub fn failed(reason: &str) -> MentorResponse {
    MentorResponse {
        response: format!(
            "I apologize, but I encountered an error: {}. Please try rephrasing your question or contact support.",
            reason
        ),
        suggestions: vec![
            "Try rephrasing your question".to_string(),
            "Check the hackathon guidelines".to_string(),
            "Contact support if the issue persists".to_string(),
        ],
        timestamp: utc_timestamp(),
    }
}
