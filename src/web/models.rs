use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub submission_id: String,
    pub hackathon_id: String,
    pub title: String,
    pub description: String,
    #[serde(default = "empty_object")]
    pub requirements: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    PassToOfflineReview,
    NeedsImprovement,
    Rejected,
}

impl Decision {
    pub fn from_label(label: &str) -> Self {
        match label {
            "NEEDS_IMPROVEMENT" => Decision::NeedsImprovement,
            "REJECTED" => Decision::Rejected,
            _ => Decision::PassToOfflineReview,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub submission_id: String,
    pub match_percentage: f64,
    pub decision: Decision,
    pub explanation: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MentorMessage {
    pub role: String,
    pub content: String,
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorRequest {
    pub message: String,
    pub user_id: Option<String>,
    pub hackathon_id: Option<String>,
    #[serde(default)]
    pub conversation_history: Option<Vec<MentorMessage>>,
    #[serde(default)]
    pub context: Option<Map<String, Value>>,
}

impl MentorRequest {
    pub fn history(&self) -> &[MentorMessage] {
        self.conversation_history.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MentorResponse {
    pub response: String,
    pub suggestions: Vec<String>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub openai_configured: bool,
    pub api_key_configured: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "system")]
    System,
}

impl Role {
    pub fn from_history(role: &str) -> Self {
        match role {
            "assistant" => Role::Assistant,
            _ => Role::User,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
