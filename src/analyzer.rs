use std::sync::LazyLock;

use log::{debug, error, warn};
use regex::Regex;
use serde_json::{Map, Value};

use crate::model::{CompletionProvider, MODEL_ID, TEMPERATURE};
use crate::web::models::{AnalyzeRequest, AnalyzeResponse, Decision, Message, Role};

pub const ANALYZE_MAX_TOKENS: u32 = 1500;
const EXPLANATION_CHARS: usize = 500;
const DEFAULT_PERCENTAGE: f64 = 75.0;

const JUDGE_SYSTEM_PROMPT: &str =
    "You are an expert hackathon judge. Provide detailed, constructive feedback in JSON format.";

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap());
static BRACED_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

pub async fn analyze(
    provider: Option<&dyn CompletionProvider>,
    request: &AnalyzeRequest,
) -> AnalyzeResponse {
    let Some(provider) = provider else {
        return unconfigured(&request.submission_id);
    };

    let messages = analysis_messages(request);
    debug!("Analysis prompt: {}", messages[1].content);

    match provider
        .complete(&messages, MODEL_ID, TEMPERATURE, ANALYZE_MAX_TOKENS)
        .await
    {
        Ok(text) => from_completion(&request.submission_id, &text),
        Err(e) => {
            error!("Analysis of {} failed: {}", request.submission_id, e);
            failed(&request.submission_id, &e.to_string())
        }
    }
}

// `key: value` lines; non-maps are rendered whole.
pub fn requirements_text(requirements: &Value) -> String {
    match requirements {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{}: {}", key, plain(value)))
            .collect::<Vec<_>>()
            .join("\n"),
        other => plain(other),
    }
}

pub fn build_prompt(request: &AnalyzeRequest) -> String {
    format!(
        "You are an expert hackathon judge analyzing a submission. Evaluate the submission against the hackathon requirements.

Hackathon Requirements:
{requirements}

Submission Title: {title}
Submission Description: {description}

Please analyze this submission and provide:
1. A match percentage (0-100) indicating how well the submission meets the requirements
2. A decision: PASS_TO_OFFLINE_REVIEW (if it meets basic requirements), NEEDS_IMPROVEMENT (if it's close but needs work), or REJECTED (if it doesn't meet requirements)
3. A detailed explanation of your decision
4. List of strengths (at least 3)
5. List of weaknesses (at least 2)
6. Actionable suggestions for improvement (at least 3)

Format your response as JSON with these keys: matchPercentage, decision, explanation, strengths, weaknesses, suggestions.
",
        requirements = requirements_text(&request.requirements),
        title = request.title,
        description = request.description,
    )
}

pub fn analysis_messages(request: &AnalyzeRequest) -> Vec<Message> {
    vec![
        Message::new(Role::System, JUDGE_SYSTEM_PROMPT),
        Message::new(Role::User, build_prompt(request)),
    ]
}

// Interior of the first fenced block, or the whole text when there is none.
fn json_scope(text: &str) -> &str {
    FENCED_JSON
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str())
}

// Regex span from the first `{` to the last `}`, not a JSON-aware scan: braces
// inside strings or two objects in one reply yield a span that fails to parse.
pub fn extract_json(scope: &str) -> Option<Map<String, Value>> {
    let span = BRACED_SPAN.find(scope)?.as_str();
    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(e) => {
            warn!("Embedded JSON did not parse: {}", e);
            None
        }
    }
}

pub fn from_completion(submission_id: &str, text: &str) -> AnalyzeResponse {
    let scope = json_scope(text);
    let Some(parsed) = extract_json(scope) else {
        warn!("No usable JSON in analysis of {}, using prose fallback", submission_id);
        return prose_fallback(submission_id, text);
    };

    AnalyzeResponse {
        submission_id: submission_id.to_string(),
        match_percentage: coerce_percentage(parsed.get("matchPercentage")),
        decision: parsed
            .get("decision")
            .and_then(Value::as_str)
            .map_or(Decision::PassToOfflineReview, Decision::from_label),
        explanation: parsed
            .get("explanation")
            .and_then(Value::as_str)
            .map_or_else(|| truncate_chars(scope, EXPLANATION_CHARS), str::to_string),
        strengths: string_list(parsed.get("strengths")),
        weaknesses: string_list(parsed.get("weaknesses")),
        suggestions: string_list(parsed.get("suggestions")),
    }
}

pub fn unconfigured(submission_id: &str) -> AnalyzeResponse {
    AnalyzeResponse {
        submission_id: submission_id.to_string(),
        match_percentage: 10.0,
        decision: Decision::PassToOfflineReview,
        explanation: "AI service is not fully configured. Submission passed for manual review."
            .to_string(),
        strengths: strings(&["Submission structure is complete"]),
        weaknesses: strings(&["AI analysis unavailable"]),
        suggestions: strings(&["Configure OpenAI API key for detailed analysis"]),
    }
}

pub fn failed(submission_id: &str, reason: &str) -> AnalyzeResponse {
    AnalyzeResponse {
        submission_id: submission_id.to_string(),
        match_percentage: DEFAULT_PERCENTAGE,
        decision: Decision::PassToOfflineReview,
        explanation: format!(
            "Error during AI analysis: {}. Submission passed for manual review.",
            reason
        ),
        strengths: strings(&["Submission received"]),
        weaknesses: strings(&["AI analysis failed"]),
        suggestions: strings(&["Manual review recommended"]),
    }
}

fn prose_fallback(submission_id: &str, text: &str) -> AnalyzeResponse {
    AnalyzeResponse {
        submission_id: submission_id.to_string(),
        match_percentage: DEFAULT_PERCENTAGE,
        decision: Decision::PassToOfflineReview,
        explanation: truncate_chars(text, EXPLANATION_CHARS),
        strengths: strings(&["Well-structured submission", "Clear description"]),
        weaknesses: strings(&["Could use more detail"]),
        suggestions: strings(&["Add more technical details", "Include demo links"]),
    }
}

fn coerce_percentage(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    raw.filter(|p| p.is_finite())
        .unwrap_or(DEFAULT_PERCENTAGE)
        .clamp(0.0, 100.0)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(plain).collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

// Strings verbatim, everything else as JSON text.
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mock::MockProvider;
    use serde_json::json;

    fn request(requirements: Value) -> AnalyzeRequest {
        AnalyzeRequest {
            submission_id: "sub-1".into(),
            hackathon_id: "hack-1".into(),
            title: "Solar Tracker".into(),
            description: "Tracks panels toward the sun".into(),
            requirements,
        }
    }

    #[test]
    fn requirements_flatten_to_lines() {
        let text = requirements_text(&json!({"theme": "energy", "teamSize": 4}));
        let mut lines: Vec<&str> = text.lines().collect();
        lines.sort();
        assert_eq!(lines, vec!["teamSize: 4", "theme: energy"]);
        assert_eq!(requirements_text(&json!("build something")), "build something");
    }

    #[test]
    fn prompt_embeds_submission_and_requirements() {
        let prompt = build_prompt(&request(json!({"theme": "energy"})));
        assert!(prompt.contains("Hackathon Requirements:\ntheme: energy\n"));
        assert!(prompt.contains("Submission Title: Solar Tracker"));
        assert!(prompt.contains("Submission Description: Tracks panels toward the sun"));
        assert!(prompt.contains("matchPercentage, decision, explanation, strengths, weaknesses, suggestions"));
    }

    #[test]
    fn fenced_block_is_parsed_exactly() {
        let text = "Here you go:\n```json\n{\"matchPercentage\": 42, \"decision\": \"REJECTED\", \"explanation\": \"x\", \"strengths\": [], \"weaknesses\": [], \"suggestions\": []}\n```\nGood luck!";
        let resp = from_completion("sub-1", text);
        assert_eq!(resp.match_percentage, 42.0);
        assert_eq!(resp.decision, Decision::Rejected);
        assert_eq!(resp.explanation, "x");
        assert!(resp.strengths.is_empty());
        assert!(resp.weaknesses.is_empty());
        assert!(resp.suggestions.is_empty());
    }

    #[test]
    fn untagged_fence_and_bare_object_are_found() {
        let fenced = "```\n{\"matchPercentage\": 60, \"decision\": \"NEEDS_IMPROVEMENT\"}\n```";
        assert_eq!(from_completion("s", fenced).decision, Decision::NeedsImprovement);

        let bare = "Verdict follows {\"matchPercentage\": 88, \"decision\": \"PASS_TO_OFFLINE_REVIEW\", \"explanation\": \"solid\"} thanks";
        let resp = from_completion("s", bare);
        assert_eq!(resp.match_percentage, 88.0);
        assert_eq!(resp.explanation, "solid");
    }

    #[test]
    fn missing_explanation_uses_fenced_interior() {
        let text = "Preamble text\n```json\n{\"matchPercentage\": 50}\n```";
        let resp = from_completion("s", text);
        assert_eq!(resp.match_percentage, 50.0);
        assert_eq!(resp.explanation, "{\"matchPercentage\": 50}");
    }

    #[test]
    fn prose_falls_back_with_truncated_explanation() {
        let prose = "This submission looks promising. ".repeat(30);
        let resp = from_completion("sub-1", &prose);
        assert_eq!(resp.match_percentage, 75.0);
        assert_eq!(resp.decision, Decision::PassToOfflineReview);
        assert_eq!(resp.explanation, prose.chars().take(500).collect::<String>());
        assert_eq!(resp.strengths.len(), 2);
        assert_eq!(resp.suggestions.len(), 2);
    }

    #[test]
    fn greedy_span_over_two_fragments_falls_back() {
        let text = "First {\"a\": 1} and then {\"b\": 2}";
        let resp = from_completion("s", text);
        assert_eq!(resp.match_percentage, 75.0);
        assert_eq!(resp.explanation, text);
    }

    #[test]
    fn out_of_range_values_are_coerced() {
        let high = from_completion("s", r#"{"matchPercentage": 250, "decision": "ACCEPTED"}"#);
        assert_eq!(high.match_percentage, 100.0);
        assert_eq!(high.decision, Decision::PassToOfflineReview);

        let low = from_completion("s", r#"{"matchPercentage": -3, "decision": 7}"#);
        assert_eq!(low.match_percentage, 0.0);
        assert_eq!(low.decision, Decision::PassToOfflineReview);

        let text = r#"{"matchPercentage": "64%", "strengths": ["fast", 3]}"#;
        let stringy = from_completion("s", text);
        assert_eq!(stringy.match_percentage, 64.0);
        assert_eq!(stringy.strengths, vec!["fast", "3"]);
        assert_eq!(stringy.explanation, text);

        let missing = from_completion("s", r#"{"matchPercentage": "lots"}"#);
        assert_eq!(missing.match_percentage, 75.0);
    }

    #[actix_web::test]
    async fn unconfigured_provider_short_circuits() {
        let resp = analyze(None, &request(json!({}))).await;
        assert_eq!(resp.match_percentage, 10.0);
        assert_eq!(resp.decision, Decision::PassToOfflineReview);
        assert_eq!(resp.submission_id, "sub-1");
    }

    #[actix_web::test]
    async fn provider_error_becomes_fallback() {
        let mock = MockProvider::failing("connection refused");
        let resp = analyze(Some(&mock), &request(json!({}))).await;
        assert_eq!(resp.match_percentage, 75.0);
        assert!(resp.explanation.contains("connection refused"));
        assert_eq!(resp.weaknesses, vec!["AI analysis failed"]);
        assert_eq!(mock.calls(), 1);
    }

    #[actix_web::test]
    async fn sends_system_and_prompt_messages() {
        let mock = MockProvider::replying(r#"{"matchPercentage": 90, "decision": "PASS_TO_OFFLINE_REVIEW"}"#);
        let resp = analyze(Some(&mock), &request(json!({"theme": "ai"}))).await;
        assert_eq!(resp.match_percentage, 90.0);

        assert_eq!(mock.last_settings(), Some(("gpt-4o-mini".to_string(), 0.7, 1500)));

        let sent = mock.last_messages();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].role, Role::System);
        assert_eq!(sent[1].role, Role::User);
        assert!(sent[1].content.contains("theme: ai"));
    }
}
