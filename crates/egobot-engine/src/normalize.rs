use egobot_contracts::results::{ModelResponse, ParsedResult};
use serde_json::{Map, Value};

const FENCE: &str = "```";

/// Best-effort decode of a JSON object from the final answer text.
///
/// A leading code fence drops the opening line and the last closing fence.
/// Malformed JSON or a non-object value yields `None`.
pub fn extract_json_payload(answer: &str) -> Option<Map<String, Value>> {
    let mut clean = answer.trim();
    if clean.starts_with(FENCE) {
        clean = match clean.split_once('\n') {
            Some((_, rest)) => rest,
            None => &clean[FENCE.len()..],
        };
        if let Some(idx) = clean.rfind(FENCE) {
            clean = &clean[..idx];
        }
    }
    match serde_json::from_str::<Value>(clean) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

pub fn normalize_result(mode: &str, response: &ModelResponse) -> ParsedResult {
    ParsedResult {
        mode: mode.to_string(),
        reasoning: response.reasoning.clone(),
        answer: response.answer.clone(),
        parsed: extract_json_payload(&response.answer),
        usage: response.usage,
        video_info: None,
        frames_analyzed: None,
    }
}
