use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const FULL_ANALYSIS_TYPE: &str = "full_analysis";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub reasoning: String,
    pub answer: String,
    pub raw: String,
    #[serde(default)]
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub fps: f64,
    pub frame_count: u64,
    pub width: u32,
    pub height: u32,
    pub duration_sec: f64,
}

impl VideoInfo {
    pub fn new(fps: f64, frame_count: u64, width: u32, height: u32) -> Self {
        let duration_sec = if fps > 0.0 {
            frame_count as f64 / fps
        } else {
            0.0
        };
        Self {
            fps,
            frame_count,
            width,
            height,
            duration_sec,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedResult {
    pub mode: String,
    pub reasoning: String,
    pub answer: String,
    pub parsed: Option<Map<String, Value>>,
    #[serde(default)]
    pub usage: TokenUsage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_info: Option<VideoInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames_analyzed: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModeOutcome {
    Completed(ParsedResult),
    Failed { error: String },
}

impl ModeOutcome {
    pub fn result(&self) -> Option<&ParsedResult> {
        match self {
            ModeOutcome::Completed(result) => Some(result),
            ModeOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ModeOutcome::Completed(_) => None,
            ModeOutcome::Failed { error } => Some(error.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullAnalysis {
    #[serde(rename = "type")]
    pub kind: String,
    pub image: String,
    pub results: IndexMap<String, ModeOutcome>,
}

impl FullAnalysis {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            kind: FULL_ANALYSIS_TYPE.to_string(),
            image: image.into(),
            results: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutput {
    Full(FullAnalysis),
    Single(ParsedResult),
}
