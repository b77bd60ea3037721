//! Network-free stand-ins for the transport and frame seams.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use egobot_contracts::results::VideoInfo;
use serde_json::{json, Value};

use crate::client::ChatTransport;
use crate::config::Config;
use crate::error::{EgobotError, Result};
use crate::frames::{ExtractedFrames, FrameSource};

type Responder = Box<dyn Fn(&Value) -> std::result::Result<Value, String> + Send + Sync>;

pub(crate) fn test_config() -> Config {
    Config::default().with_api_key("test-key")
}

pub(crate) fn completion(text: &str) -> Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": text}}],
        "usage": {"prompt_tokens": 20, "completion_tokens": 10, "total_tokens": 30},
    })
}

pub(crate) fn system_prompt_of(payload: &Value) -> &str {
    payload["messages"][0]["content"].as_str().unwrap_or_default()
}

pub(crate) fn user_text_of(payload: &Value) -> &str {
    payload["messages"][1]["content"]
        .as_array()
        .and_then(|parts| parts.last())
        .and_then(|part| part["text"].as_str())
        .unwrap_or_default()
}

pub(crate) struct ScriptedTransport {
    responder: Responder,
    payloads: Mutex<Vec<Value>>,
}

impl ScriptedTransport {
    pub(crate) fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn replying(text: &str) -> Self {
        let body = completion(text);
        Self::from_fn(move |_| Ok(body.clone()))
    }

    pub(crate) fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::from_fn(move |_| Err(message.clone()))
    }

    pub(crate) fn with_responses(responses: Vec<std::result::Result<Value, String>>) -> Self {
        let queue = Mutex::new(VecDeque::from(responses));
        Self::from_fn(move |_| {
            queue
                .lock()
                .map_err(|_| "script lock poisoned".to_string())?
                .pop_front()
                .unwrap_or_else(|| Err("no scripted response left".to_string()))
        })
    }

    pub(crate) fn payloads(&self) -> Vec<Value> {
        self.payloads
            .lock()
            .map(|payloads| payloads.clone())
            .unwrap_or_default()
    }
}

impl ChatTransport for ScriptedTransport {
    fn complete(&self, payload: &Value) -> anyhow::Result<Value> {
        if let Ok(mut payloads) = self.payloads.lock() {
            payloads.push(payload.clone());
        }
        (self.responder)(payload).map_err(anyhow::Error::msg)
    }
}

pub(crate) struct StaticFrames {
    pub(crate) info: VideoInfo,
    pub(crate) frames: Vec<PathBuf>,
}

impl FrameSource for StaticFrames {
    fn video_info(&self, video_path: &Path) -> Result<VideoInfo> {
        if !video_path.exists() {
            return Err(EgobotError::media(
                video_path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "video not found"),
            ));
        }
        Ok(self.info)
    }

    fn extract_frames(
        &self,
        _video_path: &Path,
        _info: &VideoInfo,
        max_frames: usize,
    ) -> Result<ExtractedFrames> {
        Ok(ExtractedFrames::new(
            self.frames.iter().take(max_frames).cloned().collect(),
            None,
        ))
    }
}
