mod benchmark;
mod client;
mod config;
mod engine;
mod error;
mod frames;
mod media;
mod normalize;
mod planner;

#[cfg(test)]
mod testing;

pub use benchmark::BenchmarkRunner;
pub use client::{
    split_reasoning, with_reasoning_instruction, ChatTransport, HttpTransport, ReasoningClient,
    DEFAULT_SYSTEM_PROMPT, REASONING_CLOSE, REASONING_OPEN,
};
pub use config::Config;
pub use engine::{ReasoningEngine, DEFAULT_MAX_FRAMES};
pub use error::{EgobotError, Result};
pub use frames::{sampling_interval, ExtractedFrames, FfmpegFrameSource, FrameSource};
pub use media::{data_uri_for_path, encode_file_base64, mime_for_path};
pub use normalize::{extract_json_payload, normalize_result};
pub use planner::{ActionPlanner, GRIPPER_TRAJECTORY_LABEL, MULTI_STEP_PLAN_LABEL};
