use std::path::Path;

use egobot_contracts::modes::{ModeRegistry, ModeSpec, FULL_ANALYSIS_MODES};
use egobot_contracts::results::{FullAnalysis, ModeOutcome, ParsedResult};
use tracing::warn;

use crate::client::ReasoningClient;
use crate::config::Config;
use crate::error::{EgobotError, Result};
use crate::frames::{FfmpegFrameSource, FrameSource};
use crate::normalize::normalize_result;

pub const DEFAULT_MAX_FRAMES: usize = 16;

pub struct ReasoningEngine {
    client: ReasoningClient,
    registry: ModeRegistry,
    frames: Box<dyn FrameSource>,
}

impl ReasoningEngine {
    pub fn new(config: Config) -> Result<Self> {
        let frames = FfmpegFrameSource::new(config.video_fps);
        let client = ReasoningClient::new(config)?;
        Ok(Self::from_parts(client, Box::new(frames)))
    }

    pub fn from_parts(client: ReasoningClient, frames: Box<dyn FrameSource>) -> Self {
        Self {
            client,
            registry: ModeRegistry::default(),
            frames,
        }
    }

    pub fn available_modes(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn mode(&self, mode: &str) -> Result<&ModeSpec> {
        self.registry
            .get(mode)
            .ok_or_else(|| EgobotError::UnknownMode {
                mode: mode.to_string(),
                available: self.registry.names(),
            })
    }

    pub fn analyze_image(&self, image_path: &Path, mode: &str) -> Result<ParsedResult> {
        let entry = self.mode(mode)?;
        let response = self.client.reason_about_image(
            image_path,
            &entry.user_prompt,
            &entry.system_prompt,
            true,
        )?;
        Ok(normalize_result(mode, &response))
    }

    pub fn analyze_image_url(&self, image_url: &str, mode: &str) -> Result<ParsedResult> {
        let entry = self.mode(mode)?;
        let response = self.client.reason_about_image_url(
            image_url,
            &entry.user_prompt,
            &entry.system_prompt,
            true,
        )?;
        Ok(normalize_result(mode, &response))
    }

    pub fn analyze_video(
        &self,
        video_path: &Path,
        mode: &str,
        max_frames: usize,
    ) -> Result<ParsedResult> {
        let entry = self.mode(mode)?;
        let video_info = self.frames.video_info(video_path)?;
        let frames = self
            .frames
            .extract_frames(video_path, &video_info, max_frames)?;
        if frames.is_empty() {
            return Err(EgobotError::frames(format!(
                "No frames extracted from {}",
                video_path.display()
            )));
        }

        let response = self.client.reason_about_frames(
            frames.paths(),
            &entry.user_prompt,
            &entry.system_prompt,
            true,
        )?;
        let mut result = normalize_result(mode, &response);
        result.video_info = Some(video_info);
        result.frames_analyzed = Some(frames.len());
        Ok(result)
    }

    /// Runs every full-analysis mode against one image.
    ///
    /// A failing mode is recorded as an error entry; the others still run.
    pub fn full_analysis(&self, image_path: &Path) -> FullAnalysis {
        let mut analysis = FullAnalysis::new(image_path.display().to_string());
        for mode in FULL_ANALYSIS_MODES {
            let outcome = match self.analyze_image(image_path, mode) {
                Ok(result) => ModeOutcome::Completed(result),
                Err(err) => {
                    warn!(mode = %mode, error = %err, "full analysis mode failed");
                    ModeOutcome::Failed {
                        error: err.chain_text(),
                    }
                }
            };
            analysis.results.insert((*mode).to_string(), outcome);
        }
        analysis
    }
}
