use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use egobot_contracts::results::VideoInfo;
use serde_json::Value;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::{EgobotError, Result};

pub trait FrameSource: Send + Sync {
    fn video_info(&self, video_path: &Path) -> Result<VideoInfo>;

    /// Evenly sampled frames, in playback order, at most `max_frames`.
    /// `info` is the metadata already returned by `video_info`.
    fn extract_frames(
        &self,
        video_path: &Path,
        info: &VideoInfo,
        max_frames: usize,
    ) -> Result<ExtractedFrames>;
}

#[derive(Debug)]
pub struct ExtractedFrames {
    paths: Vec<PathBuf>,
    _workdir: Option<TempDir>,
}

impl ExtractedFrames {
    pub fn new(paths: Vec<PathBuf>, workdir: Option<TempDir>) -> Self {
        Self {
            paths,
            _workdir: workdir,
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Keeps every n-th frame so the effective rate approaches `target_fps`
/// without exceeding the native rate.
pub fn sampling_interval(native_fps: f64, target_fps: f64) -> u64 {
    if !(native_fps.is_finite() && native_fps > 0.0) {
        return 1;
    }
    let target = target_fps.min(native_fps);
    if !(target.is_finite() && target > 0.0) {
        return 1;
    }
    ((native_fps / target).floor() as u64).max(1)
}

#[derive(Debug, Clone)]
pub struct FfmpegFrameSource {
    target_fps: f64,
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegFrameSource {
    pub fn new(target_fps: f64) -> Self {
        Self {
            target_fps,
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }

    pub fn with_binaries(
        mut self,
        ffmpeg: impl Into<PathBuf>,
        ffprobe: impl Into<PathBuf>,
    ) -> Self {
        self.ffmpeg = ffmpeg.into();
        self.ffprobe = ffprobe.into();
        self
    }

    fn ensure_readable(video_path: &Path) -> Result<()> {
        fs::metadata(video_path)
            .map(|_| ())
            .map_err(|err| EgobotError::media(video_path, err))
    }
}

impl FrameSource for FfmpegFrameSource {
    fn video_info(&self, video_path: &Path) -> Result<VideoInfo> {
        Self::ensure_readable(video_path)?;
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-select_streams", "v:0", "-show_entries"])
            .arg("stream=width,height,avg_frame_rate,r_frame_rate,nb_frames:format=duration")
            .args(["-of", "json"])
            .arg(video_path)
            .output()
            .map_err(|err| {
                EgobotError::frames(format!("failed to run {}: {err}", self.ffprobe.display()))
            })?;
        if !output.status.success() {
            return Err(EgobotError::frames(format!(
                "cannot open video {}: {}",
                video_path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let probe: Value = serde_json::from_slice(&output.stdout)
            .map_err(|err| EgobotError::frames(format!("unreadable ffprobe output: {err}")))?;
        parse_probe_output(&probe)
    }

    fn extract_frames(
        &self,
        video_path: &Path,
        info: &VideoInfo,
        max_frames: usize,
    ) -> Result<ExtractedFrames> {
        Self::ensure_readable(video_path)?;
        if max_frames == 0 {
            return Ok(ExtractedFrames::new(Vec::new(), None));
        }
        let interval = sampling_interval(info.fps, self.target_fps);
        let workdir = tempfile::Builder::new()
            .prefix("egobot_frames_")
            .tempdir()
            .map_err(|err| EgobotError::frames(format!("failed to create frame directory: {err}")))?;
        debug!(
            video = %video_path.display(),
            interval,
            max_frames,
            "extracting frames"
        );

        let output = Command::new(&self.ffmpeg)
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(video_path)
            .arg("-vf")
            .arg(format!("select=not(mod(n\\,{interval}))"))
            .args(["-vsync", "vfr", "-q:v", "2", "-frames:v"])
            .arg(max_frames.to_string())
            .arg(workdir.path().join("frame_%06d.jpg"))
            .output()
            .map_err(|err| {
                EgobotError::frames(format!("failed to run {}: {err}", self.ffmpeg.display()))
            })?;
        if !output.status.success() {
            return Err(EgobotError::frames(format!(
                "ffmpeg failed on {}: {}",
                video_path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(workdir.path())
            .map_err(|err| EgobotError::frames(format!("failed to list frames: {err}")))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("jpg"))
            .collect();
        paths.sort();
        paths.truncate(max_frames);
        info!(
            frames = paths.len(),
            video = %video_path.display(),
            "extracted frames"
        );
        Ok(ExtractedFrames::new(paths, Some(workdir)))
    }
}

fn parse_probe_output(probe: &Value) -> Result<VideoInfo> {
    let stream = probe
        .pointer("/streams/0")
        .ok_or_else(|| EgobotError::frames("no video stream found"))?;
    let fps = ["avg_frame_rate", "r_frame_rate"]
        .iter()
        .filter_map(|key| stream.get(*key).and_then(Value::as_str))
        .filter_map(parse_frame_rate)
        .next()
        .unwrap_or(0.0);
    let dimension = |key: &str| {
        stream
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|value| u32::try_from(value).ok())
            .unwrap_or(0)
    };
    let duration = probe
        .pointer("/format/duration")
        .and_then(value_as_f64)
        .unwrap_or(0.0);
    let frame_count = stream
        .get("nb_frames")
        .and_then(value_as_f64)
        .map(|value| value as u64)
        .unwrap_or_else(|| (duration * fps).round() as u64);
    Ok(VideoInfo::new(
        fps,
        frame_count,
        dimension("width"),
        dimension("height"),
    ))
}

fn parse_frame_rate(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let rate = match raw.split_once('/') {
        Some((num, den)) => {
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num.trim().parse::<f64>().ok()? / den
        }
        None => raw.parse().ok()?,
    };
    (rate > 0.0).then_some(rate)
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
