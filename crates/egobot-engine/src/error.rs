use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EgobotError>;

#[derive(Debug, Error)]
pub enum EgobotError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown mode '{mode}'. Available: {}", available.join(", "))]
    UnknownMode { mode: String, available: Vec<String> },

    #[error("cannot read {}", path.display())]
    MediaAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Frame extraction failed: {0}")]
    FrameExtraction(String),

    /// Any failure talking to the model endpoint. Never retried.
    #[error("Remote call failed: {0:#}")]
    RemoteCall(anyhow::Error),

    #[error("Dataset not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    #[error("Invalid dataset {}: {message}", path.display())]
    Dataset { path: PathBuf, message: String },

    #[error("Failed to write benchmark report: {0:#}")]
    Report(anyhow::Error),
}

impl EgobotError {
    pub fn config(msg: impl Into<String>) -> Self {
        EgobotError::Configuration(msg.into())
    }

    pub fn media(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EgobotError::MediaAccess {
            path: path.into(),
            source,
        }
    }

    pub fn frames(msg: impl Into<String>) -> Self {
        EgobotError::FrameExtraction(msg.into())
    }

    pub fn chain_text(&self) -> String {
        let mut parts = vec![self.to_string()];
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            let text = err.to_string();
            let trimmed = text.trim();
            if !trimmed.is_empty() && parts.last().map(String::as_str) != Some(trimmed) {
                parts.push(trimmed.to_string());
            }
            cause = err.source();
        }
        parts.join(": ")
    }
}
