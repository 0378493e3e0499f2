use std::env;
use std::path::{Path, PathBuf};

use crate::error::SoftmatchError;

/// Default topics document, relative to the working directory.
pub const DEFAULT_TOPICS_FILE: &str = "./topics.yml";

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded at startup via dotenvy. Command-line flags take
/// precedence over anything set here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Topics document (SOFTMATCH_TOPICS_FILE)
    pub topics_file: PathBuf,
    /// Word2vec export used for neighbor lookups (SOFTMATCH_MODEL_PATH)
    pub model_path: PathBuf,
    /// Restrict each term to one topic (SOFTMATCH_ENFORCE_DISJOINT)
    pub enforce_disjoint_terms: bool,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn load() -> Self {
        Self {
            topics_file: env::var("SOFTMATCH_TOPICS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOPICS_FILE)),
            model_path: env::var("SOFTMATCH_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_model_path()),
            enforce_disjoint_terms: env::var("SOFTMATCH_ENFORCE_DISJOINT")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }

    /// Check that the model file exists before any topic is processed.
    pub fn require_model(&self) -> Result<(), SoftmatchError> {
        if !self.model_path.is_file() {
            return Err(SoftmatchError::ModelUnavailable {
                path: self.model_path.clone(),
                reason: "file not found (set SOFTMATCH_MODEL_PATH or pass --model)".to_string(),
            });
        }
        Ok(())
    }

    /// Apply command-line overrides.
    pub fn with_overrides(
        mut self,
        topics_file: Option<&Path>,
        model_path: Option<&Path>,
        enforce_disjoint_terms: bool,
    ) -> Self {
        if let Some(path) = topics_file {
            self.topics_file = path.to_path_buf();
        }
        if let Some(path) = model_path {
            self.model_path = path.to_path_buf();
        }
        self.enforce_disjoint_terms |= enforce_disjoint_terms;
        self
    }
}

/// Returns the default model location.
/// Uses the platform data directory: ~/.local/share/softmatch/models/ on Linux.
pub fn default_model_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("softmatch")
        .join("models")
        .join("word2vec.bin")
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
