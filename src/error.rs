// Error taxonomy for topic generation.
//
// Only two things can abort a run: a malformed topic configuration, or an
// embedding model that cannot be loaded. Terms missing from the model's
// vocabulary and empty snippet input are ordinary outcomes, not errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a softmatch run.
#[derive(Debug, Error)]
pub enum SoftmatchError {
    /// Missing or malformed fields in the topic configuration
    #[error("Invalid topic configuration: {0}")]
    Configuration(String),

    /// The embedding model could not be opened or parsed
    #[error("Embedding model unavailable at {}: {reason}", .path.display())]
    ModelUnavailable { path: PathBuf, reason: String },
}

impl SoftmatchError {
    pub(crate) fn model(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
