use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("failed to load recorded frame from {}: {reason}", path.display())]
    DataLoad { path: PathBuf, reason: String },

    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("no action supplied for agent `{0}`")]
    MissingAction(String),

    #[error("invalid action for agent `{agent}`: {reason}")]
    InvalidAction { agent: String, reason: String },

    #[error("could not process observation for agent `{agent}`: {reason}")]
    Observation { agent: String, reason: String },

    #[error("expected {expected} actions, got {actual}")]
    ActionCountMismatch { expected: usize, actual: usize },

    #[error("Environment error: {0}")]
    EnvError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl EnvError {
    pub(crate) fn data_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        EnvError::DataLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
