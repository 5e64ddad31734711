use crate::app::UiPhase;
use thiserror::Error;

/// Rejection of a file selection before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No files found")]
    NoFiles,

    #[error("No more than {max} files")]
    TooManyFiles { count: usize, max: usize },
}

impl ValidationError {
    /// Short machine-friendly reason.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::NoFiles => "no files",
            ValidationError::TooManyFiles { .. } => "too many files",
        }
    }
}

/// Failure of a single call against the question set server.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx answer; the body is the server's plain-text message.
    #[error("{body}")]
    Status { status: u16, body: String },

    /// 2xx answer whose body is not the expected JSON.
    #[error("{0}")]
    UnexpectedBody(String),

    #[error("Failed to read file: {0}")]
    ReadFile(#[from] std::io::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl ApiError {
    /// HTTP status of a non-2xx answer.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Terminal failure of one submission cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("{message}; for {file_name}")]
    Upload { file_name: String, message: String },

    #[error("{0}")]
    Artifact(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {event} while {from:?}")]
pub struct TransitionError {
    pub from: UiPhase,
    pub event: &'static str,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid server url {value:?}: {reason}")]
    ServerUrl { value: String, reason: String },

    #[error("invalid request timeout {0:?}, expected whole seconds")]
    Timeout(String),
}
