use serde::{Deserialize, Serialize};

/// Terms and definitions extracted by the server from one file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResult {
    pub terms: Vec<String>,
    pub definitions: Vec<String>,
}

/// Combined batch payload for `POST /question_set`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedResult {
    pub terms: Vec<String>,
    pub definitions: Vec<String>,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactLink {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Pending,
    Succeeded(String),
    Failed(String),
}

/// Progress reported by a running submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionEvent {
    FileUploaded {
        file_name: String,
        terms: usize,
        definitions: usize,
    },
    FileFailed {
        file_name: String,
        message: String,
    },
    ArtifactFailed {
        message: String,
    },
    Finished(SubmissionOutcome),
}
