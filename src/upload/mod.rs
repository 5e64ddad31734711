mod client;
mod orchestrator;
mod types;

pub use client::HttpApi;
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use types::{SubmissionEvent, SubmissionOutcome};
