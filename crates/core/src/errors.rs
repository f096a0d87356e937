//! # Pipeline Errors
//!
//! Error taxonomy shared by the pipeline, the run driver and the adapters.

use thiserror::Error;

/// Errors surfaced by the research pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No credential for the configured provider was found
    #[error("credential not found: set {var} in the environment or a .env file")]
    MissingCredential { var: &'static str },

    /// The synthesis template referenced a slot no research task filled
    #[error("result slot `{slot}` is missing")]
    MissingSlot { slot: String },

    /// An agent execution failed
    #[error("agent `{task}` failed: {cause:#}")]
    Task { task: String, cause: anyhow::Error },

    /// The response stream ended without a final response
    #[error("response stream ended without a final response")]
    NoFinalResponse,

    /// The pipeline task stopped before completing the stream
    #[error("pipeline stopped before the response stream completed")]
    StreamClosed,

    /// Configuration could not be loaded
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    /// Wrap an executor failure for the named agent
    pub fn task(task: &str, cause: anyhow::Error) -> Self {
        Self::Task {
            task: task.to_string(),
            cause,
        }
    }
}
