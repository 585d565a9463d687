//! Error types for the pipeline

use calabi_vocab::VocabError;
use thiserror::Error;

/// Errors that can occur while processing a request
///
/// A request either succeeds as a whole or fails with one of these; no
/// partial entity or suggestion lists are returned.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Malformed or oversized input, fixable by the caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Inference resource missing, unreachable or failing
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Inference did not finish in time
    #[error("Inference timed out after {0} ms")]
    Timeout(u64),

    /// Invalid startup configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PipelineError {
    /// Stable machine-readable name of the error class
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput(_) => "invalid_input",
            PipelineError::ModelUnavailable(_) => "model_unavailable",
            PipelineError::Timeout(_) => "timeout",
            PipelineError::Configuration(_) => "configuration",
        }
    }
}

impl From<VocabError> for PipelineError {
    fn from(e: VocabError) -> Self {
        match e {
            VocabError::InvalidInput(msg) => PipelineError::InvalidInput(msg),
            VocabError::Embedding(e) => PipelineError::ModelUnavailable(e.to_string()),
            other @ (VocabError::Load(_) | VocabError::Index(_)) => {
                PipelineError::Configuration(other.to_string())
            }
        }
    }
}
