use crate::completion::CompletionError;
use codemap_chunker::ChunkerError;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failure to analyse a single file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Cannot analyse {filename}: {reason}")]
    Precondition { filename: String, reason: String },

    #[error("{0}")]
    Terminal(CompletionError),

    #[error("Giving up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Deadline exceeded after {attempts} attempts")]
    DeadlineExceeded { attempts: u32 },

    #[error("Analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    pub fn is_deadline(&self) -> bool {
        matches!(self, AnalysisError::DeadlineExceeded { .. })
    }
}

/// Failure of a whole pipeline run; no partial analysis is produced
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),

    #[error("Completion service unavailable: {0}")]
    ServiceUnavailable(CompletionError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Chunker error: {0}")]
    Chunker(#[from] ChunkerError),

    #[error("Scheduler error: {0}")]
    Scheduler(AnalysisError),

    #[error("A pipeline run is already in progress")]
    Busy,
}
