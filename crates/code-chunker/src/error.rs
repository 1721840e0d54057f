use thiserror::Error;

/// Result type for chunker operations
pub type Result<T> = std::result::Result<T, ChunkerError>;

/// Errors that can occur while chunking file text
#[derive(Error, Debug)]
pub enum ChunkerError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// File text could not be chunked
    #[error("Cannot chunk {filename}: {reason}")]
    Unchunkable { filename: String, reason: String },
}

impl ChunkerError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an unchunkable-file error
    pub fn unchunkable(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unchunkable {
            filename: filename.into(),
            reason: reason.into(),
        }
    }
}
