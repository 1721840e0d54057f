use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What the completion service is asked to analyse
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionRequest {
    pub filename: String,
    pub language: String,
    /// Reconstructed file text
    pub content: String,
}

/// Failures worth retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    Timeout,
    RateLimited,
    Network,
    ConnectionReset,
    /// HTTP 5xx
    Server(u16),
}

/// Failures that no retry can fix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    Authentication,
    InvalidRequest,
    /// The service answered, but not with a usable completion
    InvalidResponse,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient(TransientKind),
    Terminal(TerminalKind),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transient(TransientKind::Timeout) => f.write_str("timeout"),
            ErrorKind::Transient(TransientKind::RateLimited) => f.write_str("rate limited"),
            ErrorKind::Transient(TransientKind::Network) => f.write_str("network error"),
            ErrorKind::Transient(TransientKind::ConnectionReset) => {
                f.write_str("connection reset")
            }
            ErrorKind::Transient(TransientKind::Server(status)) => {
                write!(f, "server error (HTTP {status})")
            }
            ErrorKind::Terminal(TerminalKind::Authentication) => {
                f.write_str("authentication failed")
            }
            ErrorKind::Terminal(TerminalKind::InvalidRequest) => f.write_str("invalid request"),
            ErrorKind::Terminal(TerminalKind::InvalidResponse) => f.write_str("invalid response"),
            ErrorKind::Terminal(TerminalKind::Other) => f.write_str("completion failed"),
        }
    }
}

/// Error reported by a [`CompletionService`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct CompletionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CompletionError {
    pub fn transient(kind: TransientKind, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transient(kind),
            message: message.into(),
        }
    }

    pub fn terminal(kind: TerminalKind, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Terminal(kind),
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self.kind, ErrorKind::Transient(_))
    }
}

/// Language-model collaborator turning a file into a structured analysis
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send the rendered `prompt` for `request` and return the raw response text
    async fn complete(
        &self,
        request: &CompletionRequest,
        prompt: &str,
    ) -> Result<String, CompletionError>;

    /// Check the service can be reached at all before a run starts
    async fn ready(&self) -> Result<(), CompletionError> {
        Ok(())
    }

    /// Get service name
    fn name(&self) -> &str {
        "completion"
    }
}
