//! Error types for minidfs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Protocol Errors ===
    #[error("Malformed command: {0}")]
    MalformedCommand(String),

    #[error("Unknown command tag: {0}")]
    UnknownCommand(u8),

    // === Consensus Errors ===
    #[error("Not leader: current leader is {0}")]
    NotLeader(String),

    #[error("Consensus timeout")]
    ConsensusTimeout,

    // === Content Errors ===
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Content not present on this node: {0}")]
    ContentUnavailable(String),

    #[error("Content push to {peer} failed: {reason}")]
    ContentReplication { peer: String, reason: String },

    // === Network Errors ===
    #[error("HTTP error: {0}")]
    Http(String),

    // === Config Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === Generic ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Is this a retryable error?
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::NotLeader(_) | Error::ConsensusTimeout | Error::Http(_)
        )
    }

    /// Convert to HTTP status code
    pub fn to_http_status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Error::NotFound(_) | Error::ContentUnavailable(_) => StatusCode::NOT_FOUND,
            Error::NotLeader(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::ConsensusTimeout => StatusCode::REQUEST_TIMEOUT,
            Error::MalformedCommand(_) | Error::UnknownCommand(_) | Error::InvalidConfig(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
