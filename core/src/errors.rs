use reqwest::StatusCode;
use thiserror::Error;

use crate::session::SessionStoreError;

/// Service desk client errors
#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Request Error: {0}")]
    RequestError(String),

    /// No HTTP response was received (connect failure, reset, TLS, ...)
    #[error("Transport Error: {0}")]
    TransportError(#[source] reqwest::Error),

    #[error("HTTP Error: {status} - {detail}")]
    HttpError { status: StatusCode, detail: String },

    #[error("Parsing Error: {0}")]
    ParsingError(String),

    #[error(transparent)]
    SessionError(#[from] SessionStoreError),

    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl DeskError {
    /// Status code of the HTTP response behind this error, if there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            DeskError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Human readable reason, preferring the backend's `detail` field.
    pub fn detail(&self) -> String {
        match self {
            DeskError::HttpError { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type for service desk operations
pub type DeskResult<T> = Result<T, DeskError>;
