use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Broad class of a desk failure. Callers choose a retry policy per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeskErrorKind {
    /// Credentials were rejected. Retrying will not help until they change.
    Authentication,
    /// The ticket payload was rejected.
    Validation,
    /// Network, timeout or server-side failure. Safe to retry.
    Transient,
}

impl DeskErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeskErrorKind::Authentication => "authentication",
            DeskErrorKind::Validation => "validation",
            DeskErrorKind::Transient => "transient",
        }
    }
}

impl fmt::Display for DeskErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from creating a desk request.
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error("Desk rejected credentials (HTTP {status}): {body}")]
    Authentication { status: u16, body: String },

    #[error("Desk rejected request data (HTTP {status}): {body}")]
    Validation { status: u16, body: String },

    /// The payload could not be built locally.
    #[error("Invalid request data: {0}")]
    InvalidPayload(String),

    #[error("Desk returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Desk call timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// A success status with a body that carries no request id.
    #[error("Bad response from desk: {0}")]
    BadResponse(String),
}

impl DeskError {
    pub fn kind(&self) -> DeskErrorKind {
        match self {
            DeskError::Authentication { .. } => DeskErrorKind::Authentication,
            DeskError::Validation { .. } | DeskError::InvalidPayload(_) => {
                DeskErrorKind::Validation
            }
            DeskError::HttpStatus { .. }
            | DeskError::Timeout(_)
            | DeskError::Request(_)
            | DeskError::BadResponse(_) => DeskErrorKind::Transient,
        }
    }

    /// Classify a non-2xx response status.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => DeskError::Authentication { status, body },
            400 | 422 => DeskError::Validation { status, body },
            _ => DeskError::HttpStatus { status, body },
        }
    }
}

impl From<reqwest::Error> for DeskError {
    fn from(err: reqwest::Error) -> Self {
        DeskError::Request(err)
    }
}
