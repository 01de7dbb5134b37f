//! Failure taxonomy of the leakage client and its user-facing wording.

use std::path::PathBuf;

use reqwest::StatusCode;
use shared::error::ApiErrorBody;
use thiserror::Error;

use crate::validation::ValidationError;

pub const CONNECT_FAILURE_MESSAGE: &str =
    "Failed to connect to server. Please ensure the backend is running.";
pub const GENERIC_SERVER_FAILURE: &str = "Server error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    Server,
    MalformedResponse,
    Local,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to connect to server. Please ensure the backend is running.")]
    Transport {
        #[source]
        source: reqwest::Error,
    },
    #[error("{message}")]
    Server {
        status: Option<StatusCode>,
        message: String,
    },
    #[error("{message}")]
    MalformedResponse { message: String },
    #[error("invalid file name '{0}'")]
    InvalidFileName(String),
    #[error("failed to access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid backend url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::Transport { .. } => ErrorKind::Transport,
            ClientError::Server { .. } => ErrorKind::Server,
            ClientError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            ClientError::InvalidFileName(_)
            | ClientError::Io { .. }
            | ClientError::InvalidBaseUrl { .. } => ErrorKind::Local,
        }
    }

    /// Text shown to the user. Malformed responses read like server errors.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Whether re-running the same operation could succeed. Validation and
    /// bad file names need different input first.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Transport | ErrorKind::Server | ErrorKind::MalformedResponse
        )
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Server { status, .. } => *status,
            _ => None,
        }
    }

    pub(crate) fn transport(source: reqwest::Error) -> Self {
        ClientError::Transport { source }
    }

    pub(crate) fn server(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        ClientError::Server {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        ClientError::MalformedResponse {
            message: message.into(),
        }
    }

    /// Builds a server error from a failed response body, falling back to
    /// `fallback` when the body carries no usable message.
    pub(crate) fn from_error_body(status: StatusCode, body: &[u8], fallback: &str) -> Self {
        let reason = serde_json::from_slice::<ApiErrorBody>(body)
            .ok()
            .and_then(|body| body.reason().map(str::to_string));
        Self::server(Some(status), reason.unwrap_or_else(|| fallback.to_string()))
    }
}
