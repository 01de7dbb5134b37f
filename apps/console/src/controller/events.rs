//! Backend-to-UI events and error modeling for the console controller.

use std::path::PathBuf;

use client_core::{ClientError, ErrorKind, ValidationError};
use shared::{
    domain::Domain,
    protocol::{SessionData, Visualization},
};

use crate::backend_bridge::commands::{BackendCommand, VisualizationSource};

#[derive(Debug)]
pub enum UiEvent {
    UploadSucceeded {
        domain: Domain,
        session: SessionData,
    },
    VisualizationLoaded {
        source: VisualizationSource,
        visualization: Visualization,
    },
    FileSaved(PathBuf),
    HealthChecked(String),
    /// A queued command failed; the command is kept so it can be retried.
    CommandFailed {
        command: BackendCommand,
        error: UiError,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Transport,
    Server,
    Local,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Upload,
    Visualization,
    Download,
    Report,
    Health,
}

impl UiErrorContext {
    pub fn label(self) -> &'static str {
        match self {
            UiErrorContext::BackendStartup => "startup",
            UiErrorContext::Upload => "upload",
            UiErrorContext::Visualization => "visualization",
            UiErrorContext::Download => "download",
            UiErrorContext::Report => "report",
            UiErrorContext::Health => "health check",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
    retryable: bool,
}

impl UiError {
    pub fn from_client_error(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err.kind() {
            ErrorKind::Validation => UiErrorCategory::Validation,
            ErrorKind::Transport => UiErrorCategory::Transport,
            ErrorKind::Server | ErrorKind::MalformedResponse => UiErrorCategory::Server,
            ErrorKind::Local => UiErrorCategory::Local,
        };
        Self {
            category,
            context,
            message: err.user_message(),
            retryable: err.is_retryable(),
        }
    }

    pub fn validation(context: UiErrorContext, err: &ValidationError) -> Self {
        Self {
            category: UiErrorCategory::Validation,
            context,
            message: err.to_string(),
            retryable: false,
        }
    }

    /// Classifies free-form failures that did not come from the client.
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("failed to connect")
            || lower.contains("connection refused")
            || lower.contains("timed out")
            || lower.contains("dns")
        {
            UiErrorCategory::Transport
        } else if lower.contains("runtime")
            || lower.contains("permission denied")
            || lower.contains("no such file")
        {
            UiErrorCategory::Local
        } else {
            UiErrorCategory::Unknown
        };
        Self {
            category,
            context,
            message,
            retryable: category == UiErrorCategory::Transport,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_responses_read_as_server_errors() {
        let err = UiError::from_client_error(
            UiErrorContext::Upload,
            &ClientError::MalformedResponse {
                message: "Results response did not include a summary".into(),
            },
        );
        assert_eq!(err.category(), UiErrorCategory::Server);
        assert_eq!(err.context(), UiErrorContext::Upload);
        assert!(err.is_retryable());
    }

    #[test]
    fn validation_errors_offer_no_retry() {
        let err = UiError::validation(UiErrorContext::Upload, &ValidationError::UnsupportedType);
        assert_eq!(err.message(), "Please select a CSV or Excel file");
        assert!(!err.is_retryable());
    }

    #[test]
    fn free_form_connect_failures_are_transport() {
        let err = UiError::from_message(
            UiErrorContext::BackendStartup,
            "Connection refused (os error 111)",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
        let err = UiError::from_message(
            UiErrorContext::BackendStartup,
            "failed to build backend runtime: out of threads",
        );
        assert_eq!(err.category(), UiErrorCategory::Local);
    }
}
