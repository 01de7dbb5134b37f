//! Backend commands queued from UI to backend worker.

use client_core::UploadCandidate;
use shared::domain::{Domain, ReportVariant, SessionId};

use crate::controller::events::UiErrorContext;

/// Which aggregates a visualization view asks for: one session's charts or
/// the latest domain-wide ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualizationSource {
    Session(SessionId),
    Domain(Domain),
}

#[derive(Debug, Clone)]
pub enum BackendCommand {
    SubmitUpload {
        domain: Domain,
        candidate: UploadCandidate,
    },
    LoadVisualization {
        source: VisualizationSource,
    },
    DownloadFile {
        filename: String,
    },
    GenerateReport {
        session_id: SessionId,
        domain: Domain,
        variant: ReportVariant,
    },
    CheckHealth,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::SubmitUpload { .. } => "submit_upload",
            BackendCommand::LoadVisualization { .. } => "load_visualization",
            BackendCommand::DownloadFile { .. } => "download_file",
            BackendCommand::GenerateReport { .. } => "generate_report",
            BackendCommand::CheckHealth => "check_health",
        }
    }

    pub fn error_context(&self) -> UiErrorContext {
        match self {
            BackendCommand::SubmitUpload { .. } => UiErrorContext::Upload,
            BackendCommand::LoadVisualization { .. } => UiErrorContext::Visualization,
            BackendCommand::DownloadFile { .. } => UiErrorContext::Download,
            BackendCommand::GenerateReport { .. } => UiErrorContext::Report,
            BackendCommand::CheckHealth => UiErrorContext::Health,
        }
    }
}
