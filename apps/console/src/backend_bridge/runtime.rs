//! Backend worker: a dedicated thread owning a tokio runtime that drains the
//! command queue one command at a time and answers each with one [`UiEvent`].

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
    thread::{self, JoinHandle},
};

use client_core::AnalysisBackend;
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::{BackendCommand, VisualizationSource};
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    backend: Arc<dyn AnalysisBackend>,
    download_dir: PathBuf,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("leakage-backend".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    tracing::error!("failed to build backend runtime: {err}");
                    let _ = ui_tx.send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: failed to build runtime: {err}"),
                    )));
                    return;
                }
            };

            runtime.block_on(async move {
                tracing::info!(download_dir = %download_dir.display(), "backend worker ready");
                while let Ok(cmd) = cmd_rx.recv() {
                    let event = execute(backend.as_ref(), &download_dir, cmd).await;
                    if ui_tx.send(event).is_err() {
                        tracing::debug!("ui event receiver dropped; stopping backend worker");
                        break;
                    }
                }
                tracing::info!("backend worker stopped");
            });
        })
}

/// Runs one command against `backend`. Failures come back as
/// [`UiEvent::CommandFailed`] carrying the command for a later retry.
pub async fn execute(
    backend: &dyn AnalysisBackend,
    download_dir: &Path,
    cmd: BackendCommand,
) -> UiEvent {
    tracing::debug!(command = cmd.name(), "executing backend command");
    let outcome = match &cmd {
        BackendCommand::SubmitUpload { domain, candidate } => backend
            .submit_and_fetch(candidate, *domain)
            .await
            .map(|session| UiEvent::UploadSucceeded {
                domain: *domain,
                session,
            }),
        BackendCommand::LoadVisualization { source } => {
            let loaded = match source {
                VisualizationSource::Session(session_id) => {
                    backend.session_visualization(session_id).await
                }
                VisualizationSource::Domain(domain) => backend.domain_visualization(*domain).await,
            };
            loaded.map(|visualization| UiEvent::VisualizationLoaded {
                source: source.clone(),
                visualization,
            })
        }
        BackendCommand::DownloadFile { filename } => backend
            .download_by_name(filename, download_dir)
            .await
            .map(UiEvent::FileSaved),
        BackendCommand::GenerateReport {
            session_id,
            domain,
            variant,
        } => backend
            .generate_report(session_id, *domain, *variant, download_dir)
            .await
            .map(UiEvent::FileSaved),
        BackendCommand::CheckHealth => backend.health().await.map(UiEvent::HealthChecked),
    };

    outcome.unwrap_or_else(|err| {
        tracing::warn!(command = cmd.name(), kind = ?err.kind(), "backend command failed: {err}");
        UiEvent::CommandFailed {
            error: UiError::from_client_error(cmd.error_context(), &err),
            command: cmd,
        }
    })
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
