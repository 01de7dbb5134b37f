//! Console application state: applies user actions and backend events to the
//! navigator and the per-view state the renderer reads.

use std::path::PathBuf;

use client_core::{FileSelection, UploadCandidate};
use crossbeam_channel::Sender;
use shared::{
    domain::{Domain, ReportVariant},
    protocol::{SessionData, Visualization},
};

use crate::backend_bridge::commands::{BackendCommand, VisualizationSource};
use crate::controller::{
    events::{UiError, UiErrorContext, UiEvent},
    orchestration::dispatch_backend_command,
    reducer::{
        IgnoredReason, NavigationEvent, Navigator, PageState, Transition, VisualizationMode,
    },
};
use crate::ui::input::{UiAction, HELP};

pub struct ConsoleApp {
    navigator: Navigator,
    selection: FileSelection,
    cmd_tx: Sender<BackendCommand>,
    in_flight: usize,
    uploading: Option<Domain>,
    last_domain: Option<Domain>,
    last_failed: Option<BackendCommand>,
    error: Option<UiError>,
    status: String,
    visualization: Option<(VisualizationSource, Visualization)>,
    pending_visualization: Option<VisualizationSource>,
    saved_files: Vec<PathBuf>,
    quit: bool,
}

impl ConsoleApp {
    pub fn new(cmd_tx: Sender<BackendCommand>) -> Self {
        Self {
            navigator: Navigator::new(),
            selection: FileSelection::default(),
            cmd_tx,
            in_flight: 0,
            uploading: None,
            last_domain: None,
            last_failed: None,
            error: None,
            status: String::new(),
            visualization: None,
            pending_visualization: None,
            saved_files: Vec::new(),
            quit: false,
        }
    }

    pub fn page(&self) -> PageState {
        self.navigator.page()
    }

    pub fn session(&self) -> Option<&SessionData> {
        self.navigator.session()
    }

    pub fn selection(&self) -> &FileSelection {
        &self.selection
    }

    pub fn error(&self) -> Option<&UiError> {
        self.error.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn uploading(&self) -> Option<Domain> {
        self.uploading
    }

    pub fn can_retry(&self) -> bool {
        self.last_failed.is_some()
    }

    /// Charts loaded for the visualization view currently on screen.
    pub fn visualization(&self) -> Option<&Visualization> {
        let (source, visualization) = self.visualization.as_ref()?;
        (self.visualization_source().as_ref() == Some(source)).then_some(visualization)
    }

    pub fn visualization_pending(&self) -> bool {
        self.pending_visualization.is_some()
    }

    pub fn saved_files(&self) -> &[PathBuf] {
        &self.saved_files
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn handle_action(&mut self, action: UiAction) {
        tracing::debug!(page = self.page().id(), ?action, "ui action");
        match action {
            UiAction::Home => {
                if self.navigate(NavigationEvent::GoHome).is_applied() {
                    self.selection.clear();
                    self.visualization = None;
                    self.pending_visualization = None;
                    self.status.clear();
                }
            }
            UiAction::SelectDomain(id) => match self.navigate(NavigationEvent::SelectDomain(id)) {
                Transition::Applied => {
                    self.last_domain = self.page().domain();
                    self.selection.clear();
                    self.status.clear();
                }
                Transition::Ignored(IgnoredReason::UnknownDomain(unknown)) => {
                    self.status = format!("Unknown domain '{unknown}'; choose supermarket or telecom");
                }
                Transition::Ignored(IgnoredReason::MissingSession) => {}
            },
            UiAction::ChooseFile(path) => self.choose_file(path),
            UiAction::ClearFile => {
                self.selection.clear();
                self.forget_failed_upload();
                self.status = "File selection cleared".to_string();
            }
            UiAction::Upload => self.start_upload(),
            UiAction::Retry => match self.last_failed.take() {
                Some(command) => {
                    self.error = None;
                    self.status = format!("Retrying {}", command.error_context().label());
                    self.queue(command);
                }
                None => self.status = "Nothing to retry".to_string(),
            },
            UiAction::Results => {
                let session = self.session().cloned();
                if !self.navigate(NavigationEvent::ShowResults(session)).is_applied() {
                    self.status = "No results yet; upload a dataset first".to_string();
                }
            }
            UiAction::Visualization(mode) => self.open_visualization(mode),
            UiAction::Download(filename) => {
                if self.session().is_none() {
                    self.status = "No results to download yet".to_string();
                } else if self.queue(BackendCommand::DownloadFile {
                    filename: filename.clone(),
                }) {
                    self.status = format!("Downloading {filename}");
                }
            }
            UiAction::Report(variant) => self.request_report(variant),
            UiAction::Health => {
                self.status = "Checking backend".to_string();
                self.queue(BackendCommand::CheckHealth);
            }
            UiAction::DismissError => self.error = None,
            UiAction::Help => self.status = HELP.to_string(),
            UiAction::Quit => self.quit = true,
        }
    }

    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Error(error) => {
                tracing::error!(context = error.context().label(), "{}", error.message());
                self.error = Some(error);
            }
            UiEvent::UploadSucceeded { domain, session } => {
                self.finish_command();
                self.uploading = None;
                let session_id = session.session_id.clone();
                if self.page() == PageState::from(domain) {
                    self.selection.clear();
                    self.visualization = None;
                    self.navigate(NavigationEvent::ShowResults(Some(session)));
                    self.status = "Analysis complete".to_string();
                } else {
                    tracing::info!(%domain, %session_id, "upload finished after leaving its view");
                    self.status = format!(
                        "The {} upload finished (session {session_id}) after you left its view",
                        domain.display_name()
                    );
                }
            }
            UiEvent::VisualizationLoaded {
                source,
                visualization,
            } => {
                self.finish_command();
                if self.pending_visualization.as_ref() == Some(&source) {
                    self.pending_visualization = None;
                    self.visualization = Some((source, visualization));
                } else {
                    tracing::debug!(?source, "dropping stale visualization");
                }
            }
            UiEvent::FileSaved(path) => {
                self.finish_command();
                self.status = format!("Saved {}", path.display());
                self.saved_files.push(path);
            }
            UiEvent::HealthChecked(message) => {
                self.finish_command();
                self.status = message;
            }
            UiEvent::CommandFailed { command, error } => {
                self.finish_command();
                match &command {
                    BackendCommand::SubmitUpload { .. } => self.uploading = None,
                    BackendCommand::LoadVisualization { source }
                        if self.pending_visualization.as_ref() == Some(source) =>
                    {
                        self.pending_visualization = None;
                    }
                    _ => {}
                }
                self.last_failed = error.is_retryable().then_some(command);
                self.error = Some(error);
            }
        }
    }

    fn navigate(&mut self, event: NavigationEvent) -> Transition {
        let transition = self.navigator.apply(event);
        if transition.is_applied() {
            self.error = None;
        }
        transition
    }

    fn finish_command(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    fn queue(&mut self, command: BackendCommand) -> bool {
        let upload_domain = match &command {
            BackendCommand::SubmitUpload { domain, .. } => Some(*domain),
            _ => None,
        };
        if !dispatch_backend_command(&self.cmd_tx, command, &mut self.status) {
            return false;
        }
        self.in_flight += 1;
        if upload_domain.is_some() {
            self.uploading = upload_domain;
        }
        true
    }

    fn choose_file(&mut self, path: PathBuf) {
        if self.page().domain().is_none() {
            self.status = "Open the supermarket or telecom view to choose a file".to_string();
            return;
        }
        let candidate = match UploadCandidate::from_path(&path) {
            Ok(candidate) => candidate,
            Err(err) => {
                self.error = Some(UiError::from_message(
                    UiErrorContext::Upload,
                    format!("Could not read {}: {err}", path.display()),
                ));
                return;
            }
        };
        match self.selection.select(candidate) {
            Ok(selected) => {
                self.status = format!("Selected {} ({:.2} MB)", selected.name, selected.size_mib());
                self.error = None;
                self.forget_failed_upload();
            }
            Err(err) => self.error = Some(UiError::validation(UiErrorContext::Upload, &err)),
        }
    }

    /// A stored upload retry carries the old file, so it goes once the
    /// selection changes.
    fn forget_failed_upload(&mut self) {
        if matches!(self.last_failed, Some(BackendCommand::SubmitUpload { .. })) {
            self.last_failed = None;
        }
    }

    fn start_upload(&mut self) {
        let Some(domain) = self.page().domain() else {
            self.status = "Open the supermarket or telecom view to upload".to_string();
            return;
        };
        if self.uploading.is_some() {
            self.status = "An upload is already in progress".to_string();
            return;
        }
        let candidate = match self.selection.require() {
            Ok(candidate) => candidate.clone(),
            Err(err) => {
                self.error = Some(UiError::validation(UiErrorContext::Upload, &err));
                return;
            }
        };
        self.error = None;
        self.last_failed = None;
        if self.queue(BackendCommand::SubmitUpload { domain, candidate }) {
            self.status = "Uploading and analyzing...".to_string();
        }
    }

    fn open_visualization(&mut self, mode: VisualizationMode) {
        let transition = self.navigate(NavigationEvent::ShowVisualization { mode, data: None });
        if !transition.is_applied() {
            self.status = "No results to visualize yet; upload a dataset first".to_string();
            return;
        }
        let Some(source) = self.visualization_source() else {
            self.status = "Select a domain first to load its aggregates".to_string();
            return;
        };
        let loaded = self.visualization.as_ref().map(|(loaded, _)| loaded) == Some(&source);
        if loaded || self.pending_visualization.as_ref() == Some(&source) {
            return;
        }
        if self.queue(BackendCommand::LoadVisualization {
            source: source.clone(),
        }) {
            self.pending_visualization = Some(source);
            self.status = "Loading charts...".to_string();
        }
    }

    /// Dashboard charts come from the stored session; the index shows the
    /// domain-wide aggregates of the session's domain or the last picked one.
    fn visualization_source(&self) -> Option<VisualizationSource> {
        match self.page() {
            PageState::VisualizationDashboard => self
                .session()
                .map(|session| VisualizationSource::Session(session.session_id.clone())),
            PageState::VisualizationIndex => self
                .session()
                .map(|session| session.domain)
                .or(self.last_domain)
                .map(VisualizationSource::Domain),
            _ => None,
        }
    }

    fn request_report(&mut self, variant: ReportVariant) {
        let Some(session) = self.session() else {
            self.status = "No results to report on yet".to_string();
            return;
        };
        let command = BackendCommand::GenerateReport {
            session_id: session.session_id.clone(),
            domain: session.domain,
            variant,
        };
        if self.queue(command) {
            self.status = "Generating report...".to_string();
        }
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
