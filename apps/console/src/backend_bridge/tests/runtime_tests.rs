use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use client_core::{ClientError, ClientResult, UploadCandidate};
use crossbeam_channel::bounded;
use serde_json::json;
use shared::{
    domain::{Domain, ReportVariant, SessionId},
    protocol::{SessionData, Visualization},
};

use super::*;
use crate::controller::events::UiErrorCategory;

#[derive(Default)]
struct FakeBackend {
    offline: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    fn record(&self, call: String) -> ClientResult<()> {
        self.calls.lock().expect("calls lock").push(call);
        if self.offline {
            return Err(ClientError::Server {
                status: None,
                message: "Server error occurred".into(),
            });
        }
        Ok(())
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

fn session(id: &str) -> SessionData {
    serde_json::from_value(json!({
        "session_id": id,
        "domain": "telecom",
        "summary": {"total_records": 40, "anomaly_count": 2},
        "download_links": {}
    }))
    .expect("session fixture")
}

#[async_trait]
impl AnalysisBackend for FakeBackend {
    async fn submit_and_fetch(
        &self,
        candidate: &UploadCandidate,
        domain: Domain,
    ) -> ClientResult<SessionData> {
        self.record(format!("upload {} {domain}", candidate.name))?;
        Ok(session("fake-session"))
    }

    async fn fetch_results(
        &self,
        session_id: &SessionId,
        _domain: Domain,
    ) -> ClientResult<SessionData> {
        self.record(format!("results {session_id}"))?;
        Ok(session(session_id.as_str()))
    }

    async fn session_visualization(&self, session_id: &SessionId) -> ClientResult<Visualization> {
        self.record(format!("viz session {session_id}"))?;
        Ok(Visualization {
            charts: Vec::new(),
            stats: None,
        })
    }

    async fn domain_visualization(&self, domain: Domain) -> ClientResult<Visualization> {
        self.record(format!("viz domain {domain}"))?;
        Ok(Visualization {
            charts: Vec::new(),
            stats: Some(json!({"total": 3})),
        })
    }

    async fn download_by_name(&self, filename: &str, dir: &Path) -> ClientResult<PathBuf> {
        self.record(format!("download {filename}"))?;
        Ok(dir.join(filename))
    }

    async fn generate_report(
        &self,
        session_id: &SessionId,
        domain: Domain,
        variant: ReportVariant,
        dir: &Path,
    ) -> ClientResult<PathBuf> {
        self.record(format!("report {session_id} {domain} {variant:?}"))?;
        Ok(dir.join("report.txt"))
    }

    async fn health(&self) -> ClientResult<String> {
        self.record("health".into())?;
        Ok("Revenue Leakage Detection API is running".into())
    }
}

#[tokio::test]
async fn upload_command_yields_session_event() {
    let backend = FakeBackend::default();
    let candidate = UploadCandidate::new("/tmp/calls.csv", "calls.csv", 10);
    let event = execute(
        &backend,
        Path::new("out"),
        BackendCommand::SubmitUpload {
            domain: Domain::Telecom,
            candidate,
        },
    )
    .await;

    match event {
        UiEvent::UploadSucceeded { domain, session } => {
            assert_eq!(domain, Domain::Telecom);
            assert_eq!(session.session_id, SessionId::from("fake-session"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(backend.calls(), vec!["upload calls.csv telecom".to_string()]);
}

#[tokio::test]
async fn visualization_source_picks_the_endpoint() {
    let backend = FakeBackend::default();
    let source = VisualizationSource::Domain(Domain::Supermarket);
    let event = execute(
        &backend,
        Path::new("out"),
        BackendCommand::LoadVisualization {
            source: source.clone(),
        },
    )
    .await;

    match event {
        UiEvent::VisualizationLoaded {
            source: loaded,
            visualization,
        } => {
            assert_eq!(loaded, source);
            assert_eq!(visualization.stats, Some(json!({"total": 3})));
        }
        other => panic!("unexpected event: {other:?}"),
    }

    execute(
        &backend,
        Path::new("out"),
        BackendCommand::LoadVisualization {
            source: VisualizationSource::Session(SessionId::from("abc123")),
        },
    )
    .await;
    assert_eq!(
        backend.calls(),
        vec![
            "viz domain supermarket".to_string(),
            "viz session abc123".to_string()
        ]
    );
}

#[tokio::test]
async fn downloads_and_reports_land_in_the_download_dir() {
    let backend = FakeBackend::default();
    let dir = Path::new("reports");
    let saved = execute(
        &backend,
        dir,
        BackendCommand::DownloadFile {
            filename: "supermarket_anomalies.csv".into(),
        },
    )
    .await;
    assert!(matches!(saved, UiEvent::FileSaved(path) if path == dir.join("supermarket_anomalies.csv")));

    let report = execute(
        &backend,
        dir,
        BackendCommand::GenerateReport {
            session_id: SessionId::from("abc123"),
            domain: Domain::Supermarket,
            variant: ReportVariant::Detailed,
        },
    )
    .await;
    assert!(matches!(report, UiEvent::FileSaved(path) if path == dir.join("report.txt")));
}

#[tokio::test]
async fn failures_keep_the_command_for_retry() {
    let backend = FakeBackend::offline();
    let event = execute(
        &backend,
        Path::new("out"),
        BackendCommand::DownloadFile {
            filename: "telecom_anomalies.csv".into(),
        },
    )
    .await;

    match event {
        UiEvent::CommandFailed { command, error } => {
            assert!(matches!(
                command,
                BackendCommand::DownloadFile { ref filename } if filename == "telecom_anomalies.csv"
            ));
            assert_eq!(error.context(), UiErrorContext::Download);
            assert_eq!(error.category(), UiErrorCategory::Server);
            assert_eq!(error.message(), "Server error occurred");
            assert!(error.is_retryable());
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn worker_answers_every_queued_command_in_order() {
    let (cmd_tx, cmd_rx) = bounded(8);
    let (ui_tx, ui_rx) = bounded(8);
    let worker = launch(
        cmd_rx,
        ui_tx,
        Arc::new(FakeBackend::default()),
        PathBuf::from("out"),
    )
    .expect("spawn worker");

    cmd_tx.send(BackendCommand::CheckHealth).expect("queue health");
    cmd_tx
        .send(BackendCommand::DownloadFile {
            filename: "a.csv".into(),
        })
        .expect("queue download");

    let first = ui_rx.recv_timeout(Duration::from_secs(5)).expect("first event");
    assert!(
        matches!(first, UiEvent::HealthChecked(ref message) if message.contains("running")),
        "{first:?}"
    );
    let second = ui_rx.recv_timeout(Duration::from_secs(5)).expect("second event");
    assert!(matches!(second, UiEvent::FileSaved(_)), "{second:?}");

    drop(cmd_tx);
    worker.join().expect("worker exits once the queue closes");
}
