use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{
    header::HeaderMap,
    multipart::{Form, Part},
    Client, RequestBuilder, StatusCode,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Domain, ReportVariant, SessionId},
    protocol::{
        HealthResponse, ReportEnvelope, ResultsResponse, SessionData, UploadResponse,
        Visualization, VisualizationResponse,
    },
};
use tracing::{debug, info, warn};
use url::Url;

pub mod config;
pub mod download;
pub mod error;
pub mod insights;
pub mod validation;

pub use config::Settings;
pub use download::{ArtifactKind, ReportArtifact};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use validation::{validate, FileSelection, UploadCandidate, ValidationError};

/// Multipart field the backend reads the dataset from.
pub const UPLOAD_FIELD: &str = "file";

const UPLOAD_FAILED: &str = "Upload failed";
const RESULTS_FAILED: &str = "Failed to retrieve results";
const VISUALIZATION_FAILED: &str = "Failed to load visualization data";
const DOWNLOAD_FAILED: &str = "Failed to download file";
const REPORT_FAILED: &str = "Failed to generate report";

/// Everything a front end needs from the analysis backend. Implemented by
/// [`LeakageClient`]; tests substitute their own.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Uploads a dataset and fetches its results as one operation. Either
    /// both calls succeed and a complete [`SessionData`] comes back, or an
    /// error does.
    async fn submit_and_fetch(
        &self,
        candidate: &UploadCandidate,
        domain: Domain,
    ) -> ClientResult<SessionData>;
    async fn fetch_results(&self, session_id: &SessionId, domain: Domain)
        -> ClientResult<SessionData>;
    async fn session_visualization(&self, session_id: &SessionId) -> ClientResult<Visualization>;
    async fn domain_visualization(&self, domain: Domain) -> ClientResult<Visualization>;
    async fn download_by_name(&self, filename: &str, dir: &Path) -> ClientResult<PathBuf>;
    async fn generate_report(
        &self,
        session_id: &SessionId,
        domain: Domain,
        variant: ReportVariant,
        dir: &Path,
    ) -> ClientResult<PathBuf>;
    async fn health(&self) -> ClientResult<String>;
}

struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

pub struct LeakageClient {
    http: Client,
    base_url: Url,
    request_timeout: Duration,
    upload_timeout: Duration,
}

impl LeakageClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::from_settings(&Settings {
            api_base_url: base_url.to_string(),
            ..Settings::default()
        })
    }

    pub fn from_settings(settings: &Settings) -> ClientResult<Self> {
        let normalized = config::normalize_base_url(&settings.api_base_url)?;
        let base_url = Url::parse(&normalized).map_err(|source| ClientError::InvalidBaseUrl {
            url: settings.api_base_url.clone(),
            source,
        })?;
        Ok(Self {
            http: Client::new(),
            base_url,
            request_timeout: settings.request_timeout(),
            upload_timeout: settings.upload_timeout(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                source: url::ParseError::RelativeUrlWithoutBase,
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a request and reads the whole body. Non-2xx statuses become
    /// [`ClientError::Server`] with the body's message or `fallback`.
    async fn execute(&self, request: RequestBuilder, fallback: &str) -> ClientResult<RawResponse> {
        let response = request.send().await.map_err(|err| {
            warn!("backend request failed before a response arrived: {err}");
            ClientError::transport(err)
        })?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(ClientError::transport)?
            .to_vec();

        if !status.is_success() {
            warn!(status = %status, "backend returned failure status");
            return Err(ClientError::from_error_body(status, &body, fallback));
        }
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> ClientResult<T> {
        serde_json::from_slice(body).map_err(|err| {
            debug!("undecodable {what} body: {err}");
            ClientError::malformed(format!("Invalid {what} received from server"))
        })
    }

    /// First stage of the upload protocol: returns the session the backend
    /// assigned to the dataset.
    pub async fn upload(&self, candidate: &UploadCandidate, domain: Domain) -> ClientResult<SessionId> {
        validate(candidate)?;

        let bytes = tokio::fs::read(&candidate.path)
            .await
            .map_err(|source| ClientError::Io {
                path: candidate.path.clone(),
                source,
            })?;
        let mime = mime_guess::from_path(&candidate.name).first_or_octet_stream();
        let part = Part::bytes(bytes)
            .file_name(candidate.name.clone())
            .mime_str(mime.essence_str())
            .map_err(ClientError::transport)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        info!(
            domain = %domain,
            file = %candidate.name,
            size = candidate.size,
            "uploading dataset"
        );
        let url = self.endpoint(&["upload", domain.as_str()])?;
        let raw = self
            .execute(
                self.http
                    .post(url)
                    .timeout(self.upload_timeout)
                    .multipart(form),
                error::GENERIC_SERVER_FAILURE,
            )
            .await?;

        let response: UploadResponse = Self::decode(&raw.body, "upload response")?;
        if response.success == Some(false) {
            let message = response
                .error
                .or(response.message)
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| UPLOAD_FAILED.to_string());
            return Err(ClientError::server(Some(raw.status), message));
        }

        match response.session_id {
            Some(session_id) if !session_id.as_str().trim().is_empty() => {
                info!(session_id = %session_id, "upload accepted");
                Ok(session_id)
            }
            _ => Err(ClientError::malformed(
                "Upload response did not include a session id",
            )),
        }
    }

    pub async fn results(&self, session_id: &SessionId, domain: Domain) -> ClientResult<SessionData> {
        let url = self.endpoint(&["api", "results", session_id.as_str()])?;
        let raw = self
            .execute(
                self.http.get(url).timeout(self.request_timeout),
                RESULTS_FAILED,
            )
            .await?;

        let response: ResultsResponse = Self::decode(&raw.body, "results response")?;
        if response.success == Some(false) {
            let message = response
                .error
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| RESULTS_FAILED.to_string());
            return Err(ClientError::server(Some(raw.status), message));
        }
        let Some(summary) = response.summary else {
            return Err(ClientError::malformed(
                "Results response did not include a summary",
            ));
        };

        let reported_domain = match response.domain.as_deref() {
            Some(raw_domain) => match raw_domain.parse::<Domain>() {
                Ok(parsed) if parsed != domain => {
                    warn!(expected = %domain, reported = %parsed, "backend reported a different domain");
                    parsed
                }
                Ok(parsed) => parsed,
                Err(_) => {
                    warn!(reported = raw_domain, "ignoring unknown domain in results");
                    domain
                }
            },
            None => domain,
        };

        Ok(SessionData {
            session_id: response.session_id.unwrap_or_else(|| session_id.clone()),
            domain: reported_domain,
            summary,
            download_links: response.download_links,
            visualizations: response.visualizations,
            extra: response.extra,
        })
    }

    async fn visualization(&self, segments: &[&str]) -> ClientResult<Visualization> {
        let url = self.endpoint(segments)?;
        let raw = self
            .execute(
                self.http.get(url).timeout(self.request_timeout),
                VISUALIZATION_FAILED,
            )
            .await?;
        let response: VisualizationResponse = Self::decode(&raw.body, "visualization data")?;
        match response.charts {
            Some(charts) => Ok(Visualization {
                charts,
                stats: response.stats,
            }),
            None => match response.error.filter(|text| !text.trim().is_empty()) {
                Some(message) => Err(ClientError::server(Some(raw.status), message)),
                None => Err(ClientError::malformed(VISUALIZATION_FAILED)),
            },
        }
    }

    /// Raw bytes of a backend-produced file. The name is checked before any
    /// request is made.
    pub async fn fetch_file(&self, filename: &str) -> ClientResult<Vec<u8>> {
        download::check_file_name(filename)?;
        let url = self.endpoint(&["download", filename])?;
        let raw = self
            .execute(
                self.http.get(url).timeout(self.upload_timeout),
                DOWNLOAD_FAILED,
            )
            .await?;
        debug!(file = filename, bytes = raw.body.len(), "downloaded file");
        Ok(raw.body)
    }

    /// Asks the backend for a report and turns either response flavour into
    /// a file ready to save.
    pub async fn request_report(
        &self,
        session_id: &SessionId,
        domain: Domain,
        variant: ReportVariant,
    ) -> ClientResult<ReportArtifact> {
        let url = match variant {
            ReportVariant::Comprehensive => self.endpoint(&[
                "api",
                domain.as_str(),
                "generate-report",
                session_id.as_str(),
            ])?,
            ReportVariant::Detailed => {
                self.endpoint(&["api", "generate-detailed-report", session_id.as_str()])?
            }
        };
        info!(session_id = %session_id, domain = %domain, ?variant, "requesting report");

        let raw = self
            .execute(
                self.http.post(url).timeout(self.upload_timeout),
                REPORT_FAILED,
            )
            .await?;
        let today = chrono::Utc::now().date_naive();

        if download::is_office_document(download::content_type(&raw.headers)) {
            let file_name = download::content_disposition_file_name(&raw.headers)
                .unwrap_or_else(|| download::report_file_name(domain, today, "docx"));
            return Ok(ReportArtifact {
                file_name,
                kind: ArtifactKind::Document,
                bytes: raw.body,
            });
        }

        let envelope: ReportEnvelope = serde_json::from_slice(&raw.body)
            .map_err(|_| ClientError::malformed(REPORT_FAILED))?;
        if envelope.success != Some(true) {
            let message = envelope
                .error
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| REPORT_FAILED.to_string());
            return Err(ClientError::server(Some(raw.status), message));
        }
        let content = envelope
            .text_content()
            .ok_or_else(|| ClientError::malformed(REPORT_FAILED))?;

        Ok(ReportArtifact {
            file_name: download::report_file_name(domain, today, "txt"),
            kind: ArtifactKind::Text,
            bytes: content.into_bytes(),
        })
    }
}

#[async_trait]
impl AnalysisBackend for LeakageClient {
    async fn submit_and_fetch(
        &self,
        candidate: &UploadCandidate,
        domain: Domain,
    ) -> ClientResult<SessionData> {
        let session_id = self.upload(candidate, domain).await?;
        let session = self.results(&session_id, domain).await?;
        info!(
            session_id = %session.session_id,
            anomalies = ?session.summary.anomaly_count,
            "results ready"
        );
        Ok(session)
    }

    async fn fetch_results(
        &self,
        session_id: &SessionId,
        domain: Domain,
    ) -> ClientResult<SessionData> {
        self.results(session_id, domain).await
    }

    async fn session_visualization(&self, session_id: &SessionId) -> ClientResult<Visualization> {
        self.visualization(&["api", "visualize", "session", session_id.as_str()])
            .await
    }

    async fn domain_visualization(&self, domain: Domain) -> ClientResult<Visualization> {
        self.visualization(&["api", "visualize", domain.as_str()])
            .await
    }

    async fn download_by_name(&self, filename: &str, dir: &Path) -> ClientResult<PathBuf> {
        let bytes = self.fetch_file(filename).await?;
        download::save_bytes(dir, filename, &bytes).await
    }

    async fn generate_report(
        &self,
        session_id: &SessionId,
        domain: Domain,
        variant: ReportVariant,
        dir: &Path,
    ) -> ClientResult<PathBuf> {
        let artifact = self.request_report(session_id, domain, variant).await?;
        download::save_artifact(dir, &artifact).await
    }

    async fn health(&self) -> ClientResult<String> {
        let url = self.endpoint(&["api", "health"])?;
        let raw = self
            .execute(
                self.http.get(url).timeout(self.request_timeout),
                error::GENERIC_SERVER_FAILURE,
            )
            .await?;
        let response: HealthResponse = Self::decode(&raw.body, "health response")?;
        Ok(response.message.unwrap_or(response.status))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
