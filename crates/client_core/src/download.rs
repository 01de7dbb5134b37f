//! Saving downloaded files and generated reports to local disk.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_TYPE};
use shared::domain::Domain;

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Office document bytes exactly as the backend produced them.
    Document,
    /// Plain-text report content.
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub file_name: String,
    pub kind: ArtifactKind,
    pub bytes: Vec<u8>,
}

/// A download name must be a single path component.
pub fn check_file_name(name: &str) -> ClientResult<()> {
    let bad = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(ClientError::InvalidFileName(name.to_string()));
    }
    Ok(())
}

pub fn report_file_name(domain: Domain, date: NaiveDate, extension: &str) -> String {
    format!(
        "{domain}_comprehensive_report_{}.{extension}",
        date.format("%Y-%m-%d")
    )
}

pub fn is_office_document(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    lower.contains("officedocument") || lower.contains("msword")
}

pub(crate) fn content_type(headers: &HeaderMap) -> &str {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// The plain `filename=` parameter of a `Content-Disposition` header, if it
/// names a usable single-component file.
pub fn content_disposition_file_name(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;
    value
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("filename="))
        .map(|name| name.trim().trim_matches('"').to_string())
        .filter(|name| check_file_name(name).is_ok())
}

pub async fn save_bytes(dir: &Path, file_name: &str, bytes: &[u8]) -> ClientResult<PathBuf> {
    check_file_name(file_name)?;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ClientError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|source| ClientError::Io {
            path: path.clone(),
            source,
        })?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "saved file");
    Ok(path)
}

pub async fn save_artifact(dir: &Path, artifact: &ReportArtifact) -> ClientResult<PathBuf> {
    save_bytes(dir, &artifact.file_name, &artifact.bytes).await
}
