//! Local checks a dataset must pass before it is allowed near the network.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];
pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a CSV or Excel file")]
    UnsupportedType,
    #[error("File size must be less than 16MB")]
    TooLarge,
    #[error("Please select a file first")]
    NoFileSelected,
}

/// A locally selected dataset and the metadata validation looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

impl UploadCandidate {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            size,
        }
    }

    /// Builds a candidate from a file on disk. Fails only when the file
    /// cannot be inspected; type and size are checked by [`validate`].
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("'{}' is not a regular file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(path, name, metadata.len()))
    }

    /// Lowercased text after the last `.` of the file name.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    pub fn size_mib(&self) -> f64 {
        self.size as f64 / 1024.0 / 1024.0
    }
}

/// Extension is checked before size, so a wrong-type oversized file reports
/// the type problem.
pub fn validate(candidate: &UploadCandidate) -> Result<(), ValidationError> {
    let allowed = candidate
        .extension()
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));
    if !allowed {
        return Err(ValidationError::UnsupportedType);
    }
    if candidate.size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge);
    }
    Ok(())
}

/// The file picker state of a domain view.
#[derive(Debug, Clone, Default)]
pub struct FileSelection {
    selected: Option<UploadCandidate>,
    error: Option<ValidationError>,
}

impl FileSelection {
    /// A rejected candidate leaves the previous selection in place.
    pub fn select(&mut self, candidate: UploadCandidate) -> Result<&UploadCandidate, ValidationError> {
        if let Err(err) = validate(&candidate) {
            tracing::debug!(file = %candidate.name, size = candidate.size, "rejected upload candidate: {err}");
            self.error = Some(err.clone());
            return Err(err);
        }
        self.error = None;
        let selected: &UploadCandidate = self.selected.insert(candidate);
        Ok(selected)
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.error = None;
    }

    pub fn selected(&self) -> Option<&UploadCandidate> {
        self.selected.as_ref()
    }

    /// The candidate to upload, or the message shown when nothing is picked.
    pub fn require(&self) -> Result<&UploadCandidate, ValidationError> {
        self.selected.as_ref().ok_or(ValidationError::NoFileSelected)
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
