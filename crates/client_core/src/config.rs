use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_CONFIG_FILE: &str = "leakage.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Uploads run batch inference server-side before answering, so this
    /// is minutes rather than seconds.
    pub upload_timeout_secs: u64,
    pub download_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".into(),
            request_timeout_secs: 60,
            upload_timeout_secs: 300,
            download_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    upload_timeout_secs: Option<u64>,
    download_dir: Option<PathBuf>,
}

/// Defaults, then the TOML file, then environment variables. An explicit
/// `config_path` must exist; the implicit `leakage.toml` is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            apply_file_settings(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
                if let Err(err) = apply_file_settings(&mut settings, &raw) {
                    tracing::warn!("ignoring malformed {DEFAULT_CONFIG_FILE}: {err:#}");
                }
            }
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings.api_base_url = normalize_base_url(&settings.api_base_url)?;
    Ok(settings)
}

fn apply_file_settings(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.upload_timeout_secs {
        settings.upload_timeout_secs = v;
    }
    if let Some(v) = file_cfg.download_dir {
        settings.download_dir = v;
    }
    Ok(())
}

/// `APP__*` names win over the short aliases when both are set.
pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("LEAKAGE_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) if parsed > 0 => settings.request_timeout_secs = parsed,
            _ => tracing::warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }
    if let Some(v) = lookup("APP__UPLOAD_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) if parsed > 0 => settings.upload_timeout_secs = parsed,
            _ => tracing::warn!(value = %v, "ignoring invalid APP__UPLOAD_TIMEOUT_SECS"),
        }
    }

    if let Some(v) = lookup("APP__DOWNLOAD_DIR") {
        settings.download_dir = PathBuf::from(v);
    }
}

/// Trims whitespace and trailing slashes and requires an http(s) origin.
pub fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|source| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::InvalidBaseUrl {
            url: raw.to_string(),
            source: url::ParseError::RelativeUrlWithoutBase,
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn file_values_override_defaults() {
        let mut settings = Settings::default();
        apply_file_settings(
            &mut settings,
            r#"
api_base_url = "http://analysis.internal:8080"
upload_timeout_secs = 900
"#,
        )
        .expect("parse");

        assert_eq!(settings.api_base_url, "http://analysis.internal:8080");
        assert_eq!(settings.upload_timeout_secs, 900);
        assert_eq!(settings.request_timeout_secs, 60);
    }

    #[test]
    fn env_prefixed_names_win_over_aliases() {
        let mut settings = Settings::default();
        apply_env_overrides(
            &mut settings,
            env(&[
                ("LEAKAGE_API_BASE_URL", "http://alias:5000"),
                ("APP__API_BASE_URL", "http://prefixed:5000"),
                ("APP__DOWNLOAD_DIR", "/tmp/reports"),
            ]),
        );
        assert_eq!(settings.api_base_url, "http://prefixed:5000");
        assert_eq!(settings.download_dir, PathBuf::from("/tmp/reports"));
    }

    #[test]
    fn invalid_timeouts_are_ignored() {
        let mut settings = Settings::default();
        apply_env_overrides(
            &mut settings,
            env(&[
                ("APP__REQUEST_TIMEOUT_SECS", "soon"),
                ("APP__UPLOAD_TIMEOUT_SECS", "0"),
            ]),
        );
        assert_eq!(settings.request_timeout_secs, 60);
        assert_eq!(settings.upload_timeout_secs, 300);
    }

    #[test]
    fn normalizes_trailing_slashes() {
        assert_eq!(
            normalize_base_url(" http://localhost:5000/ ").expect("valid"),
            "http://localhost:5000"
        );
        assert!(normalize_base_url("localhost:5000").is_err());
        assert!(normalize_base_url("ftp://localhost").is_err());
    }

    #[test]
    fn explicit_missing_config_file_is_an_error() {
        let missing = std::env::temp_dir().join("leakage_missing_config_for_test.toml");
        let err = load_settings(Some(&missing)).expect_err("missing file");
        assert!(err.to_string().contains("failed to read config file"));
    }
}
