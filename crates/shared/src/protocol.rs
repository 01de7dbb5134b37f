use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{Domain, SessionId};

/// Response of `POST /upload/{domain}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Aggregate counts the backend computed for a session. Only the common
/// counters are typed; everything else is kept as sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_records: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomaly_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomaly_rate: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Summary {
    /// Flagged records. The telecom model reports them as `leakage_count`.
    pub fn anomalies(&self) -> Option<u64> {
        self.anomaly_count
            .or_else(|| self.extra.get("leakage_count").and_then(Value::as_u64))
    }

    /// Percentage of flagged records as the backend reported it, under
    /// whichever key the domain's model uses.
    pub fn reported_rate(&self) -> Option<f64> {
        self.anomaly_rate.or_else(|| {
            ["anomaly_percentage", "leakage_percentage", "leakage_rate"]
                .into_iter()
                .find_map(|key| self.extra.get(key).and_then(Value::as_f64))
        })
    }
}

/// Response of `GET /api/results/{session_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    #[serde(default)]
    pub download_links: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualizations: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Full results payload for one uploaded dataset. Only ever built from a
/// complete upload + results exchange; there is no partially filled form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: SessionId,
    pub domain: Domain,
    pub summary: Summary,
    #[serde(default)]
    pub download_links: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualizations: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Pie,
    Bar,
    Doughnut,
    Line,
    HorizontalBar,
    PolarArea,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ChartKind,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of the `/api/visualize/...` endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisualizationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charts: Option<Vec<ChartSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Visualization {
    pub charts: Vec<ChartSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Value>,
}

/// JSON flavour of the report endpoints. The document flavour is a raw
/// office-document body and never reaches this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReportEnvelope {
    /// Text to save for this report: `report.content` when the backend sent
    /// one, otherwise the whole report object pretty-printed.
    pub fn text_content(&self) -> Option<String> {
        let report = self.report.as_ref()?;
        match report.get("content") {
            Some(Value::String(content)) => Some(content.clone()),
            _ => serde_json::to_string_pretty(report).ok(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
