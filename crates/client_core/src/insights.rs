//! Shaping backend results into what the views print.

use std::fmt;

use serde_json::Value;
use shared::protocol::{ChartSpec, SessionData, Summary, Visualization};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Thresholds are strict: exactly 25% is still High.
    pub fn from_leakage_rate(percent: f64) -> Self {
        if percent > 25.0 {
            RiskLevel::Critical
        } else if percent > 15.0 {
            RiskLevel::High
        } else if percent > 5.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Percentage of anomalous records, taken from the backend when it sent one.
pub fn anomaly_rate(summary: &Summary) -> Option<f64> {
    if let Some(rate) = summary.reported_rate() {
        return Some(rate);
    }
    match (summary.anomalies(), summary.total_records) {
        (Some(count), Some(total)) if total > 0 => Some(count as f64 / total as f64 * 100.0),
        _ => None,
    }
}

pub fn risk_level(summary: &Summary) -> Option<RiskLevel> {
    anomaly_rate(summary).map(RiskLevel::from_leakage_rate)
}

pub fn renderable_charts(visualization: &Visualization) -> impl Iterator<Item = &ChartSpec> {
    visualization
        .charts
        .iter()
        .filter(|chart| chart.error.is_none())
}

/// `(label, value)` pairs of a chart's data. Objects map label → number;
/// arrays are labelled by 1-based position. Non-numeric entries are skipped.
pub fn chart_series(chart: &ChartSpec) -> Vec<(String, f64)> {
    match &chart.data {
        Value::Object(map) => map
            .iter()
            .filter_map(|(label, value)| value.as_f64().map(|v| (label.clone(), v)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(idx, value)| value.as_f64().map(|v| ((idx + 1).to_string(), v)))
            .collect(),
        _ => Vec::new(),
    }
}

pub fn download_entries(session: &SessionData) -> Vec<(&str, &str)> {
    session
        .download_links
        .iter()
        .map(|(kind, file)| (kind.as_str(), file.as_str()))
        .collect()
}
