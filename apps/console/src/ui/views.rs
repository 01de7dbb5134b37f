//! Plain-text rendering of the active view.

use std::fmt::Write as _;

use client_core::insights;
use serde_json::Value;
use shared::{
    domain::Domain,
    protocol::{SessionData, Visualization},
};

use crate::controller::{events::UiErrorCategory, reducer::PageState};
use crate::ui::app::ConsoleApp;

const RULE: &str = "------------------------------------------------------------";
const BAR_WIDTH: f64 = 30.0;

pub fn render(app: &ConsoleApp) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    match app.page() {
        PageState::Home => render_home(&mut out),
        PageState::Supermarket | PageState::Telecom => render_domain(&mut out, app),
        PageState::Results => render_results(&mut out, app.session()),
        PageState::VisualizationIndex | PageState::VisualizationDashboard => {
            render_visualization(&mut out, app)
        }
    }
    render_footer(&mut out, app);
    out
}

fn render_home(out: &mut String) {
    let _ = writeln!(out, "Revenue Leakage Detection");
    let _ = writeln!(out);
    for domain in Domain::ALL {
        let _ = writeln!(out, "  [{}] {}", domain.as_str(), domain.display_name());
        for feature in domain.features() {
            let _ = writeln!(out, "      - {feature}");
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Type 'select <domain>' to start an analysis.");
}

fn render_domain(out: &mut String, app: &ConsoleApp) {
    let Some(domain) = app.page().domain() else {
        return;
    };
    let _ = writeln!(out, "{} revenue leakage analysis", domain.display_name());
    let _ = writeln!(out, "Accepted files: CSV, XLSX, XLS up to 16MB");
    match app.selection().selected() {
        Some(file) => {
            let _ = writeln!(out, "Selected: {} ({:.2} MB)", file.name, file.size_mib());
        }
        None => {
            let _ = writeln!(out, "No file selected. Use 'file <path>'.");
        }
    }
    if app.uploading() == Some(domain) {
        let _ = writeln!(out, "Uploading and analyzing...");
    }
}

fn render_results(out: &mut String, session: Option<&SessionData>) {
    let Some(session) = session else {
        return;
    };
    let summary = &session.summary;
    let _ = writeln!(
        out,
        "{} results (session {})",
        session.domain.display_name(),
        session.session_id
    );
    if let Some(total) = summary.total_records {
        let _ = writeln!(out, "  Total records:   {total}");
    }
    if let Some(count) = summary.anomalies() {
        let _ = writeln!(out, "  Anomalies found: {count}");
    }
    if let (Some(rate), Some(risk)) = (
        insights::anomaly_rate(summary),
        insights::risk_level(summary),
    ) {
        let _ = writeln!(out, "  Leakage rate:    {rate:.1}% ({risk} risk)");
    }
    for (key, value) in &summary.extra {
        let _ = writeln!(out, "  {key}: {}", compact(value));
    }

    let downloads = insights::download_entries(session);
    if !downloads.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Downloads:");
        for (kind, file) in downloads {
            let _ = writeln!(out, "  {kind:<20} download {file}");
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Next: 'viz dashboard', 'report', 'report detailed' or 'home'."
    );
}

fn render_visualization(out: &mut String, app: &ConsoleApp) {
    match (app.page(), app.session()) {
        (PageState::VisualizationDashboard, Some(session)) => {
            let _ = writeln!(out, "Dashboard for session {}", session.session_id);
        }
        _ => {
            let _ = writeln!(out, "Visualization index");
        }
    }
    match app.visualization() {
        Some(visualization) => render_charts(out, visualization),
        None if app.visualization_pending() => {
            let _ = writeln!(out, "Loading charts...");
        }
        None => {
            let _ = writeln!(out, "No chart data loaded.");
        }
    }
}

fn render_charts(out: &mut String, visualization: &Visualization) {
    if let Some(stats) = &visualization.stats {
        let _ = writeln!(out, "Stats: {}", compact(stats));
    }
    for chart in insights::renderable_charts(visualization) {
        let series = insights::chart_series(chart);
        let max = series.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
        let _ = writeln!(out);
        let _ = writeln!(out, "{} [{:?}]", chart.title, chart.kind);
        for (label, value) in series {
            let _ = writeln!(out, "  {label:<24} {:<30} {value}", bar(value, max));
        }
    }
    for chart in &visualization.charts {
        if let Some(error) = &chart.error {
            let _ = writeln!(out);
            let _ = writeln!(out, "{} (unavailable: {error})", chart.title);
        }
    }
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let width = (value / max * BAR_WIDTH).round() as usize;
    "#".repeat(width.max(1))
}

fn compact(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn render_footer(out: &mut String, app: &ConsoleApp) {
    if let Some(error) = app.error() {
        let _ = writeln!(out);
        let prefix = match error.category() {
            UiErrorCategory::Validation => "!",
            _ => "error",
        };
        let _ = write!(out, "[{prefix}] {} failed: {}", error.context().label(), error.message());
        if app.can_retry() {
            let _ = write!(out, " (type 'retry' to try again)");
        }
        let _ = writeln!(out);
    }
    if !app.status().is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", app.status());
    }
}
