use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings, normalize_base_url},
    LeakageClient,
};
use crossbeam_channel::bounded;
use shared::domain::{Domain, ReportVariant};
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::{commands::BackendCommand, runtime};
use controller::events::UiEvent;
use ui::{
    shell::{self, AnalyzeOptions},
    ConsoleApp,
};

#[derive(Parser, Debug)]
#[command(name = "leakage-console", version, about = "Revenue leakage detection console")]
struct Cli {
    /// TOML settings file (defaults to ./leakage.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Backend origin, e.g. http://localhost:5000.
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Where downloads and reports are written.
    #[arg(long, global = true)]
    download_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive shell (default).
    Shell,
    /// Upload one dataset and print its results.
    Analyze {
        #[arg(long)]
        domain: Domain,
        #[arg(long)]
        file: PathBuf,
        /// Also generate a report: comprehensive or detailed.
        #[arg(long)]
        report: Option<ReportVariant>,
        /// Save every result file the backend offers.
        #[arg(long)]
        download_all: bool,
        /// Print the session's charts.
        #[arg(long)]
        charts: bool,
    },
    /// Check that the backend is reachable.
    Health,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(url) = cli.server_url.as_deref() {
        settings.api_base_url = normalize_base_url(url).context("invalid --server-url")?;
    }
    if let Some(dir) = cli.download_dir {
        settings.download_dir = dir;
    }
    tracing::info!(
        api = %settings.api_base_url,
        download_dir = %settings.download_dir.display(),
        "starting leakage console"
    );

    let backend = LeakageClient::from_settings(&settings).context("failed to build HTTP client")?;
    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    let worker = runtime::launch(cmd_rx, ui_tx, Arc::new(backend), settings.download_dir.clone())
        .context("failed to spawn backend worker")?;

    let mut app = ConsoleApp::new(cmd_tx);
    let outcome = match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => shell::run_shell(&mut app, &ui_rx),
        Command::Analyze {
            domain,
            file,
            report,
            download_all,
            charts,
        } => shell::run_analyze(
            &mut app,
            &ui_rx,
            AnalyzeOptions {
                domain,
                file,
                report,
                download_all,
                charts,
            },
        ),
        Command::Health => shell::run_health(&mut app, &ui_rx),
    };

    let busy = app.is_busy();
    drop(app);
    drop(ui_rx);
    if busy {
        tracing::debug!("exiting with a backend request still in flight");
    } else if worker.join().is_err() {
        tracing::error!("backend worker panicked");
    }
    outcome
}
