//! Drivers for the console app: the interactive shell and the scripted runs
//! behind the `analyze` and `health` subcommands.

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    thread,
};

use anyhow::{bail, Context, Result};
use client_core::insights;
use crossbeam_channel::{bounded, select, Receiver};
use shared::domain::{Domain, ReportVariant};

use crate::controller::{
    events::UiEvent,
    reducer::{PageState, VisualizationMode},
};
use crate::ui::{
    app::ConsoleApp,
    input::{parse_line, UiAction},
    views::render,
};

const PROMPT: &str = "leakage> ";

enum ShellInput {
    Line(String),
    Event(UiEvent),
    StdinClosed,
    WorkerGone,
}

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub domain: Domain,
    pub file: PathBuf,
    pub report: Option<ReportVariant>,
    pub download_all: bool,
    pub charts: bool,
}

pub fn run_shell(app: &mut ConsoleApp, ui_rx: &Receiver<UiEvent>) -> Result<()> {
    let (line_tx, line_rx) = bounded::<String>(64);
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if line_tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::warn!("stdin read failed: {err}");
                        break;
                    }
                }
            }
        })
        .context("failed to spawn stdin reader")?;

    draw(app)?;
    loop {
        let input = select! {
            recv(line_rx) -> line => line.map_or(ShellInput::StdinClosed, ShellInput::Line),
            recv(ui_rx) -> event => event.map_or(ShellInput::WorkerGone, ShellInput::Event),
        };
        match input {
            ShellInput::Line(line) => match parse_line(&line) {
                Ok(Some(action)) => app.handle_action(action),
                Ok(None) => {}
                Err(usage) => {
                    print_prompted(&usage)?;
                    continue;
                }
            },
            ShellInput::Event(event) => app.handle_event(event),
            ShellInput::StdinClosed => {
                tracing::debug!("stdin closed");
                break;
            }
            ShellInput::WorkerGone => bail!("backend worker stopped unexpectedly"),
        }
        if app.should_quit() {
            break;
        }
        draw(app)?;
    }
    Ok(())
}

/// Upload, fetch results and the optional follow-ups in one pass, printing
/// each view as it is reached. Stops at the first failure.
pub fn run_analyze(
    app: &mut ConsoleApp,
    ui_rx: &Receiver<UiEvent>,
    options: AnalyzeOptions,
) -> Result<()> {
    step(app, ui_rx, UiAction::SelectDomain(options.domain.as_str().to_string()))?;
    step(app, ui_rx, UiAction::ChooseFile(options.file))?;
    step(app, ui_rx, UiAction::Upload)?;
    if app.page() != PageState::Results {
        bail!("analysis did not produce results: {}", app.status());
    }
    print!("{}", render(app));

    if options.charts {
        step(app, ui_rx, UiAction::Visualization(VisualizationMode::Dashboard))?;
        print!("{}", render(app));
    }

    if options.download_all {
        let files: Vec<String> = app
            .session()
            .map(|session| {
                insights::download_entries(session)
                    .into_iter()
                    .map(|(_, file)| file.to_string())
                    .collect()
            })
            .unwrap_or_default();
        for file in files {
            step(app, ui_rx, UiAction::Download(file))?;
        }
    }

    if let Some(variant) = options.report {
        step(app, ui_rx, UiAction::Report(variant))?;
    }

    for path in app.saved_files() {
        println!("saved {}", path.display());
    }
    io::stdout().flush()?;
    Ok(())
}

pub fn run_health(app: &mut ConsoleApp, ui_rx: &Receiver<UiEvent>) -> Result<()> {
    step(app, ui_rx, UiAction::Health)?;
    println!("{}", app.status());
    Ok(())
}

/// Applies one action and waits until every command it queued is answered.
fn step(app: &mut ConsoleApp, ui_rx: &Receiver<UiEvent>, action: UiAction) -> Result<()> {
    app.handle_action(action);
    while app.is_busy() && app.error().is_none() {
        let event = ui_rx
            .recv()
            .context("backend worker stopped before answering")?;
        app.handle_event(event);
    }
    if let Some(error) = app.error() {
        bail!("{} failed: {}", error.context().label(), error.message());
    }
    Ok(())
}

fn draw(app: &ConsoleApp) -> Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{}{PROMPT}", render(app))?;
    stdout.flush()?;
    Ok(())
}

fn print_prompted(message: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{message}\n{PROMPT}")?;
    stdout.flush()?;
    Ok(())
}
