//! Parses shell lines into [`UiAction`]s.

use std::path::PathBuf;

use shared::domain::ReportVariant;

use crate::controller::reducer::VisualizationMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    Home,
    SelectDomain(String),
    ChooseFile(PathBuf),
    ClearFile,
    Upload,
    Retry,
    Results,
    Visualization(VisualizationMode),
    Download(String),
    Report(ReportVariant),
    Health,
    DismissError,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  home                      back to the domain picker (clears the session)
  select <domain>           open the supermarket or telecom upload view
  file <path>               choose a CSV/Excel file to upload
  clear                     forget the chosen file
  upload                    upload the chosen file and fetch its results
  retry                     re-run the last failed request
  results                   show the current session results
  viz index|dashboard       open the visualization views
  download <name>           save one of the session's result files
  report [detailed]         generate and save a report
  health                    check the backend
  dismiss                   hide the current error
  help                      show this list
  quit                      exit";

/// Blank lines parse to `None`. Unknown commands and missing arguments come
/// back as a usage message.
pub fn parse_line(line: &str) -> Result<Option<UiAction>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let action = match command.to_ascii_lowercase().as_str() {
        "home" => UiAction::Home,
        "select" => UiAction::SelectDomain(required(rest, "select <domain>")?.to_string()),
        "file" => UiAction::ChooseFile(PathBuf::from(required(rest, "file <path>")?)),
        "clear" => UiAction::ClearFile,
        "upload" => UiAction::Upload,
        "retry" => UiAction::Retry,
        "results" => UiAction::Results,
        "viz" => match rest.to_ascii_lowercase().as_str() {
            "" | "index" => UiAction::Visualization(VisualizationMode::Index),
            "dashboard" => UiAction::Visualization(VisualizationMode::Dashboard),
            other => return Err(format!("unknown visualization view '{other}'; use: viz index|dashboard")),
        },
        "download" => UiAction::Download(required(rest, "download <name>")?.to_string()),
        "report" => {
            if rest.is_empty() {
                UiAction::Report(ReportVariant::default())
            } else {
                UiAction::Report(rest.parse::<ReportVariant>().map_err(|err| err.to_string())?)
            }
        }
        "health" => UiAction::Health,
        "dismiss" => UiAction::DismissError,
        "help" | "?" => UiAction::Help,
        "quit" | "exit" | "q" => UiAction::Quit,
        other => return Err(format!("unknown command '{other}'; type 'help' for a list")),
    };
    Ok(Some(action))
}

fn required<'a>(value: &'a str, usage: &str) -> Result<&'a str, String> {
    if value.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
#[path = "tests/input_tests.rs"]
mod tests;
