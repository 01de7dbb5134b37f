use super::*;

#[test]
fn blank_lines_are_not_actions() {
    assert_eq!(parse_line(""), Ok(None));
    assert_eq!(parse_line("   \t"), Ok(None));
}

#[test]
fn commands_take_their_argument_verbatim() {
    assert_eq!(
        parse_line("select Telecom"),
        Ok(Some(UiAction::SelectDomain("Telecom".into())))
    );
    assert_eq!(
        parse_line("file  data/Q3 sales.csv "),
        Ok(Some(UiAction::ChooseFile(PathBuf::from("data/Q3 sales.csv"))))
    );
    assert_eq!(
        parse_line("download supermarket_anomalies.csv"),
        Ok(Some(UiAction::Download("supermarket_anomalies.csv".into())))
    );
}

#[test]
fn visualization_defaults_to_the_index() {
    assert_eq!(
        parse_line("viz"),
        Ok(Some(UiAction::Visualization(VisualizationMode::Index)))
    );
    assert_eq!(
        parse_line("VIZ Dashboard"),
        Ok(Some(UiAction::Visualization(VisualizationMode::Dashboard)))
    );
    assert!(parse_line("viz pie").is_err());
}

#[test]
fn report_variant_is_optional() {
    assert_eq!(
        parse_line("report"),
        Ok(Some(UiAction::Report(ReportVariant::Comprehensive)))
    );
    assert_eq!(
        parse_line("report detailed"),
        Ok(Some(UiAction::Report(ReportVariant::Detailed)))
    );
    let err = parse_line("report quarterly").expect_err("unknown variant");
    assert!(err.contains("quarterly"), "{err}");
}

#[test]
fn missing_arguments_and_unknown_commands_explain_usage() {
    assert_eq!(parse_line("select"), Err("usage: select <domain>".to_string()));
    assert_eq!(parse_line("file"), Err("usage: file <path>".to_string()));
    let err = parse_line("chat hello").expect_err("unknown command");
    assert!(err.contains("help"), "{err}");
}

#[test]
fn quit_has_aliases() {
    for line in ["quit", "exit", "q"] {
        assert_eq!(parse_line(line), Ok(Some(UiAction::Quit)));
    }
}
