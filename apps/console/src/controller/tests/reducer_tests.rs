use serde_json::json;
use shared::domain::SessionId;

use super::*;

const PAGES: [PageState; 6] = [
    PageState::Home,
    PageState::Supermarket,
    PageState::Telecom,
    PageState::Results,
    PageState::VisualizationIndex,
    PageState::VisualizationDashboard,
];

fn session(id: &str, anomalies: u64) -> SessionData {
    serde_json::from_value(json!({
        "session_id": id,
        "domain": "supermarket",
        "summary": {"total_records": 100, "anomaly_count": anomalies, "by_category": {"Dairy": 4}},
        "download_links": {"anomalies": "supermarket_anomalies.csv"},
        "message": "Successfully processed 100 records"
    }))
    .expect("session fixture")
}

/// Drives a navigator into `page` through public transitions only.
fn navigator_on(page: PageState) -> Navigator {
    let mut nav = Navigator::new();
    match page {
        PageState::Home => {}
        PageState::Supermarket | PageState::Telecom => {
            nav.select_domain(page.domain().expect("domain page"));
        }
        PageState::Results => {
            nav.show_results(session("s-1", 3));
        }
        PageState::VisualizationIndex => {
            nav.show_results(session("s-1", 3));
            nav.show_visualization(VisualizationMode::Index, None);
        }
        PageState::VisualizationDashboard => {
            nav.show_visualization(VisualizationMode::Dashboard, Some(session("s-1", 3)));
        }
    }
    assert_eq!(nav.page(), page);
    nav
}

#[test]
fn starts_home_without_session() {
    let nav = Navigator::new();
    assert_eq!(nav.page(), PageState::Home);
    assert!(nav.session().is_none());
}

#[test]
fn page_ids_are_distinct() {
    let ids: std::collections::BTreeSet<_> = PAGES.iter().map(|p| p.id()).collect();
    assert_eq!(ids.len(), PAGES.len());
    assert!(ids.contains("visualization-dashboard"));
}

#[test]
fn go_home_clears_everything_from_any_page() {
    for page in PAGES {
        let mut nav = navigator_on(page);
        assert!(nav.go_home().is_applied());
        assert_eq!(nav.page(), PageState::Home);
        assert!(nav.session().is_none());

        assert!(nav.go_home().is_applied());
        assert_eq!(nav.page(), PageState::Home);
        assert!(nav.session().is_none());
    }
}

#[test]
fn show_results_stores_payload_unchanged() {
    for page in PAGES {
        let mut nav = navigator_on(page);
        let data = session("abc123", 12);
        assert!(nav.show_results(data.clone()).is_applied());
        assert_eq!(nav.page(), PageState::Results);
        assert_eq!(nav.session(), Some(&data));
        assert_eq!(
            nav.session().and_then(|s| s.summary.extra.get("by_category")),
            Some(&json!({"Dairy": 4}))
        );
    }
}

#[test]
fn selecting_supermarket_keeps_session_empty() {
    let mut nav = Navigator::new();
    let outcome = nav.apply(NavigationEvent::SelectDomain("supermarket".into()));
    assert_eq!(outcome, Transition::Applied);
    assert_eq!(nav.page(), PageState::Supermarket);
    assert!(nav.session().is_none());
}

#[test]
fn selecting_a_domain_does_not_touch_stored_session() {
    let mut nav = navigator_on(PageState::Results);
    nav.select_domain(Domain::Telecom);
    assert_eq!(nav.page(), PageState::Telecom);
    assert_eq!(
        nav.session().map(|s| s.session_id.clone()),
        Some(SessionId::from("s-1"))
    );
}

#[test]
fn unknown_domain_ids_fail_closed() {
    let mut nav = navigator_on(PageState::Telecom);
    let outcome = nav.apply(NavigationEvent::SelectDomain("banking".into()));
    assert_eq!(
        outcome,
        Transition::Ignored(IgnoredReason::UnknownDomain("banking".into()))
    );
    assert_eq!(nav.page(), PageState::Telecom);
}

#[test]
fn show_results_without_payload_is_ignored() {
    let mut nav = navigator_on(PageState::Supermarket);
    let outcome = nav.apply(NavigationEvent::ShowResults(None));
    assert_eq!(outcome, Transition::Ignored(IgnoredReason::MissingSession));
    assert_eq!(nav.page(), PageState::Supermarket);
    assert!(nav.session().is_none());
}

#[test]
fn dashboard_without_data_reuses_stored_session() {
    let mut nav = Navigator::new();
    let data = session("abc123", 12);
    nav.show_results(data.clone());

    let outcome = nav.apply(NavigationEvent::ShowVisualization {
        mode: VisualizationMode::Dashboard,
        data: None,
    });
    assert!(outcome.is_applied());
    assert_eq!(nav.page(), PageState::VisualizationDashboard);
    assert_eq!(nav.session(), Some(&data));
}

#[test]
fn dashboard_with_data_replaces_stored_session() {
    let mut nav = navigator_on(PageState::Results);
    let fresh = session("fresh", 1);
    nav.show_visualization(VisualizationMode::Dashboard, Some(fresh.clone()));
    assert_eq!(nav.session(), Some(&fresh));
}

#[test]
fn dashboard_needs_some_session() {
    let mut nav = navigator_on(PageState::Telecom);
    let outcome = nav.show_visualization(VisualizationMode::Dashboard, None);
    assert_eq!(outcome, Transition::Ignored(IgnoredReason::MissingSession));
    assert_eq!(nav.page(), PageState::Telecom);
}

#[test]
fn index_leaves_stored_session_alone() {
    let mut nav = navigator_on(PageState::Results);
    let before = nav.session().cloned();
    nav.show_visualization(VisualizationMode::Index, None);
    assert_eq!(nav.page(), PageState::VisualizationIndex);
    assert_eq!(nav.session().cloned(), before);

    let mut empty = Navigator::new();
    assert!(empty
        .show_visualization(VisualizationMode::Index, None)
        .is_applied());
    assert!(empty.session().is_none());
}

#[test]
fn results_and_dashboard_always_hold_a_session() {
    for page in PAGES {
        let nav = navigator_on(page);
        if matches!(
            nav.page(),
            PageState::Results | PageState::VisualizationDashboard
        ) {
            assert!(nav.session().is_some(), "{}", page.id());
        }
    }
}
