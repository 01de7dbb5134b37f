//! Navigation state machine: which view is visible and which session it shows.
//!
//! Views never touch this state directly. They emit [`NavigationEvent`]s and
//! the app applies them here; the view then re-renders from the new state.

use shared::{domain::Domain, protocol::SessionData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageState {
    #[default]
    Home,
    Supermarket,
    Telecom,
    Results,
    VisualizationIndex,
    VisualizationDashboard,
}

impl PageState {
    pub fn id(self) -> &'static str {
        match self {
            PageState::Home => "home",
            PageState::Supermarket => "supermarket",
            PageState::Telecom => "telecom",
            PageState::Results => "results",
            PageState::VisualizationIndex => "visualization-index",
            PageState::VisualizationDashboard => "visualization-dashboard",
        }
    }

    /// The upload domain of a domain view.
    pub fn domain(self) -> Option<Domain> {
        match self {
            PageState::Supermarket => Some(Domain::Supermarket),
            PageState::Telecom => Some(Domain::Telecom),
            _ => None,
        }
    }
}

impl From<Domain> for PageState {
    fn from(domain: Domain) -> Self {
        match domain {
            Domain::Supermarket => PageState::Supermarket,
            Domain::Telecom => PageState::Telecom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizationMode {
    Index,
    Dashboard,
}

/// Transition requests a view may emit.
#[derive(Debug, Clone)]
pub enum NavigationEvent {
    SelectDomain(String),
    GoHome,
    ShowResults(Option<SessionData>),
    ShowVisualization {
        mode: VisualizationMode,
        data: Option<SessionData>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoredReason {
    UnknownDomain(String),
    MissingSession,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored(IgnoredReason),
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Navigator {
    page: PageState,
    session: Option<SessionData>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> PageState {
        self.page
    }

    pub fn session(&self) -> Option<&SessionData> {
        self.session.as_ref()
    }

    pub fn apply(&mut self, event: NavigationEvent) -> Transition {
        let from = self.page;
        let outcome = match event {
            NavigationEvent::SelectDomain(id) => self.select_domain_id(&id),
            NavigationEvent::GoHome => self.go_home(),
            NavigationEvent::ShowResults(Some(session)) => self.show_results(session),
            NavigationEvent::ShowResults(None) => Transition::Ignored(IgnoredReason::MissingSession),
            NavigationEvent::ShowVisualization { mode, data } => {
                self.show_visualization(mode, data)
            }
        };
        match &outcome {
            Transition::Applied => {
                tracing::debug!(from = from.id(), to = self.page.id(), "navigation applied")
            }
            Transition::Ignored(reason) => {
                tracing::warn!(page = from.id(), ?reason, "navigation request ignored")
            }
        }
        outcome
    }

    /// Leaves the stored session as it is.
    pub fn select_domain(&mut self, domain: Domain) -> Transition {
        self.page = PageState::from(domain);
        Transition::Applied
    }

    /// Unrecognized identifiers leave the state unchanged.
    pub fn select_domain_id(&mut self, id: &str) -> Transition {
        match id.parse::<Domain>() {
            Ok(domain) => self.select_domain(domain),
            Err(_) => Transition::Ignored(IgnoredReason::UnknownDomain(id.to_string())),
        }
    }

    pub fn go_home(&mut self) -> Transition {
        self.page = PageState::Home;
        self.session = None;
        Transition::Applied
    }

    pub fn show_results(&mut self, session: SessionData) -> Transition {
        self.session = Some(session);
        self.page = PageState::Results;
        Transition::Applied
    }

    /// `Dashboard` with `None` reuses the stored session; with nothing stored
    /// the request is ignored.
    pub fn show_visualization(
        &mut self,
        mode: VisualizationMode,
        data: Option<SessionData>,
    ) -> Transition {
        match mode {
            VisualizationMode::Index => {
                self.page = PageState::VisualizationIndex;
                Transition::Applied
            }
            VisualizationMode::Dashboard => {
                if let Some(session) = data {
                    self.session = Some(session);
                }
                if self.session.is_none() {
                    return Transition::Ignored(IgnoredReason::MissingSession);
                }
                self.page = PageState::VisualizationDashboard;
                Transition::Applied
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
