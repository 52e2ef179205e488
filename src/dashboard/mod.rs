//! Role-scoped dashboards.
//!
//! Each role sees a fixed set of tabs; the panels behind them are the
//! views from `training`, `survey`, `mapping` and `profile`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::access::Role;
use crate::api::{AssignedSurvey, UserRef, UserSummary};
use crate::error::PortalError;
use crate::profile::ProfileView;
use crate::survey::AssignedSurveys;
use crate::view::LoadState;
use crate::Portal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    Surveys,
    MyResponses,
    Submit,
    MyRequests,
    Review,
    Team,
    Training,
    Mapping,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Surveys => "surveys",
            Tab::MyResponses => "my-responses",
            Tab::Submit => "submit",
            Tab::MyRequests => "my-requests",
            Tab::Review => "review",
            Tab::Team => "team",
            Tab::Training => "training",
            Tab::Mapping => "mapping",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Surveys => "Surveys",
            Tab::MyResponses => "My Responses",
            Tab::Submit => "Submit Request",
            Tab::MyRequests => "My Requests",
            Tab::Review => "Review Requests",
            Tab::Team => "My Team",
            Tab::Training => "Training Requests",
            Tab::Mapping => "Employee Mapping",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "surveys" => Ok(Tab::Surveys),
            "my-responses" => Ok(Tab::MyResponses),
            "submit" => Ok(Tab::Submit),
            "my-requests" => Ok(Tab::MyRequests),
            "review" => Ok(Tab::Review),
            "team" => Ok(Tab::Team),
            "training" => Ok(Tab::Training),
            "mapping" => Ok(Tab::Mapping),
            _ => Err(format!("Unknown tab: {}", s)),
        }
    }
}

/// Tabs shown to `role`, in display order
pub fn tabs_for(role: Role) -> &'static [Tab] {
    match role {
        Role::Employee => &[Tab::Surveys, Tab::MyResponses, Tab::Submit, Tab::MyRequests],
        Role::Manager => &[Tab::Review, Tab::MyRequests, Tab::Submit, Tab::Team],
        Role::Hod => &[Tab::Review, Tab::Submit, Tab::MyRequests, Tab::Mapping],
        Role::Hr => &[Tab::Review, Tab::Submit, Tab::MyRequests],
        Role::Admin => &[Tab::Surveys, Tab::Training, Tab::Mapping],
    }
}

pub fn default_tab(role: Role) -> Tab {
    match role {
        Role::Employee => Tab::Surveys,
        Role::Manager | Role::Hod | Role::Hr => Tab::Review,
        Role::Admin => Tab::Training,
    }
}

/// Tab selection of one role's dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    role: Role,
    active: Tab,
}

impl Dashboard {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            active: default_tab(role),
        }
    }

    /// Dashboard of the signed-in user, opened on `tab` when the role has it
    pub fn open(portal: &Portal, tab: Option<Tab>) -> Result<Self, PortalError> {
        let role = portal
            .require_session()?
            .role
            .ok_or_else(|| PortalError::NotPermitted("no dashboard for this role".to_string()))?;
        let mut dashboard = Self::new(role);
        if let Some(tab) = tab.filter(|t| tabs_for(role).contains(t)) {
            dashboard.active = tab;
        }
        debug!(%role, tab = %dashboard.active, "Opened dashboard");
        Ok(dashboard)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn tabs(&self) -> &'static [Tab] {
        tabs_for(self.role)
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn select(&mut self, tab: Tab) -> Result<(), PortalError> {
        if !self.tabs().contains(&tab) {
            return Err(PortalError::NotPermitted(format!(
                "{} tab is not available to {}",
                tab.label(),
                self.role.label()
            )));
        }
        self.active = tab;
        Ok(())
    }
}

/// Manager "team" tab: employees currently mapped to the signed-in manager
#[derive(Debug, Clone, Default)]
pub struct TeamPanel {
    state: LoadState<Vec<UserSummary>>,
}

impl TeamPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, portal: &Portal) {
        self.state = match portal.api().me().await {
            Ok(me) => {
                info!(count = me.mapped_employees.len(), "Loaded team");
                LoadState::Loaded(me.mapped_employees)
            }
            Err(e) => LoadState::Failed(e.message_or("Failed to load team")),
        };
    }

    pub fn state(&self) -> &LoadState<Vec<UserSummary>> {
        &self.state
    }

    pub fn members(&self) -> &[UserSummary] {
        self.state.data().map(Vec::as_slice).unwrap_or_default()
    }
}

/// Employee landing panel: profile with the assigned manager, plus the
/// assigned surveys
#[derive(Debug, Clone, Default)]
pub struct EmployeeHome {
    pub profile: ProfileView,
    pub surveys: AssignedSurveys,
}

impl EmployeeHome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load both panels concurrently; a profile failure is returned after
    /// the survey list has settled
    pub async fn load(&mut self, portal: &Portal) -> Result<(), PortalError> {
        let (profile, ()) = futures::join!(self.profile.load(portal), self.surveys.load(portal));
        profile
    }

    pub fn manager(&self) -> Option<&UserRef> {
        self.profile.user().and_then(|u| u.manager.as_ref())
    }

    /// Name of the assigned manager, when the server populated it
    pub fn manager_name(&self) -> Option<&str> {
        self.manager()
            .and_then(UserRef::summary)
            .map(|m| m.name.as_str())
    }

    pub fn assigned(&self) -> &[AssignedSurvey] {
        self.surveys.surveys()
    }

    pub fn pending_surveys(&self) -> usize {
        self.surveys.pending_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubBackend;
    use serde_json::json;

    #[test]
    fn test_tab_tables() {
        assert_eq!(
            tabs_for(Role::Employee),
            &[Tab::Surveys, Tab::MyResponses, Tab::Submit, Tab::MyRequests]
        );
        assert_eq!(tabs_for(Role::Hr).len(), 3);
        for role in Role::ALL {
            assert!(tabs_for(role).contains(&default_tab(role)));
        }
        assert_eq!(default_tab(Role::Admin), Tab::Training);
        assert_eq!(default_tab(Role::Hod), Tab::Review);
    }

    #[test]
    fn test_select_refuses_foreign_tab() {
        let mut dashboard = Dashboard::new(Role::Hr);
        assert_eq!(dashboard.active(), Tab::Review);
        assert!(matches!(
            dashboard.select(Tab::Mapping),
            Err(PortalError::NotPermitted(_))
        ));
        assert_eq!(dashboard.active(), Tab::Review);
        tokio_test::assert_ok!(dashboard.select(Tab::MyRequests));
        assert_eq!(dashboard.active(), Tab::MyRequests);
    }

    #[test]
    fn test_tab_parse() {
        assert_eq!("my_requests".parse::<Tab>(), Ok(Tab::MyRequests));
        assert_eq!(" Team ".parse::<Tab>(), Ok(Tab::Team));
        assert!("settings".parse::<Tab>().is_err());
    }

    #[tokio::test]
    async fn test_open_honours_requested_tab_when_allowed() {
        let backend = StubBackend::start().await;
        let portal = backend.portal("manager");

        let dashboard = Dashboard::open(&portal, Some(Tab::MyRequests)).unwrap();
        assert_eq!(dashboard.active(), Tab::MyRequests);
        let dashboard = Dashboard::open(&portal, Some(Tab::Training)).unwrap();
        assert_eq!(dashboard.active(), Tab::Review);

        let anonymous = backend.portal_with(backend.config(), None);
        assert!(Dashboard::open(&anonymous, None).is_err());
    }

    #[tokio::test]
    async fn test_team_panel_lists_mapped_employees() {
        let backend = StubBackend::start().await;
        backend.on(
            "GET",
            "/auth/me",
            200,
            json!({"_id": "m1", "name": "Mo", "role": "manager",
                   "mappedEmployees": [{"_id": "e1", "name": "Ada"}, {"_id": "e2", "name": "Alan"}]}),
        );
        let portal = backend.portal("manager");

        let mut team = TeamPanel::new();
        team.load(&portal).await;
        let names: Vec<&str> = team.members().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Alan"]);
    }

    #[tokio::test]
    async fn test_employee_home_loads_both_panels() {
        let backend = StubBackend::start().await;
        backend.on(
            "GET",
            "/auth/me",
            200,
            json!({"_id": "e1", "name": "Ada", "role": "employee",
                   "manager": {"_id": "m1", "name": "Mo"}}),
        );
        backend.on(
            "GET",
            "/survey/assigned-with-status",
            200,
            json!([
                {"_id": "s1", "title": "Q1 pulse", "status": "Pending"},
                {"_id": "s2", "title": "Onboarding", "status": "Completed"}
            ]),
        );
        let portal = backend.portal("employee");

        let mut home = EmployeeHome::new();
        home.load(&portal).await.unwrap();
        assert_eq!(home.manager_name(), Some("Mo"));
        assert_eq!(home.assigned().len(), 2);
        assert_eq!(home.pending_surveys(), 1);
    }

    #[tokio::test]
    async fn test_employee_home_profile_failure_still_loads_surveys() {
        let backend = StubBackend::start().await;
        backend.on("GET", "/survey/assigned-with-status", 200, json!([]));
        let portal = backend.portal("employee");

        let mut home = EmployeeHome::new();
        assert!(home.load(&portal).await.is_err());
        assert!(home.surveys.state().is_loaded());
        assert_eq!(backend.count("GET", "/auth/me"), 1);
    }
}
