//! Surveys assigned to the signed-in user.

use tracing::info;

use crate::access::Route;
use crate::api::{AssignedSurvey, SurveyStatus};
use crate::error::PortalError;
use crate::view::LoadState;
use crate::Portal;

use super::FillMode;

#[derive(Debug, Clone, Default)]
pub struct AssignedSurveys {
    state: LoadState<Vec<AssignedSurvey>>,
}

impl AssignedSurveys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the list; a failure is kept as an inline error to retry from
    pub async fn load(&mut self, portal: &Portal) {
        self.state = match portal.api().assigned_surveys().await {
            Ok(surveys) => {
                info!(count = surveys.len(), "Loaded assigned surveys");
                LoadState::Loaded(surveys)
            }
            Err(e) => LoadState::Failed(e.message_or("Failed to load surveys")),
        };
    }

    pub fn state(&self) -> &LoadState<Vec<AssignedSurvey>> {
        &self.state
    }

    pub fn surveys(&self) -> &[AssignedSurvey] {
        self.state.data().map(Vec::as_slice).unwrap_or_default()
    }

    /// Surveys still waiting for an answer (dashboard badge)
    pub fn pending_count(&self) -> usize {
        self.surveys()
            .iter()
            .filter(|s| s.status == SurveyStatus::Pending)
            .count()
    }

    /// Open the feedback list; refused when nothing is assigned
    pub fn open_feedback(&self, portal: &Portal) -> Result<Route, PortalError> {
        if self.surveys().is_empty() {
            portal.notifier().alert("No feedback forms assigned.");
            return Err(PortalError::NotFound("No feedback forms assigned.".to_string()));
        }
        Ok(Route::Feedback)
    }

    /// Route that opens a survey for filling
    pub fn fill_route(&self, survey_id: &str) -> Result<Route, PortalError> {
        let survey = self
            .surveys()
            .iter()
            .find(|s| s.id == survey_id)
            .ok_or_else(|| PortalError::NotFound(format!("survey {}", survey_id)))?;
        Ok(Route::Survey {
            id: survey.id.clone(),
            edit: FillMode::Create.is_edit(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubBackend;
    use serde_json::json;

    #[tokio::test]
    async fn test_pending_count_and_routes() {
        let backend = StubBackend::start().await;
        backend.on(
            "GET",
            "/survey/assigned-with-status",
            200,
            json!([
                {"_id": "s1", "title": "Onboarding", "status": "Pending"},
                {"_id": "s2", "title": "Q3 pulse", "status": "Completed"},
                {"_id": "s3", "title": "Tools", "status": "Pending"}
            ]),
        );
        let portal = backend.portal("employee");

        let mut assigned = AssignedSurveys::new();
        assigned.load(&portal).await;
        assert_eq!(assigned.pending_count(), 2);
        assert_eq!(assigned.open_feedback(&portal).unwrap(), Route::Feedback);
        assert_eq!(
            assigned.fill_route("s2").unwrap().path(),
            "/survey/s2"
        );
        assert!(assigned.fill_route("s9").is_err());
    }

    #[tokio::test]
    async fn test_nothing_assigned_refuses_feedback_list() {
        let backend = StubBackend::start().await;
        backend.on("GET", "/survey/assigned-with-status", 200, json!([]));
        let portal = backend.portal("hr");

        let mut assigned = AssignedSurveys::new();
        assigned.load(&portal).await;
        assert!(assigned.open_feedback(&portal).is_err());
        assert_eq!(
            portal.notifier().last().unwrap().message,
            "No feedback forms assigned."
        );
    }

    #[tokio::test]
    async fn test_failure_is_inline_and_retryable() {
        let backend = StubBackend::start().await;
        backend.on("GET", "/survey/assigned-with-status", 500, json!({}));
        let portal = backend.portal("employee");

        let mut assigned = AssignedSurveys::new();
        assigned.load(&portal).await;
        assert_eq!(assigned.state().error(), Some("Failed to load surveys"));
        assert_eq!(assigned.pending_count(), 0);

        backend.on("GET", "/survey/assigned-with-status", 200, json!([]));
        assigned.load(&portal).await;
        assert!(assigned.state().is_loaded());
    }
}
