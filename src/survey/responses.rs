//! The signed-in user's submitted survey responses.

use tracing::info;

use crate::access::Route;
use crate::api::MyResponse;
use crate::error::PortalError;
use crate::view::LoadState;
use crate::Portal;

use super::FillMode;

/// Placeholder shown for a question with no stored answer
pub const NO_ANSWER: &str = "—";

#[derive(Debug, Clone, Default)]
pub struct MyResponses {
    state: LoadState<Vec<MyResponse>>,
}

impl MyResponses {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, portal: &Portal) {
        self.state = match portal.api().my_responses().await {
            Ok(responses) => {
                info!(count = responses.len(), "Loaded survey responses");
                LoadState::Loaded(responses)
            }
            Err(e) => LoadState::Failed(e.message_or("Failed to load feedback responses")),
        };
    }

    pub fn state(&self) -> &LoadState<Vec<MyResponse>> {
        &self.state
    }

    pub fn responses(&self) -> &[MyResponse] {
        self.state.data().map(Vec::as_slice).unwrap_or_default()
    }

    fn get(&self, survey_id: &str) -> Result<&MyResponse, PortalError> {
        self.responses()
            .iter()
            .find(|r| r.survey_id == survey_id)
            .ok_or_else(|| PortalError::NotFound(format!("response to survey {}", survey_id)))
    }

    /// Question/answer pairs of one response
    pub fn view(&self, survey_id: &str) -> Result<Vec<(&str, &str)>, PortalError> {
        let response = self.get(survey_id)?;
        Ok(response
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let answer = response
                    .answers
                    .get(i)
                    .map(String::as_str)
                    .filter(|a| !a.is_empty())
                    .unwrap_or(NO_ANSWER);
                (q.as_str(), answer)
            })
            .collect())
    }

    /// Route that reopens a response for editing
    pub fn edit_route(&self, survey_id: &str) -> Result<Route, PortalError> {
        let response = self.get(survey_id)?;
        Ok(Route::Survey {
            id: response.survey_id.clone(),
            edit: FillMode::Edit.is_edit(),
        })
    }

    pub async fn delete(&mut self, portal: &Portal, survey_id: &str) -> Result<(), PortalError> {
        self.get(survey_id)?;

        if let Err(e) = portal.api().delete_response(survey_id).await {
            portal.notifier().alert("Failed to delete response");
            return Err(e.into());
        }

        if let Some(responses) = self.state.data_mut() {
            responses.retain(|r| r.survey_id != survey_id);
        }
        info!(survey_id, "Survey response deleted");
        portal.notifier().success("Response deleted successfully!");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationKind;
    use crate::test_support::StubBackend;
    use serde_json::json;

    async fn loaded(backend: &StubBackend) -> (Portal, MyResponses) {
        backend.on(
            "GET",
            "/survey/my-responses",
            200,
            json!([
                {"surveyId": "s1", "title": "Onboarding", "questions": ["Q1", "Q2", "Q3"],
                 "answers": ["Good", ""], "submittedAt": "2024-05-01T10:00:00Z"},
                {"surveyId": "s2", "title": "Pulse", "questions": ["Q1"], "answers": ["Ok"]}
            ]),
        );
        let portal = backend.portal("employee");
        let mut responses = MyResponses::new();
        responses.load(&portal).await;
        (portal, responses)
    }

    #[tokio::test]
    async fn test_view_fills_missing_answers() {
        let backend = StubBackend::start().await;
        let (_portal, responses) = loaded(&backend).await;

        let pairs = responses.view("s1").unwrap();
        assert_eq!(pairs, vec![("Q1", "Good"), ("Q2", NO_ANSWER), ("Q3", NO_ANSWER)]);
        assert_eq!(
            responses.edit_route("s1").unwrap().path(),
            "/survey/s1?mode=edit"
        );
    }

    #[tokio::test]
    async fn test_delete_response() {
        let backend = StubBackend::start().await;
        backend.on("DELETE", "/survey/response/s2", 200, json!({"msg": "Deleted"}));
        let (portal, mut responses) = loaded(&backend).await;

        responses.delete(&portal, "s2").await.unwrap();
        assert_eq!(responses.responses().len(), 1);
        assert_eq!(backend.count("DELETE", "/survey/response/s2"), 1);

        backend.on("DELETE", "/survey/response/s1", 500, json!({}));
        assert!(responses.delete(&portal, "s1").await.is_err());
        assert_eq!(responses.responses().len(), 1);
        assert_eq!(
            portal.notifier().last_message(NotificationKind::Alert).as_deref(),
            Some("Failed to delete response")
        );
    }
}
