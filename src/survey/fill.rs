//! One-question-at-a-time survey fill flow.

use reqwest::Url;
use tracing::info;

use crate::access::Redirect;
use crate::api::SurveyStatus;
use crate::error::{FieldErrors, PortalError};
use crate::Portal;

const REQUIRED: &str = "This field is required";

/// Whether the fill flow creates a response or updates the existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    #[default]
    Create,
    Edit,
}

impl FillMode {
    /// Edit only when the query string carries `mode=edit`
    pub fn from_query(query: Option<&str>) -> Self {
        let Some(query) = query else {
            return FillMode::Create;
        };
        let edit = Url::parse("http://portal.local/")
            .map(|mut url| {
                url.set_query(Some(query));
                url.query_pairs().any(|(k, v)| k == "mode" && v == "edit")
            })
            .unwrap_or(false);
        if edit {
            FillMode::Edit
        } else {
            FillMode::Create
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, FillMode::Edit)
    }
}

/// State of an open survey
#[derive(Debug, Clone)]
pub struct SurveyFill {
    survey_id: String,
    mode: FillMode,
    title: String,
    questions: Vec<String>,
    answers: Vec<String>,
    response_id: Option<String>,
    step: usize,
    errors: FieldErrors,
    submitted: bool,
}

impl SurveyFill {
    /// Open `survey_id`, prefilled with the caller's stored answers.
    ///
    /// A survey already completed and opened outside edit mode starts out
    /// submitted.
    pub async fn load(portal: &Portal, survey_id: &str, mode: FillMode) -> Result<Self, PortalError> {
        let survey = match portal.api().survey_with_response(survey_id).await {
            Ok(survey) => survey,
            Err(e) => {
                portal.notifier().error("Failed to load survey");
                return Err(e.into());
            }
        };

        let mut answers = survey.answers.unwrap_or_default();
        answers.resize(survey.questions.len(), String::new());
        let submitted = survey.status == Some(SurveyStatus::Completed) && !mode.is_edit();

        info!(survey_id, questions = survey.questions.len(), ?mode, "Survey opened");
        Ok(Self {
            survey_id: survey_id.to_string(),
            mode,
            title: survey.title,
            questions: survey.questions,
            answers,
            response_id: survey.response_id,
            step: 0,
            errors: FieldErrors::new(),
            submitted,
        })
    }

    pub fn survey_id(&self) -> &str {
        &self.survey_id
    }

    pub fn mode(&self) -> FillMode {
        self.mode
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn response_id(&self) -> Option<&str> {
        self.response_id.as_deref()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn current_question(&self) -> Option<&str> {
        self.questions.get(self.step).map(String::as_str)
    }

    pub fn is_last_step(&self) -> bool {
        self.step + 1 >= self.questions.len()
    }

    pub fn progress_percent(&self) -> usize {
        if self.questions.is_empty() {
            return 100;
        }
        (self.step + 1) * 100 / self.questions.len()
    }

    /// Validation errors keyed by question index
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Update one answer and clear its error
    pub fn set_answer(&mut self, index: usize, value: &str) -> Result<(), PortalError> {
        let Some(answer) = self.answers.get_mut(index) else {
            let mut errors = FieldErrors::new();
            errors.add(index.to_string(), "No such question");
            return Err(PortalError::Validation(errors));
        };
        *answer = value.to_string();
        self.errors.remove(&index.to_string());
        Ok(())
    }

    fn is_blank(&self, index: usize) -> bool {
        self.answers
            .get(index)
            .map_or(true, |a| a.trim().is_empty())
    }

    /// Move to the next question once the current one is answered.
    ///
    /// Returns whether the step changed.
    pub fn next_step(&mut self) -> bool {
        self.errors = FieldErrors::new();
        if self.is_blank(self.step) {
            self.errors.add(self.step.to_string(), REQUIRED);
            return false;
        }
        if self.is_last_step() {
            return false;
        }
        self.step += 1;
        true
    }

    pub fn prev_step(&mut self) -> bool {
        if self.step == 0 {
            return false;
        }
        self.step -= 1;
        true
    }

    /// Required-field errors for every unanswered question
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for index in (0..self.answers.len()).filter(|&i| self.is_blank(i)) {
            errors.add(index.to_string(), REQUIRED);
        }
        errors
    }

    /// Validate every answer, then create or update the response.
    ///
    /// Nothing is sent while any answer is blank. An update is only issued
    /// in edit mode and when a response already exists.
    pub async fn submit(&mut self, portal: &Portal) -> Result<Redirect, PortalError> {
        let errors = self.validate();
        if !errors.is_empty() {
            self.errors = errors.clone();
            portal.notifier().error("Please fill in all required fields");
            return Err(PortalError::Validation(errors));
        }

        let (result, success) = match (self.mode, &self.response_id) {
            (FillMode::Edit, Some(response_id)) => (
                portal.api().update_response(response_id, &self.answers).await,
                "Response updated successfully!",
            ),
            _ => (
                portal
                    .api()
                    .submit_response(&self.survey_id, &self.answers)
                    .await,
                "Response submitted successfully!",
            ),
        };

        if let Err(e) = result {
            portal
                .notifier()
                .error(e.message_or("Failed to submit/update response"));
            return Err(e.into());
        }

        info!(survey_id = %self.survey_id, mode = ?self.mode, "Survey response saved");
        portal.notifier().success(success);
        self.submitted = true;
        Ok(portal.landing_redirect(None))
    }

    /// Where to go once the survey shows as submitted
    pub fn redirect(&self, portal: &Portal) -> Option<Redirect> {
        self.submitted.then(|| portal.landing_redirect(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Route;
    use crate::notifications::NotificationKind;
    use crate::test_support::StubBackend;
    use serde_json::json;

    #[test]
    fn test_mode_from_query() {
        assert_eq!(FillMode::from_query(None), FillMode::Create);
        assert_eq!(FillMode::from_query(Some("mode=edit")), FillMode::Edit);
        assert_eq!(FillMode::from_query(Some("x=1&mode=edit")), FillMode::Edit);
        assert_eq!(FillMode::from_query(Some("mode=view")), FillMode::Create);
        assert_eq!(FillMode::from_query(Some("mode=EDIT")), FillMode::Create);
        assert_eq!(FillMode::from_query(Some("")), FillMode::Create);
    }

    async fn open(backend: &StubBackend, role: &str, body: serde_json::Value, mode: FillMode) -> (Portal, SurveyFill) {
        backend.on("GET", "/survey/s1/my-response", 200, body);
        let portal = backend.portal(role);
        let fill = SurveyFill::load(&portal, "s1", mode).await.unwrap();
        (portal, fill)
    }

    #[tokio::test]
    async fn test_blank_answer_blocks_submit_without_request() {
        let backend = StubBackend::start().await;
        backend.on("POST", "/response/submit", 201, json!({}));
        let (portal, mut fill) = open(
            &backend,
            "employee",
            json!({"title": "Pulse", "questions": ["Q1", "Q2", "Q3"], "answers": null,
                   "status": "Pending", "responseId": null}),
            FillMode::Create,
        )
        .await;

        assert_eq!(fill.answers(), &["", "", ""]);
        fill.set_answer(0, "a").unwrap();
        fill.set_answer(1, "").unwrap();
        fill.set_answer(2, "c").unwrap();

        let err = fill.submit(&portal).await.unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["1"]);
        assert_eq!(errors.get("1"), Some("This field is required"));
        assert_eq!(backend.count("POST", "/response/submit"), 0);
        assert!(!fill.is_submitted());
        assert_eq!(
            portal.notifier().last_message(NotificationKind::Error).as_deref(),
            Some("Please fill in all required fields")
        );
    }

    #[tokio::test]
    async fn test_next_step_requires_answer() {
        let backend = StubBackend::start().await;
        let (_portal, mut fill) = open(
            &backend,
            "employee",
            json!({"title": "Pulse", "questions": ["Q1", "Q2"], "answers": ["   ", ""], "status": "Pending"}),
            FillMode::Create,
        )
        .await;

        assert!(!fill.next_step());
        assert_eq!(fill.step(), 0);
        assert!(fill.errors().contains("0"));

        fill.set_answer(0, "yes").unwrap();
        assert!(fill.errors().is_empty());
        assert!(fill.next_step());
        assert_eq!(fill.step(), 1);
        assert_eq!(fill.current_question(), Some("Q2"));

        fill.set_answer(1, "no").unwrap();
        assert!(!fill.next_step());
        assert_eq!(fill.step(), 1);
        assert!(fill.prev_step());
        assert!(!fill.prev_step());
    }

    #[tokio::test]
    async fn test_create_posts_and_redirects_by_role() {
        let backend = StubBackend::start().await;
        backend.on("POST", "/response/submit", 201, json!({}));
        let (portal, mut fill) = open(
            &backend,
            "hod",
            json!({"title": "Pulse", "questions": ["Q1"], "answers": ["fine"],
                   "status": "Completed", "responseId": "r9"}),
            FillMode::Create,
        )
        .await;
        // Completed and not in edit mode: shown as already submitted
        assert!(fill.is_submitted());
        assert_eq!(fill.redirect(&portal).unwrap().route, Route::Hod);

        let redirect = fill.submit(&portal).await.unwrap();
        assert_eq!(redirect.route, Route::Hod);
        assert_eq!(
            backend.last_body("POST", "/response/submit"),
            Some(json!({"surveyId": "s1", "answers": ["fine"]}))
        );
    }

    #[tokio::test]
    async fn test_edit_mode_patches_existing_response() {
        let backend = StubBackend::start().await;
        backend.on("PATCH", "/survey/update/r9", 200, json!({}));
        let (portal, mut fill) = open(
            &backend,
            "employee",
            json!({"title": "Pulse", "questions": ["Q1", "Q2"], "answers": ["a"],
                   "status": "Completed", "responseId": "r9"}),
            FillMode::Edit,
        )
        .await;
        assert!(!fill.is_submitted());
        assert_eq!(fill.answers(), &["a", ""]);

        fill.set_answer(1, "b").unwrap();
        let redirect = fill.submit(&portal).await.unwrap();
        assert_eq!(redirect.route, Route::Dashboard);
        assert_eq!(
            backend.last_body("PATCH", "/survey/update/r9"),
            Some(json!({"answers": ["a", "b"]}))
        );
        assert_eq!(backend.count("POST", "/response/submit"), 0);
    }

    #[tokio::test]
    async fn test_edit_mode_without_response_creates() {
        let backend = StubBackend::start().await;
        backend.on("POST", "/response/submit", 400, json!({"msg": "Already responded"}));
        let (portal, mut fill) = open(
            &backend,
            "employee",
            json!({"title": "Pulse", "questions": ["Q1"], "answers": ["a"], "status": "Pending"}),
            FillMode::Edit,
        )
        .await;

        assert!(fill.submit(&portal).await.is_err());
        assert_eq!(backend.count("POST", "/response/submit"), 1);
        assert_eq!(
            portal.notifier().last_message(NotificationKind::Error).as_deref(),
            Some("Already responded")
        );
    }

    #[tokio::test]
    async fn test_load_failure_notifies() {
        let backend = StubBackend::start().await;
        let portal = backend.portal("employee");
        assert!(SurveyFill::load(&portal, "nope", FillMode::Create).await.is_err());
        assert_eq!(
            portal.notifier().last_message(NotificationKind::Error).as_deref(),
            Some("Failed to load survey")
        );
    }
}
