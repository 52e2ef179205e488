use reqwest::Method;

use super::{
    path_segment, ApiClient, ApiError, AssignedSurvey, CreateSurveyRequest, CreatedSurvey, MyResponse,
    SubmitResponseRequest, SurveyWithResponse, UpdateResponseRequest,
};

impl ApiClient {
    /// Surveys assigned to the signed-in user with their response status
    pub async fn assigned_surveys(&self) -> Result<Vec<AssignedSurvey>, ApiError> {
        self.require_session()?;
        self.get("/survey/assigned-with-status").await
    }

    /// A survey's questions plus the caller's stored answers, if any
    pub async fn survey_with_response(&self, survey_id: &str) -> Result<SurveyWithResponse, ApiError> {
        self.require_session()?;
        self.get(&format!("/survey/{}/my-response", path_segment(survey_id)?))
            .await
    }

    pub async fn submit_response(&self, survey_id: &str, answers: &[String]) -> Result<(), ApiError> {
        self.require_session()?;
        let body = SubmitResponseRequest {
            survey_id: survey_id.to_string(),
            answers: answers.to_vec(),
        };
        self.send_json_unit(Method::POST, "/response/submit", &body)
            .await
    }

    pub async fn update_response(&self, response_id: &str, answers: &[String]) -> Result<(), ApiError> {
        self.require_session()?;
        let body = UpdateResponseRequest {
            answers: answers.to_vec(),
        };
        let path = format!("/survey/update/{}", path_segment(response_id)?);
        self.send_json_unit(Method::PATCH, &path, &body).await
    }

    pub async fn my_responses(&self) -> Result<Vec<MyResponse>, ApiError> {
        self.require_session()?;
        self.get("/survey/my-responses").await
    }

    /// Delete the caller's response to `survey_id`
    pub async fn delete_response(&self, survey_id: &str) -> Result<(), ApiError> {
        self.require_session()?;
        self.delete(&format!("/survey/response/{}", path_segment(survey_id)?))
            .await
    }

    pub async fn create_survey(&self, survey: &CreateSurveyRequest) -> Result<(), ApiError> {
        self.require_session()?;
        self.send_json_unit(Method::POST, "/survey/create", survey)
            .await
    }

    pub async fn created_surveys(&self) -> Result<Vec<CreatedSurvey>, ApiError> {
        self.require_session()?;
        self.get("/survey/created").await
    }
}
