use reqwest::Method;

use super::{path_segment, ApiClient, ApiError, DecisionRequest, TrainingRequest};
use crate::training::{Decision, Stage, TrainingFields};

impl ApiClient {
    pub async fn submit_training_request(&self, fields: &TrainingFields) -> Result<(), ApiError> {
        self.require_session()?;
        self.send_json_unit(Method::POST, "/training-request/submit", fields)
            .await
    }

    pub async fn my_training_requests(&self) -> Result<Vec<TrainingRequest>, ApiError> {
        self.require_session()?;
        self.get("/training-request/my-requests").await
    }

    /// One of the caller's own requests
    pub async fn training_request(&self, id: &str) -> Result<TrainingRequest, ApiError> {
        self.require_session()?;
        self.get(&format!("/training-request/{}", path_segment(id)?))
            .await
    }

    pub async fn update_training_request(&self, id: &str, fields: &TrainingFields) -> Result<(), ApiError> {
        self.require_session()?;
        let path = format!("/training-request/{}", path_segment(id)?);
        self.send_json_unit(Method::PATCH, &path, fields).await
    }

    pub async fn delete_training_request(&self, id: &str) -> Result<(), ApiError> {
        self.require_session()?;
        self.delete(&format!("/training-request/{}", path_segment(id)?))
            .await
    }

    /// Requests waiting at `stage` (every request for the admin stage)
    pub async fn review_queue(&self, stage: Stage) -> Result<Vec<TrainingRequest>, ApiError> {
        self.require_session()?;
        self.get(&stage.queue_path()).await
    }

    pub async fn decide(&self, stage: Stage, id: &str, decision: Decision) -> Result<(), ApiError> {
        self.require_session()?;
        let body = DecisionRequest { decision };
        self.send_json_unit(Method::PATCH, &stage.decision_path(id)?, &body)
            .await
    }

    /// Admin lookup of any request by id
    pub async fn admin_training_request(&self, id: &str) -> Result<TrainingRequest, ApiError> {
        self.require_session()?;
        self.get(&format!("/training-request/admin/{}", path_segment(id)?))
            .await
    }
}
