//! Wire types exchanged with the backend.
//!
//! Field names follow the backend's JSON (`_id`, camelCase). The client
//! treats everything here as a disposable copy of server state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::{deserialize_role, Role};
use crate::training::{Decision, TrainingFields, TrainingStatus};

// ============================================================================
// Users
// ============================================================================

/// A user as listed by `GET /auth/users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_role")]
    pub role: Option<Role>,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Assigned manager; absent until an admin or HOD maps the user
    #[serde(default)]
    pub manager: Option<UserRef>,
}

impl User {
    pub fn manager_id(&self) -> Option<&str> {
        self.manager.as_ref().map(UserRef::id)
    }

    pub fn has_manager(&self) -> bool {
        self.manager_id().is_some_and(|id| !id.is_empty())
    }
}

/// Minimal user shape embedded in other documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UserSummary {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub location: String,
}

/// A reference that the server sends either as a bare id or populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Id(String),
    Populated(UserSummary),
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            UserRef::Id(id) => id,
            UserRef::Populated(user) => &user.id,
        }
    }

    pub fn summary(&self) -> Option<&UserSummary> {
        match self {
            UserRef::Id(_) => None,
            UserRef::Populated(user) => Some(user),
        }
    }
}

/// `GET /auth/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "deserialize_role")]
    pub role: Option<Role>,
    #[serde(default)]
    pub manager: Option<UserRef>,
    #[serde(default)]
    pub mapped_employees: Vec<UserSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Bodies that carry only a human-readable message
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordRequest {
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerAssignment {
    pub manager_id: String,
}

/// `PATCH /auth/update-profile`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub department: String,
    pub location: String,
    pub email: String,
}

/// `POST /auth/register` fields (sent as multipart)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub department: String,
    pub location: String,
}

/// An image file attached to a multipart request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

// ============================================================================
// Surveys
// ============================================================================

/// Response status of an assigned survey, as computed by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SurveyStatus {
    Pending,
    Completed,
    Other(String),
}

impl From<String> for SurveyStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Pending" => SurveyStatus::Pending,
            "Completed" => SurveyStatus::Completed,
            _ => SurveyStatus::Other(s),
        }
    }
}

impl From<SurveyStatus> for String {
    fn from(status: SurveyStatus) -> Self {
        status.as_str().to_string()
    }
}

impl SurveyStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SurveyStatus::Pending => "Pending",
            SurveyStatus::Completed => "Completed",
            SurveyStatus::Other(s) => s,
        }
    }
}

impl std::fmt::Display for SurveyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `GET /survey/assigned-with-status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedSurvey {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub status: SurveyStatus,
}

/// `GET /survey/:id/my-response`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyWithResponse {
    pub title: String,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub answers: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<SurveyStatus>,
    #[serde(default)]
    pub response_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseRequest {
    pub survey_id: String,
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateResponseRequest {
    pub answers: Vec<String>,
}

/// `GET /survey/my-responses`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyResponse {
    pub survey_id: String,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// `POST /survey/create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSurveyRequest {
    pub title: String,
    pub questions: Vec<String>,
    pub assigned_to: Vec<String>,
}

/// `GET /survey/created`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSurvey {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub assigned_to: Vec<UserRef>,
    #[serde(default)]
    pub response_count: u32,
}

// ============================================================================
// Training requests
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRequest {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub request_number: Option<String>,
    #[serde(default)]
    pub status: TrainingStatus,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: TrainingFields,
}

impl TrainingRequest {
    /// Populated requester, when the server expanded it
    pub fn requester(&self) -> Option<&UserSummary> {
        self.user.as_ref().and_then(UserRef::summary)
    }

    pub fn requester_name(&self) -> &str {
        self.requester().map(|u| u.name.as_str()).unwrap_or("")
    }

    pub fn display_number(&self) -> &str {
        self.request_number.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DecisionRequest {
    pub decision: Decision,
}
