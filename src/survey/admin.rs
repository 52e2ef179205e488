//! Survey authoring for admins: the draft form, the assignee picker and
//! the list of created surveys.

use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::access::Role;
use crate::api::{CreateSurveyRequest, CreatedSurvey, User};
use crate::error::{FieldErrors, PortalError};
use crate::view::{contains_ci, LoadState};
use crate::Portal;

/// A survey being written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyDraft {
    pub title: String,
    questions: Vec<String>,
    assignees: BTreeSet<String>,
}

impl Default for SurveyDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            questions: vec![String::new()],
            assignees: BTreeSet::new(),
        }
    }
}

impl SurveyDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn add_question(&mut self) {
        self.questions.push(String::new());
    }

    pub fn update_question(&mut self, index: usize, text: &str) -> bool {
        match self.questions.get_mut(index) {
            Some(question) => {
                *question = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove a question; the last remaining question is kept
    pub fn remove_question(&mut self, index: usize) -> bool {
        if self.questions.len() <= 1 || index >= self.questions.len() {
            return false;
        }
        self.questions.remove(index);
        true
    }

    /// Select or deselect a user; returns whether the user is now selected
    pub fn toggle_assignee(&mut self, user_id: &str) -> bool {
        if self.assignees.remove(user_id) {
            false
        } else {
            self.assignees.insert(user_id.to_string());
            true
        }
    }

    pub fn assignees(&self) -> impl Iterator<Item = &str> {
        self.assignees.iter().map(String::as_str)
    }

    pub fn validate(&self) -> Result<(), PortalError> {
        let incomplete = self.title.trim().is_empty()
            || self.questions.iter().any(|q| q.trim().is_empty());
        if incomplete {
            return FieldErrors::message("Fill all fields").finish();
        }
        Ok(())
    }

    /// Create the survey; the draft resets once the server accepts it
    pub async fn create(&mut self, portal: &Portal) -> Result<(), PortalError> {
        if let Err(e) = self.validate() {
            portal.notifier().alert("Fill all fields");
            return Err(e);
        }

        let request = CreateSurveyRequest {
            title: self.title.clone(),
            questions: self.questions.clone(),
            assigned_to: self.assignees.iter().cloned().collect(),
        };
        if let Err(e) = portal.api().create_survey(&request).await {
            portal.notifier().alert("Survey creation failed");
            return Err(e.into());
        }

        info!(
            title = %request.title,
            questions = request.questions.len(),
            assignees = request.assigned_to.len(),
            "Survey created"
        );
        portal.notifier().success("Survey created successfully!");
        *self = Self::default();
        Ok(())
    }
}

/// Users a survey can be assigned to, grouped by department
#[derive(Debug, Clone, Default)]
pub struct AssigneePicker {
    users: Vec<User>,
    pub department: Option<String>,
    pub role: Option<Role>,
}

impl AssigneePicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every non-admin user
    pub async fn load(&mut self, portal: &Portal) -> Result<(), PortalError> {
        match portal.api().users().await {
            Ok(users) => {
                self.users = users
                    .into_iter()
                    .filter(|u| u.role != Some(Role::Admin))
                    .collect();
                Ok(())
            }
            Err(e) => {
                portal.notifier().alert("Failed to fetch users");
                Err(e.into())
            }
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn departments(&self) -> Vec<&str> {
        self.users
            .iter()
            .map(|u| u.department.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Filtered users per department, departments in name order
    pub fn grouped(&self) -> BTreeMap<&str, Vec<&User>> {
        let mut groups: BTreeMap<&str, Vec<&User>> = BTreeMap::new();
        for user in &self.users {
            if self
                .department
                .as_deref()
                .is_some_and(|d| d != user.department)
            {
                continue;
            }
            if self.role.is_some() && user.role != self.role {
                continue;
            }
            groups.entry(user.department.as_str()).or_default().push(user);
        }
        groups
    }
}

/// Surveys the admin has created
#[derive(Debug, Clone, Default)]
pub struct CreatedSurveys {
    state: LoadState<Vec<CreatedSurvey>>,
    pub search: String,
}

impl CreatedSurveys {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, portal: &Portal) {
        self.state = match portal.api().created_surveys().await {
            Ok(surveys) => LoadState::Loaded(surveys),
            Err(e) => LoadState::Failed(e.message_or("Failed to load created surveys")),
        };
    }

    pub fn state(&self) -> &LoadState<Vec<CreatedSurvey>> {
        &self.state
    }

    /// Surveys whose title contains the search term
    pub fn visible(&self) -> Vec<&CreatedSurvey> {
        self.state
            .data()
            .map(|surveys| {
                surveys
                    .iter()
                    .filter(|s| contains_ci(&s.title, &self.search))
                    .collect()
            })
            .unwrap_or_default()
    }
}
