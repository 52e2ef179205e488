//! The training-needs questionnaire.
//!
//! Nineteen free-text or multiple-choice answers, entered over four steps.
//! The same form submits a new request or edits an existing one.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use crate::access::Redirect;
use crate::dashboard::Tab;
use crate::error::{FieldErrors, PortalError};
use crate::Portal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextArea,
    /// One of a fixed set of options; empty means unanswered
    Select(&'static [&'static str]),
}

/// One question of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// JSON field name
    pub name: &'static str,
    /// Question shown while filling the form
    pub question: &'static str,
    /// Label shown in the request detail view
    pub label: &'static str,
    pub kind: FieldKind,
    /// Zero-based step the question belongs to
    pub step: usize,
}

pub const STEPS: [&str; 4] = [
    "Skills & Training Needs",
    "Role & Performance",
    "Career Development",
    "Training Preferences & History",
];

const CONFIDENCE_LEVELS: &[&str] = &["Low", "Medium", "High"];
const AREAS: &[&str] = &[
    "Technical Skills",
    "Communication",
    "Leadership",
    "Time Management",
    "Other",
];
const FORMATS: &[&str] = &["In-person", "Online Live", "Self-paced"];
const DURATIONS: &[&str] = &["1 Day", "1 Week", "Short Sessions"];
const LEARNING_PREFERENCES: &[&str] = &["Individual", "Team-based"];
const FREQUENCIES: &[&str] = &["Monthly", "Quarterly", "Bi-annually", "Annually"];

const fn entry(
    name: &'static str,
    question: &'static str,
    label: &'static str,
    kind: FieldKind,
    step: usize,
) -> FieldSpec {
    FieldSpec {
        name,
        question,
        label,
        kind,
        step,
    }
}

pub const FIELDS: [FieldSpec; 19] = [
    entry("generalSkills", "What skills do you feel you need to improve?", "Skills to Improve", FieldKind::TextArea, 0),
    entry("toolsTraining", "Tools or software you'd like to get trained on?", "Tools for Training", FieldKind::Text, 0),
    entry("softSkills", "Need training in communication, leadership, or soft skills?", "Soft Skills Training", FieldKind::Text, 0),
    entry("confidenceLevel", "Confidence level with tools (Excel, SAP, etc.)?", "Tool Confidence Level", FieldKind::Select(CONFIDENCE_LEVELS), 0),
    entry("technicalSkills", "Technical skills you'd like to learn?", "Technical Skills to Learn", FieldKind::Text, 0),
    entry("dataTraining", "Need training in data analysis or reporting?", "Data/Reporting Training", FieldKind::Text, 1),
    entry("roleChallenges", "Challenges in your current role?", "Current Role Challenges", FieldKind::TextArea, 1),
    entry("efficiencyTraining", "Training to perform your job better?", "Job Efficiency Training", FieldKind::Text, 1),
    entry("certifications", "Certifications you're interested in?", "Interested Certifications", FieldKind::Text, 1),
    entry("careerGoals", "Where do you see yourself in 2 years?", "2-Year Career Goal", FieldKind::TextArea, 2),
    entry("careerTraining", "Training needed to reach your goals?", "Training for Career Goal", FieldKind::Text, 2),
    entry("areaNeed", "Area you need most training in:", "Urgent Training Areas", FieldKind::Select(AREAS), 2),
    entry("trainingFormat", "Preferred training format?", "Preferred Format", FieldKind::Select(FORMATS), 3),
    entry("trainingDuration", "Preferred duration?", "Preferred Duration", FieldKind::Select(DURATIONS), 3),
    entry("learningPreference", "Learning preference?", "Learning Style", FieldKind::Select(LEARNING_PREFERENCES), 3),
    entry("pastTraining", "Attended any training in the last 6 months?", "Past Trainings", FieldKind::Text, 3),
    entry("pastTrainingFeedback", "Was it relevant and helpful?", "Feedback on Past Trainings", FieldKind::Text, 3),
    entry("trainingImprovement", "Suggestions for improvement?", "Suggested Improvements", FieldKind::TextArea, 3),
    entry("trainingFrequency", "Training frequency preferred:", "Training Frequency", FieldKind::Select(FREQUENCIES), 3),
];

/// Look up a question by its JSON field name
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.name == name)
}

/// The answers, sent to the backend as a flat JSON object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainingFields {
    pub general_skills: String,
    pub tools_training: String,
    pub soft_skills: String,
    pub confidence_level: String,
    pub technical_skills: String,
    pub data_training: String,
    pub role_challenges: String,
    pub efficiency_training: String,
    pub certifications: String,
    pub career_goals: String,
    pub career_training: String,
    pub training_format: String,
    pub training_duration: String,
    pub learning_preference: String,
    pub past_training: String,
    pub past_training_feedback: String,
    pub training_improvement: String,
    pub area_need: String,
    pub training_frequency: String,
}

impl TrainingFields {
    fn slot(&self, name: &str) -> Option<&String> {
        let value = match name {
            "generalSkills" => &self.general_skills,
            "toolsTraining" => &self.tools_training,
            "softSkills" => &self.soft_skills,
            "confidenceLevel" => &self.confidence_level,
            "technicalSkills" => &self.technical_skills,
            "dataTraining" => &self.data_training,
            "roleChallenges" => &self.role_challenges,
            "efficiencyTraining" => &self.efficiency_training,
            "certifications" => &self.certifications,
            "careerGoals" => &self.career_goals,
            "careerTraining" => &self.career_training,
            "trainingFormat" => &self.training_format,
            "trainingDuration" => &self.training_duration,
            "learningPreference" => &self.learning_preference,
            "pastTraining" => &self.past_training,
            "pastTrainingFeedback" => &self.past_training_feedback,
            "trainingImprovement" => &self.training_improvement,
            "areaNeed" => &self.area_need,
            "trainingFrequency" => &self.training_frequency,
            _ => return None,
        };
        Some(value)
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut String> {
        let value = match name {
            "generalSkills" => &mut self.general_skills,
            "toolsTraining" => &mut self.tools_training,
            "softSkills" => &mut self.soft_skills,
            "confidenceLevel" => &mut self.confidence_level,
            "technicalSkills" => &mut self.technical_skills,
            "dataTraining" => &mut self.data_training,
            "roleChallenges" => &mut self.role_challenges,
            "efficiencyTraining" => &mut self.efficiency_training,
            "certifications" => &mut self.certifications,
            "careerGoals" => &mut self.career_goals,
            "careerTraining" => &mut self.career_training,
            "trainingFormat" => &mut self.training_format,
            "trainingDuration" => &mut self.training_duration,
            "learningPreference" => &mut self.learning_preference,
            "pastTraining" => &mut self.past_training,
            "pastTrainingFeedback" => &mut self.past_training_feedback,
            "trainingImprovement" => &mut self.training_improvement,
            "areaNeed" => &mut self.area_need,
            "trainingFrequency" => &mut self.training_frequency,
            _ => return None,
        };
        Some(value)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.slot(name).map(String::as_str)
    }

    /// Set one answer.
    ///
    /// Unknown field names and select values outside the field's options
    /// are refused and leave the answers unchanged.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), PortalError> {
        let Some(entry) = field(name) else {
            let mut errors = FieldErrors::new();
            errors.add(name, "Unknown field");
            return Err(PortalError::Validation(errors));
        };

        if let FieldKind::Select(options) = entry.kind {
            if !value.is_empty() && !options.contains(&value) {
                let mut errors = FieldErrors::new();
                errors.add(name, format!("Choose one of: {}", options.join(", ")));
                return Err(PortalError::Validation(errors));
            }
        }

        if let Some(slot) = self.slot_mut(name) {
            *slot = value.to_string();
        }
        Ok(())
    }

    /// (label, answer) pairs in question order
    pub fn details(&self) -> Vec<(&'static str, &str)> {
        FIELDS
            .iter()
            .map(|f| (f.label, self.get(f.name).unwrap_or_default()))
            .collect()
    }

    pub fn answered(&self) -> usize {
        FIELDS
            .iter()
            .filter(|f| self.get(f.name).is_some_and(|v| !v.trim().is_empty()))
            .count()
    }
}

/// Multi-step form state for a new or an existing request
#[derive(Debug, Clone, Default)]
pub struct TrainingForm {
    fields: TrainingFields,
    step: usize,
    editing: Option<String>,
}

impl TrainingForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load one of the caller's requests for editing
    pub async fn load_for_edit(portal: &Portal, id: &str) -> Result<Self, PortalError> {
        match portal.api().training_request(id).await {
            Ok(request) => Ok(Self {
                fields: request.fields,
                step: 0,
                editing: Some(request.id),
            }),
            Err(e) => {
                portal
                    .notifier()
                    .alert("Failed to load training request for editing");
                Err(e.into())
            }
        }
    }

    pub fn fields(&self) -> &TrainingFields {
        &self.fields
    }

    /// Id of the request being edited, if any
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn step_title(&self) -> &'static str {
        STEPS[self.step]
    }

    pub fn step_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        let step = self.step;
        FIELDS.iter().filter(move |f| f.step == step)
    }

    pub fn is_last_step(&self) -> bool {
        self.step + 1 == STEPS.len()
    }

    pub fn progress_percent(&self) -> usize {
        (self.step + 1) * 100 / STEPS.len()
    }

    /// Advance one step; false on the last step
    pub fn next(&mut self) -> bool {
        if self.is_last_step() {
            return false;
        }
        self.step += 1;
        true
    }

    /// Go back one step; false on the first step
    pub fn prev(&mut self) -> bool {
        if self.step == 0 {
            return false;
        }
        self.step -= 1;
        true
    }

    pub fn set(&mut self, name: &str, value: &str) -> Result<(), PortalError> {
        self.fields.set(name, value)
    }

    /// Submit a new request, or save the one being edited
    pub async fn submit(&self, portal: &Portal) -> Result<Redirect, PortalError> {
        match &self.editing {
            None => self.create(portal).await,
            Some(id) => self.update(portal, id).await,
        }
    }

    async fn create(&self, portal: &Portal) -> Result<Redirect, PortalError> {
        if let Err(e) = portal.api().submit_training_request(&self.fields).await {
            portal.notifier().alert("Error submitting training request.");
            return Err(e.into());
        }

        info!(answered = self.fields.answered(), "Training request submitted");
        portal
            .notifier()
            .success("Training request submitted successfully!");
        Ok(portal.landing_redirect(None))
    }

    async fn update(&self, portal: &Portal, id: &str) -> Result<Redirect, PortalError> {
        if let Err(e) = portal.api().update_training_request(id, &self.fields).await {
            portal.notifier().alert("Failed to update training request");
            return Err(e.into());
        }

        info!(id, "Training request updated");
        portal.notifier().success("Request updated successfully");
        Ok(Redirect {
            after: Duration::ZERO,
            ..portal.landing_redirect(Some(Tab::MyRequests))
        })
    }
}
