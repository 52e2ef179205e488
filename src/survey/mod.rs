//! Feedback surveys: filling, the assigned list, past responses and
//! admin authoring.

pub mod admin;
pub mod assigned;
pub mod fill;
pub mod responses;

pub use admin::{AssigneePicker, CreatedSurveys, SurveyDraft};
pub use assigned::AssignedSurveys;
pub use fill::{FillMode, SurveyFill};
pub use responses::{MyResponses, NO_ANSWER};
