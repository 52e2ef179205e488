//! Training requests: the status chain, the multi-step form, the
//! submitter's own list and the stage review views.

pub mod admin;
pub mod form;
pub mod requests;
pub mod review;
mod status;

pub use admin::{AdminFilter, AdminTrainingView};
pub use form::{FieldKind, FieldSpec, TrainingFields, TrainingForm, FIELDS, STEPS};
pub use requests::{MyRequests, RequestFilter};
pub use review::ReviewQueue;
pub use status::{Badge, Decision, Stage, Tone, TrainingStatus};
