//! Training-request status model.
//!
//! The approval chain runs Manager → HOD → HR → Admin. Each stage owns a
//! request while its status is `Pending_<Stage>`; a rejection at any stage
//! and the final admin approval are terminal. Transitions happen on the
//! server only: the client reads the status string it is given and sends
//! `approve`/`reject` decisions to the owning stage's endpoint.

use serde::{Deserialize, Serialize};

use crate::access::Role;
use crate::api::{path_segment, ApiError};

/// Approval checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Manager,
    Hod,
    Hr,
    Admin,
}

impl Stage {
    pub const CHAIN: [Stage; 4] = [Stage::Manager, Stage::Hod, Stage::Hr, Stage::Admin];

    /// Role that reviews requests at this stage
    pub fn reviewer(&self) -> Role {
        match self {
            Stage::Manager => Role::Manager,
            Stage::Hod => Role::Hod,
            Stage::Hr => Role::Hr,
            Stage::Admin => Role::Admin,
        }
    }

    /// Status a request carries while this stage owns it
    pub fn pending_status(&self) -> TrainingStatus {
        match self {
            Stage::Manager => TrainingStatus::PendingManager,
            Stage::Hod => TrainingStatus::PendingHod,
            Stage::Hr => TrainingStatus::PendingHr,
            Stage::Admin => TrainingStatus::PendingAdmin,
        }
    }

    /// Stage that follows an approval here
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Manager => Some(Stage::Hod),
            Stage::Hod => Some(Stage::Hr),
            Stage::Hr => Some(Stage::Admin),
            Stage::Admin => None,
        }
    }

    /// Path segment of this stage's review endpoints
    pub fn review_segment(&self) -> &'static str {
        match self {
            Stage::Manager => "manager-review",
            Stage::Hod => "hod-review",
            Stage::Hr => "hr-review",
            Stage::Admin => "admin-review",
        }
    }

    /// Endpoint listing the requests this stage works on
    pub fn queue_path(&self) -> String {
        match self {
            Stage::Admin => "/training-request/all".to_string(),
            _ => format!("/training-request/{}", self.review_segment()),
        }
    }

    /// Endpoint accepting a decision on request `id`
    pub fn decision_path(&self, id: &str) -> Result<String, ApiError> {
        Ok(format!(
            "/training-request/{}/{}",
            self.review_segment(),
            path_segment(id)?
        ))
    }

    pub fn label(&self) -> &'static str {
        self.reviewer().label()
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Reviewer decision sent to a stage endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn past_tense(&self) -> &'static str {
        match self {
            Decision::Approve => "approved",
            Decision::Reject => "rejected",
        }
    }
}

impl std::str::FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approve" | "approved" => Ok(Decision::Approve),
            "reject" | "rejected" => Ok(Decision::Reject),
            _ => Err(format!("Unknown decision: {}", s)),
        }
    }
}

/// Status string of a training request as reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TrainingStatus {
    PendingManager,
    ApprovedByManager,
    RejectedByManager,
    PendingHod,
    ApprovedByHod,
    RejectedByHod,
    PendingHr,
    ApprovedByHr,
    RejectedByHr,
    PendingAdmin,
    ApprovedByAdmin,
    RejectedByAdmin,
    Cancelled,
    /// Any status string this client does not recognise
    Unknown(String),
}

impl Default for TrainingStatus {
    fn default() -> Self {
        TrainingStatus::PendingManager
    }
}

/// Colour family of a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Yellow,
    Blue,
    Red,
    Green,
    Gray,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Yellow => "yellow",
            Tone::Blue => "blue",
            Tone::Red => "red",
            Tone::Green => "green",
            Tone::Gray => "gray",
        }
    }
}

/// Badge styling for a status: tone plus background/text/border shades
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub tone: Tone,
    pub background: u16,
    pub text: u16,
    pub border: u16,
}

impl Badge {
    const fn new(tone: Tone, background: u16, text: u16, border: u16) -> Self {
        Self {
            tone,
            background,
            text,
            border,
        }
    }

    pub fn css_class(&self) -> String {
        let t = self.tone.as_str();
        format!(
            "bg-{t}-{} text-{t}-{} border-{t}-{}",
            self.background, self.text, self.border
        )
    }
}

impl TrainingStatus {
    /// Every status string this client knows
    pub const KNOWN: [TrainingStatus; 13] = [
        TrainingStatus::PendingManager,
        TrainingStatus::ApprovedByManager,
        TrainingStatus::RejectedByManager,
        TrainingStatus::PendingHod,
        TrainingStatus::ApprovedByHod,
        TrainingStatus::RejectedByHod,
        TrainingStatus::PendingHr,
        TrainingStatus::ApprovedByHr,
        TrainingStatus::RejectedByHr,
        TrainingStatus::PendingAdmin,
        TrainingStatus::ApprovedByAdmin,
        TrainingStatus::RejectedByAdmin,
        TrainingStatus::Cancelled,
    ];

    pub fn parse(s: &str) -> Self {
        match s {
            "Pending_Manager" => TrainingStatus::PendingManager,
            "Approved_By_Manager" => TrainingStatus::ApprovedByManager,
            "Rejected_By_Manager" => TrainingStatus::RejectedByManager,
            "Pending_HOD" => TrainingStatus::PendingHod,
            "Approved_By_HOD" => TrainingStatus::ApprovedByHod,
            "Rejected_By_HOD" => TrainingStatus::RejectedByHod,
            "Pending_HR" => TrainingStatus::PendingHr,
            "Approved_By_HR" => TrainingStatus::ApprovedByHr,
            "Rejected_By_HR" => TrainingStatus::RejectedByHr,
            "Pending_Admin" => TrainingStatus::PendingAdmin,
            "Approved_By_Admin" => TrainingStatus::ApprovedByAdmin,
            "Rejected_By_Admin" => TrainingStatus::RejectedByAdmin,
            "Cancelled" => TrainingStatus::Cancelled,
            other => TrainingStatus::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TrainingStatus::PendingManager => "Pending_Manager",
            TrainingStatus::ApprovedByManager => "Approved_By_Manager",
            TrainingStatus::RejectedByManager => "Rejected_By_Manager",
            TrainingStatus::PendingHod => "Pending_HOD",
            TrainingStatus::ApprovedByHod => "Approved_By_HOD",
            TrainingStatus::RejectedByHod => "Rejected_By_HOD",
            TrainingStatus::PendingHr => "Pending_HR",
            TrainingStatus::ApprovedByHr => "Approved_By_HR",
            TrainingStatus::RejectedByHr => "Rejected_By_HR",
            TrainingStatus::PendingAdmin => "Pending_Admin",
            TrainingStatus::ApprovedByAdmin => "Approved_By_Admin",
            TrainingStatus::RejectedByAdmin => "Rejected_By_Admin",
            TrainingStatus::Cancelled => "Cancelled",
            TrainingStatus::Unknown(raw) => raw,
        }
    }

    /// Human-readable label. Unknown statuses show their raw text with
    /// underscores turned into spaces.
    pub fn label(&self) -> String {
        let label = match self {
            TrainingStatus::PendingManager => "Pending Manager Review",
            TrainingStatus::ApprovedByManager => "Approved by Manager",
            TrainingStatus::RejectedByManager => "Rejected by Manager",
            TrainingStatus::PendingHod => "Pending HOD Review",
            TrainingStatus::ApprovedByHod => "Approved by HOD",
            TrainingStatus::RejectedByHod => "Rejected by HOD",
            TrainingStatus::PendingHr => "Pending HR Review",
            TrainingStatus::ApprovedByHr => "Approved by HR",
            TrainingStatus::RejectedByHr => "Rejected by HR",
            TrainingStatus::PendingAdmin => "Pending Admin Review",
            TrainingStatus::ApprovedByAdmin => "Approved by Admin",
            TrainingStatus::RejectedByAdmin => "Rejected by Admin",
            TrainingStatus::Cancelled => "Cancelled",
            TrainingStatus::Unknown(raw) if raw.trim().is_empty() => "Unknown",
            TrainingStatus::Unknown(raw) => return raw.replace('_', " "),
        };
        label.to_string()
    }

    pub fn badge(&self) -> Badge {
        match self {
            TrainingStatus::PendingManager => Badge::new(Tone::Yellow, 100, 700, 200),
            TrainingStatus::ApprovedByManager => Badge::new(Tone::Blue, 100, 700, 200),
            TrainingStatus::RejectedByManager => Badge::new(Tone::Red, 100, 700, 200),
            TrainingStatus::PendingHod => Badge::new(Tone::Yellow, 200, 800, 300),
            TrainingStatus::ApprovedByHod => Badge::new(Tone::Blue, 200, 800, 300),
            TrainingStatus::RejectedByHod => Badge::new(Tone::Red, 200, 800, 300),
            TrainingStatus::PendingHr => Badge::new(Tone::Yellow, 300, 900, 400),
            TrainingStatus::ApprovedByHr => Badge::new(Tone::Blue, 300, 900, 400),
            TrainingStatus::RejectedByHr => Badge::new(Tone::Red, 300, 900, 400),
            TrainingStatus::PendingAdmin => Badge::new(Tone::Yellow, 400, 900, 500),
            TrainingStatus::ApprovedByAdmin => Badge::new(Tone::Green, 100, 700, 200),
            TrainingStatus::RejectedByAdmin => Badge::new(Tone::Red, 100, 700, 200),
            TrainingStatus::Cancelled => Badge::new(Tone::Gray, 300, 700, 400),
            TrainingStatus::Unknown(_) => Badge::new(Tone::Gray, 100, 700, 200),
        }
    }

    /// Stage the status belongs to (pending at, approved by or rejected by)
    pub fn stage(&self) -> Option<Stage> {
        match self {
            TrainingStatus::PendingManager
            | TrainingStatus::ApprovedByManager
            | TrainingStatus::RejectedByManager => Some(Stage::Manager),
            TrainingStatus::PendingHod
            | TrainingStatus::ApprovedByHod
            | TrainingStatus::RejectedByHod => Some(Stage::Hod),
            TrainingStatus::PendingHr
            | TrainingStatus::ApprovedByHr
            | TrainingStatus::RejectedByHr => Some(Stage::Hr),
            TrainingStatus::PendingAdmin
            | TrainingStatus::ApprovedByAdmin
            | TrainingStatus::RejectedByAdmin => Some(Stage::Admin),
            TrainingStatus::Cancelled | TrainingStatus::Unknown(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            TrainingStatus::PendingManager
                | TrainingStatus::PendingHod
                | TrainingStatus::PendingHr
                | TrainingStatus::PendingAdmin
        )
    }

    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            TrainingStatus::RejectedByManager
                | TrainingStatus::RejectedByHod
                | TrainingStatus::RejectedByHr
                | TrainingStatus::RejectedByAdmin
        )
    }

    /// No further review will surface the request
    pub fn is_terminal(&self) -> bool {
        self.is_rejected()
            || matches!(
                self,
                TrainingStatus::ApprovedByAdmin | TrainingStatus::Cancelled
            )
    }

    /// Position in the forward-only chain; unknown statuses have none.
    pub fn rank(&self) -> Option<usize> {
        Self::KNOWN[..12].iter().position(|s| s == self)
    }
}

impl From<String> for TrainingStatus {
    fn from(s: String) -> Self {
        TrainingStatus::parse(&s)
    }
}

impl From<TrainingStatus> for String {
    fn from(status: TrainingStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
