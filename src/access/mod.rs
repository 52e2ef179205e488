//! Role model, route table and the permitted-action table shared by every view.

mod role;
mod route;

pub use role::{deserialize_lenient as deserialize_role, landing_route, Role};
pub use route::{guard, Route};

use std::time::Duration;

use crate::config::OwnerEditPolicy;
use crate::dashboard::Tab;
use crate::training::{Stage, TrainingStatus};

/// Navigation a flow asks for once it has finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub route: Route,
    /// Dashboard tab to open on arrival
    pub tab: Option<Tab>,
    /// How long the success message stays up before navigating
    pub after: Duration,
}

impl Redirect {
    pub fn now(route: Route) -> Self {
        Self {
            route,
            tab: None,
            after: Duration::ZERO,
        }
    }
}

/// Actions a view may offer on a training request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    Edit,
    Delete,
    Approve,
    Reject,
}

/// The list a training request is shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestView {
    /// The signed-in user's own requests
    Mine,
    /// A stage review queue
    Review(Stage),
    /// The admin list of every request
    All,
}

/// Actions offered for a request with `status` in `view`.
///
/// Review queues are filtered by the server, so an item present in a queue
/// is always decidable there; the admin list may decide at any stage.
pub fn permitted_actions(
    view: RequestView,
    status: &TrainingStatus,
    owner_edit: OwnerEditPolicy,
) -> Vec<Action> {
    match view {
        RequestView::Mine => {
            let editable = match owner_edit {
                OwnerEditPolicy::Always => true,
                OwnerEditPolicy::UntilReviewed => status.is_pending(),
            };
            if editable {
                vec![Action::View, Action::Edit, Action::Delete]
            } else {
                vec![Action::View]
            }
        }
        RequestView::Review(_) | RequestView::All => {
            vec![Action::View, Action::Approve, Action::Reject]
        }
    }
}

/// Stage whose review queue a role works through, if any
pub fn review_stage(role: Role) -> Option<Stage> {
    match role {
        Role::Manager => Some(Stage::Manager),
        Role::Hod => Some(Stage::Hod),
        Role::Hr => Some(Stage::Hr),
        Role::Admin => Some(Stage::Admin),
        Role::Employee => None,
    }
}
