//! Stage review queues for managers, HODs and HR.

use tracing::{info, warn};

use crate::access::{permitted_actions, Action, RequestView};
use crate::api::TrainingRequest;
use crate::config::DecisionSync;
use crate::error::PortalError;
use crate::Portal;

use super::requests::{find, RequestFilter};
use super::{Decision, Stage};

fn load_failed(stage: Stage) -> &'static str {
    match stage {
        Stage::Manager => "Failed to fetch requests",
        Stage::Hod => "Failed to load HOD review requests",
        Stage::Hr => "Failed to load HR review requests",
        Stage::Admin => "Failed to fetch training requests",
    }
}

fn decision_failed(stage: Stage) -> &'static str {
    match stage {
        Stage::Manager => "Failed to update request",
        _ => "Failed to update status",
    }
}

/// Requests waiting on one stage.
///
/// The list is whatever the stage endpoint returns; it is never filtered
/// again by status on this side.
#[derive(Debug, Clone)]
pub struct ReviewQueue {
    stage: Stage,
    requests: Vec<TrainingRequest>,
    pub filter: RequestFilter,
}

impl ReviewQueue {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            requests: Vec::new(),
            filter: RequestFilter::default(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub async fn load(&mut self, portal: &Portal) -> Result<(), PortalError> {
        match portal.api().review_queue(self.stage).await {
            Ok(requests) => {
                info!(stage = %self.stage, count = requests.len(), "Loaded review queue");
                self.requests = requests;
                Ok(())
            }
            Err(e) => {
                portal.notifier().alert(load_failed(self.stage));
                Err(e.into())
            }
        }
    }

    pub fn requests(&self) -> &[TrainingRequest] {
        &self.requests
    }

    pub fn visible(&self) -> Vec<&TrainingRequest> {
        self.filter.apply(&self.requests)
    }

    pub fn get(&self, id: &str) -> Option<&TrainingRequest> {
        find(&self.requests, id)
    }

    pub fn actions(&self, id: &str, portal: &Portal) -> Vec<Action> {
        self.get(id)
            .map(|r| {
                permitted_actions(
                    RequestView::Review(self.stage),
                    &r.status,
                    portal.config.policy.owner_edit,
                )
            })
            .unwrap_or_default()
    }

    /// Send a decision for a queued request.
    ///
    /// On success the queue catches up according to the decision-sync
    /// policy; on failure it is left exactly as it was.
    pub async fn decide(
        &mut self,
        portal: &Portal,
        id: &str,
        decision: Decision,
    ) -> Result<(), PortalError> {
        if self.get(id).is_none() {
            return Err(PortalError::NotFound(format!("training request {}", id)));
        }

        if let Err(e) = portal.api().decide(self.stage, id, decision).await {
            portal.notifier().alert(decision_failed(self.stage));
            return Err(e.into());
        }

        info!(stage = %self.stage, id, decision = decision.past_tense(), "Decision recorded");
        portal
            .notifier()
            .success(format!("Request {} successfully!", decision.past_tense()));

        // The decision stands even when the reload fails
        if portal.config.policy.decision_sync == DecisionSync::Refetch {
            match self.load(portal).await {
                Ok(()) => return Ok(()),
                Err(e) => warn!(stage = %self.stage, id, error = %e, "Queue reload failed after decision"),
            }
        }
        self.requests.retain(|r| r.id != id);
        Ok(())
    }
}
