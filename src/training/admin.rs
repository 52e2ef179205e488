//! Admin view over every training request.

use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::access::{permitted_actions, Action, RequestView};
use crate::api::TrainingRequest;
use crate::config::DecisionSync;
use crate::error::PortalError;
use crate::view::contains_ci;
use crate::Portal;

use super::requests::find;
use super::{Decision, Stage};

/// Client-side filters of the admin list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminFilter {
    /// Exact department (case-insensitive); empty means any
    pub department: String,
    pub name: String,
    pub email: String,
    pub location: String,
}

impl AdminFilter {
    pub fn matches(&self, request: &TrainingRequest) -> bool {
        let user = request.requester().cloned().unwrap_or_default();
        let department = self.department.trim();
        (department.is_empty() || user.department.eq_ignore_ascii_case(department))
            && contains_ci(&user.name, &self.name)
            && contains_ci(&user.email, &self.email)
            && contains_ci(&user.location, &self.location)
    }
}

/// The admin "training" tab
#[derive(Debug, Clone, Default)]
pub struct AdminTrainingView {
    requests: Vec<TrainingRequest>,
    filter: AdminFilter,
    lookup: Option<TrainingRequest>,
}

impl AdminTrainingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, portal: &Portal) -> Result<(), PortalError> {
        match portal.api().review_queue(Stage::Admin).await {
            Ok(requests) => {
                info!(count = requests.len(), "Loaded all training requests");
                self.requests = requests;
                Ok(())
            }
            Err(e) => {
                portal.notifier().alert("Failed to fetch training requests");
                Err(e.into())
            }
        }
    }

    pub fn requests(&self) -> &[TrainingRequest] {
        &self.requests
    }

    pub fn filter(&self) -> &AdminFilter {
        &self.filter
    }

    /// Change the filters; any change drops the id lookup result
    pub fn set_filter(&mut self, filter: AdminFilter) {
        if filter != self.filter {
            self.lookup = None;
        }
        self.filter = filter;
    }

    pub fn lookup_result(&self) -> Option<&TrainingRequest> {
        self.lookup.as_ref()
    }

    pub fn clear_lookup(&mut self) {
        self.lookup = None;
    }

    /// Look a request up by exact id; the result replaces the filtered list.
    ///
    /// A blank id only clears the previous result.
    pub async fn lookup(&mut self, portal: &Portal, id: &str) -> Result<(), PortalError> {
        let id = id.trim();
        if id.is_empty() {
            self.lookup = None;
            return Ok(());
        }

        match portal.api().admin_training_request(id).await {
            Ok(request) => {
                self.lookup = Some(request);
                Ok(())
            }
            Err(e) => {
                self.lookup = None;
                portal.notifier().alert("Request not found");
                Err(e.into())
            }
        }
    }

    /// Lookup result when there is one, else the filtered list
    pub fn visible(&self) -> Vec<&TrainingRequest> {
        match &self.lookup {
            Some(found) => vec![found],
            None => self
                .requests
                .iter()
                .filter(|r| self.filter.matches(r))
                .collect(),
        }
    }

    /// Departments present in the list, for the department dropdown
    pub fn departments(&self) -> Vec<String> {
        self.requests
            .iter()
            .filter_map(|r| r.requester())
            .map(|u| u.department.clone())
            .filter(|d| !d.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn get(&self, id: &str) -> Option<&TrainingRequest> {
        self.lookup
            .as_ref()
            .filter(|r| r.id == id)
            .or_else(|| find(&self.requests, id))
    }

    pub fn actions(&self, portal: &Portal, id: &str) -> Vec<Action> {
        self.get(id)
            .map(|r| permitted_actions(RequestView::All, &r.status, portal.config.policy.owner_edit))
            .unwrap_or_default()
    }

    /// Approve or reject at the admin stage, whatever the current status.
    ///
    /// Afterwards the decided request is replaced by the server's copy, or
    /// the whole list is reloaded under the refetch policy.
    pub async fn decide(
        &mut self,
        portal: &Portal,
        id: &str,
        decision: Decision,
    ) -> Result<(), PortalError> {
        if self.get(id).is_none() {
            return Err(PortalError::NotFound(format!("training request {}", id)));
        }

        if let Err(e) = portal.api().decide(Stage::Admin, id, decision).await {
            portal.notifier().alert("Failed to update status");
            return Err(e.into());
        }

        info!(id, decision = decision.past_tense(), "Admin decision recorded");
        portal
            .notifier()
            .success(format!("Request {} successfully!", decision.past_tense()));

        if portal.config.policy.decision_sync == DecisionSync::Reconcile {
            match portal.api().admin_training_request(id).await {
                Ok(updated) => {
                    self.replace(updated);
                    return Ok(());
                }
                Err(e) => warn!(id, error = %e, "Could not fetch decided request, reloading list"),
            }
        }

        // The decision stands even when the reload fails
        if let Err(e) = self.load(portal).await {
            warn!(id, error = %e, "List reload failed after decision");
            return Ok(());
        }
        if let Some(fresh) = self
            .lookup
            .as_ref()
            .and_then(|l| find(&self.requests, &l.id))
            .cloned()
        {
            self.lookup = Some(fresh);
        }
        Ok(())
    }

    fn replace(&mut self, updated: TrainingRequest) {
        if let Some(slot) = self.requests.iter_mut().find(|r| r.id == updated.id) {
            *slot = updated.clone();
        }
        if let Some(lookup) = self.lookup.as_mut().filter(|l| l.id == updated.id) {
            *lookup = updated;
        }
    }
}
