//! The signed-in user's own training requests.

use tracing::info;

use crate::access::{permitted_actions, Action, RequestView, Route};
use crate::api::TrainingRequest;
use crate::error::PortalError;
use crate::view::contains_ci;
use crate::Portal;

use super::TrainingStatus;

/// Search box plus status dropdown of the request tables.
///
/// The status filter only applies when the user picked one; review queues
/// are already filtered by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub term: String,
    pub status: Option<TrainingStatus>,
}

impl RequestFilter {
    pub fn matches(&self, request: &TrainingRequest) -> bool {
        let term_matches = contains_ci(request.display_number(), &self.term)
            || contains_ci(request.requester_name(), &self.term);
        let status_matches = self
            .status
            .as_ref()
            .map_or(true, |status| &request.status == status);
        term_matches && status_matches
    }

    pub fn apply<'a>(&self, requests: &'a [TrainingRequest]) -> Vec<&'a TrainingRequest> {
        requests.iter().filter(|r| self.matches(r)).collect()
    }
}

pub(crate) fn find<'a>(requests: &'a [TrainingRequest], id: &str) -> Option<&'a TrainingRequest> {
    requests.iter().find(|r| r.id == id)
}

/// "My requests" tab
#[derive(Debug, Clone, Default)]
pub struct MyRequests {
    requests: Vec<TrainingRequest>,
    pub filter: RequestFilter,
}

impl MyRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the caller's requests; on failure the current list is kept
    pub async fn load(&mut self, portal: &Portal) -> Result<(), PortalError> {
        match portal.api().my_training_requests().await {
            Ok(requests) => {
                info!(count = requests.len(), "Loaded own training requests");
                self.requests = requests;
                Ok(())
            }
            Err(e) => {
                portal
                    .notifier()
                    .alert("Failed to fetch your training requests");
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

    pub fn actions(&self, portal: &Portal, id: &str) -> Vec<Action> {
        self.get(id)
            .map(|r| {
                permitted_actions(RequestView::Mine, &r.status, portal.config.policy.owner_edit)
            })
            .unwrap_or_default()
    }

    fn require(&self, portal: &Portal, id: &str, action: Action) -> Result<(), PortalError> {
        let request = self
            .get(id)
            .ok_or_else(|| PortalError::NotFound(format!("training request {}", id)))?;
        if self.actions(portal, id).contains(&action) {
            Ok(())
        } else {
            Err(PortalError::NotPermitted(format!(
                "request {} is {}",
                request.display_number(),
                request.status.label()
            )))
        }
    }

    /// Route of the edit form for one request
    pub fn edit_route(&self, portal: &Portal, id: &str) -> Result<Route, PortalError> {
        self.require(portal, id, Action::Edit)?;
        Ok(Route::TrainingForm(id.to_string()))
    }

    /// Delete a request and drop it from the list
    pub async fn delete(&mut self, portal: &Portal, id: &str) -> Result<(), PortalError> {
        self.require(portal, id, Action::Delete)?;

        if let Err(e) = portal.api().delete_training_request(id).await {
            portal.notifier().alert("Failed to delete request");
            return Err(e.into());
        }

        self.requests.retain(|r| r.id != id);
        info!(id, "Training request deleted");
        portal.notifier().success("Request deleted successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OwnerEditPolicy;
    use crate::notifications::NotificationKind;
    use crate::test_support::{session, StubBackend};
    use serde_json::{json, Value};

    fn request(id: &str, number: &str, status: &str, name: &str) -> Value {
        json!({
            "_id": id,
            "requestNumber": number,
            "status": status,
            "user": {"_id": format!("u-{}", id), "name": name}
        })
    }

    fn parse(value: Value) -> TrainingRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_filter_term_and_status() {
        let requests = vec![
            parse(request("1", "TR-001", "Pending_Manager", "Ada Lovelace")),
            parse(request("2", "TR-002", "Approved_By_HOD", "Grace Hopper")),
        ];

        let mut filter = RequestFilter::default();
        assert_eq!(filter.apply(&requests).len(), 2);

        filter.term = "grace".to_string();
        assert_eq!(filter.apply(&requests)[0].id, "2");

        filter.term = "tr-00".to_string();
        filter.status = Some(TrainingStatus::PendingManager);
        let found = filter.apply(&requests);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }

    #[tokio::test]
    async fn test_load_and_delete() {
        let backend = StubBackend::start().await;
        backend.on(
            "GET",
            "/training-request/my-requests",
            200,
            json!([
                request("1", "TR-001", "Pending_Manager", "Ada"),
                request("2", "TR-002", "Approved_By_Admin", "Ada")
            ]),
        );
        backend.on("DELETE", "/training-request/1", 200, json!({"msg": "deleted"}));
        let portal = backend.portal("employee");

        let mut mine = MyRequests::new();
        mine.load(&portal).await.unwrap();
        assert_eq!(mine.requests().len(), 2);
        assert_eq!(
            mine.edit_route(&portal, "2").unwrap(),
            Route::TrainingForm("2".to_string())
        );

        mine.delete(&portal, "1").await.unwrap();
        assert_eq!(mine.requests().len(), 1);
        assert_eq!(backend.count("DELETE", "/training-request/1"), 1);
        assert_eq!(
            portal.notifier().last_message(NotificationKind::Success).as_deref(),
            Some("Request deleted successfully")
        );
    }

    #[tokio::test]
    async fn test_until_reviewed_policy_blocks_finished_requests() {
        let backend = StubBackend::start().await;
        backend.on(
            "GET",
            "/training-request/my-requests",
            200,
            json!([request("2", "TR-002", "Rejected_By_HR", "Ada")]),
        );
        let mut config = backend.config();
        config.policy.owner_edit = OwnerEditPolicy::UntilReviewed;
        let portal = backend.portal_with(config, Some(session("employee", "Ada", "IT")));

        let mut mine = MyRequests::new();
        mine.load(&portal).await.unwrap();
        assert_eq!(mine.actions(&portal, "2"), vec![Action::View]);
        assert!(matches!(
            mine.delete(&portal, "2").await,
            Err(PortalError::NotPermitted(_))
        ));
        assert_eq!(backend.count("DELETE", "/training-request/2"), 0);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_list() {
        let backend = StubBackend::start().await;
        backend.on(
            "GET",
            "/training-request/my-requests",
            200,
            json!([request("1", "TR-001", "Pending_Manager", "Ada")]),
        );
        backend.on("DELETE", "/training-request/1", 500, json!({}));
        let portal = backend.portal("employee");

        let mut mine = MyRequests::new();
        mine.load(&portal).await.unwrap();
        assert!(mine.delete(&portal, "1").await.is_err());
        assert_eq!(mine.requests().len(), 1);
        assert_eq!(
            portal.notifier().last_message(NotificationKind::Alert).as_deref(),
            Some("Failed to delete request")
        );
    }
}
