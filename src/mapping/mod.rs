//! Employee-to-manager mapping editor.
//!
//! Admins map across every department; a HOD only sees their own
//! department. Both variants need a selected manager before anything is
//! sent, and each has its own policy for employees that already report to
//! someone.

use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::access::Role;
use crate::api::{User, UserSummary};
use crate::config::{AlreadyMappedPolicy, PolicyConfig};
use crate::error::PortalError;
use crate::session::Session;
use crate::Portal;

/// Who is editing, which decides the visible users
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingScope {
    Admin,
    Hod { department: String },
}

impl MappingScope {
    pub fn for_session(session: &Session) -> Result<Self, PortalError> {
        match session.role {
            Some(Role::Admin) => Ok(MappingScope::Admin),
            Some(Role::Hod) => Ok(MappingScope::Hod {
                department: session.department.clone(),
            }),
            _ => Err(PortalError::NotPermitted(
                "only admins and HODs edit the mapping".to_string(),
            )),
        }
    }

    pub fn already_mapped_policy(&self, policy: &PolicyConfig) -> AlreadyMappedPolicy {
        match self {
            MappingScope::Admin => policy.admin_already_mapped,
            MappingScope::Hod { .. } => policy.hod_already_mapped,
        }
    }

    fn includes(&self, user: &User) -> bool {
        match self {
            MappingScope::Admin => user.role != Some(Role::Admin),
            MappingScope::Hod { department } => &user.department == department,
        }
    }

    fn messages(&self) -> Messages {
        match self {
            MappingScope::Admin => Messages {
                mapped: "Mapped successfully",
                map_failed: "Failed to map",
                unmapped: "Unmapped successfully",
                unmap_failed: "Failed to unmap",
            },
            MappingScope::Hod { .. } => Messages {
                mapped: "Mapping updated",
                map_failed: "Mapping failed",
                unmapped: "Employee unmapped from manager",
                unmap_failed: "Failed to unmap employee",
            },
        }
    }
}

struct Messages {
    mapped: &'static str,
    map_failed: &'static str,
    unmapped: &'static str,
    unmap_failed: &'static str,
}

#[derive(Debug, Clone)]
pub struct MappingEditor {
    scope: MappingScope,
    users: Vec<User>,
    department: Option<String>,
    manager: Option<String>,
    mapped: Vec<UserSummary>,
}

impl MappingEditor {
    pub fn new(scope: MappingScope) -> Self {
        let department = match &scope {
            MappingScope::Admin => None,
            MappingScope::Hod { department } => Some(department.clone()),
        };
        Self {
            scope,
            users: Vec::new(),
            department,
            manager: None,
            mapped: Vec::new(),
        }
    }

    pub fn for_portal(portal: &Portal) -> Result<Self, PortalError> {
        Ok(Self::new(MappingScope::for_session(portal.require_session()?)?))
    }

    pub fn scope(&self) -> &MappingScope {
        &self.scope
    }

    /// Fetch the users visible in this scope
    pub async fn load(&mut self, portal: &Portal) -> Result<(), PortalError> {
        match portal.api().users().await {
            Ok(users) => {
                self.users = users.into_iter().filter(|u| self.scope.includes(u)).collect();
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
            .filter(|d| !d.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    /// Pick the department to work in; clears the manager selection
    pub fn select_department(&mut self, department: &str) {
        self.department = Some(department.to_string());
        self.manager = None;
        self.mapped.clear();
    }

    fn in_department<'a>(&'a self, role: Role) -> impl Iterator<Item = &'a User> + 'a {
        self.users.iter().filter(move |u| {
            u.role == Some(role)
                && self
                    .department
                    .as_deref()
                    .map_or(true, |d| u.department == d)
        })
    }

    pub fn managers(&self) -> Vec<&User> {
        self.in_department(Role::Manager).collect()
    }

    pub fn employees(&self) -> Vec<&User> {
        self.in_department(Role::Employee).collect()
    }

    pub fn selected_manager(&self) -> Option<&str> {
        self.manager.as_deref()
    }

    pub fn mapped_employees(&self) -> &[UserSummary] {
        &self.mapped
    }

    /// Select a manager and fetch the employees mapped to them
    pub async fn select_manager(&mut self, portal: &Portal, manager_id: &str) -> Result<(), PortalError> {
        if !self.managers().iter().any(|m| m.id == manager_id) {
            return Err(PortalError::NotFound(format!("manager {}", manager_id)));
        }
        self.manager = Some(manager_id.to_string());
        self.refresh_mapped(portal).await;
        Ok(())
    }

    async fn refresh_mapped(&mut self, portal: &Portal) {
        let Some(manager_id) = self.manager.clone() else {
            return;
        };
        match portal.api().manager_employees(&manager_id).await {
            Ok(mapped) => self.mapped = mapped,
            Err(e) => warn!(manager_id = %manager_id, error = %e, "Failed to fetch mapped employees"),
        }
    }

    fn require_manager(&self, portal: &Portal) -> Result<String, PortalError> {
        self.manager.clone().ok_or_else(|| {
            portal.notifier().alert("Please select a manager first.");
            PortalError::NoManagerSelected
        })
    }

    /// Assign `employee_id` to the selected manager
    pub async fn map(&mut self, portal: &Portal, employee_id: &str) -> Result<(), PortalError> {
        let manager_id = self.require_manager(portal)?;
        let employee = self
            .users
            .iter()
            .find(|u| u.id == employee_id)
            .ok_or_else(|| PortalError::NotFound(format!("employee {}", employee_id)))?;

        let policy = self.scope.already_mapped_policy(&portal.config.policy);
        if policy == AlreadyMappedPolicy::Refuse && employee.has_manager() {
            let err = PortalError::AlreadyMapped(employee.name.clone());
            portal.notifier().alert(err.to_string());
            return Err(err);
        }

        let messages = self.scope.messages();
        if let Err(e) = portal.api().assign_manager(employee_id, &manager_id).await {
            portal.notifier().alert(messages.map_failed);
            return Err(e.into());
        }

        info!(employee_id, manager_id = %manager_id, "Employee mapped");
        portal.notifier().success(messages.mapped);
        self.refresh(portal).await;
        Ok(())
    }

    /// Remove `employee_id` from the selected manager
    pub async fn unmap(&mut self, portal: &Portal, employee_id: &str) -> Result<(), PortalError> {
        let manager_id = self.require_manager(portal)?;

        let messages = self.scope.messages();
        if let Err(e) = portal.api().unassign_manager(employee_id, &manager_id).await {
            portal.notifier().alert(messages.unmap_failed);
            return Err(e.into());
        }

        info!(employee_id, manager_id = %manager_id, "Employee unmapped");
        portal.notifier().success(messages.unmapped);
        self.refresh(portal).await;
        Ok(())
    }

    async fn refresh(&mut self, portal: &Portal) {
        if let Err(e) = self.load(portal).await {
            warn!(error = %e, "Failed to reload users after mapping change");
        }
        self.refresh_mapped(portal).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationKind;
    use crate::test_support::{session, StubBackend};
    use serde_json::{json, Value};

    fn users() -> Value {
        json!([
            {"_id": "m1", "name": "Mia", "role": "manager", "department": "IT"},
            {"_id": "m2", "name": "Max", "role": "manager", "department": "Finance"},
            {"_id": "e1", "name": "Ada", "role": "employee", "department": "IT", "manager": null},
            {"_id": "e2", "name": "Bo", "role": "employee", "department": "IT", "manager": "m1"},
            {"_id": "e3", "name": "Cy", "role": "employee", "department": "Finance"},
            {"_id": "a1", "name": "Root", "role": "admin", "department": "IT"}
        ])
    }

    async fn editor(backend: &StubBackend, role: &str) -> (Portal, MappingEditor) {
        backend.on("GET", "/auth/users", 200, users());
        let portal = backend.portal_with(backend.config(), Some(session(role, "Hana", "IT")));
        let mut editor = MappingEditor::for_portal(&portal).unwrap();
        editor.load(&portal).await.unwrap();
        (portal, editor)
    }

    #[tokio::test]
    async fn test_map_without_manager_sends_nothing() {
        let backend = StubBackend::start().await;
        let (portal, mut editor) = editor(&backend, "admin").await;

        let err = editor.map(&portal, "e1").await.unwrap_err();
        assert!(matches!(err, PortalError::NoManagerSelected));
        let err = editor.unmap(&portal, "e2").await.unwrap_err();
        assert!(matches!(err, PortalError::NoManagerSelected));

        assert_eq!(backend.count("PATCH", "/auth/users/e1/assign-manager"), 0);
        assert_eq!(backend.count("PATCH", "/auth/users/e2/unassign-manager"), 0);
        assert_eq!(
            portal.notifier().last_message(NotificationKind::Alert).as_deref(),
            Some("Please select a manager first.")
        );
    }

    #[tokio::test]
    async fn test_scopes_filter_users() {
        let backend = StubBackend::start().await;
        let (_portal, mut admin) = editor(&backend, "admin").await;
        assert_eq!(admin.users().len(), 5);
        assert_eq!(admin.departments(), vec!["Finance", "IT"]);
        assert_eq!(admin.managers().len(), 2);
        admin.select_department("Finance");
        assert_eq!(admin.employees()[0].id, "e3");

        let (_portal, hod) = editor(&backend, "hod").await;
        assert_eq!(hod.department(), Some("IT"));
        assert_eq!(hod.users().len(), 4);
        assert_eq!(hod.managers().len(), 1);
        assert_eq!(hod.employees().len(), 2);
    }

    #[tokio::test]
    async fn test_hod_refuses_already_mapped() {
        let backend = StubBackend::start().await;
        backend.on("GET", "/auth/users/manager/m1", 200, json!([{"_id": "e2", "name": "Bo"}]));
        let (portal, mut editor) = editor(&backend, "hod").await;

        editor.select_manager(&portal, "m1").await.unwrap();
        assert_eq!(editor.mapped_employees().len(), 1);

        let err = editor.map(&portal, "e2").await.unwrap_err();
        assert!(matches!(err, PortalError::AlreadyMapped(ref name) if name == "Bo"));
        assert_eq!(
            portal.notifier().last_message(NotificationKind::Alert).as_deref(),
            Some("Bo is already assigned to a manager.")
        );
        assert_eq!(backend.count("PATCH", "/auth/users/e2/assign-manager"), 0);
    }

    #[tokio::test]
    async fn test_admin_maps_and_refreshes() {
        let backend = StubBackend::start().await;
        backend.on("GET", "/auth/users/manager/m1", 200, json!([]));
        backend.on("PATCH", "/auth/users/e2/assign-manager", 200, json!({"msg": "ok"}));
        let (portal, mut editor) = editor(&backend, "admin").await;

        editor.select_department("IT");
        editor.select_manager(&portal, "m1").await.unwrap();
        backend.on("GET", "/auth/users/manager/m1", 200, json!([{"_id": "e2", "name": "Bo"}]));

        // Admin policy lets an already-mapped employee through to the server
        editor.map(&portal, "e2").await.unwrap();
        assert_eq!(
            backend.last_body("PATCH", "/auth/users/e2/assign-manager"),
            Some(json!({"managerId": "m1"}))
        );
        assert_eq!(editor.mapped_employees().len(), 1);
        assert_eq!(backend.count("GET", "/auth/users"), 2);
        assert_eq!(
            portal.notifier().last_message(NotificationKind::Success).as_deref(),
            Some("Mapped successfully")
        );
    }

    #[tokio::test]
    async fn test_unmap_failure_alerts() {
        let backend = StubBackend::start().await;
        backend.on("GET", "/auth/users/manager/m1", 200, json!([]));
        backend.on("PATCH", "/auth/users/e2/unassign-manager", 500, json!({}));
        let (portal, mut editor) = editor(&backend, "hod").await;

        editor.select_manager(&portal, "m1").await.unwrap();
        assert!(editor.unmap(&portal, "e2").await.is_err());
        assert_eq!(
            portal.notifier().last_message(NotificationKind::Alert).as_deref(),
            Some("Failed to unmap employee")
        );
    }

    #[test]
    fn test_scope_requires_mapping_role() {
        let employee = session("employee", "Ada", "IT");
        assert!(matches!(
            MappingScope::for_session(&employee),
            Err(PortalError::NotPermitted(_))
        ));
    }
}
