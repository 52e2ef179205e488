//! Portal roles.

use serde::{Deserialize, Deserializer, Serialize};

use super::Route;

/// Roles a portal account can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Submits training requests and answers assigned surveys
    Employee,
    /// First reviewer; owns requests from mapped employees
    Manager,
    /// Head of department; second reviewer, maps employees in their department
    Hod,
    /// Third reviewer
    Hr,
    /// Final reviewer; authors surveys and maps employees across departments
    Admin,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Employee,
        Role::Manager,
        Role::Hod,
        Role::Hr,
        Role::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Manager => "manager",
            Role::Hod => "hod",
            Role::Hr => "hr",
            Role::Admin => "admin",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Role::Employee => "Employee",
            Role::Manager => "Manager",
            Role::Hod => "HOD",
            Role::Hr => "HR",
            Role::Admin => "Admin",
        }
    }

    /// Route a user of this role lands on after login and after finishing a flow
    pub fn landing_route(&self) -> Route {
        match self {
            Role::Employee => Route::Dashboard,
            Role::Manager => Route::Manager,
            Role::Hod => Route::Hod,
            Role::Hr => Route::Hr,
            Role::Admin => Route::Admin,
        }
    }

    /// Only employees and managers report to a manager
    pub fn can_have_manager(&self) -> bool {
        matches!(self, Role::Employee | Role::Manager)
    }

    /// Roles allowed to edit the employee-manager mapping
    pub fn can_edit_mapping(&self) -> bool {
        matches!(self, Role::Admin | Role::Hod)
    }

    pub fn can_author_surveys(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "employee" => Ok(Role::Employee),
            "manager" => Ok(Role::Manager),
            "hod" => Ok(Role::Hod),
            "hr" => Ok(Role::Hr),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Landing route for an optional role. Unrecognised or missing roles go to the login page.
pub fn landing_route(role: Option<Role>) -> Route {
    role.map(|r| r.landing_route()).unwrap_or(Route::Login)
}

/// Deserialize a role string, mapping unknown values to `None` instead of failing.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}
