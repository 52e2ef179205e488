//! Portal routes and the login guard.

use reqwest::Url;

use super::Role;
use crate::session::Session;

/// Every screen of the portal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    ForgotPassword,
    ResetPassword(String),
    Dashboard,
    Admin,
    Manager,
    Hod,
    Hr,
    Profile,
    TrainingRequest,
    MyTrainingRequests,
    TrainingForm(String),
    Survey { id: String, edit: bool },
    Feedback,
    MyFeedbackResponses,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/".to_string(),
            Route::Register => "/register".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::ResetPassword(token) => format!("/reset-password/{}", token),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Admin => "/admin".to_string(),
            Route::Manager => "/manager".to_string(),
            Route::Hod => "/hod".to_string(),
            Route::Hr => "/hr".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::TrainingRequest => "/training-request".to_string(),
            Route::MyTrainingRequests => "/my-training-requests".to_string(),
            Route::TrainingForm(id) => format!("/training-form/{}", id),
            Route::Survey { id, edit: false } => format!("/survey/{}", id),
            Route::Survey { id, edit: true } => format!("/survey/{}?mode=edit", id),
            Route::Feedback => "/feedback".to_string(),
            Route::MyFeedbackResponses => "/my-feedback-responses".to_string(),
        }
    }

    /// Parse a path (with optional query string) back into a route.
    pub fn parse(path: &str) -> Option<Route> {
        let url = Url::parse("http://portal.local/").ok()?.join(path).ok()?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let route = match segments.as_slice() {
            [] => Route::Login,
            ["register"] => Route::Register,
            ["forgot-password"] => Route::ForgotPassword,
            ["reset-password", token] => Route::ResetPassword(token.to_string()),
            ["dashboard"] => Route::Dashboard,
            ["admin"] => Route::Admin,
            ["manager"] => Route::Manager,
            ["hod"] => Route::Hod,
            ["hr"] => Route::Hr,
            ["profile"] => Route::Profile,
            ["training-request"] => Route::TrainingRequest,
            ["my-training-requests"] => Route::MyTrainingRequests,
            ["training-form", id] => Route::TrainingForm(id.to_string()),
            ["survey", id] => Route::Survey {
                id: id.to_string(),
                edit: crate::survey::FillMode::from_query(url.query()).is_edit(),
            },
            ["feedback"] => Route::Feedback,
            ["my-feedback-responses"] => Route::MyFeedbackResponses,
            _ => return None,
        };
        Some(route)
    }

    /// Routes reachable without signing in
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Route::Login | Route::Register | Route::ForgotPassword | Route::ResetPassword(_)
        )
    }

    /// The role a panel route is reserved for, if any
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::Admin => Some(Role::Admin),
            Route::Manager => Some(Role::Manager),
            Route::Hod => Some(Role::Hod),
            Route::Hr => Some(Role::Hr),
            _ => None,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Check whether `session` may open `route`.
///
/// On refusal the route to redirect to is returned: the login page when no
/// one is signed in, otherwise the session's own landing route.
pub fn guard(route: &Route, session: Option<&Session>) -> Result<(), Route> {
    if route.is_public() {
        return Ok(());
    }

    let Some(session) = session else {
        return Err(Route::Login);
    };

    match route.required_role() {
        Some(required) if session.role != Some(required) => {
            Err(super::landing_route(session.role))
        }
        _ => Ok(()),
    }
}
