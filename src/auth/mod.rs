//! Sign-in, registration and password recovery.

pub mod validation;

use std::path::PathBuf;
use tracing::{info, warn};

use crate::access::{landing_route, Redirect, Role, Route};
use crate::api::{ApiError, Registration};
use crate::error::{FieldErrors, PortalError};
use crate::profile::read_image;
use crate::session::{Session, SessionStore};
use crate::Portal;

pub use validation::{
    password_strength, validate_department, validate_password, PasswordStrength, DEPARTMENTS,
};

/// Report a failed call: the server's message, else `fallback`
fn report(portal: &Portal, error: ApiError, fallback: &str) -> PortalError {
    portal.notifier().error(error.message_or(fallback));
    error.into()
}

fn invalid(portal: &Portal, message: &str) -> PortalError {
    portal.notifier().error(message);
    PortalError::Validation(FieldErrors::message(message))
}

/// Sign in, persist the session and pick the landing route.
pub async fn login(
    portal: &mut Portal,
    store: &SessionStore,
    email: &str,
    password: &str,
) -> Result<Redirect, PortalError> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(invalid(portal, "Please fill in all fields"));
    }

    let token = match portal.api().login(email.trim(), password).await {
        Ok(token) => token,
        Err(e) => return Err(report(portal, e, "Login failed. Please try again.")),
    };

    let session = Session::from_token(&token)?;
    if session.role.is_none() {
        warn!("Login token carries an unknown role");
    }
    store.save(&session)?;
    let route = landing_route(session.role);
    info!(role = ?session.role, %route, "Signed in");
    portal.sign_in(session)?;
    Ok(Redirect::now(route))
}

/// Forget the session and return to the login page
pub fn logout(portal: &mut Portal, store: &SessionStore) -> Result<Redirect, PortalError> {
    store.clear()?;
    portal.sign_out()?;
    info!("Signed out");
    Ok(Redirect::now(Route::Login))
}

/// New-account form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
    pub department: String,
    pub location: String,
    /// Optional avatar file
    pub image: Option<PathBuf>,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            role: Role::Employee,
            department: String::new(),
            location: String::new(),
            image: None,
        }
    }
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), PortalError> {
        let missing = [
            &self.name,
            &self.email,
            &self.password,
            &self.confirm_password,
            &self.location,
        ]
        .iter()
        .any(|v| v.trim().is_empty())
            || self.department.is_empty();
        if missing {
            return FieldErrors::message("Please fill in all required fields").finish();
        }

        let mut errors = FieldErrors::new();
        if self.password != self.confirm_password {
            errors.add("confirmPassword", "Passwords do not match!");
        }
        if let Err(e) = validate_password(&self.password) {
            errors.add("password", e);
        }
        if let Err(e) = validate_department(&self.department) {
            errors.add("department", e);
        }
        // The first failing check is the one shown
        let first = ["confirmPassword", "password", "department"]
            .iter()
            .find_map(|field| errors.get(field).map(str::to_string));
        match first {
            Some(message) => errors.with_summary(message).finish(),
            None => Ok(()),
        }
    }

    pub fn strength(&self) -> Option<PasswordStrength> {
        password_strength(&self.password)
    }

    /// Create the account; the confirmation field is never sent
    pub async fn submit(&self, portal: &Portal) -> Result<Redirect, PortalError> {
        if let Err(e) = self.validate() {
            portal.notifier().error(e.to_string());
            return Err(e);
        }

        let image = match &self.image {
            Some(path) => match read_image(path).await {
                Ok(image) => Some(image),
                Err(e) => {
                    portal.notifier().error(e.to_string());
                    return Err(e);
                }
            },
            None => None,
        };

        let registration = Registration {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            role: self.role,
            department: self.department.clone(),
            location: self.location.trim().to_string(),
        };
        if let Err(e) = portal.api().register(&registration, image.as_ref()).await {
            return Err(report(portal, e, "Registration failed"));
        }

        info!(email = %registration.email, role = %registration.role, "Registered");
        portal
            .notifier()
            .success("Registration successful! Redirecting to login...");
        Ok(Redirect {
            route: Route::Login,
            tab: None,
            after: portal.redirect_delay(),
        })
    }
}

/// Ask for a reset link; returns the server's confirmation
pub async fn forgot_password(portal: &Portal, email: &str) -> Result<String, PortalError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(invalid(portal, "Please enter your email address"));
    }

    match portal.api().request_reset(email).await {
        Ok(response) => {
            let message = response
                .msg
                .unwrap_or_else(|| "Password reset link sent".to_string());
            portal.notifier().success(message.clone());
            Ok(message)
        }
        Err(e) => Err(report(portal, e, "Failed to send reset link")),
    }
}

/// Set a new password with the token from the reset link
pub async fn reset_password(
    portal: &Portal,
    token: &str,
    password: &str,
    confirm: &str,
) -> Result<Redirect, PortalError> {
    if password.trim().is_empty() {
        return Err(invalid(portal, "Please enter a password"));
    }
    if let Err(e) = validate_password(password) {
        return Err(invalid(portal, &e));
    }
    if password != confirm {
        return Err(invalid(portal, "Passwords do not match"));
    }

    match portal.api().reset_password(token, password).await {
        Ok(response) => {
            portal.notifier().success(
                response
                    .msg
                    .unwrap_or_else(|| "Password reset successful".to_string()),
            );
            Ok(Redirect {
                route: Route::Login,
                tab: None,
                after: portal.redirect_delay(),
            })
        }
        Err(e) => Err(report(portal, e, "Reset failed")),
    }
}
