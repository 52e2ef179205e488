pub mod access;
pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod mapping;
pub mod notifications;
pub mod profile;
pub mod session;
pub mod survey;
pub mod training;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{FieldErrors, PortalError};

use std::time::Duration;

use access::{landing_route, Redirect, Role};
use api::{ApiClient, ApiError};
use config::Config;
use dashboard::Tab;
use notifications::Notifier;
use session::Session;

/// Everything a view needs: configuration, the gateway client, the
/// notification queue and the signed-in session.
pub struct Portal {
    pub config: Config,
    api: ApiClient,
    notifier: Notifier,
    session: Option<Session>,
}

impl Portal {
    pub fn new(config: Config, session: Option<Session>) -> Result<Self, PortalError> {
        let api = ApiClient::new(&config.api, session.as_ref())?;
        let notifier = Notifier::new(config.ui.notification_ttl());
        Ok(Self {
            config,
            api,
            notifier,
            session,
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn require_session(&self) -> Result<&Session, PortalError> {
        self.session
            .as_ref()
            .ok_or(PortalError::Api(ApiError::NotSignedIn))
    }

    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().and_then(|s| s.role)
    }

    /// Replace the session and rebuild the client around its token
    pub fn sign_in(&mut self, session: Session) -> Result<(), PortalError> {
        self.api = ApiClient::new(&self.config.api, Some(&session))?;
        self.session = Some(session);
        Ok(())
    }

    pub fn sign_out(&mut self) -> Result<(), PortalError> {
        self.api = ApiClient::new(&self.config.api, None)?;
        self.session = None;
        Ok(())
    }

    pub fn redirect_delay(&self) -> Duration {
        self.config.ui.redirect_delay()
    }

    /// Delayed redirect to the signed-in role's landing route
    pub fn landing_redirect(&self, tab: Option<Tab>) -> Redirect {
        Redirect {
            route: landing_route(self.role()),
            tab,
            after: self.redirect_delay(),
        }
    }
}
