//! Signed-in session.
//!
//! A session is created once from the token returned by `POST /auth/login`
//! and passed explicitly to the API client and to every route guard. The
//! CLI keeps it in a small JSON file between invocations; logging out
//! deletes that file.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::access::{deserialize_role, Role};
use crate::error::PortalError;

/// Claims the backend puts in the login token
#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default, alias = "_id")]
    id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_role")]
    role: Option<Role>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    department: Option<String>,
}

/// The signed-in user as seen by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user_id: Option<String>,
    /// `None` when the token carries a role this client does not know
    pub role: Option<Role>,
    pub name: String,
    pub department: String,
}

impl Session {
    /// Build a session from a login token.
    ///
    /// The signature is not checked here; the token is only opaque proof
    /// for the server, and its claims are read for display and routing.
    pub fn from_token(token: &str) -> Result<Self, PortalError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| PortalError::Session(format!("Invalid login token: {}", e)))?;
        let claims = data.claims;

        debug!(role = ?claims.role, "Decoded login token");

        Ok(Self {
            token: token.to_string(),
            user_id: claims.id,
            role: claims.role,
            name: claims.name.unwrap_or_default(),
            department: claims.department.unwrap_or_default(),
        })
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Employee"
        } else {
            &self.name
        }
    }
}

/// File-backed session storage
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session, if one exists
    pub fn load(&self) -> Result<Option<Session>, PortalError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let session = serde_json::from_str(&content)
            .map_err(|e| PortalError::Session(format!("Corrupt session file: {}", e)))?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<(), PortalError> {
        let content = serde_json::to_string_pretty(session)
            .map_err(|e| PortalError::Session(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        info!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    /// Forget the stored session (logout)
    pub fn clear(&self) -> Result<(), PortalError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            info!(path = %self.path.display(), "Session cleared");
        }
        Ok(())
    }
}
