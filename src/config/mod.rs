use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL, including the `/api` prefix
    #[serde(default = "default_base_url", alias = "apiBaseUrl")]
    pub base_url: String,
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How the session token is written into the Authorization header
    #[serde(default)]
    pub auth_scheme: AuthScheme,
    /// Base URL profile images are served from
    #[serde(default = "default_uploads_url")]
    pub uploads_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            auth_scheme: AuthScheme::default(),
            uploads_url: default_uploads_url(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "https://tna-backend.onrender.com/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_uploads_url() -> String {
    "http://localhost:5000/uploads".to_string()
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `Authorization: <token>`
    Raw,
}

impl AuthScheme {
    pub fn header_value(&self, token: &str) -> String {
        match self {
            AuthScheme::Bearer => format!("Bearer {}", token),
            AuthScheme::Raw => token.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// File the signed-in session is kept in between invocations
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

fn default_session_path() -> PathBuf {
    PathBuf::from(".tna-session.json")
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    /// Delay before the redirect that follows a successful submission
    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,
    /// How long a notification stays queued before it expires
    #[serde(default = "default_notification_ttl_ms")]
    pub notification_ttl_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            redirect_delay_ms: default_redirect_delay_ms(),
            notification_ttl_ms: default_notification_ttl_ms(),
        }
    }
}

impl UiConfig {
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }
}

fn default_redirect_delay_ms() -> u64 {
    2000
}

fn default_notification_ttl_ms() -> u64 {
    3000
}

/// Behaviour switches for the points where the portal's views used to disagree
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub decision_sync: DecisionSync,
    #[serde(default)]
    pub owner_edit: OwnerEditPolicy,
    #[serde(default = "default_admin_already_mapped")]
    pub admin_already_mapped: AlreadyMappedPolicy,
    #[serde(default = "default_hod_already_mapped")]
    pub hod_already_mapped: AlreadyMappedPolicy,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            decision_sync: DecisionSync::default(),
            owner_edit: OwnerEditPolicy::default(),
            admin_already_mapped: default_admin_already_mapped(),
            hod_already_mapped: default_hod_already_mapped(),
        }
    }
}

fn default_admin_already_mapped() -> AlreadyMappedPolicy {
    AlreadyMappedPolicy::Allow
}

fn default_hod_already_mapped() -> AlreadyMappedPolicy {
    AlreadyMappedPolicy::Refuse
}

/// How a review list catches up after a decision
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSync {
    /// Stage queues drop the decided item; the admin list swaps in the server's copy
    #[default]
    Reconcile,
    /// Every list reloads from the server
    Refetch,
}

/// Whether a submitter may still edit or delete their own request
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OwnerEditPolicy {
    /// Edit and delete are always offered
    #[default]
    Always,
    /// Only while the request is waiting at some stage
    UntilReviewed,
}

/// Whether mapping an employee who already has a manager is attempted
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlreadyMappedPolicy {
    /// Send the request and let the server decide
    Allow,
    /// Refuse locally with an alert
    Refuse,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config =
                toml::from_str(&content).with_context(|| "Failed to parse configuration file")?;
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://tna-backend.onrender.com/api");
        assert_eq!(config.api.auth_scheme, AuthScheme::Bearer);
        assert_eq!(config.ui.redirect_delay(), Duration::from_secs(2));
        assert_eq!(config.policy.decision_sync, DecisionSync::Reconcile);
        assert_eq!(config.policy.owner_edit, OwnerEditPolicy::Always);
        assert_eq!(config.policy.admin_already_mapped, AlreadyMappedPolicy::Allow);
    }

    #[test]
    fn test_parse_full_file() {
        let config: Config = toml::from_str(
            r#"
            [api]
            apiBaseUrl = "http://localhost:5000/api"
            auth_scheme = "raw"

            [policy]
            decision_sync = "refetch"
            owner_edit = "until_reviewed"
            admin_already_mapped = "refuse"

            [ui]
            redirect_delay_ms = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        assert_eq!(config.api.auth_scheme, AuthScheme::Raw);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.policy.decision_sync, DecisionSync::Refetch);
        assert_eq!(config.policy.owner_edit, OwnerEditPolicy::UntilReviewed);
        assert_eq!(config.policy.admin_already_mapped, AlreadyMappedPolicy::Refuse);
        assert_eq!(config.policy.hod_already_mapped, AlreadyMappedPolicy::Refuse);
        assert_eq!(config.ui.redirect_delay_ms, 0);
    }

    #[test]
    fn test_missing_sections_use_mapping_defaults() {
        let config: Config = toml::from_str("[policy]\n").unwrap();
        assert_eq!(config.policy.admin_already_mapped, AlreadyMappedPolicy::Allow);
        assert_eq!(config.policy.hod_already_mapped, AlreadyMappedPolicy::Refuse);
    }

    #[test]
    fn test_auth_header_value() {
        assert_eq!(AuthScheme::Bearer.header_value("abc"), "Bearer abc");
        assert_eq!(AuthScheme::Raw.header_value("abc"), "abc");
    }

    #[test]
    fn test_load_missing_file() {
        let config = Config::load(Path::new("/definitely/not/here.toml")).unwrap();
        assert_eq!(config.logging.level, "info");
    }
}
