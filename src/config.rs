//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use url::Url;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub reddit: RedditConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 3000)
    pub port: u16,
    /// Public base URL the provider redirects back to (e.g., "https://vote.example.com")
    pub base_url: String,
    /// Directory of static assets served at the root path
    pub static_dir: String,
}

impl ServerConfig {
    /// OAuth redirect URI registered with the provider
    ///
    /// # Returns
    /// Full URL like "https://vote.example.com/auth/callback"
    pub fn callback_url(&self) -> String {
        format!("{}/auth/callback", self.base_url.trim_end_matches('/'))
    }

    pub fn is_https(&self) -> bool {
        self.base_url
            .get(..8)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("https://"))
    }
}

/// Reddit OAuth configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    pub profile_url: String,
    /// Requested scope (read-only identity)
    pub scope: String,
    /// Reddit refuses API calls without a descriptive User-Agent
    pub user_agent: String,
}

/// Session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session id
    pub cookie_name: String,
    /// Lifetime of a session from creation, in seconds (default: 3600)
    pub ttl_seconds: i64,
    /// Upper bound on sessions held in memory
    pub max_sessions: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (BALLOT_GATE__*)
    ///
    /// # Errors
    /// Returns error if provider credentials are missing or any value is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.base_url", "http://localhost:3000")?
            .set_default("server.static_dir", "public")?
            .set_default("reddit.authorize_url", "https://www.reddit.com/api/v1/authorize")?
            .set_default("reddit.token_url", "https://www.reddit.com/api/v1/access_token")?
            .set_default("reddit.profile_url", "https://oauth.reddit.com/api/v1/me")?
            .set_default("reddit.scope", "identity")?
            .set_default(
                "reddit.user_agent",
                concat!("web:ballot-gate:v", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("session.cookie_name", "ballot_gate_sid")?
            .set_default("session.ttl_seconds", 3600)?
            .set_default("session.max_sessions", 100_000)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("BALLOT_GATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub(crate) fn validate(&self) -> Result<(), crate::error::AppError> {
        use crate::error::AppError;

        if self.reddit.client_id.trim().is_empty() {
            return Err(AppError::Config(
                "reddit.client_id must not be empty".to_string(),
            ));
        }
        if self.reddit.client_secret.trim().is_empty() {
            return Err(AppError::Config(
                "reddit.client_secret must not be empty".to_string(),
            ));
        }

        match Url::parse(&self.server.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            _ => {
                return Err(AppError::Config(format!(
                    "server.base_url must be an absolute http(s) URL, got {:?}",
                    self.server.base_url
                )));
            }
        }

        for (key, value) in [
            ("reddit.authorize_url", &self.reddit.authorize_url),
            ("reddit.token_url", &self.reddit.token_url),
            ("reddit.profile_url", &self.reddit.profile_url),
        ] {
            Url::parse(value)
                .map_err(|e| AppError::Config(format!("{key} is not a valid URL: {e}")))?;
        }

        if self.session.ttl_seconds <= 0 {
            return Err(AppError::Config(
                "session.ttl_seconds must be greater than 0".to_string(),
            ));
        }
        if self.session.max_sessions == 0 {
            return Err(AppError::Config(
                "session.max_sessions must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
