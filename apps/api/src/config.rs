//! API configuration module.
//!
//! ## Configuration Priority (highest to lowest)
//! 1. Environment variables (after `.env` is loaded)
//! 2. TOML file (path from `INGREVENTORY_CONFIG`)
//! 3. Default values
//!
//! ## Example Config File
//! ```toml
//! environment = "production"
//!
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8000
//! api_prefix = "/api"
//!
//! [database]
//! path = "/var/lib/ingreventory/ingreventory.db"
//!
//! [auth]
//! jwt_secret = "change-me"
//!
//! [fulfillment]
//! compensate_on_failure = true
//! ```

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Secret used when nothing else is configured. Refused in production.
pub const DEV_JWT_SECRET: &str = "ingreventory-dev-secret-change-in-production";

// =============================================================================
// Config Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Prefix every route is mounted under.
    pub api_prefix: String,
    /// Origins allowed by CORS. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8000,
            api_prefix: "/api".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("ingreventory.db"),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Token lifetime in seconds (default: 30 days).
    pub token_lifetime_secs: i64,
    /// Password-reset code lifetime in seconds (default: 15 minutes).
    pub reset_code_lifetime_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_lifetime_secs: 30 * 24 * 3600,
            reset_code_lifetime_secs: 15 * 60,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FulfillmentConfig {
    /// Reverse applied decrements when a shipment fails part way.
    pub compensate_on_failure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct XenditConfig {
    /// Fallback secret key when the request does not carry one.
    pub secret_key: Option<String>,
    pub base_url: String,
    /// Storefront URL used for the payment redirect pages.
    pub frontend_url: String,
}

impl Default for XenditConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            base_url: "https://api.xendit.co".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FacebookConfig {
    pub pixel_id: Option<String>,
    pub access_token: Option<String>,
    pub graph_api_version: String,
    pub base_url: String,
    /// Used when an event carries no source URL.
    pub default_event_source_url: String,
}

impl Default for FacebookConfig {
    fn default() -> Self {
        Self {
            pixel_id: None,
            access_token: None,
            graph_api_version: "v19.0".to_string(),
            base_url: "https://graph.facebook.com".to_string(),
            default_event_source_url: "https://ingreventory.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    pub api_token: Option<String>,
    pub base_url: String,
    /// Subscriber group the reset campaign is sent to.
    pub group_id: String,
    pub from_name: String,
    pub reply_to: String,
    /// Seconds before the one-off campaign and subscriber are removed again.
    pub cleanup_after_secs: u64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: "https://api.sender.net/v2".to_string(),
            group_id: "dB9pnx".to_string(),
            from_name: "Ingreventory".to_string(),
            reply_to: "admin@ingreventory.com".to_string(),
            cleanup_after_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    pub xendit: XenditConfig,
    pub facebook: FacebookConfig,
    pub sender: SenderConfig,
}

// =============================================================================
// ApiConfig
// =============================================================================

/// Complete API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// `development`, `test` or `production`.
    pub environment: String,
    /// Include error details in failure envelopes. Unset means "everywhere
    /// except production".
    pub expose_error_details: Option<bool>,
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub auth: AuthConfig,
    pub fulfillment: FulfillmentConfig,
    pub integrations: IntegrationsConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            expose_error_details: None,
            server: ServerConfig::default(),
            database: DatabaseSettings::default(),
            auth: AuthConfig::default(),
            fulfillment: FulfillmentConfig::default(),
            integrations: IntegrationsConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration: defaults, then the TOML file, then environment
    /// overrides, then validation.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(|| env::var("INGREVENTORY_CONFIG").ok().map(PathBuf::from)) {
            if path.exists() {
                info!(?path, "Loading API config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Configuration for tests: in-memory friendly defaults, details exposed.
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            expose_error_details: Some(true),
            auth: AuthConfig {
                jwt_secret: "test-secret".to_string(),
                ..AuthConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn exposes_error_details(&self) -> bool {
        self.expose_error_details.unwrap_or(!self.is_production())
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.server.bind_addr, self.server.port)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(environment) = env::var("APP_ENV") {
            self.environment = environment;
        }
        if let Some(expose) = parse_env::<bool>("EXPOSE_ERROR_DETAILS")? {
            self.expose_error_details = Some(expose);
        }

        if let Ok(addr) = env::var("BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(port) = parse_env::<u16>("PORT")? {
            self.server.port = port;
        }
        if let Ok(prefix) = env::var("API_PREFIX") {
            self.server.api_prefix = prefix;
        }
        if let Ok(origins) = env::var("CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();
        }

        if let Ok(path) = env::var("DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(max) = parse_env::<u32>("DATABASE_MAX_CONNECTIONS")? {
            self.database.max_connections = max;
        }

        if let Ok(secret) = env::var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(lifetime) = parse_env::<i64>("JWT_LIFETIME_SECS")? {
            self.auth.token_lifetime_secs = lifetime;
        }

        if let Some(compensate) = parse_env::<bool>("COMPENSATE_ON_FAILURE")? {
            self.fulfillment.compensate_on_failure = compensate;
        }

        let integrations = &mut self.integrations;
        if let Ok(key) = env::var("XENDIT_SECRET_KEY") {
            integrations.xendit.secret_key = Some(key);
        }
        if let Ok(url) = env::var("FRONTEND_URL") {
            integrations.xendit.frontend_url = url;
        }
        if let Ok(pixel) = env::var("FB_PIXEL_ID") {
            integrations.facebook.pixel_id = Some(pixel);
        }
        if let Ok(token) = env::var("FB_ACCESS_TOKEN") {
            integrations.facebook.access_token = Some(token);
        }
        if let Ok(version) = env::var("FB_GRAPH_API_VERSION") {
            integrations.facebook.graph_api_version = version;
        }
        if let Ok(token) = env::var("SENDER_NET_API_KEY") {
            integrations.sender.api_token = Some(token);
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.server.api_prefix.is_empty() && !self.server.api_prefix.starts_with('/') {
            return Err(ConfigError::InvalidValue(format!(
                "server.api_prefix must start with '/', got: {}",
                self.server.api_prefix
            )));
        }
        if self.server.api_prefix.len() > 1 && self.server.api_prefix.ends_with('/') {
            return Err(ConfigError::InvalidValue(
                "server.api_prefix must not end with '/'".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("auth.jwt_secret".to_string()));
        }
        if self.is_production() && self.auth.jwt_secret == DEV_JWT_SECRET {
            return Err(ConfigError::InsecureSecret);
        }
        if self.auth.token_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "auth.token_lifetime_secs must be positive".to_string(),
            ));
        }
        if self.auth.reset_code_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "auth.reset_code_lifetime_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(None),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("The development JWT secret cannot be used in production")]
    InsecureSecret,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.api_prefix, "/api");
        assert!(!config.fulfillment.compensate_on_failure);
        assert!(config.exposes_error_details());
    }

    #[test]
    fn test_production_hides_details_and_rejects_dev_secret() {
        let config = ApiConfig {
            environment: "production".to_string(),
            ..ApiConfig::default()
        };

        assert!(!config.exposes_error_details());
        assert!(matches!(config.validate(), Err(ConfigError::InsecureSecret)));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ApiConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [fulfillment]
            compensate_on_failure = true
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.api_prefix, "/api");
        assert!(config.fulfillment.compensate_on_failure);
        assert_eq!(config.integrations.facebook.graph_api_version, "v19.0");
    }

    #[test]
    fn test_prefix_must_be_rooted() {
        let mut config = ApiConfig::default();
        config.server.api_prefix = "api".to_string();
        assert!(config.validate().is_err());
    }
}
