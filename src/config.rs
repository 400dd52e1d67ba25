//! Configuration module for the gatekeeper.
//!
//! Loads configuration from YAML files and environment variables.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

use crate::auth::cipher;
use crate::logging::LoggingConfig;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Secrets and policy for request authentication.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared secret expected in `x-token` from internal services.
    pub service_token: String,
    /// Hex-encoded AES key for encrypted API keys.
    pub api_encryption_key: String,
    /// HMAC secret for bearer JWTs.
    pub jwt_secret: String,
    #[serde(default = "default_jwt_issuer")]
    pub jwt_issuer: String,
    /// Longest bearer token lifetime accepted.
    #[serde(default = "default_token_duration_hours")]
    pub token_duration_hours: i64,
    /// Let credential-less requests through with a zero identity.
    #[serde(default)]
    pub allow_anonymous: bool,
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
    /// Idle lifetime of a stored session, in seconds.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Most sessions held in memory at once.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_jwt_issuer() -> String {
    "gatekeeper".to_string()
}

fn default_token_duration_hours() -> i64 {
    72
}

fn default_session_cookie() -> String {
    "session".to_string()
}

fn default_session_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_max_sessions() -> usize {
    100_000
}

/// Longest accepted bearer lifetime, ten years.
const MAX_TOKEN_DURATION_HOURS: i64 = 10 * 365 * 24;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("token_duration_hours", &self.token_duration_hours)
            .field("allow_anonymous", &self.allow_anonymous)
            .field("session_cookie", &self.session_cookie)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("max_sessions", &self.max_sessions)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    /// Reject configurations that would fail every request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_token.is_empty() {
            return Err(ConfigError::Message(
                "auth.service_token must not be empty".to_string(),
            ));
        }

        if self.jwt_secret.is_empty() {
            return Err(ConfigError::Message(
                "auth.jwt_secret must not be empty".to_string(),
            ));
        }

        if !(1..=MAX_TOKEN_DURATION_HOURS).contains(&self.token_duration_hours) {
            return Err(ConfigError::Message(format!(
                "auth.token_duration_hours must be between 1 and {}",
                MAX_TOKEN_DURATION_HOURS
            )));
        }

        if self.session_ttl_secs == 0 || self.max_sessions == 0 {
            return Err(ConfigError::Message(
                "auth.session_ttl_secs and auth.max_sessions must be positive".to_string(),
            ));
        }

        cipher::parse_key(&self.api_encryption_key)
            .map_err(|e| ConfigError::Message(format!("auth.api_encryption_key: {}", e)))?;

        Ok(())
    }
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (GATEKEEPER__*)
    /// 2. config/local.yaml (if exists)
    /// 3. config/default.yaml
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("GATEKEEPER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.auth.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const TEST_KEY: &str =
        "e05b0e0d42c608dd08151cfc325da68f1eadd7bf60e457a043bc2e1de39635e2";

    pub(crate) fn auth_config() -> AuthConfig {
        AuthConfig {
            service_token: "service".to_string(),
            api_encryption_key: TEST_KEY.to_string(),
            jwt_secret: "test-secret-key-12345".to_string(),
            jwt_issuer: "gatekeeper".to_string(),
            token_duration_hours: 72,
            allow_anonymous: false,
            session_cookie: "session".to_string(),
            session_ttl_secs: 3600,
            max_sessions: 1000,
        }
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_auth_defaults_from_source() {
        let loaded = ConfigLoader::builder()
            .set_override("auth.service_token", "svc")
            .unwrap()
            .set_override("auth.api_encryption_key", TEST_KEY)
            .unwrap()
            .set_override("auth.jwt_secret", "jwt")
            .unwrap()
            .build()
            .unwrap();

        let config: Config = loaded.try_deserialize().unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, crate::logging::LogFormat::Json);
        assert_eq!(config.auth.jwt_issuer, "gatekeeper");
        assert_eq!(config.auth.token_duration_hours, 72);
        assert_eq!(config.auth.session_cookie, "session");
        assert_eq!(config.auth.session_ttl_secs, 86_400);
        assert_eq!(config.auth.max_sessions, 100_000);
        assert!(!config.auth.allow_anonymous);
        assert!(config.auth.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut config = auth_config();
        config.api_encryption_key = "abc".to_string();
        assert!(config.validate().is_err());

        let mut config = auth_config();
        config.service_token.clear();
        assert!(config.validate().is_err());

        let mut config = auth_config();
        config.token_duration_hours = 0;
        assert!(config.validate().is_err());

        let mut config = auth_config();
        config.token_duration_hours = i64::MAX;
        assert!(config.validate().is_err());

        let mut config = auth_config();
        config.max_sessions = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let debug = format!("{:?}", auth_config());
        assert!(!debug.contains(TEST_KEY));
        assert!(!debug.contains("test-secret-key"));
    }
}
