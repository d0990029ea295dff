//! Application configuration
//!
//! Loaded from a TOML file (`~/.config/auth-service/config.toml` unless
//! `AUTH_SERVICE_CONFIG` points elsewhere). Every section and field has a
//! default, so a partial or missing file still yields a usable config.
//! `AUTH_TOKEN_SECRET` and `DATABASE_URL` override the file.
//!
//! The placeholder token secret is refused for the database backend. The
//! memory backend replaces it with a random per-process secret.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::AuthSettings;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::database::DatabaseConfig;

pub const CONFIG_PATH_ENV: &str = "AUTH_SERVICE_CONFIG";
pub const TOKEN_SECRET_ENV: &str = "AUTH_TOKEN_SECRET";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Placeholder secret shipped in the default config. Never used to sign.
pub const DEFAULT_TOKEN_SECRET: &str = "change-me-in-production";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// `~/.config/auth-service/config.toml`, or `./config.toml` when no home
/// directory can be determined.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("auth-service").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Config file path: `AUTH_SERVICE_CONFIG` if set, the default otherwise.
pub fn config_path_from_env() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub security: SecuritySection,
    pub storage: StorageSection,
    pub logging: LoggingSection,
    pub admin: AdminSection,
    /// Set when the token secret was generated at startup
    #[serde(skip)]
    pub secret_generated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight work on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: 30,
        }
    }
}

impl ServerSection {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    pub token_secret: String,
    pub token_ttl_hours: i64,
    pub issuer: String,
    pub bcrypt_cost: u32,
    /// Interval of the background purge of expired revocations
    pub revocation_sweep_secs: u64,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            token_secret: DEFAULT_TOKEN_SECRET.to_string(),
            token_ttl_hours: 24,
            issuer: "auth-service".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            revocation_sweep_secs: 300,
        }
    }
}

impl std::fmt::Debug for SecuritySection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecuritySection")
            .field("token_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("issuer", &self.issuer)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("revocation_sweep_secs", &self.revocation_sweep_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local, lost on restart
    #[default]
    Memory,
    Database,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub backend: StorageBackend,
    /// Used by the `database` backend
    pub url: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            url: DatabaseConfig::default().url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Account created when the credential store starts out empty.
/// No account is created unless a password is set.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSection {
    pub username: String,
    pub password: Option<String>,
}

impl Default for AdminSection {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: None,
        }
    }
}

impl std::fmt::Debug for AdminSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSection")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AppConfig {
    /// Read and validate the config at `path`, then apply environment
    /// overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&raw)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.ensure_token_secret();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Defaults plus environment overrides, for when no file exists.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.ensure_token_secret();
        config
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup(TOKEN_SECRET_ENV).filter(|s| !s.is_empty()) {
            self.security.token_secret = secret;
        }
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|s| !s.is_empty()) {
            self.storage.url = url;
            self.storage.backend = StorageBackend::Database;
        }
    }

    /// Swap the placeholder secret for 32 random bytes when the memory
    /// backend is in use. Returns whether a secret was generated.
    pub fn ensure_token_secret(&mut self) -> bool {
        if self.security.token_secret != DEFAULT_TOKEN_SECRET
            || self.storage.backend != StorageBackend::Memory
        {
            return false;
        }
        let bytes: [u8; 32] = rand::random();
        self.security.token_secret = hex::encode(bytes);
        self.secret_generated = true;
        true
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.token_secret.is_empty() {
            return Err(ConfigError::Invalid("security.token_secret is empty".into()));
        }
        if self.security.token_secret == DEFAULT_TOKEN_SECRET {
            return Err(ConfigError::Invalid(format!(
                "security.token_secret is the placeholder; set it or {}",
                TOKEN_SECRET_ENV
            )));
        }
        if self.security.token_ttl_hours <= 0 {
            return Err(ConfigError::Invalid(
                "security.token_ttl_hours must be positive".into(),
            ));
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Invalid(
                "security.bcrypt_cost must be between 4 and 31".into(),
            ));
        }
        if self.security.revocation_sweep_secs == 0 {
            return Err(ConfigError::Invalid(
                "security.revocation_sweep_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl From<&AppConfig> for AuthSettings {
    fn from(cfg: &AppConfig) -> Self {
        AuthSettings {
            jwt: JwtConfig {
                secret: cfg.security.token_secret.clone(),
                expiration_hours: cfg.security.token_ttl_hours,
                issuer: cfg.security.issuer.clone(),
            },
            bcrypt_cost: cfg.security.bcrypt_cost,
        }
    }
}

impl From<&AppConfig> for DatabaseConfig {
    fn from(cfg: &AppConfig) -> Self {
        DatabaseConfig {
            url: cfg.storage.url.clone(),
        }
    }
}
