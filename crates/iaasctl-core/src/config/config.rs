//! Account and endpoint configuration
//!
//! Configuration is stored in TOML format. Values may reference environment
//! variables with `${VAR}` or `${VAR:-default}`, and a handful of
//! `IAAS_*` environment variables override the file.
//!
//! ```toml
//! access_key_id = "QYACCESSKEYIDEXAMPLE"
//! secret_access_key = "${IAAS_SECRET:-keyring:iaas-secret}"
//! zone = "pek3"
//!
//! [retry]
//! max_attempts = 5
//! ```

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::credential::SecretStore;
use super::error::{ConfigError, Result};
use super::resilience::RetryConfig;
use crate::sign::Credentials;

pub const ENV_ACCESS_KEY_ID: &str = "IAAS_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "IAAS_SECRET_ACCESS_KEY";
pub const ENV_HOST: &str = "IAAS_HOST";
pub const ENV_ZONE: &str = "IAAS_ZONE";

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Access key identifier, plaintext or `keyring:` reference
    #[serde(default)]
    pub access_key_id: String,
    /// Secret access key, plaintext or `keyring:` reference
    #[serde(default)]
    pub secret_access_key: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// `https` or `http`
    #[serde(default = "default_protocol")]
    pub protocol: String,
    /// Path prefix of the API, e.g. `/iaas`
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Per-call timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,
    /// Zone used when a service is created without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_key_id: String::new(),
            secret_access_key: String::new(),
            host: default_host(),
            port: default_port(),
            protocol: default_protocol(),
            uri: default_uri(),
            api_version: default_api_version(),
            connection_timeout_secs: default_connection_timeout(),
            zone: None,
            retry: RetryConfig::default(),
        }
    }
}

fn default_host() -> String {
    "api.qingcloud.com".to_string()
}

fn default_port() -> u16 {
    443
}

fn default_protocol() -> String {
    "https".to_string()
}

fn default_uri() -> String {
    "/iaas".to_string()
}

fn default_api_version() -> String {
    "1".to_string()
}

fn default_connection_timeout() -> u64 {
    30
}

impl Config {
    /// Configuration with the given key pair and default endpoint settings
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            ..Self::default()
        }
    }

    /// Point at `protocol://host:port`
    #[must_use]
    pub fn with_endpoint(
        mut self,
        protocol: impl Into<String>,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        self.protocol = protocol.into();
        self.host = host.into();
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Load configuration from the standard location, then apply
    /// environment overrides
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = Self::load_from_path(&config_path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific path.
    ///
    /// A missing file yields the default configuration.
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text, expanding environment variables
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let expanded_content = Self::expand_env_vars(content);
        Ok(toml::from_str(&expanded_content)?)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Override host and zone from `IAAS_HOST` / `IAAS_ZONE`.
    ///
    /// Credentials are resolved lazily by [`Config::credentials`].
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var(ENV_HOST) {
            debug!("Found {} environment variable", ENV_HOST);
            self.host = host;
        }
        if let Ok(zone) = std::env::var(ENV_ZONE) {
            debug!("Found {} environment variable", ENV_ZONE);
            self.zone = Some(zone);
        }
    }

    /// Resolve the key pair (environment, keyring or plaintext)
    pub fn credentials(&self) -> Result<Credentials> {
        let store = SecretStore::new();

        let access_key_id = store
            .resolve(&self.access_key_id, Some(ENV_ACCESS_KEY_ID))
            .map_err(|e| {
                ConfigError::CredentialError(format!("Failed to resolve access key id: {}", e))
            })?;
        let secret_access_key = store
            .resolve(&self.secret_access_key, Some(ENV_SECRET_ACCESS_KEY))
            .map_err(|e| {
                ConfigError::CredentialError(format!(
                    "Failed to resolve secret access key: {}",
                    e
                ))
            })?;

        if access_key_id.is_empty() {
            return Err(ConfigError::MissingCredential {
                name: "access_key_id",
            });
        }
        if secret_access_key.is_empty() {
            return Err(ConfigError::MissingCredential {
                name: "secret_access_key",
            });
        }

        Ok(Credentials::new(access_key_id, secret_access_key))
    }

    /// Check endpoint settings
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.protocol.as_str(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "protocol",
                message: format!("expected \"http\" or \"https\", got \"{}\"", self.protocol),
            });
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "host",
                message: "must not be empty".to_string(),
            });
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port",
                message: "must not be 0".to_string(),
            });
        }
        if self.connection_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "connection_timeout_secs",
                message: "must be at least 1".to_string(),
            });
        }
        self.endpoint().map(|_| ())
    }

    /// Path requests are sent to and signed for, always with a trailing slash
    pub fn request_path(&self) -> String {
        let trimmed = self.uri.trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        }
    }

    /// Full endpoint URL, without query string
    pub fn endpoint(&self) -> Result<Url> {
        let endpoint = format!(
            "{}://{}:{}{}",
            self.protocol,
            self.host,
            self.port,
            self.request_path()
        );
        Url::parse(&endpoint).map_err(|source| ConfigError::InvalidEndpoint { endpoint, source })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Get the path to the configuration file
    ///
    /// On macOS, this supports both the standard macOS path and Linux-style ~/.config path:
    /// 1. Check ~/.config/iaasctl/config.toml (Linux-style, preferred for consistency)
    /// 2. Fall back to ~/Library/Application Support/io.iaasctl.iaasctl/config.toml
    ///
    /// On Linux: ~/.config/iaasctl/config.toml
    /// On Windows: %APPDATA%\iaasctl\iaasctl\config.toml
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("iaasctl")
                    .join("config.toml");

                if linux_style_path
                    .parent()
                    .map(|p| p.exists())
                    .unwrap_or(false)
                {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs =
            ProjectDirs::from("io", "iaasctl", "iaasctl").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand environment variables in configuration content
    ///
    /// Supports ${VAR} and ${VAR:-default} syntax. Unset variables without a
    /// default are left as-is.
    fn expand_env_vars(content: &str) -> String {
        let expanded =
            shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok());
        expanded.to_string()
    }
}
