//! Configuration for the API client
//!
//! # Features
//!
//! - TOML config file in the platform config directory
//! - Environment variable expansion in config files
//! - Environment variable overrides for credentials, host and zone
//! - Secure credential storage using OS keyring (optional)
//! - Retry policy for transient transport failures

#[allow(clippy::module_inception)]
pub mod config;
pub mod credential;
pub mod error;
pub mod resilience;

// Re-export main types for convenience
pub use config::Config;
pub use credential::{SecretBackend, SecretStore};
pub use error::{ConfigError, Result};
pub use resilience::RetryConfig;
