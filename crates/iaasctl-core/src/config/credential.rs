//! Where secret access keys live
//!
//! The config file holds either the secret itself or a `keyring:<access key id>`
//! reference into the OS keyring (`secure-storage` feature). Environment
//! variables take precedence over both.

use super::error::{ConfigError, Result};

/// Marks a config value as a keyring entry name
pub const KEYRING_PREFIX: &str = "keyring:";

#[cfg(feature = "secure-storage")]
const KEYRING_SERVICE: &str = "iaasctl";

/// Backend used when saving a secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretBackend {
    #[cfg(feature = "secure-storage")]
    Keyring,
    Plaintext,
}

impl SecretBackend {
    /// Keyring when compiled in and reachable, plaintext otherwise
    pub fn detect() -> Self {
        #[cfg(feature = "secure-storage")]
        {
            if keyring_entry("__probe__").is_ok() {
                return SecretBackend::Keyring;
            }
        }
        SecretBackend::Plaintext
    }

    pub fn name(&self) -> &'static str {
        match self {
            #[cfg(feature = "secure-storage")]
            SecretBackend::Keyring => "keyring",
            SecretBackend::Plaintext => "plaintext",
        }
    }
}

/// Saves and resolves secret access keys
#[derive(Debug)]
pub struct SecretStore {
    backend: SecretBackend,
}

impl Default for SecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore {
    pub fn new() -> Self {
        Self {
            backend: SecretBackend::detect(),
        }
    }

    /// A store that never touches the keyring
    pub fn plaintext() -> Self {
        Self {
            backend: SecretBackend::Plaintext,
        }
    }

    pub fn backend(&self) -> SecretBackend {
        self.backend
    }

    /// Save the secret of `access_key_id` and return what goes into the config file
    pub fn save(&self, access_key_id: &str, secret: &str) -> Result<String> {
        match self.backend {
            #[cfg(feature = "secure-storage")]
            SecretBackend::Keyring => {
                keyring_entry(access_key_id)?
                    .set_password(secret)
                    .map_err(|e| {
                        ConfigError::KeyringError(format!(
                            "cannot save secret for {}: {}",
                            access_key_id, e
                        ))
                    })?;
                Ok(format!("{}{}", KEYRING_PREFIX, access_key_id))
            }
            SecretBackend::Plaintext => {
                let _ = access_key_id;
                Ok(secret.to_string())
            }
        }
    }

    /// Resolve a config value: `env_var` if set, else the keyring entry it
    /// references, else the value itself
    pub fn resolve(&self, value: &str, env_var: Option<&str>) -> Result<String> {
        if let Some(var) = env_var
            && let Ok(from_env) = std::env::var(var)
        {
            return Ok(from_env);
        }

        let Some(entry) = value.strip_prefix(KEYRING_PREFIX) else {
            return Ok(value.to_string());
        };
        read_keyring(entry)
    }

    pub fn is_reference(value: &str) -> bool {
        value.starts_with(KEYRING_PREFIX)
    }
}

#[cfg(feature = "secure-storage")]
fn keyring_entry(name: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(KEYRING_SERVICE, name).map_err(|e| ConfigError::KeyringError(e.to_string()))
}

#[cfg(feature = "secure-storage")]
fn read_keyring(name: &str) -> Result<String> {
    keyring_entry(name)?
        .get_password()
        .map_err(|e| ConfigError::KeyringError(format!("cannot read '{}': {}", name, e)))
}

#[cfg(not(feature = "secure-storage"))]
fn read_keyring(name: &str) -> Result<String> {
    Err(ConfigError::CredentialError(format!(
        "'{}{}' needs the secure-storage feature",
        KEYRING_PREFIX, name
    )))
}
