//! Error types for iaasctl

use colored::Colorize;
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// ```text
/// error: Service error 1400: PermissionDenied, access key not found
///
///   tip: check credentials: iaasctl config show
/// ```
pub struct CliDiagnostic {
    message: String,
    tips: Vec<String>,
}

impl CliDiagnostic {
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            tips: Vec::new(),
        }
    }

    pub fn tip(mut self, text: &str) -> Self {
        self.tips.push(text.to_string());
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        for tip in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", tip);
        }
    }
}

/// Main error type for the iaasctl application
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] iaasctl_core::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] iaasctl_core::ConfigError),

    #[error("Invalid parameter '{arg}': expected KEY=VALUE")]
    InvalidParameter { arg: String },

    #[error("Invalid timestamp '{value}': {message}")]
    InvalidTimestamp { value: String, message: String },

    #[error("File error for '{path}': {message}")]
    FileError { path: String, message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for iaasctl operations
pub type Result<T> = std::result::Result<T, CliError>;

impl CliError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            CliError::Config(iaasctl_core::ConfigError::MissingCredential { .. })
            | CliError::Api(iaasctl_core::Error::Config(
                iaasctl_core::ConfigError::MissingCredential { .. },
            )) => vec![
                "Set access_key_id and secret_access_key in the config file: iaasctl config path"
                    .to_string(),
                "Or export IAAS_ACCESS_KEY_ID and IAAS_SECRET_ACCESS_KEY".to_string(),
            ],
            CliError::Api(err) if err.is_service_error() => vec![
                "Check the action parameters: iaasctl sign <ACTION> -P ... shows what is sent"
                    .to_string(),
            ],
            CliError::Api(err) if err.is_retryable() => vec![
                "Check network connectivity and the configured host: iaasctl config show"
                    .to_string(),
                "Raise connection_timeout_secs or [retry] max_attempts in the config file"
                    .to_string(),
            ],
            CliError::InvalidParameter { .. } => {
                vec!["Pass parameters as -P key=value, e.g. -P caches.1=c-1234abcd".to_string()]
            }
            CliError::FileError { path, .. } => vec![format!("Check that file exists: {}", path)],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&self.to_string());
        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion);
        }
        diag.print();
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        CliError::OutputError {
            message: format!("YAML error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_suggest_env_vars() {
        let err = CliError::Config(iaasctl_core::ConfigError::MissingCredential {
            name: "access_key_id",
        });
        assert!(
            err.suggestions()
                .iter()
                .any(|s| s.contains("IAAS_ACCESS_KEY_ID"))
        );
    }

    #[test]
    fn test_service_error_is_displayed_verbatim() {
        let err = CliError::from(iaasctl_core::Error::Service {
            ret_code: 1400,
            message: "PermissionDenied".to_string(),
        });
        assert_eq!(err.to_string(), "Service error 1400: PermissionDenied");
        assert_eq!(err.suggestions().len(), 1);
    }
}
