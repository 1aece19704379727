//! Error taxonomy for the request pipeline
//!
//! Every failure surfaces as one of a small set of typed errors:
//!
//! - [`ValidationError`] - raised before any network I/O
//! - [`TransportError`] - network, timeout and HTTP status failures
//! - [`Error::Service`] - a well-formed response carrying a non-zero `ret_code`
//! - [`DecodeError`] - a body that does not match the envelope or descriptor
//!
//! # Example
//!
//! ```rust
//! use iaasctl_core::{Error, ValidationError};
//!
//! fn handle_error(err: Error) {
//!     if err.is_validation() {
//!         println!("Fix the request: {err}");
//!     } else if err.is_retryable() {
//!         println!("Temporary error, can retry");
//!     }
//! }
//!
//! let err: Error = ValidationError::ParameterRequired {
//!     field: "cache_size".to_string(),
//!     owning_type: "CreateCacheInput".to_string(),
//! }
//! .into();
//! assert!(err.is_validation());
//! assert!(!err.is_retryable());
//! ```

use std::time::Duration;
use thiserror::Error;

use crate::config::ConfigError;

/// Client-side request problems, detected without touching the network
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{owning_type}.{field} is required")]
    ParameterRequired { field: String, owning_type: String },

    #[error("{field} value \"{value}\" is not allowed, expected one of {allowed_values:?}")]
    ParameterValueNotAllowed {
        field: String,
        value: String,
        allowed_values: Vec<String>,
    },

    #[error("{owning_type} has no descriptor for field {field}")]
    UnknownField { field: String, owning_type: String },

    #[error("{owning_type}.{field} is malformed: {reason}")]
    Malformed {
        field: String,
        owning_type: String,
        reason: String,
    },
}

impl ValidationError {
    /// Wire name of the offending field
    pub fn field(&self) -> &str {
        match self {
            ValidationError::ParameterRequired { field, .. }
            | ValidationError::ParameterValueNotAllowed { field, .. }
            | ValidationError::UnknownField { field, .. }
            | ValidationError::Malformed { field, .. } => field,
        }
    }
}

/// Failures talking to the endpoint
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request failed after {attempts} attempt(s): {source}")]
    Request {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} after {attempts} attempt(s): {body}")]
    HttpStatus {
        status: u16,
        body: String,
        attempts: u32,
    },
}

impl TransportError {
    /// Returns true if this failure was a timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Request { source, .. } if source.is_timeout())
    }

    /// Returns true if a later attempt could succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Client(_) => false,
            TransportError::Request { source, .. } => is_transient_reqwest(source),
            TransportError::HttpStatus { status, .. } => is_transient_status(*status),
        }
    }

    /// Number of attempts made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            TransportError::Client(_) => 0,
            TransportError::Request { attempts, .. }
            | TransportError::HttpStatus { attempts, .. } => *attempts,
        }
    }
}

pub(crate) fn is_transient_reqwest(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
}

pub(crate) fn is_transient_status(status: u16) -> bool {
    matches!(status, 502..=504)
}

/// Response bodies that do not match what the pipeline expects
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Response is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Response is not a JSON object")]
    NotAnObject,

    #[error("Response envelope is missing \"{0}\"")]
    MissingEnvelopeField(&'static str),

    #[error("Response field {field} should be {expected}")]
    UnexpectedShape {
        field: String,
        expected: &'static str,
    },

    #[error("Failed to build {type_name} from response: {source}")]
    Deserialize {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Umbrella error returned by client calls
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-zero `ret_code` in an otherwise well-formed response
    #[error("Service error {ret_code}: {message}")]
    Service { ret_code: i64, message: String },

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Job {job_id} did not finish within {timeout:?}")]
    JobTimeout { job_id: String, timeout: Duration },

    #[error("Job {job_id} ended with status \"{status}\"")]
    JobFailed { job_id: String, status: String },
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true if the request was rejected before reaching the network
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Returns true if the service rejected the request
    #[must_use]
    pub fn is_service_error(&self) -> bool {
        matches!(self, Error::Service { .. })
    }

    /// Returns true if this is a timeout error
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_timeout(),
            Error::JobTimeout { .. } => true,
            _ => false,
        }
    }

    /// Returns true if this error is potentially retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_transient(),
            Error::JobTimeout { .. } => true,
            _ => false,
        }
    }

    /// The service `ret_code`, if the service answered
    pub fn ret_code(&self) -> Option<i64> {
        match self {
            Error::Service { ret_code, .. } => Some(*ret_code),
            _ => None,
        }
    }
}
