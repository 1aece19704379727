//! # iaasctl-core
//!
//! A schema-driven engine that turns typed API inputs into signed HTTP
//! requests for an IaaS cloud API, and typed outputs back out of the JSON
//! responses.
//!
//! Every operation goes through the same pipeline:
//!
//! 1. [`validate`] checks the input against its static [`schema::StructSchema`]
//! 2. [`marshal`] flattens it into wire parameters (`key.N`, `key.sub`, defaults)
//! 3. [`sign`] adds auth parameters and an HMAC-SHA256 signature
//! 4. [`dispatch`] sends it with timeout and bounded retry
//! 5. [`unmarshal`] checks the response envelope and decodes the output
//!
//! Typed operations live in [`services`]; [`Client::send_raw`] covers actions
//! that have no typed binding.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod marshal;
pub mod operation;
pub mod progress;
pub mod schema;
pub mod services;
pub mod sign;
pub mod unmarshal;
pub mod validate;

pub use client::Client;
pub use config::{Config, ConfigError, RetryConfig};
pub use error::{DecodeError, Error, Result, TransportError, ValidationError};
pub use marshal::ParameterList;
pub use operation::{HttpMethod, Operation, Properties};
pub use progress::{JobState, ProgressCallback, ProgressEvent, wait_job};
pub use schema::{FieldSchema, Schema, StructSchema};
pub use sign::{Credentials, SignedRequest};
