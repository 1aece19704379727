//! HTTP dispatch with timeout and bounded retry
//!
//! GET operations carry their parameters in the query string, POST
//! operations in a form-encoded body. Transient failures (connect errors,
//! timeouts, resets, HTTP 502/503/504) of idempotent operations are retried
//! with exponential backoff; everything else is returned on first failure.

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, trace, warn};
use url::Url;

use crate::config::{Config, RetryConfig};
use crate::error::{Result, TransportError, is_transient_reqwest, is_transient_status};
use crate::operation::HttpMethod;
use crate::sign::SignedRequest;

/// User agent string for iaasctl HTTP requests
const IAASCTL_USER_AGENT: &str = concat!("iaasctl/", env!("CARGO_PKG_VERSION"));

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Sends signed requests to the configured endpoint
#[derive(Debug, Clone)]
pub struct Dispatcher {
    http: reqwest::Client,
    endpoint: Url,
    retry: RetryConfig,
}

/// Outcome of one failed attempt
enum Failure {
    Request(reqwest::Error),
    Status { status: u16, body: String },
}

impl Failure {
    fn is_transient(&self) -> bool {
        match self {
            Failure::Request(e) => is_transient_reqwest(e),
            Failure::Status { status, .. } => is_transient_status(*status),
        }
    }

    fn into_error(self, attempts: u32) -> TransportError {
        match self {
            Failure::Request(source) => TransportError::Request { attempts, source },
            Failure::Status { status, body } => TransportError::HttpStatus {
                status,
                body,
                attempts,
            },
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Request(e) => write!(f, "{}", e),
            Failure::Status { status, .. } => write!(f, "HTTP {}", status),
        }
    }
}

impl Dispatcher {
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = config.endpoint()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(IAASCTL_USER_AGENT)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            http,
            endpoint,
            retry: config.retry.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send a signed request and return the raw body of a 2xx response
    pub async fn send(&self, request: &SignedRequest) -> std::result::Result<Vec<u8>, TransportError> {
        let attempts = self.retry.attempts_for(request.method.is_idempotent());
        let encoded = request.encoded();
        trace!("Encoded parameters: {} bytes", encoded.len());

        let mut attempt = 1;
        loop {
            match self.attempt(request.method, &encoded).await {
                Ok(body) => {
                    debug!("{} {} succeeded on attempt {}", request.method, self.endpoint, attempt);
                    return Ok(body);
                }
                Err(failure) if failure.is_transient() && attempt < attempts => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        "Attempt {}/{} failed ({}), retrying in {:?}",
                        attempt, attempts, failure, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(failure) => {
                    debug!("Giving up after attempt {}: {}", attempt, failure);
                    return Err(failure.into_error(attempt));
                }
            }
        }
    }

    async fn attempt(&self, method: HttpMethod, encoded: &str) -> std::result::Result<Vec<u8>, Failure> {
        let builder = match method {
            HttpMethod::Get => {
                let mut url = self.endpoint.clone();
                url.set_query(Some(encoded));
                self.http.get(url)
            }
            HttpMethod::Post => self
                .http
                .post(self.endpoint.clone())
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(encoded.to_string()),
        };

        let response = builder.send().await.map_err(Failure::Request)?;
        let status = response.status();
        let body = response.bytes().await.map_err(Failure::Request)?;

        if status.is_success() {
            Ok(body.to_vec())
        } else {
            Err(Failure::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            })
        }
    }
}
