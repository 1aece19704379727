//! The request pipeline
//!
//! `Client::send` runs every call through the same stages:
//! validate → marshal → sign → dispatch → unmarshal. Validation and
//! marshalling failures return before anything touches the network.
//!
//! # Example
//!
//! ```rust,no_run
//! use iaasctl_core::services::cache::DescribeCachesInput;
//! use iaasctl_core::{Client, Config};
//!
//! # async fn example() -> iaasctl_core::Result<()> {
//! let client = Client::new(Config::new("QYACCESSKEYIDEXAMPLE", "SECRETACCESSKEY"))?;
//! let caches = client.caches("pek3");
//!
//! let output = caches.describe_caches(&DescribeCachesInput::default()).await?;
//! println!("{} caches", output.total_count.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::marshal::{ParameterList, marshal_object};
use crate::operation::{HttpMethod, Operation, Properties};
use crate::schema::Schema;
use crate::sign::{Credentials, SignedRequest, Signer};
use crate::unmarshal::{check_envelope, classify_transport, unmarshal};
use crate::validate::{to_wire_object, validate_object};

/// API client holding the shared, read-only configuration
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<Config>,
    credentials: Arc<Credentials>,
    dispatcher: Dispatcher,
}

impl Client {
    /// Create a client; credentials are resolved once, here
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let credentials = config.credentials()?;
        let dispatcher = Dispatcher::new(&config)?;
        debug!(
            "Created client for {} (access key {})",
            dispatcher.endpoint(),
            credentials.access_key_id()
        );

        Ok(Self {
            config: Arc::new(config),
            credentials: Arc::new(credentials),
            dispatcher,
        })
    }

    /// Create a client from the config file in the standard location
    pub fn from_default_config() -> Result<Self> {
        Self::new(Config::load()?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build a fresh operation for one call
    pub fn operation(
        &self,
        action: impl Into<String>,
        method: HttpMethod,
        properties: Properties,
    ) -> Operation {
        Operation::new(self.config.clone(), action, method, properties)
    }

    /// Properties for `zone`, falling back to the configured default zone
    pub fn properties_for(&self, zone: Option<String>) -> Properties {
        Properties {
            zone: zone.or_else(|| self.config.zone.clone()),
        }
    }

    /// Validate, marshal and sign an input without sending it
    pub fn prepare<I>(
        &self,
        operation: &Operation,
        input: &I,
        timestamp: DateTime<Utc>,
    ) -> Result<SignedRequest>
    where
        I: Serialize + Schema,
    {
        let schema = I::schema();
        debug!("Validating {} for {}", schema.type_name, operation.action());
        let object = to_wire_object(input, schema)?;
        validate_object(&object, schema)?;

        let mut params = operation.base_params();
        params.extend(marshal_object(&object, schema)?);
        trace!("Marshalled {} parameters", params.len());

        self.sign(operation, &params, timestamp)
    }

    /// Sign an arbitrary parameter list for `operation`
    pub fn sign(
        &self,
        operation: &Operation,
        params: &ParameterList,
        timestamp: DateTime<Utc>,
    ) -> Result<SignedRequest> {
        let config = operation.config();
        Ok(Signer::new(&self.credentials, &config.api_version)?.sign(
            params,
            operation.method(),
            &config.request_path(),
            timestamp,
        ))
    }

    /// Run the full pipeline for one typed call
    pub async fn send<I, O>(&self, operation: &Operation, input: &I) -> Result<O>
    where
        I: Serialize + Schema,
        O: DeserializeOwned + Schema,
    {
        let signed = self.prepare(operation, input, Utc::now())?;
        let body = self.dispatch(operation, &signed).await?;
        let output = unmarshal::<O>(&body)?;
        debug!("{} returned {}", operation.action(), O::schema().type_name);
        Ok(output)
    }

    /// Sign and send a raw parameter list, returning the envelope-checked body.
    ///
    /// No schema is involved, so nothing is validated client-side.
    pub async fn send_raw(&self, operation: &Operation, params: ParameterList) -> Result<Value> {
        let mut all = operation.base_params();
        all.extend(params);
        let signed = self.sign(operation, &all, Utc::now())?;
        let body = self.dispatch(operation, &signed).await?;
        Ok(Value::Object(check_envelope(&body)?))
    }

    async fn dispatch(&self, operation: &Operation, signed: &SignedRequest) -> Result<Vec<u8>> {
        debug!("Dispatching {} via {}", operation.action(), signed.method);
        self.dispatcher
            .send(signed)
            .await
            .map_err(classify_transport)
    }
}
