//! Server certificates for load balancers
//!
//! Certificate bodies are too large for a query string, so this action is
//! sent as a form-encoded POST.

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;
use crate::operation::{HttpMethod, Properties};
use crate::schema::{FieldSchema, Schema, StructSchema};

#[derive(Debug, Clone)]
pub struct CertificateService {
    client: Client,
    properties: Properties,
}

impl CertificateService {
    pub fn new(client: Client, properties: Properties) -> Self {
        Self { client, properties }
    }

    pub async fn create_server_certificate(
        &self,
        input: &CreateServerCertificateInput,
    ) -> Result<CreateServerCertificateOutput> {
        let op = self.client.operation(
            "CreateServerCertificate",
            HttpMethod::Post,
            self.properties.clone(),
        );
        self.client.send(&op, input).await
    }
}

#[derive(Clone, Default, Serialize)]
pub struct CreateServerCertificateInput {
    /// PEM encoded certificate chain
    pub certificate_content: Option<String>,
    /// PEM encoded private key
    pub private_key: Option<String>,
    pub server_certificate_name: Option<String>,
}

impl std::fmt::Debug for CreateServerCertificateInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateServerCertificateInput")
            .field("certificate_content", &self.certificate_content)
            .field("private_key", &self.private_key.as_ref().map(|_| "***"))
            .field("server_certificate_name", &self.server_certificate_name)
            .finish()
    }
}

static CREATE_SERVER_CERTIFICATE_INPUT: StructSchema = StructSchema {
    type_name: "CreateServerCertificateInput",
    fields: &[
        FieldSchema::param("certificate_content").required(),
        FieldSchema::param("private_key").required(),
        FieldSchema::param("server_certificate_name"),
    ],
};

impl Schema for CreateServerCertificateInput {
    fn schema() -> &'static StructSchema {
        &CREATE_SERVER_CERTIFICATE_INPUT
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateServerCertificateOutput {
    pub action: Option<String>,
    pub ret_code: Option<i64>,
    pub message: Option<String>,
    pub server_certificate_id: Option<String>,
}

static CREATE_SERVER_CERTIFICATE_OUTPUT: StructSchema = StructSchema {
    type_name: "CreateServerCertificateOutput",
    fields: &[
        FieldSchema::element("action"),
        FieldSchema::element("ret_code"),
        FieldSchema::element("message"),
        FieldSchema::element("server_certificate_id"),
    ],
};

impl Schema for CreateServerCertificateOutput {
    fn schema() -> &'static StructSchema {
        &CREATE_SERVER_CERTIFICATE_OUTPUT
    }
}
