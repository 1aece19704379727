//! Asynchronous job queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;
use crate::operation::{HttpMethod, Properties};
use crate::schema::{FieldSchema, Schema, StructSchema};

pub const JOB_STATUSES: &[&str] = &[
    "pending",
    "working",
    "failed",
    "successful",
    "done with failure",
];

#[derive(Debug, Clone)]
pub struct JobService {
    client: Client,
    properties: Properties,
}

impl JobService {
    pub fn new(client: Client, properties: Properties) -> Self {
        Self { client, properties }
    }

    pub async fn describe_jobs(&self, input: &DescribeJobsInput) -> Result<DescribeJobsOutput> {
        let op = self
            .client
            .operation("DescribeJobs", HttpMethod::Get, self.properties.clone());
        self.client.send(&op, input).await
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DescribeJobsInput {
    pub job_action: Option<String>,
    pub jobs: Option<Vec<String>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub status: Option<Vec<String>>,
    pub verbose: Option<i64>,
}

static DESCRIBE_JOBS_INPUT: StructSchema = StructSchema {
    type_name: "DescribeJobsInput",
    fields: &[
        FieldSchema::param("job_action"),
        FieldSchema::param("jobs").list(),
        FieldSchema::param("limit").default_value("20"),
        FieldSchema::param("offset").default_value("0"),
        FieldSchema::param("status").list().one_of(JOB_STATUSES),
        FieldSchema::param("verbose").one_of(&["0", "1"]),
    ],
};

impl Schema for DescribeJobsInput {
    fn schema() -> &'static StructSchema {
        &DESCRIBE_JOBS_INPUT
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    pub create_time: Option<DateTime<Utc>>,
    pub job_action: Option<String>,
    pub job_id: Option<String>,
    pub owner: Option<String>,
    /// Comma separated ids of the resources the job touched
    pub resource_ids: Option<String>,
    pub status: Option<String>,
    pub status_time: Option<DateTime<Utc>>,
}

static JOB: StructSchema = StructSchema {
    type_name: "Job",
    fields: &[
        FieldSchema::element("create_time").timestamp(),
        FieldSchema::element("job_action"),
        FieldSchema::element("job_id"),
        FieldSchema::element("owner"),
        FieldSchema::element("resource_ids"),
        FieldSchema::element("status").one_of(JOB_STATUSES),
        FieldSchema::element("status_time").timestamp(),
    ],
};

impl Schema for Job {
    fn schema() -> &'static StructSchema {
        &JOB
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescribeJobsOutput {
    pub action: Option<String>,
    pub ret_code: Option<i64>,
    pub message: Option<String>,
    pub job_set: Option<Vec<Job>>,
    pub total_count: Option<i64>,
}

static DESCRIBE_JOBS_OUTPUT: StructSchema = StructSchema {
    type_name: "DescribeJobsOutput",
    fields: &[
        FieldSchema::element("action"),
        FieldSchema::element("ret_code"),
        FieldSchema::element("message"),
        FieldSchema::element("job_set").list_of(&JOB),
        FieldSchema::element("total_count"),
    ],
};

impl Schema for DescribeJobsOutput {
    fn schema() -> &'static StructSchema {
        &DESCRIBE_JOBS_OUTPUT
    }
}
