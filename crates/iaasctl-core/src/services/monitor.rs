//! Monitoring data for caches

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::Client;
use crate::error::Result;
use crate::operation::{HttpMethod, Properties};
use crate::schema::{FieldSchema, Schema, StructSchema};

/// Sampling intervals accepted by the monitor API
pub const MONITOR_STEPS: &[&str] = &["5m", "15m", "2h", "1d"];

#[derive(Debug, Clone)]
pub struct MonitorService {
    client: Client,
    properties: Properties,
}

impl MonitorService {
    pub fn new(client: Client, properties: Properties) -> Self {
        Self { client, properties }
    }

    pub async fn get_cache_monitor(
        &self,
        input: &GetCacheMonitorInput,
    ) -> Result<GetCacheMonitorOutput> {
        let op = self
            .client
            .operation("GetCacheMonitor", HttpMethod::Get, self.properties.clone());
        self.client.send(&op, input).await
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GetCacheMonitorInput {
    pub end_time: Option<DateTime<Utc>>,
    /// Sent as `meters=a&meters=b`
    pub meters: Option<Vec<String>>,
    pub resource: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub step: Option<String>,
}

static GET_CACHE_MONITOR_INPUT: StructSchema = StructSchema {
    type_name: "GetCacheMonitorInput",
    fields: &[
        FieldSchema::param("end_time").required().timestamp(),
        FieldSchema::param("meters").required().repeated(),
        FieldSchema::param("resource").required(),
        FieldSchema::param("start_time").required().timestamp(),
        FieldSchema::param("step").required().one_of(MONITOR_STEPS),
    ],
};

impl Schema for GetCacheMonitorInput {
    fn schema() -> &'static StructSchema {
        &GET_CACHE_MONITOR_INPUT
    }
}

/// One meter's samples; points are `[timestamp, value]` or plain values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meter {
    pub data: Option<Vec<Value>>,
    pub meter_id: Option<String>,
    pub sequence: Option<i64>,
    pub vxnet_id: Option<String>,
}

static METER: StructSchema = StructSchema {
    type_name: "Meter",
    fields: &[
        FieldSchema::element("data").list(),
        FieldSchema::element("meter_id"),
        FieldSchema::element("sequence"),
        FieldSchema::element("vxnet_id"),
    ],
};

impl Schema for Meter {
    fn schema() -> &'static StructSchema {
        &METER
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetCacheMonitorOutput {
    pub action: Option<String>,
    pub ret_code: Option<i64>,
    pub message: Option<String>,
    pub meter_set: Option<Vec<Meter>>,
    pub resource_id: Option<String>,
}

static GET_CACHE_MONITOR_OUTPUT: StructSchema = StructSchema {
    type_name: "GetCacheMonitorOutput",
    fields: &[
        FieldSchema::element("action"),
        FieldSchema::element("ret_code"),
        FieldSchema::element("message"),
        FieldSchema::element("meter_set").list_of(&METER),
        FieldSchema::element("resource_id"),
    ],
};

impl Schema for GetCacheMonitorOutput {
    fn schema() -> &'static StructSchema {
        &GET_CACHE_MONITOR_OUTPUT
    }
}
