//! Cache (redis / memcached) operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;
use crate::operation::{HttpMethod, Properties};
use crate::schema::{FieldSchema, Schema, StructSchema};

pub const CACHE_TYPES: &[&str] = &[
    "redis2.8.17",
    "redis3.0.5",
    "redis3.2.9",
    "memcached1.4.13",
];

pub const CACHE_STATUSES: &[&str] = &[
    "pending",
    "active",
    "stopped",
    "suspended",
    "deleted",
    "ceased",
];

#[derive(Debug, Clone)]
pub struct CacheService {
    client: Client,
    properties: Properties,
}

impl CacheService {
    pub fn new(client: Client, properties: Properties) -> Self {
        Self { client, properties }
    }

    pub async fn create_caches(&self, input: &CreateCachesInput) -> Result<CreateCachesOutput> {
        let op = self
            .client
            .operation("CreateCaches", HttpMethod::Get, self.properties.clone());
        self.client.send(&op, input).await
    }

    pub async fn describe_caches(
        &self,
        input: &DescribeCachesInput,
    ) -> Result<DescribeCachesOutput> {
        let op = self
            .client
            .operation("DescribeCaches", HttpMethod::Get, self.properties.clone());
        self.client.send(&op, input).await
    }

    pub async fn delete_caches(&self, input: &DeleteCachesInput) -> Result<DeleteCachesOutput> {
        let op = self
            .client
            .operation("DeleteCaches", HttpMethod::Get, self.properties.clone());
        self.client.send(&op, input).await
    }
}

/// Fixed private IP for one cache role
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CachePrivateIP {
    pub cache_role: Option<String>,
    pub private_ips: Option<String>,
}

static CACHE_PRIVATE_IP: StructSchema = StructSchema {
    type_name: "CachePrivateIP",
    fields: &[
        FieldSchema::param("cache_role").one_of(&["master", "slave"]),
        FieldSchema::param("private_ips"),
    ],
};

impl Schema for CachePrivateIP {
    fn schema() -> &'static StructSchema {
        &CACHE_PRIVATE_IP
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateCachesInput {
    pub auto_backup_time: Option<i64>,
    /// 0 for high performance, 1 for super high performance
    pub cache_class: Option<i64>,
    pub cache_name: Option<String>,
    pub cache_parameter_group: Option<String>,
    /// Size in GB
    pub cache_size: Option<i64>,
    pub cache_type: Option<String>,
    pub network_type: Option<i64>,
    pub node_count: Option<i64>,
    pub private_ips: Option<Vec<CachePrivateIP>>,
    pub vxnet: Option<String>,
}

static CREATE_CACHES_INPUT: StructSchema = StructSchema {
    type_name: "CreateCachesInput",
    fields: &[
        FieldSchema::param("auto_backup_time"),
        FieldSchema::param("cache_class").one_of(&["0", "1"]),
        FieldSchema::param("cache_name"),
        FieldSchema::param("cache_parameter_group"),
        FieldSchema::param("cache_size").required(),
        FieldSchema::param("cache_type")
            .required()
            .one_of(CACHE_TYPES),
        FieldSchema::param("network_type").one_of(&["0", "1"]),
        FieldSchema::param("node_count"),
        FieldSchema::param("private_ips").list_of(&CACHE_PRIVATE_IP),
        FieldSchema::param("vxnet").required(),
    ],
};

impl Schema for CreateCachesInput {
    fn schema() -> &'static StructSchema {
        &CREATE_CACHES_INPUT
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCachesOutput {
    pub action: Option<String>,
    pub ret_code: Option<i64>,
    pub message: Option<String>,
    pub cache_id: Option<String>,
    pub cache_node: Option<Vec<String>>,
    pub job_id: Option<String>,
}

static CREATE_CACHES_OUTPUT: StructSchema = StructSchema {
    type_name: "CreateCachesOutput",
    fields: &[
        FieldSchema::element("action"),
        FieldSchema::element("ret_code"),
        FieldSchema::element("message"),
        FieldSchema::element("cache_id"),
        FieldSchema::element("cache_node").list(),
        FieldSchema::element("job_id"),
    ],
};

impl Schema for CreateCachesOutput {
    fn schema() -> &'static StructSchema {
        &CREATE_CACHES_OUTPUT
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DescribeCachesInput {
    pub cache_type: Option<Vec<String>>,
    pub caches: Option<Vec<String>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub search_word: Option<String>,
    pub status: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub verbose: Option<i64>,
}

static DESCRIBE_CACHES_INPUT: StructSchema = StructSchema {
    type_name: "DescribeCachesInput",
    fields: &[
        FieldSchema::param("cache_type").list().one_of(CACHE_TYPES),
        FieldSchema::param("caches").list(),
        FieldSchema::param("limit").default_value("20"),
        FieldSchema::param("offset").default_value("0"),
        FieldSchema::param("search_word"),
        FieldSchema::param("status").list().one_of(CACHE_STATUSES),
        FieldSchema::param("tags").list(),
        FieldSchema::param("verbose").one_of(&["0", "1"]),
    ],
};

impl Schema for DescribeCachesInput {
    fn schema() -> &'static StructSchema {
        &DESCRIBE_CACHES_INPUT
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VxNet {
    pub vxnet_id: Option<String>,
    pub vxnet_name: Option<String>,
}

static VXNET: StructSchema = StructSchema {
    type_name: "VxNet",
    fields: &[
        FieldSchema::element("vxnet_id"),
        FieldSchema::element("vxnet_name"),
    ],
};

impl Schema for VxNet {
    fn schema() -> &'static StructSchema {
        &VXNET
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cache {
    pub cache_id: Option<String>,
    pub cache_name: Option<String>,
    pub cache_parameter_group_id: Option<String>,
    pub cache_size: Option<i64>,
    pub cache_type: Option<String>,
    pub create_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub node_count: Option<i64>,
    pub status: Option<String>,
    pub status_time: Option<DateTime<Utc>>,
    pub transition_status: Option<String>,
    pub vxnet: Option<VxNet>,
}

static CACHE: StructSchema = StructSchema {
    type_name: "Cache",
    fields: &[
        FieldSchema::element("cache_id"),
        FieldSchema::element("cache_name"),
        FieldSchema::element("cache_parameter_group_id"),
        FieldSchema::element("cache_size"),
        FieldSchema::element("cache_type").one_of(CACHE_TYPES),
        FieldSchema::element("create_time").timestamp(),
        FieldSchema::element("description"),
        FieldSchema::element("node_count"),
        FieldSchema::element("status").one_of(CACHE_STATUSES),
        FieldSchema::element("status_time").timestamp(),
        FieldSchema::element("transition_status"),
        FieldSchema::element("vxnet").nested(&VXNET),
    ],
};

impl Schema for Cache {
    fn schema() -> &'static StructSchema {
        &CACHE
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescribeCachesOutput {
    pub action: Option<String>,
    pub ret_code: Option<i64>,
    pub message: Option<String>,
    pub cache_set: Option<Vec<Cache>>,
    pub total_count: Option<i64>,
}

static DESCRIBE_CACHES_OUTPUT: StructSchema = StructSchema {
    type_name: "DescribeCachesOutput",
    fields: &[
        FieldSchema::element("action"),
        FieldSchema::element("ret_code"),
        FieldSchema::element("message"),
        FieldSchema::element("cache_set").list_of(&CACHE),
        FieldSchema::element("total_count"),
    ],
};

impl Schema for DescribeCachesOutput {
    fn schema() -> &'static StructSchema {
        &DESCRIBE_CACHES_OUTPUT
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteCachesInput {
    pub caches: Option<Vec<String>>,
}

static DELETE_CACHES_INPUT: StructSchema = StructSchema {
    type_name: "DeleteCachesInput",
    fields: &[FieldSchema::param("caches").list().required()],
};

impl Schema for DeleteCachesInput {
    fn schema() -> &'static StructSchema {
        &DELETE_CACHES_INPUT
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteCachesOutput {
    pub action: Option<String>,
    pub ret_code: Option<i64>,
    pub message: Option<String>,
    pub job_id: Option<String>,
}

static DELETE_CACHES_OUTPUT: StructSchema = StructSchema {
    type_name: "DeleteCachesOutput",
    fields: &[
        FieldSchema::element("action"),
        FieldSchema::element("ret_code"),
        FieldSchema::element("message"),
        FieldSchema::element("job_id"),
    ],
};

impl Schema for DeleteCachesOutput {
    fn schema() -> &'static StructSchema {
        &DELETE_CACHES_OUTPUT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::marshal::marshal;
    use crate::services::coverage::assert_schema_matches;
    use crate::unmarshal::unmarshal;
    use crate::validate::validate;
    use pretty_assertions::assert_eq;

    fn create_input() -> CreateCachesInput {
        CreateCachesInput {
            cache_size: Some(1),
            cache_type: Some("redis2.8.17".to_string()),
            vxnet: Some("vxnet-0".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_schemas_match_types() {
        assert_schema_matches(&CachePrivateIP::default());
        assert_schema_matches(&CreateCachesInput::default());
        assert_schema_matches(&CreateCachesOutput::default());
        assert_schema_matches(&DescribeCachesInput::default());
        assert_schema_matches(&DescribeCachesOutput::default());
        assert_schema_matches(&Cache::default());
        assert_schema_matches(&VxNet::default());
        assert_schema_matches(&DeleteCachesInput::default());
        assert_schema_matches(&DeleteCachesOutput::default());
    }

    #[test]
    fn test_create_caches_valid() {
        let input = create_input();
        assert_eq!(validate(&input), Ok(()));

        let params = marshal(&input).unwrap();
        assert_eq!(params.get("cache_size"), Some("1"));
        assert_eq!(params.get("cache_type"), Some("redis2.8.17"));
        assert_eq!(params.get("vxnet"), Some("vxnet-0"));
        assert!(!params.contains_key("cache_name"));
    }

    #[test]
    fn test_create_caches_missing_size() {
        let input = CreateCachesInput {
            cache_size: None,
            ..create_input()
        };
        assert_eq!(
            validate(&input),
            Err(ValidationError::ParameterRequired {
                field: "cache_size".to_string(),
                owning_type: "CreateCachesInput".to_string(),
            })
        );
    }

    #[test]
    fn test_create_caches_nested_private_ips() {
        let input = CreateCachesInput {
            private_ips: Some(vec![
                CachePrivateIP {
                    cache_role: Some("master".to_string()),
                    private_ips: Some("192.168.0.10".to_string()),
                },
                CachePrivateIP {
                    cache_role: Some("slave".to_string()),
                    private_ips: Some("192.168.0.11".to_string()),
                },
            ]),
            ..create_input()
        };

        let params = marshal(&input).unwrap();
        assert_eq!(params.get("private_ips.1.cache_role"), Some("master"));
        assert_eq!(params.get("private_ips.2.private_ips"), Some("192.168.0.11"));

        let bad = CreateCachesInput {
            private_ips: Some(vec![CachePrivateIP {
                cache_role: Some("replica".to_string()),
                private_ips: None,
            }]),
            ..create_input()
        };
        assert!(matches!(
            validate(&bad),
            Err(ValidationError::ParameterValueNotAllowed { ref field, .. }) if field == "cache_role"
        ));
    }

    #[test]
    fn test_describe_caches_defaults_and_filters() {
        let input = DescribeCachesInput {
            status: Some(vec!["active".to_string(), "stopped".to_string()]),
            ..Default::default()
        };
        let params = marshal(&input).unwrap();
        assert_eq!(params.get("limit"), Some("20"));
        assert_eq!(params.get("offset"), Some("0"));
        assert_eq!(params.get("status.1"), Some("active"));
        assert_eq!(params.get("status.2"), Some("stopped"));

        let bad = DescribeCachesInput {
            status: Some(vec!["active".to_string(), "running".to_string()]),
            ..Default::default()
        };
        assert!(validate(&bad).is_err());
    }

    #[test]
    fn test_delete_caches_empty_list_is_missing() {
        let empty = DeleteCachesInput {
            caches: Some(Vec::new()),
        };
        let absent = DeleteCachesInput { caches: None };
        assert_eq!(validate(&empty), validate(&absent));
        assert!(matches!(
            validate(&empty),
            Err(ValidationError::ParameterRequired { ref field, .. }) if field == "caches"
        ));
    }

    #[test]
    fn test_describe_caches_output_decodes() {
        let body = br#"{
            "action": "DescribeCachesResponse",
            "ret_code": 0,
            "total_count": 1,
            "cache_set": [{
                "cache_id": "c-1234abcd",
                "cache_type": "redis3.2.9",
                "cache_size": 2,
                "status": "active",
                "create_time": "2024-03-01T08:00:00Z",
                "vxnet": {"vxnet_id": "vxnet-0", "vxnet_name": "base", "extra": true},
                "nodes": [{"cache_node_id": "cn-1"}]
            }]
        }"#;

        let output: DescribeCachesOutput = unmarshal(body).unwrap();
        assert_eq!(output.total_count, Some(1));
        let cache = &output.cache_set.unwrap()[0];
        assert_eq!(cache.cache_id.as_deref(), Some("c-1234abcd"));
        assert_eq!(cache.cache_size, Some(2));
        assert_eq!(
            cache.vxnet.as_ref().and_then(|v| v.vxnet_id.as_deref()),
            Some("vxnet-0")
        );
        assert!(cache.status_time.is_none());
    }

    #[test]
    fn test_delete_caches_output_with_string_ret_code() {
        let body = br#"{"action":"DeleteCachesResponse","ret_code":"0","job_id":"j-1"}"#;

        let output: DeleteCachesOutput = unmarshal(body).unwrap();
        assert_eq!(output.ret_code, Some(0));
        assert_eq!(output.job_id.as_deref(), Some("j-1"));
    }
}
