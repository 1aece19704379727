//! Cluster node operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;
use crate::operation::{HttpMethod, Properties};
use crate::schema::{FieldSchema, Schema, StructSchema};

#[derive(Debug, Clone)]
pub struct ClusterService {
    client: Client,
    properties: Properties,
}

impl ClusterService {
    pub fn new(client: Client, properties: Properties) -> Self {
        Self { client, properties }
    }

    pub async fn describe_cluster_nodes(
        &self,
        input: &DescribeClusterNodesInput,
    ) -> Result<DescribeClusterNodesOutput> {
        let op = self.client.operation(
            "DescribeClusterNodes",
            HttpMethod::Get,
            self.properties.clone(),
        );
        self.client.send(&op, input).await
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DescribeClusterNodesInput {
    pub cluster: Option<String>,
    pub console: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub owner: Option<String>,
    pub reverse: Option<i64>,
    pub role: Option<String>,
    pub search_word: Option<String>,
    pub sort_key: Option<String>,
    pub status: Option<String>,
    pub verbose: Option<i64>,
}

static DESCRIBE_CLUSTER_NODES_INPUT: StructSchema = StructSchema {
    type_name: "DescribeClusterNodesInput",
    fields: &[
        FieldSchema::param("cluster").required(),
        FieldSchema::param("console"),
        FieldSchema::param("limit").default_value("20"),
        FieldSchema::param("offset").default_value("0"),
        FieldSchema::param("owner"),
        FieldSchema::param("reverse").one_of(&["0", "1"]),
        FieldSchema::param("role"),
        FieldSchema::param("search_word"),
        FieldSchema::param("sort_key"),
        FieldSchema::param("status").one_of(&[
            "pending",
            "active",
            "stopped",
            "suspended",
            "deleted",
            "ceased",
        ]),
        FieldSchema::param("verbose").one_of(&["0", "1"]),
    ],
};

impl Schema for DescribeClusterNodesInput {
    fn schema() -> &'static StructSchema {
        &DESCRIBE_CLUSTER_NODES_INPUT
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterNode {
    pub cluster_id: Option<String>,
    pub cpu: Option<i64>,
    pub create_time: Option<DateTime<Utc>>,
    pub health_status: Option<String>,
    pub instance_id: Option<String>,
    pub memory: Option<i64>,
    pub name: Option<String>,
    pub node_id: Option<String>,
    pub private_ip: Option<String>,
    pub role: Option<String>,
    pub server_id: Option<i64>,
    pub status: Option<String>,
    pub status_time: Option<DateTime<Utc>>,
    pub transition_status: Option<String>,
    pub vxnet_id: Option<String>,
}

static CLUSTER_NODE: StructSchema = StructSchema {
    type_name: "ClusterNode",
    fields: &[
        FieldSchema::element("cluster_id"),
        FieldSchema::element("cpu"),
        FieldSchema::element("create_time").timestamp(),
        FieldSchema::element("health_status"),
        FieldSchema::element("instance_id"),
        FieldSchema::element("memory"),
        FieldSchema::element("name"),
        FieldSchema::element("node_id"),
        FieldSchema::element("private_ip"),
        FieldSchema::element("role"),
        FieldSchema::element("server_id"),
        FieldSchema::element("status"),
        FieldSchema::element("status_time").timestamp(),
        FieldSchema::element("transition_status"),
        FieldSchema::element("vxnet_id"),
    ],
};

impl Schema for ClusterNode {
    fn schema() -> &'static StructSchema {
        &CLUSTER_NODE
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescribeClusterNodesOutput {
    pub action: Option<String>,
    pub ret_code: Option<i64>,
    pub message: Option<String>,
    pub node_set: Option<Vec<ClusterNode>>,
    pub total_count: Option<i64>,
}

static DESCRIBE_CLUSTER_NODES_OUTPUT: StructSchema = StructSchema {
    type_name: "DescribeClusterNodesOutput",
    fields: &[
        FieldSchema::element("action"),
        FieldSchema::element("ret_code"),
        FieldSchema::element("message"),
        FieldSchema::element("node_set").list_of(&CLUSTER_NODE),
        FieldSchema::element("total_count"),
    ],
};

impl Schema for DescribeClusterNodesOutput {
    fn schema() -> &'static StructSchema {
        &DESCRIBE_CLUSTER_NODES_OUTPUT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::coverage::assert_schema_matches;
    use crate::unmarshal::unmarshal;
    use crate::validate::validate;

    #[test]
    fn test_schemas_match_types() {
        assert_schema_matches(&DescribeClusterNodesInput::default());
        assert_schema_matches(&DescribeClusterNodesOutput::default());
        assert_schema_matches(&ClusterNode::default());
    }

    #[test]
    fn test_cluster_is_required() {
        assert!(validate(&DescribeClusterNodesInput::default()).is_err());
        assert!(
            validate(&DescribeClusterNodesInput {
                cluster: Some("cl-1234abcd".to_string()),
                ..Default::default()
            })
            .is_ok()
        );
    }

    #[test]
    fn test_nodes_decode_in_response_order() {
        let body = br#"{
            "action": "DescribeClusterNodesResponse",
            "ret_code": 0,
            "total_count": 2,
            "node_set": [
                {"node_id": "cln-b", "role": "master", "cpu": 2, "memory": 4096,
                 "create_time": "2024-02-01T10:00:00Z", "server_id": 1},
                {"node_id": "cln-a", "role": "slave", "cpu": 2, "memory": 4096,
                 "create_time": "2024-02-01T10:00:05Z", "server_id": 2}
            ]
        }"#;

        let output: DescribeClusterNodesOutput = unmarshal(body).unwrap();
        let nodes = output.node_set.unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].node_id.as_deref(), Some("cln-b"));
        assert_eq!(nodes[1].role.as_deref(), Some("slave"));
        assert!(nodes[0].create_time < nodes[1].create_time);
    }
}
