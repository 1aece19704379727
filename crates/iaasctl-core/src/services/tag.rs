//! Resource tagging

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Result;
use crate::operation::{HttpMethod, Properties};
use crate::schema::{FieldSchema, Schema, StructSchema};

pub const TAGGABLE_RESOURCE_TYPES: &[&str] = &[
    "instance",
    "volume",
    "keypair",
    "security_group",
    "vxnet",
    "eip",
    "router",
    "loadbalancer",
    "snapshot",
    "cache",
    "cluster",
    "server_certificate",
];

#[derive(Debug, Clone)]
pub struct TagService {
    client: Client,
    properties: Properties,
}

impl TagService {
    pub fn new(client: Client, properties: Properties) -> Self {
        Self { client, properties }
    }

    pub async fn attach_tags(&self, input: &AttachTagsInput) -> Result<AttachTagsOutput> {
        let op = self
            .client
            .operation("AttachTags", HttpMethod::Get, self.properties.clone());
        self.client.send(&op, input).await
    }

    pub async fn describe_tags(&self, input: &DescribeTagsInput) -> Result<DescribeTagsOutput> {
        let op = self
            .client
            .operation("DescribeTags", HttpMethod::Get, self.properties.clone());
        self.client.send(&op, input).await
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceTagPair {
    pub resource_id: Option<String>,
    pub resource_type: Option<String>,
    pub tag_id: Option<String>,
}

static RESOURCE_TAG_PAIR: StructSchema = StructSchema {
    type_name: "ResourceTagPair",
    fields: &[
        FieldSchema::param("resource_id").required(),
        FieldSchema::param("resource_type")
            .required()
            .one_of(TAGGABLE_RESOURCE_TYPES),
        FieldSchema::param("tag_id").required(),
    ],
};

impl Schema for ResourceTagPair {
    fn schema() -> &'static StructSchema {
        &RESOURCE_TAG_PAIR
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AttachTagsInput {
    pub resource_tag_pairs: Option<Vec<ResourceTagPair>>,
}

static ATTACH_TAGS_INPUT: StructSchema = StructSchema {
    type_name: "AttachTagsInput",
    fields: &[FieldSchema::param("resource_tag_pairs")
        .required()
        .list_of(&RESOURCE_TAG_PAIR)],
};

impl Schema for AttachTagsInput {
    fn schema() -> &'static StructSchema {
        &ATTACH_TAGS_INPUT
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttachTagsOutput {
    pub action: Option<String>,
    pub ret_code: Option<i64>,
    pub message: Option<String>,
}

static ATTACH_TAGS_OUTPUT: StructSchema = StructSchema {
    type_name: "AttachTagsOutput",
    fields: &[
        FieldSchema::element("action"),
        FieldSchema::element("ret_code"),
        FieldSchema::element("message"),
    ],
};

impl Schema for AttachTagsOutput {
    fn schema() -> &'static StructSchema {
        &ATTACH_TAGS_OUTPUT
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DescribeTagsInput {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub owner: Option<String>,
    pub search_word: Option<String>,
    pub tags: Option<Vec<String>>,
    pub verbose: Option<i64>,
}

static DESCRIBE_TAGS_INPUT: StructSchema = StructSchema {
    type_name: "DescribeTagsInput",
    fields: &[
        FieldSchema::param("limit").default_value("20"),
        FieldSchema::param("offset").default_value("0"),
        FieldSchema::param("owner"),
        FieldSchema::param("search_word"),
        FieldSchema::param("tags").list(),
        FieldSchema::param("verbose").one_of(&["0", "1"]),
    ],
};

impl Schema for DescribeTagsInput {
    fn schema() -> &'static StructSchema {
        &DESCRIBE_TAGS_INPUT
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceTypeCount {
    pub count: Option<i64>,
    pub resource_type: Option<String>,
}

static RESOURCE_TYPE_COUNT: StructSchema = StructSchema {
    type_name: "ResourceTypeCount",
    fields: &[
        FieldSchema::element("count"),
        FieldSchema::element("resource_type"),
    ],
};

impl Schema for ResourceTypeCount {
    fn schema() -> &'static StructSchema {
        &RESOURCE_TYPE_COUNT
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tag {
    pub color: Option<String>,
    pub create_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub resource_count: Option<i64>,
    pub resource_type_count: Option<Vec<ResourceTypeCount>>,
    pub tag_id: Option<String>,
    pub tag_name: Option<String>,
}

static TAG: StructSchema = StructSchema {
    type_name: "Tag",
    fields: &[
        FieldSchema::element("color"),
        FieldSchema::element("create_time").timestamp(),
        FieldSchema::element("description"),
        FieldSchema::element("owner"),
        FieldSchema::element("resource_count"),
        FieldSchema::element("resource_type_count").list_of(&RESOURCE_TYPE_COUNT),
        FieldSchema::element("tag_id"),
        FieldSchema::element("tag_name"),
    ],
};

impl Schema for Tag {
    fn schema() -> &'static StructSchema {
        &TAG
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescribeTagsOutput {
    pub action: Option<String>,
    pub ret_code: Option<i64>,
    pub message: Option<String>,
    pub tag_set: Option<Vec<Tag>>,
    pub total_count: Option<i64>,
}

static DESCRIBE_TAGS_OUTPUT: StructSchema = StructSchema {
    type_name: "DescribeTagsOutput",
    fields: &[
        FieldSchema::element("action"),
        FieldSchema::element("ret_code"),
        FieldSchema::element("message"),
        FieldSchema::element("tag_set").list_of(&TAG),
        FieldSchema::element("total_count"),
    ],
};

impl Schema for DescribeTagsOutput {
    fn schema() -> &'static StructSchema {
        &DESCRIBE_TAGS_OUTPUT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::marshal::marshal;
    use crate::services::coverage::assert_schema_matches;
    use crate::validate::validate;
    use pretty_assertions::assert_eq;

    fn pair(resource_id: &str, resource_type: &str) -> ResourceTagPair {
        ResourceTagPair {
            resource_id: Some(resource_id.to_string()),
            resource_type: Some(resource_type.to_string()),
            tag_id: Some("tag-1".to_string()),
        }
    }

    #[test]
    fn test_schemas_match_types() {
        assert_schema_matches(&ResourceTagPair::default());
        assert_schema_matches(&AttachTagsInput::default());
        assert_schema_matches(&AttachTagsOutput::default());
        assert_schema_matches(&DescribeTagsInput::default());
        assert_schema_matches(&DescribeTagsOutput::default());
        assert_schema_matches(&Tag::default());
        assert_schema_matches(&ResourceTypeCount::default());
    }

    #[test]
    fn test_attach_tags_flattens_pairs() {
        let input = AttachTagsInput {
            resource_tag_pairs: Some(vec![pair("c-1", "cache"), pair("cl-2", "cluster")]),
        };
        let params = marshal(&input).unwrap();
        let flat: Vec<_> = params.iter().collect();
        assert_eq!(
            flat,
            vec![
                ("resource_tag_pairs.1.resource_id", "c-1"),
                ("resource_tag_pairs.1.resource_type", "cache"),
                ("resource_tag_pairs.1.tag_id", "tag-1"),
                ("resource_tag_pairs.2.resource_id", "cl-2"),
                ("resource_tag_pairs.2.resource_type", "cluster"),
                ("resource_tag_pairs.2.tag_id", "tag-1"),
            ]
        );
    }

    #[test]
    fn test_nested_violation_is_reported_unchanged() {
        let mut second = pair("cl-2", "cluster");
        second.tag_id = None;
        let input = AttachTagsInput {
            resource_tag_pairs: Some(vec![pair("c-1", "cache"), second]),
        };
        assert_eq!(
            validate(&input),
            Err(ValidationError::ParameterRequired {
                field: "tag_id".to_string(),
                owning_type: "ResourceTagPair".to_string(),
            })
        );
    }
}
