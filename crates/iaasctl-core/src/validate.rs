//! Generic schema-driven input validation
//!
//! One validator serves every Input type: the value is walked through its
//! `serde` serialization and checked against the type's [`StructSchema`].
//! The first violation wins and is returned unchanged, however deep it was
//! found.

use chrono::DateTime;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::schema::{FieldKind, FieldSchema, Location, Schema, StructSchema};

/// Validate an input against its static schema
pub fn validate<T: Serialize + Schema>(input: &T) -> Result<(), ValidationError> {
    let object = to_wire_object(input, T::schema())?;
    validate_object(&object, T::schema())
}

/// Validate an already serialized input
pub fn validate_object(
    object: &Map<String, Value>,
    schema: &StructSchema,
) -> Result<(), ValidationError> {
    for (key, value) in object {
        let declared = schema
            .field(key)
            .is_some_and(|f| f.location == Location::Params);
        if !declared && !value.is_null() {
            return Err(ValidationError::UnknownField {
                field: key.clone(),
                owning_type: schema.type_name.to_string(),
            });
        }
    }

    for field in schema.params() {
        match present_value(object, field) {
            Some(value) => check_field(field, value, schema)?,
            None if field.required => {
                return Err(ValidationError::ParameterRequired {
                    field: field.name.to_string(),
                    owning_type: schema.type_name.to_string(),
                });
            }
            None => {}
        }
    }

    Ok(())
}

/// Serialize an input into its wire-keyed JSON object
pub(crate) fn to_wire_object<T: Serialize>(
    input: &T,
    schema: &StructSchema,
) -> Result<Map<String, Value>, ValidationError> {
    match serde_json::to_value(input) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(malformed(
            "<root>",
            schema,
            format!("expected an object, got {}", json_type(&other)),
        )),
        Err(e) => Err(malformed("<root>", schema, e.to_string())),
    }
}

/// The field's value if it counts as present.
///
/// `null` is absent, and so is an empty collection: a required list with no
/// items fails exactly like a missing one.
pub(crate) fn present_value<'a>(
    object: &'a Map<String, Value>,
    field: &FieldSchema,
) -> Option<&'a Value> {
    match object.get(field.name)? {
        Value::Null => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() && field.kind.is_collection() => None,
        value => Some(value),
    }
}

/// Wire text of a scalar JSON value
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Normalize an RFC 3339 timestamp to `YYYY-MM-DDTHH:MM:SSZ`
pub(crate) fn wire_timestamp(text: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(text).ok().map(|t| {
        t.with_timezone(&chrono::Utc)
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string()
    })
}

fn check_field(
    field: &FieldSchema,
    value: &Value,
    schema: &StructSchema,
) -> Result<(), ValidationError> {
    match field.kind {
        FieldKind::Scalar => {
            let text = scalar_text(value)
                .ok_or_else(|| shape_error(field, schema, value))?;
            check_allowed(field, &text)
        }
        FieldKind::Timestamp => {
            let text = value
                .as_str()
                .ok_or_else(|| shape_error(field, schema, value))?;
            if wire_timestamp(text).is_none() {
                return Err(malformed(
                    field.name,
                    schema,
                    format!("\"{text}\" is not an RFC 3339 timestamp"),
                ));
            }
            Ok(())
        }
        FieldKind::ScalarArray(_) => {
            let items = value
                .as_array()
                .ok_or_else(|| shape_error(field, schema, value))?;
            for item in items {
                let text =
                    scalar_text(item).ok_or_else(|| shape_error(field, schema, item))?;
                check_allowed(field, &text)?;
            }
            Ok(())
        }
        FieldKind::Struct(nested) => {
            let object = value
                .as_object()
                .ok_or_else(|| shape_error(field, schema, value))?;
            validate_object(object, nested)
        }
        FieldKind::StructArray(nested) => {
            let items = value
                .as_array()
                .ok_or_else(|| shape_error(field, schema, value))?;
            for item in items {
                let object = item
                    .as_object()
                    .ok_or_else(|| shape_error(field, schema, item))?;
                validate_object(object, nested)?;
            }
            Ok(())
        }
        FieldKind::Map => {
            let entries = value
                .as_object()
                .ok_or_else(|| shape_error(field, schema, value))?;
            for entry in entries.values() {
                let text =
                    scalar_text(entry).ok_or_else(|| shape_error(field, schema, entry))?;
                check_allowed(field, &text)?;
            }
            Ok(())
        }
    }
}

fn check_allowed(field: &FieldSchema, text: &str) -> Result<(), ValidationError> {
    if field.allows(text) {
        return Ok(());
    }
    Err(ValidationError::ParameterValueNotAllowed {
        field: field.name.to_string(),
        value: text.to_string(),
        allowed_values: field.allowed_values.iter().map(|v| v.to_string()).collect(),
    })
}

fn shape_error(field: &FieldSchema, schema: &StructSchema, found: &Value) -> ValidationError {
    malformed(
        field.name,
        schema,
        format!("expected {}, got {}", field.kind.describe(), json_type(found)),
    )
}

fn malformed(field: &str, schema: &StructSchema, reason: String) -> ValidationError {
    ValidationError::Malformed {
        field: field.to_string(),
        owning_type: schema.type_name.to_string(),
        reason,
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static ADDRESS: StructSchema = StructSchema {
        type_name: "Address",
        fields: &[
            FieldSchema::param("role").required().one_of(&["master", "slave"]),
            FieldSchema::param("ip"),
        ],
    };

    static REQUEST: StructSchema = StructSchema {
        type_name: "Request",
        fields: &[
            FieldSchema::param("size").required(),
            FieldSchema::param("ids").required().list(),
            FieldSchema::param("kind").one_of(&["a", "b"]),
            FieldSchema::param("addresses").list_of(&ADDRESS),
            FieldSchema::param("primary").nested(&ADDRESS),
            FieldSchema::param("labels").map().one_of(&["x", "y"]),
            FieldSchema::param("since").timestamp(),
            FieldSchema::element("ignored_in_requests").required(),
        ],
    };

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test fixture must be an object"),
        }
    }

    #[test]
    fn test_minimal_valid_request() {
        let input = object(json!({"size": 1, "ids": ["c-1"]}));
        assert_eq!(validate_object(&input, &REQUEST), Ok(()));
    }

    #[test]
    fn test_missing_required_field() {
        let input = object(json!({"ids": ["c-1"]}));
        let err = validate_object(&input, &REQUEST).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ParameterRequired {
                field: "size".to_string(),
                owning_type: "Request".to_string(),
            }
        );
    }

    #[test]
    fn test_null_counts_as_absent() {
        let input = object(json!({"size": null, "ids": ["c-1"]}));
        let err = validate_object(&input, &REQUEST).unwrap_err();
        assert_eq!(err.field(), "size");
    }

    #[test]
    fn test_empty_required_list_fails_like_absent() {
        let absent = validate_object(&object(json!({"size": 1})), &REQUEST).unwrap_err();
        let empty =
            validate_object(&object(json!({"size": 1, "ids": []})), &REQUEST).unwrap_err();
        assert_eq!(absent, empty);
    }

    #[test]
    fn test_value_outside_allowed_set() {
        let input = object(json!({"size": 1, "ids": ["c-1"], "kind": "z"}));
        let err = validate_object(&input, &REQUEST).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ParameterValueNotAllowed {
                field: "kind".to_string(),
                value: "z".to_string(),
                allowed_values: vec!["a".to_string(), "b".to_string()],
            }
        );
    }

    #[test]
    fn test_nested_failure_propagates_unchanged() {
        let input = object(json!({
            "size": 1,
            "ids": ["c-1"],
            "addresses": [{"role": "master"}, {"role": "witness"}],
        }));
        let err = validate_object(&input, &REQUEST).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ParameterValueNotAllowed {
                field: "role".to_string(),
                value: "witness".to_string(),
                allowed_values: vec!["master".to_string(), "slave".to_string()],
            }
        );

        let input = object(json!({"size": 1, "ids": ["c-1"], "primary": {"ip": "10.0.0.1"}}));
        let err = validate_object(&input, &REQUEST).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ParameterRequired {
                field: "role".to_string(),
                owning_type: "Address".to_string(),
            }
        );
    }

    #[test]
    fn test_map_values_checked_against_allowed_set() {
        let ok = object(json!({"size": 1, "ids": ["c-1"], "labels": {"k": "x"}}));
        assert!(validate_object(&ok, &REQUEST).is_ok());

        let bad = object(json!({"size": 1, "ids": ["c-1"], "labels": {"k": "q"}}));
        assert_eq!(validate_object(&bad, &REQUEST).unwrap_err().field(), "labels");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let input = object(json!({"size": 1, "ids": ["c-1"], "sizee": 2}));
        let err = validate_object(&input, &REQUEST).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownField { ref field, .. } if field == "sizee"));
    }

    #[test]
    fn test_shape_mismatch_is_malformed() {
        let input = object(json!({"size": {"nested": true}, "ids": ["c-1"]}));
        let err = validate_object(&input, &REQUEST).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed { ref field, .. } if field == "size"));

        let input = object(json!({"size": 1, "ids": ["c-1"], "since": "yesterday"}));
        let err = validate_object(&input, &REQUEST).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed { ref field, .. } if field == "since"));
    }

    #[test]
    fn test_wire_timestamp_normalizes_to_utc() {
        assert_eq!(
            wire_timestamp("2024-03-01T08:30:00+08:00").as_deref(),
            Some("2024-03-01T00:30:00Z")
        );
        assert_eq!(
            wire_timestamp("2024-03-01T00:30:00.250Z").as_deref(),
            Some("2024-03-01T00:30:00Z")
        );
        assert_eq!(wire_timestamp("03/01/2024"), None);
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&json!("a")).as_deref(), Some("a"));
        assert_eq!(scalar_text(&json!(42)).as_deref(), Some("42"));
        assert_eq!(scalar_text(&json!(1.5)).as_deref(), Some("1.5"));
        assert_eq!(scalar_text(&json!(true)).as_deref(), Some("true"));
        assert_eq!(scalar_text(&json!([1])), None);
    }
}
