//! Flattening validated inputs into ordered wire parameters

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::schema::{ArrayStyle, FieldKind, FieldSchema, Schema, StructSchema};
use crate::validate::{json_type, present_value, scalar_text, to_wire_object, wire_timestamp};

/// Ordered (key, value) pairs as they go on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterList {
    pairs: Vec<(String, String)>,
}

impl ParameterList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value recorded for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn extend(&mut self, other: ParameterList) {
        self.pairs.extend(other.pairs);
    }

    /// Pairs stably sorted by key. Insertion order is left untouched.
    pub fn canonical(&self) -> Vec<(&str, &str)> {
        let mut sorted: Vec<(&str, &str)> = self.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        sorted
    }

    /// Percent-encoded `k=v&k=v` in insertion order
    pub fn to_query_string(&self) -> String {
        encode_pairs(self.iter())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Percent-encode and join pairs. Only RFC 3986 unreserved characters are
/// left as-is, so a space becomes `%20`.
pub(crate) fn encode_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Marshal an input into wire parameters
pub fn marshal<T: Serialize + Schema>(input: &T) -> Result<ParameterList, ValidationError> {
    let object = to_wire_object(input, T::schema())?;
    marshal_object(&object, T::schema())
}

/// Marshal an already serialized input
pub fn marshal_object(
    object: &Map<String, Value>,
    schema: &StructSchema,
) -> Result<ParameterList, ValidationError> {
    let mut out = ParameterList::new();
    flatten(None, object, schema, &mut out)?;
    Ok(out)
}

fn flatten(
    prefix: Option<&str>,
    object: &Map<String, Value>,
    schema: &StructSchema,
    out: &mut ParameterList,
) -> Result<(), ValidationError> {
    for field in schema.params() {
        let key = match prefix {
            Some(p) => format!("{p}.{}", field.name),
            None => field.name.to_string(),
        };

        let Some(value) = present_value(object, field) else {
            if let Some(default) = field.default {
                out.push(key, default);
            }
            continue;
        };

        match field.kind {
            FieldKind::Scalar => out.push(key, scalar(field, schema, value)?),
            FieldKind::Timestamp => {
                let text = scalar(field, schema, value)?;
                let formatted = wire_timestamp(&text).ok_or_else(|| {
                    malformed(field, schema, format!("\"{text}\" is not an RFC 3339 timestamp"))
                })?;
                out.push(key, formatted);
            }
            FieldKind::ScalarArray(style) => {
                for (i, item) in array(field, schema, value)?.iter().enumerate() {
                    let text = scalar(field, schema, item)?;
                    match style {
                        ArrayStyle::Indexed => out.push(format!("{key}.{}", i + 1), text),
                        ArrayStyle::Repeated => out.push(key.clone(), text),
                    }
                }
            }
            FieldKind::Struct(nested) => {
                flatten(Some(&key), object_of(field, schema, value)?, nested, out)?;
            }
            FieldKind::StructArray(nested) => {
                for (i, item) in array(field, schema, value)?.iter().enumerate() {
                    let item_key = format!("{key}.{}", i + 1);
                    flatten(Some(&item_key), object_of(field, schema, item)?, nested, out)?;
                }
            }
            FieldKind::Map => {
                let mut entries: Vec<_> = object_of(field, schema, value)?.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                for (map_key, entry) in entries {
                    out.push(format!("{key}.{map_key}"), scalar(field, schema, entry)?);
                }
            }
        }
    }
    Ok(())
}

fn scalar(
    field: &FieldSchema,
    schema: &StructSchema,
    value: &Value,
) -> Result<String, ValidationError> {
    scalar_text(value).ok_or_else(|| {
        malformed(field, schema, format!("expected a scalar, got {}", json_type(value)))
    })
}

fn array<'a>(
    field: &FieldSchema,
    schema: &StructSchema,
    value: &'a Value,
) -> Result<&'a Vec<Value>, ValidationError> {
    value.as_array().ok_or_else(|| {
        malformed(field, schema, format!("expected an array, got {}", json_type(value)))
    })
}

fn object_of<'a>(
    field: &FieldSchema,
    schema: &StructSchema,
    value: &'a Value,
) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| {
        malformed(field, schema, format!("expected an object, got {}", json_type(value)))
    })
}

fn malformed(field: &FieldSchema, schema: &StructSchema, reason: String) -> ValidationError {
    ValidationError::Malformed {
        field: field.name.to_string(),
        owning_type: schema.type_name.to_string(),
        reason,
    }
}
