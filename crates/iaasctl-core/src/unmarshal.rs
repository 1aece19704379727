//! Response decoding and error classification
//!
//! Every response is a JSON object carrying the `action` / `ret_code` /
//! `message` envelope. A non-zero `ret_code` becomes [`Error::Service`];
//! otherwise the declared elements of the output schema are picked out of
//! the body and deserialized into the typed output. Undeclared fields are
//! ignored, missing or `null` ones stay absent.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{DecodeError, Error, Result, TransportError};
use crate::schema::{FieldKind, FieldSchema, Schema, StructSchema};

/// Decode a response body into a typed output
pub fn unmarshal<T: DeserializeOwned + Schema>(body: &[u8]) -> Result<T> {
    let schema = T::schema();
    let object = check_envelope(body)?;
    let projected = project(&object, schema)?;
    serde_json::from_value(Value::Object(projected)).map_err(|source| {
        DecodeError::Deserialize {
            type_name: schema.type_name,
            source,
        }
        .into()
    })
}

/// Parse a body and check its envelope, returning the full JSON object.
///
/// `ret_code` is rewritten as an integer in the returned object.
pub fn check_envelope(body: &[u8]) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_slice(body).map_err(DecodeError::InvalidJson)?;
    let Value::Object(mut object) = value else {
        return Err(DecodeError::NotAnObject.into());
    };

    let ret_code = ret_code_of(&object)?;
    if ret_code != 0 {
        return Err(Error::Service {
            ret_code,
            message: object
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        });
    }

    if !object.get("action").is_some_and(Value::is_string) {
        return Err(DecodeError::MissingEnvelopeField("action").into());
    }

    object.insert("ret_code".to_string(), Value::from(ret_code));
    Ok(object)
}

/// Turn a dispatcher failure into the caller-facing error.
///
/// Some gateways answer business rejections with a non-2xx status and a
/// regular envelope; those are service errors, not transport errors.
pub fn classify_transport(err: TransportError) -> Error {
    if let TransportError::HttpStatus { body, .. } = &err
        && let Err(service @ Error::Service { .. }) = check_envelope(body.as_bytes())
    {
        return service;
    }
    Error::Transport(err)
}

fn ret_code_of(object: &Map<String, Value>) -> std::result::Result<i64, DecodeError> {
    let value = object
        .get("ret_code")
        .ok_or(DecodeError::MissingEnvelopeField("ret_code"))?;
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or(DecodeError::UnexpectedShape {
        field: "ret_code".to_string(),
        expected: "an integer",
    })
}

/// Keep only the declared elements of `schema`, recursing into nested records
pub fn project(
    object: &Map<String, Value>,
    schema: &StructSchema,
) -> std::result::Result<Map<String, Value>, DecodeError> {
    let mut out = Map::new();
    for field in schema.elements() {
        match object.get(field.name) {
            None | Some(Value::Null) => {}
            Some(value) => {
                out.insert(field.name.to_string(), project_value(field, value)?);
            }
        }
    }
    Ok(out)
}

fn project_value(field: &FieldSchema, value: &Value) -> std::result::Result<Value, DecodeError> {
    let unexpected = |expected| DecodeError::UnexpectedShape {
        field: field.name.to_string(),
        expected,
    };

    match field.kind {
        FieldKind::Scalar if value.is_array() || value.is_object() => Err(unexpected("a scalar")),
        FieldKind::Scalar => Ok(value.clone()),
        FieldKind::Timestamp if value.is_string() => Ok(value.clone()),
        FieldKind::Timestamp => Err(unexpected("a timestamp string")),
        FieldKind::ScalarArray(_) if value.is_array() => Ok(value.clone()),
        FieldKind::ScalarArray(_) => Err(unexpected("an array")),
        FieldKind::Map if value.is_object() => Ok(value.clone()),
        FieldKind::Map => Err(unexpected("an object")),
        FieldKind::Struct(nested) => {
            let object = value.as_object().ok_or_else(|| unexpected("an object"))?;
            Ok(Value::Object(project(object, nested)?))
        }
        FieldKind::StructArray(nested) => {
            let items = value.as_array().ok_or_else(|| unexpected("an array of objects"))?;
            items
                .iter()
                .map(|item| {
                    item.as_object()
                        .ok_or_else(|| unexpected("an array of objects"))
                        .and_then(|object| project(object, nested))
                        .map(Value::Object)
                })
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Value::Array)
        }
    }
}
