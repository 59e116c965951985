//! Primitive and container mapping tables, and `$ref` helpers.
//!
//! | IR primitive | schema |
//! |--------------|--------|
//! | `boolean` | `type: boolean` |
//! | `integer` | `type: integer` |
//! | `long` | `type: integer, format: int64` |
//! | `double` | `type: number, format: double` |
//! | `string` | `type: string` |
//! | `datetime` | `type: string, format: date-time` |
//! | `uuid` | `type: string, format: uuid` |

use serde_json::{json, Value};

use crate::error::ConvertError;
use crate::types::{json_type_name, PrimitiveType};

/// Prefix of every named-type reference.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Build a reference object pointing at a declared type.
pub fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("{}{}", SCHEMA_REF_PREFIX, name) })
}

/// Returns the `$ref` string if the value is a reference object.
pub fn reference_target(schema: &Value) -> Option<&str> {
    schema.get("$ref").and_then(|v| v.as_str())
}

/// Extract the type name from a `#/components/schemas/<Name>` reference.
///
/// # Errors
///
/// Returns `ConvertError::UnsupportedReference` for any other reference form.
pub fn ref_type_name(reference: &str) -> Result<&str, ConvertError> {
    reference
        .strip_prefix(SCHEMA_REF_PREFIX)
        .filter(|name| !name.is_empty() && !name.contains('/'))
        .ok_or_else(|| ConvertError::UnsupportedReference {
            reference: reference.to_string(),
        })
}

/// Schema object for an IR primitive.
pub fn primitive_to_schema(primitive: PrimitiveType) -> Value {
    match primitive {
        PrimitiveType::Boolean => json!({ "type": "boolean" }),
        PrimitiveType::Integer => json!({ "type": "integer" }),
        PrimitiveType::Long => json!({ "type": "integer", "format": "int64" }),
        PrimitiveType::Double => json!({ "type": "number", "format": "double" }),
        PrimitiveType::String => json!({ "type": "string" }),
        PrimitiveType::Datetime => json!({ "type": "string", "format": "date-time" }),
        PrimitiveType::Uuid => json!({ "type": "string", "format": "uuid" }),
    }
}

/// IR primitive for a scalar schema object.
///
/// Unknown formats fall back to the plain primitive of the schema's `type`.
///
/// # Errors
///
/// Returns `ConvertError::UnsupportedShape` when the schema has no scalar `type`.
pub fn primitive_from_schema(schema: &Value) -> Result<PrimitiveType, ConvertError> {
    let Some(type_name) = schema.get("type").and_then(|t| t.as_str()) else {
        return Err(ConvertError::UnsupportedShape {
            kind: match schema.get("type") {
                Some(other) => format!("schema type of JSON {}", json_type_name(other)),
                None => "untyped schema".to_string(),
            },
        });
    };
    let format = schema.get("format").and_then(|f| f.as_str());

    match (type_name, format) {
        ("boolean", _) => Ok(PrimitiveType::Boolean),
        ("integer", Some("int64")) => Ok(PrimitiveType::Long),
        ("integer", _) => Ok(PrimitiveType::Integer),
        ("number", _) => Ok(PrimitiveType::Double),
        ("string", Some("date-time")) => Ok(PrimitiveType::Datetime),
        ("string", Some("uuid")) => Ok(PrimitiveType::Uuid),
        ("string", _) => Ok(PrimitiveType::String),
        (other, _) => Err(ConvertError::UnsupportedShape {
            kind: format!("schema type {}", other),
        }),
    }
}

/// Array schema for `list<T>` and `set<T>`.
pub fn array_schema(items: Value) -> Value {
    json!({ "type": "array", "items": items })
}

/// Object schema for string-keyed `map<string, V>`.
pub fn map_schema(values: Value) -> Value {
    json!({ "type": "object", "additionalProperties": values })
}
