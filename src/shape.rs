//! Classification of schema objects by shape.
//!
//! Converters classify a schema once and match on the result. Priority,
//! first match wins:
//!
//! | # | Shape | Condition |
//! |---|-------|-----------|
//! | 1 | `Reference` | `$ref` present |
//! | 2 | `Empty` | none of `type`, `properties`, `enum`, `oneOf`, `allOf`, `items`, `additionalProperties` |
//! | 3 | `OneOf` | `oneOf` present |
//! | 4 | `Enum` | `enum` present |
//! | 5 | `Scalar` | `type` is a string other than `array` / `object` |
//! | 6 | `Array` | `type: array` |
//! | 7 | `Object` | `properties` or `allOf` present, or bare `type: object` |
//! | 8 | `Map` | schema-valued `additionalProperties` without `properties` |
//! | - | `Unrecognized` | anything else |

use serde_json::Value;

/// Keys whose presence makes a schema non-empty.
const SHAPE_KEYS: &[&str] = &[
    "type",
    "properties",
    "enum",
    "oneOf",
    "allOf",
    "items",
    "additionalProperties",
];

/// The shape of one schema object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaShape<'a> {
    Reference(&'a str),
    Empty,
    OneOf(&'a [Value]),
    Enum(&'a [Value]),
    Scalar(&'a str),
    Array(Option<&'a Value>),
    Object,
    Map(&'a Value),
    Unrecognized,
}

/// Classify a schema object.
pub fn classify(schema: &Value) -> SchemaShape<'_> {
    let Some(map) = schema.as_object() else {
        return SchemaShape::Unrecognized;
    };

    if let Some(reference) = map.get("$ref").and_then(|r| r.as_str()) {
        return SchemaShape::Reference(reference);
    }
    if !SHAPE_KEYS.iter().any(|key| map.contains_key(*key)) {
        return SchemaShape::Empty;
    }
    if let Some(members) = map.get("oneOf").and_then(|v| v.as_array()) {
        return SchemaShape::OneOf(members);
    }
    if let Some(values) = map.get("enum").and_then(|v| v.as_array()) {
        return SchemaShape::Enum(values);
    }

    let type_name = map.get("type").and_then(|t| t.as_str());
    match type_name {
        Some("array") => return SchemaShape::Array(map.get("items")),
        Some("object") | None => {}
        Some(scalar) => return SchemaShape::Scalar(scalar),
    }

    let has_properties = map.contains_key("properties") || map.contains_key("allOf");
    let additional = map.get("additionalProperties").filter(|v| v.is_object());
    match (has_properties, additional, type_name) {
        (true, _, _) => SchemaShape::Object,
        (false, Some(values), _) => SchemaShape::Map(values),
        (false, None, Some("object")) => SchemaShape::Object,
        _ => SchemaShape::Unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reference_wins_over_everything() {
        let schema = json!({ "$ref": "#/components/schemas/A", "type": "string" });
        assert_eq!(classify(&schema), SchemaShape::Reference("#/components/schemas/A"));
    }

    #[test]
    fn empty_schemas() {
        assert_eq!(classify(&json!({})), SchemaShape::Empty);
        assert_eq!(classify(&json!({ "description": "anything" })), SchemaShape::Empty);
    }

    #[test]
    fn one_of_before_enum_and_type() {
        let schema = json!({
            "type": "string",
            "enum": ["a"],
            "oneOf": [{ "type": "string" }]
        });
        assert!(matches!(classify(&schema), SchemaShape::OneOf(members) if members.len() == 1));
    }

    #[test]
    fn enum_before_scalar_type() {
        let schema = json!({ "type": "string", "enum": ["a", "b"] });
        assert!(matches!(classify(&schema), SchemaShape::Enum(values) if values.len() == 2));
    }

    #[test]
    fn scalar_types() {
        assert_eq!(classify(&json!({ "type": "integer" })), SchemaShape::Scalar("integer"));
        assert_eq!(classify(&json!({ "type": "null" })), SchemaShape::Scalar("null"));
    }

    #[test]
    fn arrays_with_and_without_items() {
        let items = json!({ "type": "string" });
        let schema = json!({ "type": "array", "items": items });
        assert_eq!(classify(&schema), SchemaShape::Array(Some(&items)));
        assert_eq!(classify(&json!({ "type": "array" })), SchemaShape::Array(None));
    }

    #[test]
    fn objects() {
        let typed = json!({ "type": "object", "properties": { "a": { "type": "string" } } });
        assert_eq!(classify(&typed), SchemaShape::Object);

        let implicit = json!({ "properties": {} });
        assert_eq!(classify(&implicit), SchemaShape::Object);

        let composed = json!({ "allOf": [{ "$ref": "#/components/schemas/Base" }] });
        assert_eq!(classify(&composed), SchemaShape::Object);

        assert_eq!(classify(&json!({ "type": "object" })), SchemaShape::Object);
    }

    #[test]
    fn maps_need_schema_valued_additional_properties() {
        let values = json!({ "type": "integer" });
        let schema = json!({ "type": "object", "additionalProperties": values });
        assert_eq!(classify(&schema), SchemaShape::Map(&values));

        let open = json!({ "type": "object", "additionalProperties": true });
        assert_eq!(classify(&open), SchemaShape::Object);

        let with_properties = json!({
            "properties": { "a": { "type": "string" } },
            "additionalProperties": { "type": "string" }
        });
        assert_eq!(classify(&with_properties), SchemaShape::Object);
    }

    #[test]
    fn unrecognized_shapes() {
        assert_eq!(classify(&json!(true)), SchemaShape::Unrecognized);
        assert_eq!(classify(&json!({ "items": { "type": "string" } })), SchemaShape::Unrecognized);
    }
}
