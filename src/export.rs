//! Export of IR declarations and services to OpenAPI schema objects.

use serde_json::{json, Map, Value};

use crate::error::ConvertError;
use crate::mapping::{array_schema, map_schema, primitive_to_schema, schema_ref, SCHEMA_REF_PREFIX};
use crate::types::{
    ContainerType, HttpEndpoint, HttpService, PrimitiveType, TypeDeclaration, TypeReference,
    TypeShape, UnionMember,
};

/// A converted type reference and whether a field of that type is required.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedSchema {
    pub schema: Value,
    pub required: bool,
}

/// Convert a type reference into a schema (or `$ref`) object.
///
/// `optional<T>` converts to the schema of `T` with `required: false`;
/// requiredness belongs to the enclosing object. Inner optionals only affect
/// the schema they wrap.
///
/// # Errors
///
/// Returns `ConvertError::UnsupportedShape` for maps keyed by anything but
/// `string`.
pub fn convert_type_reference(reference: &TypeReference) -> Result<ConvertedSchema, ConvertError> {
    let schema = match reference {
        TypeReference::Primitive(primitive) => primitive_to_schema(*primitive),
        TypeReference::Named(name) => schema_ref(name),
        TypeReference::Void => json!({ "type": "object" }),
        TypeReference::Container(container) => match container.as_ref() {
            ContainerType::List(item) | ContainerType::Set(item) => {
                array_schema(convert_type_reference(item)?.schema)
            }
            ContainerType::Map { key, value } => {
                if *key != TypeReference::Primitive(PrimitiveType::String) {
                    return Err(ConvertError::UnsupportedShape {
                        kind: format!("map key {}", key),
                    });
                }
                map_schema(convert_type_reference(value)?.schema)
            }
            ContainerType::Optional(inner) => {
                return Ok(ConvertedSchema {
                    schema: convert_type_reference(inner)?.schema,
                    required: false,
                })
            }
        },
    };
    Ok(ConvertedSchema {
        schema,
        required: true,
    })
}

/// Convert one declaration into the schema stored under its name.
///
/// # Errors
///
/// Returns `ConvertError` if any type reference in the declaration cannot be
/// expressed as a schema.
pub fn convert_declaration(declaration: &TypeDeclaration) -> Result<Value, ConvertError> {
    let mut schema = match &declaration.shape {
        TypeShape::Object {
            extends,
            properties,
        } => {
            let mut converted = Map::new();
            let mut required = Vec::new();
            for property in properties {
                let field = convert_type_reference(&property.value_type)?;
                if property.is_required() {
                    required.push(Value::String(property.key.clone()));
                }
                converted.insert(
                    property.key.clone(),
                    with_description(field.schema, property.docs.as_deref()),
                );
            }

            let mut object = Map::new();
            object.insert("type".into(), json!("object"));
            object.insert("properties".into(), Value::Object(converted));
            if !required.is_empty() {
                object.insert("required".into(), Value::Array(required));
            }
            if !extends.is_empty() {
                let parents = extends.iter().map(|name| schema_ref(name)).collect();
                object.insert("allOf".into(), Value::Array(parents));
            }
            Value::Object(object)
        }
        TypeShape::Alias { alias_of } => convert_type_reference(alias_of)?.schema,
        TypeShape::Enum { values } => json!({ "type": "string", "enum": values }),
        TypeShape::Union {
            discriminant,
            types,
        } => convert_union(discriminant, types)?,
    };

    if let (Some(docs), Value::Object(map)) = (&declaration.docs, &mut schema) {
        map.insert("description".into(), Value::String(docs.clone()));
    }
    Ok(schema)
}

/// Convert declarations into a `components.schemas` map.
///
/// # Errors
///
/// Returns `ConvertError::NameCollision` when two declarations share a name.
pub fn convert_declarations(
    declarations: &[TypeDeclaration],
) -> Result<Map<String, Value>, ConvertError> {
    let mut schemas = Map::new();
    for declaration in declarations {
        if schemas.contains_key(&declaration.name) {
            return Err(ConvertError::NameCollision {
                name: declaration.name.clone(),
            });
        }
        schemas.insert(declaration.name.clone(), convert_declaration(declaration)?);
    }
    Ok(schemas)
}

/// Every member becomes `allOf: [<member type>, <discriminant assertion>]`.
fn convert_union(discriminant: &str, members: &[UnionMember]) -> Result<Value, ConvertError> {
    let mut one_of = Vec::with_capacity(members.len());
    let mut mapping = Map::new();

    for member in members {
        let value = convert_type_reference(&member.value_type)?;
        if let TypeReference::Named(name) = &member.value_type {
            mapping.insert(
                member.discriminant_value.clone(),
                Value::String(format!("{}{}", SCHEMA_REF_PREFIX, name)),
            );
        }

        let assertion = json!({
            "type": "object",
            "properties": {
                discriminant: { "type": "string", "enum": [member.discriminant_value] }
            },
            "required": [discriminant]
        });
        one_of.push(with_description(
            json!({ "allOf": [value.schema, assertion] }),
            member.docs.as_deref(),
        ));
    }

    let mut discriminator = Map::new();
    discriminator.insert("propertyName".into(), json!(discriminant));
    if !mapping.is_empty() {
        discriminator.insert("mapping".into(), Value::Object(mapping));
    }
    Ok(json!({ "oneOf": one_of, "discriminator": discriminator }))
}

/// Convert services into an OpenAPI `paths` map.
///
/// # Errors
///
/// Returns `ConvertError::DuplicateRoute` when two endpoints share a method
/// and path, or any error from converting their body types.
pub fn convert_services(services: &[HttpService]) -> Result<Map<String, Value>, ConvertError> {
    let mut paths = Map::new();
    for service in services {
        for (operation_id, endpoint) in &service.endpoints {
            let item = paths
                .entry(endpoint.path.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            let Value::Object(item) = item else {
                continue;
            };
            let key = endpoint.method.path_item_key();
            if item.contains_key(key) {
                return Err(ConvertError::DuplicateRoute {
                    method: endpoint.method.to_string(),
                    path: endpoint.path.clone(),
                });
            }
            item.insert(key.to_string(), convert_endpoint(operation_id, endpoint)?);
        }
    }
    Ok(paths)
}

/// Convert one endpoint into an operation object.
///
/// # Errors
///
/// Returns `ConvertError` if a body type cannot be expressed as a schema.
pub fn convert_endpoint(operation_id: &str, endpoint: &HttpEndpoint) -> Result<Value, ConvertError> {
    let mut operation = Map::new();
    operation.insert("operationId".into(), json!(operation_id));
    if let Some(docs) = &endpoint.docs {
        operation.insert("description".into(), json!(docs));
    }

    if !endpoint.path_parameters.is_empty() {
        let parameters: Vec<Value> = endpoint
            .path_parameters
            .iter()
            .map(|(name, primitive)| {
                json!({
                    "name": name,
                    "in": "path",
                    "required": true,
                    "schema": primitive_to_schema(*primitive)
                })
            })
            .collect();
        operation.insert("parameters".into(), Value::Array(parameters));
    }

    if let Some(request) = &endpoint.request {
        operation.insert(
            "requestBody".into(),
            json!({ "required": true, "content": json_content(request)? }),
        );
    }

    let responses = match &endpoint.response {
        Some(response) if *response != TypeReference::Void => json!({
            "200": { "description": "Successful response", "content": json_content(response)? }
        }),
        _ => json!({ "204": { "description": "No content" } }),
    };
    operation.insert("responses".into(), responses);

    Ok(Value::Object(operation))
}

fn json_content(reference: &TypeReference) -> Result<Value, ConvertError> {
    let converted = convert_type_reference(reference)?;
    Ok(json!({ "application/json": { "schema": converted.schema } }))
}

fn with_description(mut schema: Value, docs: Option<&str>) -> Value {
    if let (Some(docs), Value::Object(map)) = (docs, &mut schema) {
        map.insert("description".into(), json!(docs));
    }
    schema
}
