//! Import of named schema objects into IR type declarations.
//!
//! One named schema converts to one declaration plus every anonymous nested
//! schema that had to be hoisted to a declaration of its own.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::diagnostic::{self, schema_pointer, Diagnostic};
use crate::error::ConvertError;
use crate::mapping::{primitive_from_schema, ref_type_name, reference_target};
use crate::naming::synthesize_name;
use crate::shape::{classify, SchemaShape};
use crate::types::{ObjectProperty, PrimitiveType, TypeDeclaration, TypeReference, TypeShape};

/// Nested segment used for array items.
const ITEM_SEGMENT: &str = "Item";
/// Nested segment used for map values.
const VALUE_SEGMENT: &str = "Value";

/// Result of converting one named schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeConversion {
    /// The root declaration first, then hoisted declarations in discovery
    /// order. Empty when the schema was skipped.
    pub declarations: Vec<TypeDeclaration>,
    pub diagnostics: Vec<Diagnostic>,
}

impl TypeConversion {
    /// The declaration for the requested name, if the schema was not skipped.
    pub fn root(&self) -> Option<&TypeDeclaration> {
        self.declarations.first()
    }

    /// Declarations synthesized for nested schemas.
    pub fn hoisted(&self) -> &[TypeDeclaration] {
        self.declarations.get(1..).unwrap_or_default()
    }

    pub fn is_skipped(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// Convert a named schema object into IR declarations.
///
/// `oneOf` schemas are skipped with a `W001` diagnostic rather than failing.
///
/// # Errors
///
/// Returns `ConvertError::UnrecognizedSchemaShape` when a nested schema fits
/// no known shape, `ConvertError::UnsupportedShape` for unknown scalar types,
/// and `ConvertError::UnsupportedReference` for references outside
/// `#/components/schemas`.
pub fn convert_type(name: &str, schema: &Value) -> Result<TypeConversion, ConvertError> {
    let mut hoister = Hoister::new(name);
    let root = vec![name.to_string()];

    let shape = match classify(schema) {
        SchemaShape::Reference(reference) => TypeShape::Alias {
            alias_of: TypeReference::named(ref_type_name(reference)?),
        },
        SchemaShape::Empty => TypeShape::empty_object(),
        SchemaShape::OneOf(members) => {
            debug!(type_name = name, members = members.len(), "Skipping oneOf schema.");
            return Ok(TypeConversion {
                declarations: Vec::new(),
                diagnostics: vec![Diagnostic::warning(
                    diagnostic::ONE_OF_SKIPPED,
                    schema_pointer(name),
                    "oneOf schemas are not supported on import; type skipped",
                )],
            });
        }
        SchemaShape::Enum(values) => TypeShape::Enum {
            values: hoister.string_values(&root, values),
        },
        SchemaShape::Scalar(_) => TypeShape::Alias {
            alias_of: TypeReference::Primitive(primitive_from_schema(schema)?),
        },
        SchemaShape::Array(Some(items)) => TypeShape::Alias {
            alias_of: TypeReference::list(hoister.convert_nested(&root, ITEM_SEGMENT, items)?),
        },
        SchemaShape::Object => hoister.object_shape(&root, schema)?,
        SchemaShape::Map(values) => TypeShape::Alias {
            alias_of: TypeReference::map(
                PrimitiveType::String.into(),
                hoister.convert_nested(&root, VALUE_SEGMENT, values)?,
            ),
        },
        SchemaShape::Array(None) | SchemaShape::Unrecognized => {
            return Err(ConvertError::UnrecognizedSchemaShape {
                path: name.to_string(),
                schema: schema.clone(),
            })
        }
    };

    let declaration = TypeDeclaration::new(name, shape).with_docs(description(schema));
    debug!(
        type_name = name,
        hoisted = hoister.hoisted.len(),
        "Converted schema."
    );

    let mut declarations = Vec::with_capacity(hoister.hoisted.len() + 1);
    declarations.push(declaration);
    declarations.extend(hoister.hoisted);
    Ok(TypeConversion {
        declarations,
        diagnostics: hoister.diagnostics,
    })
}

/// Accumulates hoisted declarations for one top-level conversion.
struct Hoister<'n> {
    root_name: &'n str,
    hoisted: Vec<TypeDeclaration>,
    diagnostics: Vec<Diagnostic>,
}

impl<'n> Hoister<'n> {
    fn new(root_name: &'n str) -> Self {
        Self {
            root_name,
            hoisted: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Convert a schema found at `parents` + `segment` into a type reference,
    /// hoisting enums and objects under their synthesized names.
    fn convert_nested(
        &mut self,
        parents: &[String],
        segment: &str,
        schema: &Value,
    ) -> Result<TypeReference, ConvertError> {
        let mut path = parents.to_vec();
        path.push(segment.to_string());

        match classify(schema) {
            SchemaShape::Reference(reference) => {
                Ok(TypeReference::named(ref_type_name(reference)?))
            }
            SchemaShape::Enum(values) => {
                let values = self.string_values(&path, values);
                Ok(self.hoist(&path, TypeShape::Enum { values }, schema))
            }
            SchemaShape::Scalar(_) => Ok(TypeReference::Primitive(primitive_from_schema(schema)?)),
            SchemaShape::Array(Some(items)) => Ok(TypeReference::list(self.convert_nested(
                &path,
                ITEM_SEGMENT,
                items,
            )?)),
            SchemaShape::Object => {
                let shape = self.object_shape(&path, schema)?;
                Ok(self.hoist(&path, shape, schema))
            }
            SchemaShape::Map(values) => Ok(TypeReference::map(
                PrimitiveType::String.into(),
                self.convert_nested(&path, VALUE_SEGMENT, values)?,
            )),
            SchemaShape::Empty
            | SchemaShape::OneOf(_)
            | SchemaShape::Array(None)
            | SchemaShape::Unrecognized => Err(ConvertError::UnrecognizedSchemaShape {
                path: path.join("/"),
                schema: schema.clone(),
            }),
        }
    }

    fn hoist(&mut self, path: &[String], shape: TypeShape, schema: &Value) -> TypeReference {
        let name = synthesize_name(path);
        debug!(root = self.root_name, hoisted = %name, "Hoisting nested schema.");
        self.hoisted
            .push(TypeDeclaration::new(name.clone(), shape).with_docs(description(schema)));
        TypeReference::Named(name)
    }

    /// Object declaration from `properties`, `required` and `allOf`.
    ///
    /// Referenced `allOf` members become `extends`; inline members contribute
    /// their properties. A property is required if any `required` list of the
    /// schema or its inline members names it.
    fn object_shape(&mut self, path: &[String], schema: &Value) -> Result<TypeShape, ConvertError> {
        let mut extends = Vec::new();
        let mut inline = Vec::new();

        if let Some(members) = schema.get("allOf").and_then(|v| v.as_array()) {
            for member in members {
                match reference_target(member) {
                    Some(reference) => extends.push(ref_type_name(reference)?.to_string()),
                    None => inline.push(member),
                }
            }
        }
        inline.push(schema);

        let required: HashSet<&str> = inline
            .iter()
            .filter_map(|s| s.get("required").and_then(|v| v.as_array()))
            .flatten()
            .filter_map(|v| v.as_str())
            .collect();

        let mut properties = Vec::new();
        for source in inline {
            self.collect_properties(path, source, &required, &mut properties)?;
        }

        Ok(TypeShape::Object {
            extends,
            properties,
        })
    }

    /// Properties missing from `required` become `optional<T>`.
    fn collect_properties(
        &mut self,
        path: &[String],
        schema: &Value,
        required: &HashSet<&str>,
        out: &mut Vec<ObjectProperty>,
    ) -> Result<(), ConvertError> {
        let Some(props) = schema.get("properties").and_then(|v| v.as_object()) else {
            return Ok(());
        };

        for (key, prop) in props {
            let mut value_type = self.convert_nested(path, key, prop)?;
            if !required.contains(key.as_str()) {
                value_type = TypeReference::optional(value_type);
            }
            out.push(ObjectProperty {
                key: key.clone(),
                value_type,
                docs: description(prop),
            });
        }
        Ok(())
    }

    /// String enum values in order; anything else is dropped with a `W004`.
    fn string_values(&mut self, path: &[String], values: &[Value]) -> Vec<String> {
        let kept: Vec<String> = values
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect();
        let dropped = values.len() - kept.len();
        if dropped > 0 {
            self.diagnostics.push(Diagnostic::warning(
                diagnostic::ENUM_VALUES_DROPPED,
                schema_pointer(self.root_name),
                format!(
                    "dropped {} non-string enum value(s) from {}",
                    dropped,
                    synthesize_name(path)
                ),
            ));
        }
        kept
    }
}

fn description(schema: &Value) -> Option<String> {
    schema
        .get("description")
        .and_then(|d| d.as_str())
        .map(String::from)
}
