//! OpenAPI ⇄ IR
//!
//! Bidirectional translation between OpenAPI v3 documents and a compact
//! intermediate representation (IR) of API types and HTTP services.
//!
//! Import reads `components.schemas` and `paths` into type declarations and
//! endpoints. Export turns IR declarations and services back into an OpenAPI
//! document.
//!
//! # Example
//!
//! ```
//! use openapi_ir::{export_document, import_document, ExportOptions, ImportOptions, TypeShape};
//! use serde_json::json;
//!
//! let document = json!({
//!     "openapi": "3.0.3",
//!     "components": {
//!         "schemas": {
//!             "Post": {
//!                 "type": "object",
//!                 "required": ["id"],
//!                 "properties": {
//!                     "id": { "type": "string", "format": "uuid" },
//!                     "tags": { "type": "array", "items": { "type": "string" } }
//!                 }
//!             }
//!         }
//!     }
//! });
//!
//! let result = import_document(&document, &ImportOptions::new("Blog"));
//! assert!(result.diagnostics.is_empty());
//!
//! let post = result.types.get("Post").unwrap();
//! let TypeShape::Object { properties, .. } = &post.shape else {
//!     panic!("expected an object");
//! };
//! assert_eq!(properties[0].value_type.to_string(), "uuid");
//! assert_eq!(properties[1].value_type.to_string(), "optional<list<string>>");
//!
//! // And back again: optional fields are left out of `required`.
//! let exported = export_document(&result.to_ir("Blog"), &ExportOptions::default()).unwrap();
//! assert_eq!(exported["components"]["schemas"]["Post"]["required"], json!(["id"]));
//! ```
//!
//! # Type Mapping
//!
//! | OpenAPI schema | IR type |
//! |----------------|---------|
//! | `boolean` | `boolean` |
//! | `integer` / `integer` + `int64` | `integer` / `long` |
//! | `number` | `double` |
//! | `string` / + `date-time` / + `uuid` | `string` / `datetime` / `uuid` |
//! | `array` + `items` | `list<T>` |
//! | `additionalProperties` schema | `map<string, T>` |
//! | `$ref: #/components/schemas/X` | `X` |
//! | property missing from `required` | `optional<T>` |
//!
//! Inline object and enum schemas nested inside a named schema are hoisted to
//! their own declarations, named after the path that leads to them
//! (`Post.comments[].status` becomes `PostCommentsItemStatus`).

pub mod diagnostic;
mod document;
mod error;
mod export;
mod loader;
mod mapping;
mod naming;
mod registry;
mod service_converter;
mod shape;
mod type_converter;
mod types;

pub use diagnostic::{Diagnostic, Severity};
pub use document::{
    export_document, import_document, ExportOptions, ImportOptions, ImportResult,
};
pub use error::{ConvertError, LoadError};
pub use export::{
    convert_declaration, convert_declarations, convert_endpoint, convert_services,
    convert_type_reference, ConvertedSchema,
};
pub use loader::{
    ensure_openapi_v3, is_url, load_document, load_document_auto, load_document_str, load_ir,
    load_ir_str,
};
pub use mapping::{primitive_from_schema, primitive_to_schema, schema_ref, SCHEMA_REF_PREFIX};
pub use naming::synthesize_name;
pub use registry::TypeRegistry;
pub use service_converter::{
    convert_operation, convert_paths, path_operations, PathOperation, ServiceConversion,
};
pub use shape::{classify, SchemaShape};
pub use type_converter::{convert_type, TypeConversion};
pub use types::{
    ContainerType, HttpEndpoint, HttpMethod, HttpService, IntermediateRepresentation,
    ObjectProperty, PrimitiveType, TypeDeclaration, TypeReference, TypeShape, UnionMember,
};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
