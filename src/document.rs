//! Whole-document conversion in both directions.
//!
//! The import driver converts every eligible schema and operation and turns
//! per-entity failures into diagnostics, so one bad entity never stops the
//! batch.

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::diagnostic::{self, operation_pointer, schema_pointer, Diagnostic};
use crate::error::ConvertError;
use crate::export::{convert_declarations, convert_services};
use crate::mapping::reference_target;
use crate::registry::TypeRegistry;
use crate::service_converter::{convert_operation, path_operations};
use crate::type_converter::convert_type;
use crate::types::{
    HttpEndpoint, HttpService, IntermediateRepresentation, TypeDeclaration, TypeShape,
};

/// Options for importing an OpenAPI document.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Name of the HTTP service that receives the converted endpoints.
    pub service_name: String,
    /// Report named references that have no declaration after import.
    pub check_references: bool,
}

impl ImportOptions {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            check_references: true,
        }
    }

    /// Enable or disable the unresolved-reference check.
    pub fn check_references(mut self, check: bool) -> Self {
        self.check_references = check;
        self
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self::new("Service")
    }
}

/// Everything an import pass produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportResult {
    pub types: TypeRegistry,
    pub service: HttpService,
    pub diagnostics: Vec<Diagnostic>,
}

impl ImportResult {
    /// Returns true if any entity failed to convert.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Package the result as an IR value for the export direction.
    pub fn to_ir(&self, api_name: impl Into<String>) -> IntermediateRepresentation {
        IntermediateRepresentation {
            api_name: api_name.into(),
            types: self.types.iter().cloned().collect(),
            services: vec![self.service.clone()],
        }
    }

    /// Render as a definition document in the compact declaration syntax.
    pub fn to_definition(&self) -> Value {
        let types: Map<String, Value> = self
            .types
            .iter()
            .map(|declaration| (declaration.name.clone(), declaration_definition(declaration)))
            .collect();
        let endpoints: Map<String, Value> = self
            .service
            .endpoints
            .iter()
            .map(|(id, endpoint)| (id.clone(), endpoint_definition(endpoint)))
            .collect();

        json!({
            "types": types,
            "services": {
                "http": {
                    self.service.name.clone(): { "endpoints": endpoints }
                }
            }
        })
    }
}

/// Import `components.schemas` and `paths` of an OpenAPI v3 document.
pub fn import_document(document: &Value, options: &ImportOptions) -> ImportResult {
    let mut types = TypeRegistry::new();
    let mut diagnostics = Vec::new();

    if let Some(schemas) = document
        .pointer("/components/schemas")
        .and_then(|s| s.as_object())
    {
        for (name, schema) in schemas {
            if reference_target(schema).is_some() {
                debug!(type_name = %name, "Skipping top-level reference schema.");
                diagnostics.push(Diagnostic::warning(
                    diagnostic::REFERENCE_SKIPPED,
                    schema_pointer(name),
                    "top-level reference schemas are not converted; type skipped",
                ));
                continue;
            }

            let converted = convert_type(name, schema).and_then(|conversion| {
                diagnostics.extend(conversion.diagnostics);
                types.extend(conversion.declarations)
            });
            if let Err(e) = converted {
                debug!(type_name = %name, error = %e, "Schema conversion failed.");
                diagnostics.push(Diagnostic::error(
                    diagnostic::TYPE_FAILED,
                    schema_pointer(name),
                    e.to_string(),
                ));
            }
        }
    }

    let mut service = HttpService::new(options.service_name.clone());
    if let Some(paths) = document.get("paths") {
        for operation in path_operations(paths, &mut diagnostics) {
            let converted = convert_operation(&operation)
                .and_then(|(id, endpoint)| service.insert_endpoint(id, endpoint));
            if let Err(e) = converted {
                debug!(path = operation.path, method = %operation.method, error = %e, "Operation conversion failed.");
                diagnostics.push(Diagnostic::error(
                    diagnostic::OPERATION_FAILED,
                    operation.pointer(),
                    e.to_string(),
                ));
            }
        }
    }

    if options.check_references {
        diagnostics.extend(unresolved_reference_diagnostics(&types, &service));
    }

    info!(
        types = types.len(),
        endpoints = service.endpoints.len(),
        diagnostics = diagnostics.len(),
        "Imported OpenAPI document."
    );

    ImportResult {
        types,
        service,
        diagnostics,
    }
}

fn unresolved_reference_diagnostics(types: &TypeRegistry, service: &HttpService) -> Vec<Diagnostic> {
    let unresolved = |referenced_by: &str, name: &str| {
        ConvertError::UnresolvedReference {
            name: name.to_string(),
            referenced_by: referenced_by.to_string(),
        }
        .to_string()
    };

    let mut diagnostics: Vec<Diagnostic> = types
        .unresolved_references()
        .into_iter()
        .map(|(referenced_by, name)| {
            Diagnostic::error(
                diagnostic::UNRESOLVED_REFERENCE,
                schema_pointer(referenced_by),
                unresolved(referenced_by, name),
            )
        })
        .collect();

    for (operation_id, endpoint) in &service.endpoints {
        for name in endpoint
            .referenced_names()
            .into_iter()
            .filter(|name| !types.contains(name))
        {
            diagnostics.push(Diagnostic::error(
                diagnostic::UNRESOLVED_REFERENCE,
                operation_pointer(&endpoint.path, Some(endpoint.method.path_item_key())),
                unresolved(operation_id, name),
            ));
        }
    }
    diagnostics
}

/// Alias without docs -> bare reference string; everything else an object.
fn declaration_definition(declaration: &TypeDeclaration) -> Value {
    let mut definition = Map::new();
    match &declaration.shape {
        TypeShape::Alias { alias_of } => {
            let Some(docs) = &declaration.docs else {
                return Value::String(alias_of.to_string());
            };
            definition.insert("type".into(), json!(alias_of.to_string()));
            definition.insert("docs".into(), json!(docs));
            return Value::Object(definition);
        }
        TypeShape::Object {
            extends,
            properties,
        } => {
            if !extends.is_empty() {
                definition.insert("extends".into(), json!(extends));
            }
            let fields: Map<String, Value> = properties
                .iter()
                .map(|p| {
                    let field = match &p.docs {
                        Some(docs) => json!({ "type": p.value_type.to_string(), "docs": docs }),
                        None => json!(p.value_type.to_string()),
                    };
                    (p.key.clone(), field)
                })
                .collect();
            definition.insert("fields".into(), Value::Object(fields));
        }
        TypeShape::Enum { values } => {
            definition.insert("enum".into(), json!(values));
        }
        TypeShape::Union {
            discriminant,
            types,
        } => {
            definition.insert("discriminant".into(), json!(discriminant));
            let members: Map<String, Value> = types
                .iter()
                .map(|m| {
                    let member = match &m.docs {
                        Some(docs) => json!({ "type": m.value_type.to_string(), "docs": docs }),
                        None => json!(m.value_type.to_string()),
                    };
                    (m.discriminant_value.clone(), member)
                })
                .collect();
            definition.insert("union".into(), Value::Object(members));
        }
    }
    if let Some(docs) = &declaration.docs {
        definition.insert("docs".into(), json!(docs));
    }
    Value::Object(definition)
}

fn endpoint_definition(endpoint: &HttpEndpoint) -> Value {
    let mut definition = Map::new();
    definition.insert("method".into(), json!(endpoint.method.as_str()));
    definition.insert("path".into(), json!(endpoint.path));
    if !endpoint.path_parameters.is_empty() {
        let parameters: Map<String, Value> = endpoint
            .path_parameters
            .iter()
            .map(|(name, primitive)| (name.clone(), json!(primitive.as_str())))
            .collect();
        definition.insert("parameters".into(), Value::Object(parameters));
    }
    if let Some(docs) = &endpoint.docs {
        definition.insert("docs".into(), json!(docs));
    }
    if let Some(request) = &endpoint.request {
        definition.insert("request".into(), json!(request.to_string()));
    }
    if let Some(response) = &endpoint.response {
        definition.insert("response".into(), json!(response.to_string()));
    }
    definition.insert("errors".into(), json!(endpoint.errors));
    Value::Object(definition)
}

/// Options for exporting an IR value as an OpenAPI document.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// `info.title`; defaults to the IR's api name.
    pub title: Option<String>,
    /// `info.version`.
    pub version: String,
    /// Value of the top-level `openapi` field.
    pub openapi_version: String,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: None,
            version: "0.0.0".to_string(),
            openapi_version: "3.0.3".to_string(),
        }
    }
}

/// Assemble an OpenAPI document from an IR value.
///
/// # Errors
///
/// Returns `ConvertError` if a declaration or endpoint cannot be expressed,
/// two declarations share a name, a named type is used but never declared,
/// or two endpoints share a route.
pub fn export_document(
    ir: &IntermediateRepresentation,
    options: &ExportOptions,
) -> Result<Value, ConvertError> {
    let types = TypeRegistry::from_declarations(ir.types.iter().cloned())?;
    types.check_references()?;
    for service in &ir.services {
        for (operation_id, endpoint) in &service.endpoints {
            if let Some(name) = endpoint
                .referenced_names()
                .into_iter()
                .find(|name| !types.contains(name))
            {
                return Err(ConvertError::UnresolvedReference {
                    name: name.to_string(),
                    referenced_by: operation_id.clone(),
                });
            }
        }
    }

    let schemas = convert_declarations(&ir.types)?;
    let paths = convert_services(&ir.services)?;
    let title = options.title.as_deref().unwrap_or(&ir.api_name);

    info!(
        schemas = schemas.len(),
        paths = paths.len(),
        "Exported IR to OpenAPI."
    );

    Ok(json!({
        "openapi": options.openapi_version,
        "info": { "title": title, "version": options.version },
        "paths": paths,
        "components": { "schemas": schemas }
    }))
}
