//! Import of an OpenAPI `paths` map into an IR HTTP service.
//!
//! Supported operations are GET, POST, PUT and DELETE. PATCH is skipped with
//! a diagnostic. Bodies must reference a declared schema and parameters must
//! be scalar path parameters.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::diagnostic::{self, operation_pointer, Diagnostic};
use crate::error::ConvertError;
use crate::mapping::{primitive_from_schema, ref_type_name, reference_target};
use crate::types::{HttpEndpoint, HttpMethod, HttpService, PrimitiveType, TypeReference};

/// Success statuses tried in order when resolving the response body.
const SUCCESS_STATUSES: &[&str] = &["200", "201"];

/// Result of converting a whole `paths` map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceConversion {
    pub service: HttpService,
    pub diagnostics: Vec<Diagnostic>,
}

/// One operation of a path item, with the path-level parameters it inherits.
#[derive(Debug, Clone, Copy)]
pub struct PathOperation<'a> {
    pub path: &'a str,
    pub method: HttpMethod,
    pub operation: &'a Value,
    pub shared_parameters: &'a [Value],
}

impl PathOperation<'_> {
    /// JSON Pointer to this operation for diagnostics.
    pub fn pointer(&self) -> String {
        operation_pointer(self.path, Some(self.method.path_item_key()))
    }
}

/// List the convertible operations of a `paths` map.
///
/// Paths come in document order; within a path item methods come in
/// GET, POST, PUT, DELETE order.
///
/// PATCH operations are not returned; each one adds a `W003` diagnostic.
pub fn path_operations<'a>(
    paths: &'a Value,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<PathOperation<'a>> {
    let mut operations = Vec::new();
    let Some(paths) = paths.as_object() else {
        return operations;
    };

    for (path, item) in paths {
        let Some(item) = item.as_object() else {
            continue;
        };
        let shared_parameters = item
            .get("parameters")
            .and_then(|p| p.as_array())
            .map(Vec::as_slice)
            .unwrap_or_default();

        for method in HttpMethod::ALL {
            if let Some(operation) = item.get(method.path_item_key()) {
                operations.push(PathOperation {
                    path,
                    method,
                    operation,
                    shared_parameters,
                });
            }
        }

        if item.contains_key("patch") {
            debug!(path = %path, "Skipping PATCH operation.");
            diagnostics.push(Diagnostic::warning(
                diagnostic::PATCH_SKIPPED,
                operation_pointer(path, Some("patch")),
                "PATCH operations are not supported; operation skipped",
            ));
        }
    }
    operations
}

/// Convert a `paths` map into a service, failing on the first bad operation.
///
/// # Errors
///
/// Returns the first `ConvertError` raised by [`convert_operation`], or
/// `ConvertError::DuplicateOperationId` when two operations share an id.
pub fn convert_paths(service_name: &str, paths: &Value) -> Result<ServiceConversion, ConvertError> {
    let mut diagnostics = Vec::new();
    let mut service = HttpService::new(service_name);

    for operation in path_operations(paths, &mut diagnostics) {
        let (operation_id, endpoint) = convert_operation(&operation)?;
        service.insert_endpoint(operation_id, endpoint)?;
    }

    Ok(ServiceConversion {
        service,
        diagnostics,
    })
}

/// Convert one operation into its operation id and endpoint.
///
/// GET carries no request body, POST/PUT carry one, DELETE carries no
/// response body.
///
/// # Errors
///
/// Returns `ConvertError` when the operation id, success response or request
/// body is missing, a body is inline or not JSON, or a parameter is not a
/// scalar path parameter.
pub fn convert_operation(op: &PathOperation<'_>) -> Result<(String, HttpEndpoint), ConvertError> {
    let operation_id = op
        .operation
        .get("operationId")
        .and_then(|id| id.as_str())
        .ok_or_else(|| ConvertError::MissingOperationId {
            path: op.path.to_string(),
            method: op.method.to_string(),
        })?;

    let response = if op.method.has_response_body() {
        Some(resolve_response(operation_id, op.operation)?)
    } else {
        None
    };

    let request = if op.method.has_request_body() {
        Some(resolve_request(operation_id, op.operation)?)
    } else {
        None
    };

    let path_parameters = convert_parameters(operation_id, op)?;

    let docs = op
        .operation
        .get("description")
        .or_else(|| op.operation.get("summary"))
        .and_then(|d| d.as_str())
        .map(String::from);

    debug!(
        operation_id,
        method = %op.method,
        path = op.path,
        "Converted operation."
    );

    Ok((
        operation_id.to_string(),
        HttpEndpoint {
            method: op.method,
            path: op.path.to_string(),
            path_parameters,
            request,
            response,
            docs,
            errors: Vec::new(),
        },
    ))
}

fn resolve_response(operation_id: &str, operation: &Value) -> Result<TypeReference, ConvertError> {
    let responses = operation.get("responses");
    let response = SUCCESS_STATUSES
        .iter()
        .find_map(|status| responses.and_then(|r| r.get(*status)))
        .ok_or_else(|| ConvertError::MissingSuccessResponse {
            operation_id: operation_id.to_string(),
        })?;
    body_type(operation_id, response, "response")
}

fn resolve_request(operation_id: &str, operation: &Value) -> Result<TypeReference, ConvertError> {
    let body = operation
        .get("requestBody")
        .ok_or_else(|| ConvertError::MissingRequestBody {
            operation_id: operation_id.to_string(),
        })?;
    body_type(operation_id, body, "request body")
}

/// Resolve a request body or response object to the type it carries.
///
/// The first JSON media type with a schema wins; that schema must be a
/// reference.
fn body_type(operation_id: &str, body: &Value, kind: &str) -> Result<TypeReference, ConvertError> {
    if let Some(reference) = reference_target(body) {
        return Ok(TypeReference::named(ref_type_name(reference)?));
    }

    let schema = body
        .get("content")
        .and_then(|c| c.as_object())
        .into_iter()
        .flat_map(|content| content.iter())
        .filter(|(media_type, _)| media_type.contains("json"))
        .find_map(|(_, media)| media.get("schema"))
        .ok_or_else(|| ConvertError::MissingJsonContent {
            operation_id: operation_id.to_string(),
            body: kind.to_string(),
        })?;

    match reference_target(schema) {
        Some(reference) => Ok(TypeReference::named(ref_type_name(reference)?)),
        None => Err(ConvertError::InlineBodyUnsupported {
            operation_id: operation_id.to_string(),
            body: kind.to_string(),
        }),
    }
}

/// Path-item parameters first, overridden by operation parameters of the
/// same name.
fn convert_parameters(
    operation_id: &str,
    op: &PathOperation<'_>,
) -> Result<IndexMap<String, PrimitiveType>, ConvertError> {
    let operation_parameters = op
        .operation
        .get("parameters")
        .and_then(|p| p.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut parameters = IndexMap::new();
    for parameter in op.shared_parameters.iter().chain(operation_parameters) {
        let (name, primitive) = convert_parameter(operation_id, parameter)?;
        parameters.insert(name, primitive);
    }
    Ok(parameters)
}

fn convert_parameter(
    operation_id: &str,
    parameter: &Value,
) -> Result<(String, PrimitiveType), ConvertError> {
    let shape_error = |parameter: &str, reason: &str| ConvertError::UnsupportedParameterShape {
        operation_id: operation_id.to_string(),
        parameter: parameter.to_string(),
        reason: reason.to_string(),
    };

    if let Some(reference) = reference_target(parameter) {
        return Err(shape_error(reference, "referenced parameters are not supported"));
    }
    let name = parameter
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| shape_error("<unnamed>", "parameter has no name"))?;

    let location = parameter.get("in").and_then(|l| l.as_str()).unwrap_or("");
    if location != "path" {
        return Err(ConvertError::UnsupportedParameterLocation {
            operation_id: operation_id.to_string(),
            parameter: name.to_string(),
            location: location.to_string(),
        });
    }

    let schema = parameter
        .get("schema")
        .ok_or_else(|| shape_error(name, "parameter has no schema"))?;
    if reference_target(schema).is_some() {
        return Err(shape_error(name, "referenced parameter schemas are not supported"));
    }
    if schema.get("type").and_then(|t| t.as_str()) == Some("array") {
        return Err(shape_error(name, "list parameters are not supported"));
    }

    let primitive = primitive_from_schema(schema).map_err(|e| shape_error(name, &e.to_string()))?;
    Ok((name.to_string(), primitive))
}
