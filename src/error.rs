//! Error types for schema translation and document loading.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Hard failures while translating a single type, operation, or declaration.
///
/// Each variant carries enough context to locate the offending input.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("operation {method} {path} has no operationId")]
    MissingOperationId { path: String, method: String },

    #[error("operationId \"{operation_id}\" is declared more than once")]
    DuplicateOperationId { operation_id: String },

    #[error("operation {operation_id} has neither a 200 nor a 201 response")]
    MissingSuccessResponse { operation_id: String },

    #[error("operation {operation_id} has no request body")]
    MissingRequestBody { operation_id: String },

    #[error("operation {operation_id} {body} has no JSON media type with a schema")]
    MissingJsonContent { operation_id: String, body: String },

    #[error("operation {operation_id} {body} uses an inline schema; only schema references are supported")]
    InlineBodyUnsupported { operation_id: String, body: String },

    #[error("parameter \"{parameter}\" of operation {operation_id} is in {location}; only path parameters are supported")]
    UnsupportedParameterLocation {
        operation_id: String,
        parameter: String,
        location: String,
    },

    #[error("parameter \"{parameter}\" of operation {operation_id}: {reason}")]
    UnsupportedParameterShape {
        operation_id: String,
        parameter: String,
        reason: String,
    },

    #[error("unrecognized schema shape at {path}: {schema}")]
    UnrecognizedSchemaShape { path: String, schema: Value },

    #[error("unsupported shape: {kind}")]
    UnsupportedShape { kind: String },

    #[error("unsupported reference \"{reference}\": expected #/components/schemas/<Name>")]
    UnsupportedReference { reference: String },

    #[error("invalid type reference \"{text}\": {reason}")]
    InvalidTypeReference { text: String, reason: String },

    #[error("type \"{name}\" is declared more than once")]
    NameCollision { name: String },

    #[error("\"{referenced_by}\" references undeclared type \"{name}\"")]
    UnresolvedReference { name: String, referenced_by: String },

    #[error("route {method} {path} is declared by more than one endpoint")]
    DuplicateRoute { method: String, path: String },
}

impl ConvertError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while reading an OpenAPI document or an IR file.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid document: {message}")]
    InvalidDocument { message: String },

    #[error("not an OpenAPI v3 document (openapi = {found})")]
    NotOpenApiV3 { found: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}
