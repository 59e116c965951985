//! Structured diagnostics for skipped and failed entities.

use std::fmt;

use serde::Serialize;

/// `oneOf` schema skipped on import.
pub const ONE_OF_SKIPPED: &str = "W001";
/// Top-level reference schema skipped on import.
pub const REFERENCE_SKIPPED: &str = "W002";
/// PATCH operation skipped on import.
pub const PATCH_SKIPPED: &str = "W003";
/// Non-string enum values dropped.
pub const ENUM_VALUES_DROPPED: &str = "W004";
/// A named schema failed to convert.
pub const TYPE_FAILED: &str = "E001";
/// An operation failed to convert.
pub const OPERATION_FAILED: &str = "E002";
/// A named reference has no declaration.
pub const UNRESOLVED_REFERENCE: &str = "E003";

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic produced during a conversion pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    /// JSON Pointer to the offending input (e.g., "/components/schemas/Pet")
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(code: &str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.to_string(),
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn error(code: &str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.to_string(),
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}[{}]: {} - {}", severity, self.code, self.path, self.message)
    }
}

/// Escape one JSON Pointer segment (RFC 6901: `~` -> `~0`, `/` -> `~1`).
pub fn pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// JSON Pointer to a named schema under `components.schemas`.
pub fn schema_pointer(name: &str) -> String {
    format!("/components/schemas/{}", pointer_segment(name))
}

/// JSON Pointer to an operation (or path item when `method` is `None`).
pub fn operation_pointer(path: &str, method: Option<&str>) -> String {
    match method {
        Some(method) => format!("/paths/{}/{}", pointer_segment(path), method),
        None => format!("/paths/{}", pointer_segment(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_path() {
        let diag = Diagnostic::warning(PATCH_SKIPPED, "/paths/~1posts/patch", "PATCH is not supported");
        assert_eq!(
            diag.to_string(),
            "warning[W003]: /paths/~1posts/patch - PATCH is not supported"
        );
        assert!(!diag.is_error());
    }

    #[test]
    fn pointers_escape_segments() {
        assert_eq!(operation_pointer("/posts/{id}", Some("get")), "/paths/~1posts~1{id}/get");
        assert_eq!(schema_pointer("a~b"), "/components/schemas/a~0b");
    }

    #[test]
    fn serializes_lowercase_severity() {
        let diag = Diagnostic::error(TYPE_FAILED, "/components/schemas/Pet", "boom");
        let value = serde_json::to_value(&diag).unwrap();
        assert_eq!(value["severity"], "error");
        assert_eq!(value["code"], "E001");
    }
}
