//! Document loading from files, strings, and HTTP URLs.
//!
//! OpenAPI documents may be JSON or YAML. YAML is normalized into a
//! `serde_json::Value` with string keys, so `200:` and `"200":` read the same.

use std::path::Path;

use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::LoadError;
use crate::types::{json_type_name, IntermediateRepresentation};

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Syntax {
    Json,
    Yaml,
}

impl Syntax {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Syntax::Json),
            "yaml" | "yml" => Some(Syntax::Yaml),
            _ => None,
        }
    }

    /// JSON documents start with `{` or `[`; everything else is read as YAML.
    fn sniff(content: &str) -> Self {
        match content.trim_start().chars().next() {
            Some('{') | Some('[') => Syntax::Json,
            _ => Syntax::Yaml,
        }
    }
}

/// Load an OpenAPI v3 document from a file path.
///
/// `.json` files are parsed as JSON, `.yaml`/`.yml` as YAML; any other
/// extension is sniffed from the content.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist, a parse error
/// if the content is malformed, or `LoadError::NotOpenApiV3` if the document
/// doesn't declare an `openapi: 3.x` version.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    let content = read_file(path)?;
    let syntax = Syntax::from_path(path).unwrap_or_else(|| Syntax::sniff(&content));
    debug!(path = %path.display(), ?syntax, "Loading OpenAPI document.");
    let document = parse(&content, syntax)?;
    ensure_openapi_v3(&document)?;
    Ok(document)
}

/// Load an OpenAPI v3 document from a JSON or YAML string.
///
/// # Errors
///
/// Returns a parse error if the string is malformed, or
/// `LoadError::NotOpenApiV3` if it isn't an OpenAPI v3 document.
pub fn load_document_str(content: &str) -> Result<Value, LoadError> {
    let document = parse(content, Syntax::sniff(content))?;
    ensure_openapi_v3(&document)?;
    Ok(document)
}

/// Load an OpenAPI v3 document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the server
/// answers with an error status, and the same errors as
/// [`load_document_str`] for the body.
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<Value, LoadError> {
    let network_error = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    debug!(url, "Fetching OpenAPI document.");
    let body = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(network_error)?;

    let syntax = Syntax::from_path(Path::new(url)).unwrap_or_else(|| Syntax::sniff(&body));
    let document = parse(&body, syntax)?;
    ensure_openapi_v3(&document)?;
    Ok(document)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load an OpenAPI document from a file path or URL.
///
/// URL loading requires the `remote` feature.
///
/// # Errors
///
/// Returns appropriate errors based on the source type.
pub fn load_document_auto(source: &str) -> Result<Value, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_document_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_document(Path::new(source))
    }
}

/// Load an IR value from a JSON or YAML file.
///
/// # Errors
///
/// Returns an IO or parse error, or `LoadError::InvalidDocument` if the
/// content doesn't describe an IR value.
pub fn load_ir(path: &Path) -> Result<IntermediateRepresentation, LoadError> {
    let content = read_file(path)?;
    let syntax = Syntax::from_path(path).unwrap_or_else(|| Syntax::sniff(&content));
    ir_from_value(parse(&content, syntax)?)
}

/// Load an IR value from a JSON or YAML string.
///
/// # Errors
///
/// Same as [`load_ir`], minus the IO errors.
pub fn load_ir_str(content: &str) -> Result<IntermediateRepresentation, LoadError> {
    ir_from_value(parse(content, Syntax::sniff(content))?)
}

fn ir_from_value(value: Value) -> Result<IntermediateRepresentation, LoadError> {
    serde_json::from_value(value).map_err(|e| LoadError::InvalidDocument {
        message: format!("not an IR value: {}", e),
    })
}

/// Check that a document is an object with an `openapi` field of `3.x`.
///
/// # Errors
///
/// Returns `LoadError::InvalidDocument` for a non-object, or
/// `LoadError::NotOpenApiV3` for a missing or other version.
pub fn ensure_openapi_v3(document: &Value) -> Result<(), LoadError> {
    let Some(object) = document.as_object() else {
        return Err(LoadError::InvalidDocument {
            message: format!(
                "expected an object at the document root, got {}",
                json_type_name(document)
            ),
        });
    };
    match object.get("openapi") {
        Some(Value::String(version)) if version.starts_with("3.") => Ok(()),
        Some(Value::String(version)) => Err(LoadError::NotOpenApiV3 {
            found: version.clone(),
        }),
        Some(other) => Err(LoadError::NotOpenApiV3 {
            found: other.to_string(),
        }),
        None if object.contains_key("swagger") => Err(LoadError::NotOpenApiV3 {
            found: format!("swagger {}", object["swagger"]),
        }),
        None => Err(LoadError::NotOpenApiV3 {
            found: "<missing>".to_string(),
        }),
    }
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

fn parse(content: &str, syntax: Syntax) -> Result<Value, LoadError> {
    match syntax {
        Syntax::Json => {
            serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
        }
        Syntax::Yaml => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(content)
                .map_err(|source| LoadError::InvalidYaml { source })?;
            yaml_to_json(yaml)
        }
    }
}

/// Convert a YAML value to JSON, stringifying scalar mapping keys.
fn yaml_to_json(yaml: serde_yaml::Value) -> Result<Value, LoadError> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| LoadError::InvalidDocument {
                        message: format!("number {} has no JSON representation", n),
                    })?
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut object = Map::new();
            for (key, value) in mapping {
                object.insert(mapping_key(key)?, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn mapping_key(key: serde_yaml::Value) -> Result<String, LoadError> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        other => Err(LoadError::InvalidDocument {
            message: format!("unsupported mapping key: {:?}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    const YAML_DOC: &str = "\
openapi: 3.0.3
info:
  title: Blog
  version: '1'
paths:
  /posts/{id}:
    get:
      operationId: getPost
      responses:
        200:
          description: OK
";

    fn temp_with_suffix(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn load_document_json_file() {
        let file = temp_with_suffix(".json", r#"{"openapi": "3.1.0", "paths": {}}"#);
        let document = load_document(file.path()).unwrap();
        assert_eq!(document["openapi"], "3.1.0");
    }

    #[test]
    fn load_document_yaml_file_stringifies_status_keys() {
        let file = temp_with_suffix(".yaml", YAML_DOC);
        let document = load_document(file.path()).unwrap();
        assert_eq!(
            document["paths"]["/posts/{id}"]["get"]["responses"]["200"]["description"],
            "OK"
        );
    }

    #[test]
    fn load_document_sniffs_unknown_extension() {
        let file = temp_with_suffix(".txt", YAML_DOC);
        let document = load_document(file.path()).unwrap();
        assert_eq!(document["info"]["title"], "Blog");
    }

    #[test]
    fn load_document_file_not_found() {
        let result = load_document(Path::new("/nonexistent/openapi.yaml"));
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
    }

    #[test]
    fn load_document_invalid_json() {
        let file = temp_with_suffix(".json", "not valid json");
        let result = load_document(file.path());
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn load_document_invalid_yaml() {
        let result = load_document_str("openapi: [3.0.0");
        assert!(matches!(result, Err(LoadError::InvalidYaml { .. })));
    }

    #[test]
    fn swagger_documents_are_rejected() {
        let result = load_document_str(r#"{"swagger": "2.0"}"#);
        assert!(matches!(
            result,
            Err(LoadError::NotOpenApiV3 { found }) if found == "swagger \"2.0\""
        ));
    }

    #[test]
    fn missing_version_is_rejected() {
        let result = load_document_str("paths: {}");
        assert!(matches!(result, Err(LoadError::NotOpenApiV3 { found }) if found == "<missing>"));
    }

    #[test]
    fn non_object_root_is_invalid() {
        let result = load_document_str("[1, 2]");
        assert!(matches!(result, Err(LoadError::InvalidDocument { .. })));
    }

    #[test]
    fn yaml_tags_and_scalar_keys() {
        let value = parse("1: !custom a\ntrue: 2.5\n", Syntax::Yaml).unwrap();
        assert_eq!(value["1"], "a");
        assert_eq!(value["true"], 2.5);
    }

    #[test]
    fn load_ir_from_yaml() {
        let file = temp_with_suffix(
            ".yml",
            "\
apiName: Blog
types:
  - name: PostIds
    shape:
      _type: alias
      aliasOf: list<uuid>
",
        );
        let ir = load_ir(file.path()).unwrap();
        assert_eq!(ir.api_name, "Blog");
        assert_eq!(ir.types[0].name, "PostIds");
        assert!(ir.services.is_empty());
    }

    #[test]
    fn load_ir_rejects_bad_type_reference() {
        let result = load_ir_str(
            r#"{"types": [{"name": "X", "shape": {"_type": "alias", "aliasOf": "list<"}}]}"#,
        );
        assert!(matches!(result, Err(LoadError::InvalidDocument { .. })));
    }

    #[test]
    fn is_url_detection() {
        assert!(is_url("https://example.com/openapi.yaml"));
        assert!(is_url("http://example.com/openapi.json"));
        assert!(!is_url("/path/to/openapi.yaml"));
        assert!(!is_url("openapi.yaml"));
    }

    #[test]
    fn load_document_auto_file() {
        let file = temp_with_suffix(".json", r#"{"openapi": "3.0.0"}"#);
        let document = load_document_auto(file.path().to_str().unwrap()).unwrap();
        assert_eq!(document["openapi"], "3.0.0");
    }

    #[cfg(feature = "remote")]
    mod remote {
        use super::*;

        #[test]
        fn load_document_url_yaml() {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/openapi.yaml")
                .with_status(200)
                .with_header("content-type", "application/yaml")
                .with_body(YAML_DOC)
                .create();

            let url = format!("{}/openapi.yaml", server.url());
            let document = load_document_auto(&url).unwrap();
            assert_eq!(document["info"]["title"], "Blog");
            mock.assert();
        }

        #[test]
        fn load_document_url_404() {
            let mut server = mockito::Server::new();
            let _mock = server.mock("GET", "/missing.json").with_status(404).create();

            let url = format!("{}/missing.json", server.url());
            let result = load_document_url(&url);
            assert!(matches!(result, Err(LoadError::NetworkError { .. })));
        }
    }
}
