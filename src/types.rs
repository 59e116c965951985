//! IR data model: type references, type declarations, and HTTP services.
//!
//! Type references serialize in the compact textual syntax of the declaration
//! language (`optional<list<Post>>`, `map<string, double>`, `uuid`, `Author`),
//! so IR files stay readable when written as YAML or JSON.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConvertError;

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Leaf value types of the IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Boolean,
    Integer,
    Long,
    Double,
    String,
    Datetime,
    Uuid,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 7] = [
        PrimitiveType::Boolean,
        PrimitiveType::Integer,
        PrimitiveType::Long,
        PrimitiveType::Double,
        PrimitiveType::String,
        PrimitiveType::Datetime,
        PrimitiveType::Uuid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Long => "long",
            PrimitiveType::Double => "double",
            PrimitiveType::String => "string",
            PrimitiveType::Datetime => "datetime",
            PrimitiveType::Uuid => "uuid",
        }
    }

    /// Parse a primitive keyword of the declaration language.
    ///
    /// Returns `None` for anything else (the caller decides whether that is
    /// a named reference or an error).
    pub fn parse(s: &str) -> Option<Self> {
        PrimitiveType::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

/// Generic containers over other type references.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContainerType {
    List(TypeReference),
    Set(TypeReference),
    Map {
        key: TypeReference,
        value: TypeReference,
    },
    Optional(TypeReference),
}

/// Where a value's type comes from.
///
/// Named references resolve by name against a type registry and are never
/// expanded, so recursive types are fine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeReference {
    Primitive(PrimitiveType),
    Container(Box<ContainerType>),
    Named(String),
    Void,
}

impl TypeReference {
    pub fn named(name: impl Into<String>) -> Self {
        TypeReference::Named(name.into())
    }

    pub fn list(item: TypeReference) -> Self {
        TypeReference::Container(Box::new(ContainerType::List(item)))
    }

    pub fn set(item: TypeReference) -> Self {
        TypeReference::Container(Box::new(ContainerType::Set(item)))
    }

    pub fn map(key: TypeReference, value: TypeReference) -> Self {
        TypeReference::Container(Box::new(ContainerType::Map { key, value }))
    }

    pub fn optional(inner: TypeReference) -> Self {
        TypeReference::Container(Box::new(ContainerType::Optional(inner)))
    }

    /// True when the outermost layer is `optional<..>`.
    pub fn is_optional(&self) -> bool {
        matches!(self, TypeReference::Container(c) if matches!(**c, ContainerType::Optional(_)))
    }

    /// Append every declared name this reference mentions, at any depth.
    pub fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeReference::Named(name) => out.push(name),
            TypeReference::Container(container) => match container.as_ref() {
                ContainerType::List(inner)
                | ContainerType::Set(inner)
                | ContainerType::Optional(inner) => inner.collect_names(out),
                ContainerType::Map { key, value } => {
                    key.collect_names(out);
                    value.collect_names(out);
                }
            },
            TypeReference::Primitive(_) | TypeReference::Void => {}
        }
    }
}

impl From<PrimitiveType> for TypeReference {
    fn from(primitive: PrimitiveType) -> Self {
        TypeReference::Primitive(primitive)
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeReference::Primitive(p) => f.write_str(p.as_str()),
            TypeReference::Named(name) => f.write_str(name),
            TypeReference::Void => f.write_str("void"),
            TypeReference::Container(container) => match container.as_ref() {
                ContainerType::List(inner) => write!(f, "list<{}>", inner),
                ContainerType::Set(inner) => write!(f, "set<{}>", inner),
                ContainerType::Optional(inner) => write!(f, "optional<{}>", inner),
                ContainerType::Map { key, value } => write!(f, "map<{}, {}>", key, value),
            },
        }
    }
}

impl FromStr for TypeReference {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_reference(s.trim(), s)
    }
}

impl TryFrom<String> for TypeReference {
    type Error = ConvertError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeReference> for String {
    fn from(value: TypeReference) -> Self {
        value.to_string()
    }
}

fn parse_reference(text: &str, original: &str) -> Result<TypeReference, ConvertError> {
    let invalid = |reason: &str| ConvertError::InvalidTypeReference {
        text: original.to_string(),
        reason: reason.to_string(),
    };

    if text.is_empty() {
        return Err(invalid("empty type reference"));
    }

    if let Some(open) = text.find('<') {
        let Some(inner) = text[open + 1..].strip_suffix('>') else {
            return Err(invalid("missing closing '>'"));
        };
        let kind = text[..open].trim();
        let args = split_arguments(inner).ok_or_else(|| invalid("unbalanced '<' '>'"))?;

        let arity = match kind {
            "list" | "set" | "optional" => 1,
            "map" => 2,
            other => {
                return Err(ConvertError::UnsupportedShape {
                    kind: format!("container {}", other),
                })
            }
        };
        if args.len() != arity {
            return Err(invalid(&format!(
                "{} takes {} type argument(s), got {}",
                kind,
                arity,
                args.len()
            )));
        }

        let mut parsed = Vec::with_capacity(arity);
        for arg in args {
            parsed.push(parse_reference(arg.trim(), original)?);
        }
        let mut parsed = parsed.into_iter();
        let first = parsed.next().ok_or_else(|| invalid("missing type argument"))?;

        return Ok(match kind {
            "list" => TypeReference::list(first),
            "set" => TypeReference::set(first),
            "optional" => TypeReference::optional(first),
            _ => {
                let value = parsed.next().ok_or_else(|| invalid("missing map value type"))?;
                TypeReference::map(first, value)
            }
        });
    }

    if text == "void" {
        return Ok(TypeReference::Void);
    }
    if let Some(primitive) = PrimitiveType::parse(text) {
        return Ok(TypeReference::Primitive(primitive));
    }
    if text
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | ','))
    {
        return Err(invalid("not a type name"));
    }
    Ok(TypeReference::Named(text.to_string()))
}

/// Split container arguments on top-level commas.
///
/// Returns `None` when angle brackets don't balance.
fn split_arguments(inner: &str) -> Option<Vec<&str>> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                args.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    args.push(&inner[start..]);
    Some(args)
}

/// A named entry in a type registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    pub shape: TypeShape,
}

impl TypeDeclaration {
    pub fn new(name: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            name: name.into(),
            docs: None,
            shape,
        }
    }

    pub fn with_docs(mut self, docs: Option<String>) -> Self {
        self.docs = docs;
        self
    }

    /// Every declared name this declaration depends on (extends and field types).
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        match &self.shape {
            TypeShape::Object {
                extends,
                properties,
            } => {
                names.extend(extends.iter().map(String::as_str));
                for property in properties {
                    property.value_type.collect_names(&mut names);
                }
            }
            TypeShape::Alias { alias_of } => alias_of.collect_names(&mut names),
            TypeShape::Enum { .. } => {}
            TypeShape::Union { types, .. } => {
                for member in types {
                    member.value_type.collect_names(&mut names);
                }
            }
        }
        names
    }
}

/// The shape of a type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename_all = "lowercase")]
pub enum TypeShape {
    Object {
        #[serde(default)]
        extends: Vec<String>,
        #[serde(default)]
        properties: Vec<ObjectProperty>,
    },
    Alias {
        #[serde(rename = "aliasOf")]
        alias_of: TypeReference,
    },
    Enum {
        values: Vec<String>,
    },
    Union {
        discriminant: String,
        types: Vec<UnionMember>,
    },
}

impl TypeShape {
    pub fn empty_object() -> Self {
        TypeShape::Object {
            extends: Vec::new(),
            properties: Vec::new(),
        }
    }
}

/// One field of an object declaration.
///
/// A field is required unless its type is wrapped in `optional<..>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectProperty {
    pub key: String,
    pub value_type: TypeReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

impl ObjectProperty {
    pub fn new(key: impl Into<String>, value_type: TypeReference) -> Self {
        Self {
            key: key.into(),
            value_type,
            docs: None,
        }
    }

    pub fn is_required(&self) -> bool {
        !self.value_type.is_optional()
    }
}

/// One member of a discriminated union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionMember {
    pub discriminant_value: String,
    pub value_type: TypeReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

/// HTTP methods the IR can express. There is no PATCH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 4] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Key of this method in an OpenAPI path item object.
    pub fn path_item_key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
        }
    }

    pub fn has_request_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }

    pub fn has_response_body(&self) -> bool {
        !matches!(self, HttpMethod::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single HTTP endpoint of a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpEndpoint {
    pub method: HttpMethod,
    pub path: String,
    #[serde(default)]
    pub path_parameters: IndexMap<String, PrimitiveType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<TypeReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<TypeReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl HttpEndpoint {
    /// Declared names used by the request and response bodies.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for reference in self.request.iter().chain(self.response.iter()) {
            reference.collect_names(&mut names);
        }
        names
    }
}

/// A named group of endpoints keyed by operation id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpService {
    pub name: String,
    #[serde(default)]
    pub endpoints: IndexMap<String, HttpEndpoint>,
}

impl HttpService {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoints: IndexMap::new(),
        }
    }

    /// Register an endpoint under its operation id.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::DuplicateOperationId` if the id is taken.
    pub fn insert_endpoint(
        &mut self,
        operation_id: String,
        endpoint: HttpEndpoint,
    ) -> Result<(), ConvertError> {
        if self.endpoints.contains_key(&operation_id) {
            return Err(ConvertError::DuplicateOperationId { operation_id });
        }
        self.endpoints.insert(operation_id, endpoint);
        Ok(())
    }
}

/// Types and services of one API, as produced by an IR generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediateRepresentation {
    #[serde(default)]
    pub api_name: String,
    #[serde(default)]
    pub types: Vec<TypeDeclaration>,
    #[serde(default)]
    pub services: Vec<HttpService>,
}
