#![deny(missing_docs)]

//! # OpenAPI Parser Abstraction
//!
//! Capability traits that hide the concrete spec-parsing backend from the
//! resolver:
//!
//! - **Schema**: the structural shape of a schema node.
//! - **MediaType**: a content type plus its schema.
//! - **ApiDocument**: the document root (component schemas, `$ref` lookup, endpoints).
//!
//! Backends:
//! - **oas30**: OpenAPI 3.0.x documents through `openapiv3`.
//! - **oas31**: OpenAPI 3.1.x / 3.2.x documents through `utoipa`.

pub mod oas30;
pub mod oas31;
pub mod pointer;
pub(crate) mod shims;

use crate::error::{AppError, AppResult};
use serde_json::Value;
use std::fmt;

pub use oas30::Oas30Document;
pub use oas31::Oas31Document;

/// Identity of a schema node: the JSON Pointer of the node inside its document.
///
/// Two wrappers around the same underlying node always carry the same key, so the
/// key (not the wrapper) is what the resolver memoizes on.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaKey(String);

impl SchemaKey {
    /// Creates a key from a raw pointer (e.g. `#/components/schemas/User`).
    pub fn new(pointer: impl Into<String>) -> Self {
        Self(pointer.into())
    }

    /// Key of a component schema.
    pub fn component(name: &str) -> Self {
        Self(format!(
            "#/components/schemas/{}",
            pointer::escape_pointer_segment(name)
        ))
    }

    /// Key of a nested node, appending one escaped pointer segment.
    pub fn child(&self, segment: &str) -> Self {
        Self(format!(
            "{}/{}",
            self.0,
            pointer::escape_pointer_segment(segment)
        ))
    }

    /// Returns the raw pointer.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaKey({:?})", self.0)
    }
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation relevant keywords of a schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    /// `nullable: true` (3.0) or `type: [.., "null"]` (3.1).
    pub nullable: bool,
    /// `default` value.
    pub default: Option<Value>,
    /// `minLength`.
    pub min_length: Option<usize>,
    /// `maxLength`.
    pub max_length: Option<usize>,
    /// `minimum` (or 3.1 numeric `exclusiveMinimum`).
    pub minimum: Option<f64>,
    /// Whether `minimum` is exclusive.
    pub exclusive_minimum: bool,
    /// `maximum` (or 3.1 numeric `exclusiveMaximum`).
    pub maximum: Option<f64>,
    /// Whether `maximum` is exclusive.
    pub exclusive_maximum: bool,
    /// `pattern`.
    pub pattern: Option<String>,
    /// `minItems`.
    pub min_items: Option<usize>,
    /// `maxItems`.
    pub max_items: Option<usize>,
}

impl Constraints {
    /// True when no keyword is set.
    pub fn is_empty(&self) -> bool {
        *self == Constraints::default()
    }
}

/// Boxed schema capability, borrowed from its document.
pub type SchemaRef<'a> = Box<dyn Schema + 'a>;

/// Boxed media type capability, borrowed from its document.
pub type MediaTypeRef<'a> = Box<dyn MediaType + 'a>;

/// The `additionalProperties` keyword.
pub enum Additional<'a> {
    /// Absent or `false`.
    None,
    /// `true`: a free-form map.
    Any,
    /// A schema for the map values.
    Schema(SchemaRef<'a>),
}

/// Structural view of a schema node, independent of the parsing backend.
///
/// A `$ref` node only answers `key` and `reference`; every structural accessor of
/// such a node is empty. The resolver follows the reference through
/// [`ApiDocument::resolve_reference`].
pub trait Schema {
    /// Identity of the node.
    fn key(&self) -> &SchemaKey;

    /// The raw `$ref` value if this node is a reference.
    fn reference(&self) -> Option<&str>;

    /// Declared `type` (`string`, `integer`, `object`, ...).
    fn type_name(&self) -> Option<&str>;

    /// Declared `format`.
    fn format(&self) -> Option<String>;

    /// `allOf` items in declaration order.
    fn all_of(&self) -> Vec<SchemaRef<'_>>;

    /// `oneOf` items in declaration order.
    fn one_of(&self) -> Vec<SchemaRef<'_>>;

    /// `anyOf` items in declaration order.
    fn any_of(&self) -> Vec<SchemaRef<'_>>;

    /// Object properties in declaration order.
    fn properties(&self) -> Vec<(String, SchemaRef<'_>)>;

    /// Names listed in `required`.
    fn required(&self) -> Vec<String>;

    /// Array item schema.
    fn items(&self) -> Option<SchemaRef<'_>>;

    /// The `additionalProperties` keyword.
    fn additional_properties(&self) -> Additional<'_>;

    /// `enum` values.
    fn enum_values(&self) -> Vec<Value>;

    /// Validation keywords.
    fn constraints(&self) -> Constraints;

    /// `deprecated: true`.
    fn deprecated(&self) -> bool;
}

/// A content entry of a request body or a response.
pub trait MediaType {
    /// The content type (e.g. `application/json`).
    fn content_type(&self) -> &str;

    /// The schema of this content type, if any.
    fn schema(&self) -> Option<SchemaRef<'_>>;
}

/// A parameter of an endpoint.
pub struct Parameter<'a> {
    /// Parameter name.
    pub name: String,
    /// Location: `path`, `query`, `header` or `cookie`.
    pub location: String,
    /// Whether the parameter is required.
    pub required: bool,
    /// Parameter schema, or the schema of its first `content` entry.
    pub schema: SchemaRef<'a>,
}

/// A response of an endpoint.
pub struct Response<'a> {
    /// Status code (`200`, `4XX`, `default`).
    pub status: String,
    /// Content entries in declaration order.
    pub contents: Vec<MediaTypeRef<'a>>,
}

/// A single operation (path + method).
pub struct Endpoint<'a> {
    /// Path template.
    pub path: String,
    /// Lower case HTTP method.
    pub method: String,
    /// `operationId`.
    pub operation_id: Option<String>,
    /// `deprecated: true`.
    pub deprecated: bool,
    /// Path and operation parameters (operation level wins on name + location).
    pub parameters: Vec<Parameter<'a>>,
    /// Request body content entries.
    pub request_body: Vec<MediaTypeRef<'a>>,
    /// Responses in declaration order.
    pub responses: Vec<Response<'a>>,
}

/// The root of a parsed API description.
pub trait ApiDocument {
    /// The `openapi` version string.
    fn version(&self) -> &str;

    /// Component schemas in declaration order.
    fn schemas(&self) -> Vec<(String, SchemaRef<'_>)>;

    /// Resolves a local `$ref` (`#/components/schemas/...`).
    fn resolve_reference(&self, reference: &str) -> Option<SchemaRef<'_>>;

    /// All operations in path declaration order.
    ///
    /// Fails on references to parameters, bodies, responses or path items that
    /// cannot be located.
    fn endpoints(&self) -> AppResult<Vec<Endpoint<'_>>>;
}

/// Methods of a Path Item Object, in the order they are reported.
pub(crate) const METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Parses an OpenAPI YAML (or JSON) document and picks the backend from the
/// `openapi` version field.
pub fn load_document(content: &str) -> AppResult<Box<dyn ApiDocument>> {
    let raw: Value = serde_yaml::from_str(content)
        .map_err(|e| AppError::Parse(format!("Failed to parse YAML container: {}", e)))?;

    let version = raw
        .get("openapi")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::Parse("Missing 'openapi' version field".into()))?
        .to_string();

    if version.starts_with("3.0") {
        tracing::debug!(%version, "using openapiv3 backend");
        Ok(Box::new(Oas30Document::from_value(raw)?))
    } else if version.starts_with("3.1") || version.starts_with("3.2") {
        tracing::debug!(%version, "using utoipa backend");
        Ok(Box::new(Oas31Document::from_value(raw)?))
    } else {
        Err(AppError::Parse(format!(
            "Unsupported OpenAPI version '{}'",
            version
        )))
    }
}

/// Reads `serde` serializable numbers (e.g. `utoipa` numbers) as `f64`.
pub(crate) fn as_f64<T: serde::Serialize>(value: &T) -> Option<f64> {
    serde_json::to_value(value).ok()?.as_f64()
}

/// Reads `serde` serializable unit enums (types, formats, locations) as strings.
pub(crate) fn as_string<T: serde::Serialize>(value: &T) -> Option<String> {
    match serde_json::to_value(value).ok()? {
        Value::String(s) => Some(s),
        _ => None,
    }
}
