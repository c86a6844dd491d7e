#![deny(missing_docs)]

//! # Document Shims
//!
//! Intermediate deserialization layer for the parts of an OpenAPI 3.1 document the
//! `utoipa` backend does not take from `utoipa` itself: the root, paths, operations,
//! parameters and content maps. Schemas stay native `utoipa` nodes.
//!
//! Maps are `IndexMap`s so that declaration order survives deserialization.

use indexmap::IndexMap;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use utoipa::openapi::{schema::Schema, RefOr};

/// Schema for the root document.
///
/// `components` is read separately, once into `utoipa::openapi::Components` for the
/// schemas and once into [`ShimComponents`] for everything else.
#[derive(Deserialize)]
pub struct ShimOpenApi {
    /// OpenAPI version (e.g. "3.1.0").
    pub openapi: String,

    /// Path items.
    #[serde(default)]
    pub paths: ShimPaths,
}

/// Paths Object without its specification extensions.
#[derive(Default)]
pub struct ShimPaths {
    /// Parsed path items keyed by path template, in declaration order.
    pub items: IndexMap<String, ShimPathItem>,
}

impl<'de> Deserialize<'de> for ShimPaths {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut items = IndexMap::new();

        for (key, value) in raw {
            if key.starts_with("x-") {
                continue;
            }
            let path_item = serde_json::from_value::<ShimPathItem>(value).map_err(|e| {
                DeError::custom(format!("Failed to parse path item '{}': {}", key, e))
            })?;
            items.insert(key, path_item);
        }

        Ok(Self { items })
    }
}

/// Path Item Object.
#[derive(Deserialize, Default)]
pub struct ShimPathItem {
    /// Parameters shared by all operations of the path.
    #[serde(default)]
    pub parameters: Vec<ShimParameter>,
    /// GET operation.
    pub get: Option<ShimOperation>,
    /// PUT operation.
    pub put: Option<ShimOperation>,
    /// POST operation.
    pub post: Option<ShimOperation>,
    /// DELETE operation.
    pub delete: Option<ShimOperation>,
    /// OPTIONS operation.
    pub options: Option<ShimOperation>,
    /// HEAD operation.
    pub head: Option<ShimOperation>,
    /// PATCH operation.
    pub patch: Option<ShimOperation>,
    /// TRACE operation.
    pub trace: Option<ShimOperation>,
}

impl ShimPathItem {
    /// Returns the operation for a lower case method name.
    pub fn operation(&self, method: &str) -> Option<&ShimOperation> {
        match method {
            "get" => self.get.as_ref(),
            "put" => self.put.as_ref(),
            "post" => self.post.as_ref(),
            "delete" => self.delete.as_ref(),
            "options" => self.options.as_ref(),
            "head" => self.head.as_ref(),
            "patch" => self.patch.as_ref(),
            "trace" => self.trace.as_ref(),
            _ => None,
        }
    }
}

/// Operation Object.
#[derive(Deserialize, Default)]
pub struct ShimOperation {
    /// `operationId`.
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    /// `deprecated`.
    #[serde(default)]
    pub deprecated: bool,
    /// Operation parameters.
    #[serde(default)]
    pub parameters: Vec<ShimParameter>,
    /// Request body.
    #[serde(rename = "requestBody")]
    pub request_body: Option<ShimBody>,
    /// Responses keyed by status code.
    #[serde(default)]
    pub responses: IndexMap<String, ShimBody>,
}

/// Parameter Object, or a reference to one.
#[derive(Deserialize, Default)]
pub struct ShimParameter {
    /// `$ref` to `#/components/parameters/..`.
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    /// Parameter name.
    pub name: Option<String>,
    /// Location.
    #[serde(rename = "in")]
    pub location: Option<String>,
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Parameter schema.
    pub schema: Option<RefOr<Schema>>,
    /// Content map, the alternative to `schema`.
    #[serde(default)]
    pub content: IndexMap<String, ShimMediaType>,
}

/// Request Body or Response Object (only the content map matters here).
#[derive(Deserialize, Default)]
pub struct ShimBody {
    /// `$ref` to a reusable body.
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    /// Content map keyed by media type.
    #[serde(default)]
    pub content: IndexMap<String, ShimMediaType>,
}

/// Media Type Object.
#[derive(Deserialize, Default)]
pub struct ShimMediaType {
    /// The schema of the content.
    pub schema: Option<RefOr<Schema>>,
}

/// Reusable parameters, request bodies and responses.
#[derive(Deserialize, Default)]
pub struct ShimComponents {
    /// `components.parameters`.
    #[serde(default)]
    pub parameters: IndexMap<String, ShimParameter>,
    /// `components.requestBodies`.
    #[serde(default, rename = "requestBodies")]
    pub request_bodies: IndexMap<String, ShimBody>,
    /// `components.responses`.
    #[serde(default)]
    pub responses: IndexMap<String, ShimBody>,
}
