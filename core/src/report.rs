//! # Resolution Report
//!
//! Flattened, serializable view of a [`ResolvedApi`] used by the CLI output.

use crate::api::{ResolvedApi, ResolvedContent};
use crate::model::{Annotation, DataType, DataTypeId, DataTypes};
use indexmap::IndexMap;
use serde::Serialize;

/// Report root.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApiReport {
    /// Component models in declaration order.
    pub models: Vec<ModelReport>,
    /// Endpoints.
    pub endpoints: Vec<EndpointReport>,
}

/// How a single type is referenced.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TypeReport {
    /// Generated type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Imports needed to reference it, annotation imports included.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    /// Rendered annotations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
}

impl TypeReport {
    fn new(types: &DataTypes, id: DataTypeId) -> Self {
        Self::with_usage(types, id, &[])
    }

    /// The type's own annotations followed by those of the use site.
    fn with_usage(types: &DataTypes, id: DataTypeId, usage: &[Annotation]) -> Self {
        let mut annotations: Vec<&Annotation> = types.annotations(id).iter().collect();
        for annotation in usage {
            if !annotations.contains(&annotation) {
                annotations.push(annotation);
            }
        }
        let mut imports = types.imports(id);
        for annotation in &annotations {
            imports.extend(annotation.imports());
        }
        Self {
            type_name: types.type_name(id),
            imports: imports.into_iter().collect(),
            annotations: annotations.into_iter().map(Annotation::render).collect(),
        }
    }
}

/// A component schema.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelReport {
    /// Schema name.
    pub name: String,
    /// Variant label.
    pub kind: String,
    /// Package.
    pub package: String,
    /// Type, imports and annotations.
    #[serde(flatten)]
    pub reference: TypeReport,
    /// Imports of everything the type references.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub referenced_imports: Vec<String>,
    /// Effective properties: name to generated type name.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, String>,
    /// Required property names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Enum values.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    /// `deprecated: true`
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

impl ModelReport {
    fn new(types: &DataTypes, name: &str, id: DataTypeId) -> Self {
        let data_type = types.get(id);
        let values = match data_type {
            Some(DataType::Enum { values, .. }) => values.clone(),
            _ => Vec::new(),
        };
        Self {
            name: name.to_string(),
            kind: data_type.map(DataType::kind).unwrap_or("pending").to_string(),
            package: types.package_name(id),
            reference: TypeReport::new(types, id),
            referenced_imports: types.referenced_imports(id).into_iter().collect(),
            properties: types
                .properties(id)
                .iter()
                .map(|(property, property_id)| (property.clone(), types.type_name(*property_id)))
                .collect(),
            required: types.required(id),
            values,
            deprecated: data_type.is_some_and(DataType::deprecated),
        }
    }
}

/// A parameter.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ParameterReport {
    /// Name.
    pub name: String,
    /// Location.
    #[serde(rename = "in")]
    pub location: String,
    /// Required flag.
    pub required: bool,
    /// Resolved type.
    #[serde(flatten)]
    pub reference: TypeReport,
}

/// A body or response content entry.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContentReport {
    /// Content type.
    pub content_type: String,
    /// Resolved type, absent for schema-less entries.
    #[serde(flatten)]
    pub reference: Option<TypeReport>,
}

/// A response.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResponseReport {
    /// Status.
    pub status: String,
    /// Content entries.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<ContentReport>,
}

/// An endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EndpointReport {
    /// Path template.
    pub path: String,
    /// Method.
    pub method: String,
    /// Operation name.
    pub operation: String,
    /// `deprecated: true`
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Parameters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterReport>,
    /// Request body contents.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub request_body: Vec<ContentReport>,
    /// Responses.
    pub responses: Vec<ResponseReport>,
}

impl ApiReport {
    /// Builds the report of a resolved API.
    pub fn new(api: &ResolvedApi) -> Self {
        let types = &api.types;
        let models = api
            .models
            .iter()
            .map(|(name, id)| ModelReport::new(types, name, *id))
            .collect();
        let endpoints = api
            .endpoints
            .iter()
            .map(|endpoint| EndpointReport {
                path: endpoint.path.clone(),
                method: endpoint.method.clone(),
                operation: endpoint.operation_name.clone(),
                deprecated: endpoint.deprecated,
                parameters: endpoint
                    .parameters
                    .iter()
                    .map(|p| ParameterReport {
                        name: p.name.clone(),
                        location: p.location.clone(),
                        required: p.required,
                        reference: TypeReport::with_usage(types, p.data_type, &p.annotations),
                    })
                    .collect(),
                request_body: contents(types, &endpoint.request_body),
                responses: endpoint
                    .responses
                    .iter()
                    .map(|r| ResponseReport {
                        status: r.status.clone(),
                        contents: contents(types, &r.contents),
                    })
                    .collect(),
            })
            .collect();
        Self { models, endpoints }
    }

    /// Model entry by schema name.
    pub fn model(&self, name: &str) -> Option<&ModelReport> {
        self.models.iter().find(|m| m.name == name)
    }
}

fn contents(types: &DataTypes, contents: &[ResolvedContent]) -> Vec<ContentReport> {
    contents
        .iter()
        .map(|c| ContentReport {
            content_type: c.content_type.clone(),
            reference: c
                .data_type
                .map(|id| TypeReport::with_usage(types, id, &c.annotations)),
        })
        .collect()
}
