#![deny(missing_docs)]

//! # API Resolution
//!
//! Walks a whole document: component schemas first (in declaration order), then
//! every endpoint's parameters, request bodies and responses.

use crate::error::AppResult;
use crate::mapping::Target;
use crate::model::{Annotation, DataTypeId, DataTypes};
use crate::oas::{load_document, ApiDocument, Endpoint, MediaTypeRef};
use crate::options::ApiOptions;
use crate::report::ApiReport;
use crate::resolver::{DataTypeConverter, Resolved, Scope};
use heck::ToUpperCamelCase;
use indexmap::IndexMap;

/// A resolved parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParameter {
    /// Parameter name.
    pub name: String,
    /// `path`, `query`, `header` or `cookie`.
    pub location: String,
    /// Whether the parameter is required.
    pub required: bool,
    /// Resolved type.
    pub data_type: DataTypeId,
    /// Annotations of `parameters` rules, on this parameter only.
    pub annotations: Vec<Annotation>,
}

/// A resolved content entry of a body or response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContent {
    /// Content type.
    pub content_type: String,
    /// Resolved type, `None` when the entry has no schema.
    pub data_type: Option<DataTypeId>,
    /// Annotations of `responses` rules, on this entry only.
    pub annotations: Vec<Annotation>,
}

/// A resolved response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedResponse {
    /// Status code or `default`.
    pub status: String,
    /// Content entries in declaration order.
    pub contents: Vec<ResolvedContent>,
}

/// A resolved operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEndpoint {
    /// Path template.
    pub path: String,
    /// Lower case HTTP method.
    pub method: String,
    /// Upper camel case operation name, used as prefix of inline type names.
    pub operation_name: String,
    /// `deprecated: true`
    pub deprecated: bool,
    /// Parameters.
    pub parameters: Vec<ResolvedParameter>,
    /// Request body contents.
    pub request_body: Vec<ResolvedContent>,
    /// Responses.
    pub responses: Vec<ResolvedResponse>,
}

/// The output of a run: the type arena plus the entry points into it.
#[derive(Debug)]
pub struct ResolvedApi {
    /// Every resolved type.
    pub types: DataTypes,
    /// Component schemas by name, in declaration order.
    pub models: IndexMap<String, DataTypeId>,
    /// Endpoints that were not excluded.
    pub endpoints: Vec<ResolvedEndpoint>,
}

impl ResolvedApi {
    /// Type of a component schema.
    pub fn model(&self, name: &str) -> Option<DataTypeId> {
        self.models.get(name).copied()
    }

    /// A resolved endpoint by path and (case insensitive) method.
    pub fn endpoint(&self, path: &str, method: &str) -> Option<&ResolvedEndpoint> {
        self.endpoints
            .iter()
            .find(|e| e.path == path && e.method.eq_ignore_ascii_case(method))
    }

    /// Serializable summary.
    pub fn report(&self) -> ApiReport {
        ApiReport::new(self)
    }
}

/// Runs the resolver over a whole document.
pub struct ApiConverter<'o> {
    options: &'o ApiOptions,
}

impl<'o> ApiConverter<'o> {
    /// Creates a converter for the given options.
    pub fn new(options: &'o ApiOptions) -> Self {
        Self { options }
    }

    /// Resolves all component schemas and endpoints.
    ///
    /// The first error aborts the run; no partial result is returned.
    pub fn convert(&self, doc: &dyn ApiDocument) -> AppResult<ResolvedApi> {
        let mut types = DataTypes::new();
        let mut converter = DataTypeConverter::new(self.options);

        let mut models = IndexMap::new();
        for (name, schema) in doc.schemas() {
            let id = converter.convert_schema(doc, schema.as_ref(), &name, &mut types)?;
            models.insert(name, id);
        }
        tracing::debug!(count = models.len(), "resolved component schemas");

        let mut endpoints = Vec::new();
        for endpoint in doc.endpoints()? {
            if converter.finder().is_excluded(&endpoint.path) {
                tracing::info!(path = %endpoint.path, method = %endpoint.method, "skipping excluded endpoint");
                continue;
            }
            endpoints.push(convert_endpoint(doc, &mut converter, &endpoint, &mut types)?);
        }

        tracing::info!(
            models = models.len(),
            endpoints = endpoints.len(),
            types = types.len(),
            "resolved api"
        );
        Ok(ResolvedApi {
            types,
            models,
            endpoints,
        })
    }
}

/// Parses `content` and resolves it.
pub fn resolve_api(content: &str, options: &ApiOptions) -> AppResult<ResolvedApi> {
    let doc = load_document(content)?;
    ApiConverter::new(options).convert(doc.as_ref())
}

fn operation_name(endpoint: &Endpoint<'_>) -> String {
    match &endpoint.operation_id {
        Some(id) => id.to_upper_camel_case(),
        None => format!("{} {}", endpoint.method, endpoint.path).to_upper_camel_case(),
    }
}

fn convert_endpoint(
    doc: &dyn ApiDocument,
    converter: &mut DataTypeConverter<'_>,
    endpoint: &Endpoint<'_>,
    types: &mut DataTypes,
) -> AppResult<ResolvedEndpoint> {
    let path = endpoint.path.as_str();
    let operation = operation_name(endpoint);

    let mut parameters = Vec::new();
    for parameter in &endpoint.parameters {
        let name = format!("{} {}", operation, parameter.name).to_upper_camel_case();
        let scope = Scope::endpoint(path, Target::Parameter(&parameter.name));
        let resolved = converter.convert(doc, parameter.schema.as_ref(), &name, scope, types)?;
        parameters.push(ResolvedParameter {
            name: parameter.name.clone(),
            location: parameter.location.clone(),
            required: parameter.required,
            data_type: resolved.data_type,
            annotations: resolved.annotations,
        });
    }

    let request_body = convert_contents(
        doc,
        converter,
        &endpoint.request_body,
        &format!("{}RequestBody", operation),
        |_| Target::Schema,
        path,
        types,
    )?;

    let mut responses = Vec::new();
    for response in &endpoint.responses {
        let name = format!("{}Response{}", operation, response.status.to_upper_camel_case());
        responses.push(ResolvedResponse {
            status: response.status.clone(),
            contents: convert_contents(
                doc,
                converter,
                &response.contents,
                &name,
                Target::Response,
                path,
                types,
            )?,
        });
    }

    Ok(ResolvedEndpoint {
        path: endpoint.path.clone(),
        method: endpoint.method.clone(),
        operation_name: operation,
        deprecated: endpoint.deprecated,
        parameters,
        request_body,
        responses,
    })
}

fn convert_contents<'m>(
    doc: &dyn ApiDocument,
    converter: &mut DataTypeConverter<'_>,
    contents: &'m [MediaTypeRef<'_>],
    name: &str,
    target: impl Fn(&'m str) -> Target<'m>,
    path: &str,
    types: &mut DataTypes,
) -> AppResult<Vec<ResolvedContent>> {
    let mut out = Vec::with_capacity(contents.len());
    for media in contents {
        let content_type = media.content_type();
        let resolved = match media.schema() {
            Some(schema) => Some(converter.convert(
                doc,
                schema.as_ref(),
                name,
                Scope::endpoint(path, target(content_type)),
                types,
            )?),
            None => None,
        };
        let (data_type, annotations) = match resolved {
            Some(Resolved {
                data_type,
                annotations,
            }) => (Some(data_type), annotations),
            None => (None, Vec::new()),
        };
        out.push(ResolvedContent {
            content_type: content_type.to_string(),
            data_type,
            annotations,
        });
    }
    Ok(out)
}
