#![deny(missing_docs)]

//! # OpenAPI 3.1 Backend
//!
//! Adapts `utoipa`'s OpenAPI model to the parser capability traits.
//!
//! Component schemas are native `utoipa` nodes; paths, operations and reusable
//! parameters/bodies come from the serde shims in [`super::shims`].

use super::shims::{ShimBody, ShimComponents, ShimOpenApi, ShimParameter, ShimPathItem};
use super::{
    as_f64, as_string, pointer, Additional, ApiDocument, Constraints, Endpoint, MediaType,
    MediaTypeRef, Parameter, Response, Schema, SchemaKey, SchemaRef, METHODS,
};
use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde_json::Value;
use utoipa::openapi::schema::{
    AdditionalProperties, ArrayItems, Object, Schema as OasSchema, SchemaType, Type,
};
use utoipa::openapi::{Components, Deprecated, RefOr};

/// An OpenAPI 3.1 / 3.2 document.
pub struct Oas31Document {
    version: String,
    components: Components,
    schema_order: Vec<String>,
    shared: ShimComponents,
    paths: IndexMap<String, ShimPathItem>,
}

impl Oas31Document {
    /// Parses a document from its YAML (or JSON) text.
    pub fn from_yaml(content: &str) -> AppResult<Self> {
        let raw: Value = serde_yaml::from_str(content)
            .map_err(|e| AppError::Parse(format!("Failed to parse YAML container: {}", e)))?;
        Self::from_value(raw)
    }

    /// Builds the document from an already parsed JSON value.
    pub fn from_value(raw: Value) -> AppResult<Self> {
        let components_raw = raw
            .get("components")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));

        let schema_order = components_raw
            .get("schemas")
            .and_then(Value::as_object)
            .map(|schemas| schemas.keys().cloned().collect())
            .unwrap_or_default();

        let components: Components = serde_json::from_value(components_raw.clone())
            .map_err(|e| AppError::Parse(format!("Failed to parse OpenAPI components: {}", e)))?;
        let shared: ShimComponents = serde_json::from_value(components_raw)
            .map_err(|e| AppError::Parse(format!("Failed to parse OpenAPI components: {}", e)))?;
        let shim: ShimOpenApi = serde_json::from_value(raw)
            .map_err(|e| AppError::Parse(format!("Failed to parse OpenAPI Shim: {}", e)))?;

        Ok(Self {
            version: shim.openapi,
            components,
            schema_order,
            shared,
            paths: shim.paths.items,
        })
    }

    fn parameter<'s>(
        &'s self,
        param: &'s ShimParameter,
        key: SchemaKey,
    ) -> AppResult<(SchemaKey, &'s ShimParameter)> {
        match &param.reference {
            Some(reference) => pointer::extract_component_name(reference, "parameters")
                .and_then(|name| {
                    let shared = self.shared.parameters.get(&name)?;
                    Some((SchemaKey::new("#/components/parameters").child(&name), shared))
                })
                .ok_or_else(|| AppError::UnresolvableReference {
                    reference: reference.clone(),
                    location: key.to_string(),
                }),
            None => Ok((key, param)),
        }
    }

    fn parameters<'s>(
        &'s self,
        item: &'s ShimPathItem,
        op_params: &'s [ShimParameter],
        path_key: &SchemaKey,
        op_key: &SchemaKey,
    ) -> AppResult<Vec<Parameter<'s>>> {
        let declared = item
            .parameters
            .iter()
            .enumerate()
            .map(|(i, p)| (p, path_key.child("parameters").child(&i.to_string())))
            .chain(
                op_params
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (p, op_key.child("parameters").child(&i.to_string()))),
            );

        let mut merged: IndexMap<(String, String), Parameter<'s>> = IndexMap::new();
        for (raw, key) in declared {
            let (key, param) = self.parameter(raw, key)?;
            let (Some(name), Some(location)) = (&param.name, &param.location) else {
                return Err(AppError::Parse(format!(
                    "Parameter at {} has no name or location",
                    key
                )));
            };
            let schema = match &param.schema {
                Some(schema) => Some(Oas31Schema::boxed(key.child("schema"), schema)),
                None => param.content.iter().find_map(|(content_type, media)| {
                    let key = key.child("content").child(content_type).child("schema");
                    media.schema.as_ref().map(|s| Oas31Schema::boxed(key, s))
                }),
            };
            let schema = schema.ok_or_else(|| {
                AppError::Parse(format!("Parameter '{}' at {} has no schema", name, key))
            })?;

            merged.insert(
                (name.clone(), location.clone()),
                Parameter {
                    name: name.clone(),
                    location: location.clone(),
                    required: param.required,
                    schema,
                },
            );
        }
        Ok(merged.into_values().collect())
    }

    fn contents<'s>(
        &'s self,
        body: &'s ShimBody,
        section: &str,
        key: SchemaKey,
    ) -> AppResult<Vec<MediaTypeRef<'s>>> {
        let (body, key) = match &body.reference {
            Some(reference) => pointer::extract_component_name(reference, section)
                .and_then(|name| {
                    let map = if section == "requestBodies" {
                        &self.shared.request_bodies
                    } else {
                        &self.shared.responses
                    };
                    map.get(&name).map(|b| {
                        (b, SchemaKey::new("#/components").child(section).child(&name))
                    })
                })
                .ok_or_else(|| AppError::UnresolvableReference {
                    reference: reference.clone(),
                    location: key.to_string(),
                })?,
            None => (body, key),
        };

        Ok(body
            .content
            .iter()
            .map(|(content_type, media)| {
                Box::new(Oas31MediaType {
                    content_type: content_type.as_str(),
                    key: key.child("content").child(content_type).child("schema"),
                    schema: media.schema.as_ref(),
                }) as MediaTypeRef<'s>
            })
            .collect())
    }
}

impl ApiDocument for Oas31Document {
    fn version(&self) -> &str {
        &self.version
    }

    fn schemas(&self) -> Vec<(String, SchemaRef<'_>)> {
        self.schema_order
            .iter()
            .filter_map(|name| {
                let schema = self.components.schemas.get(name)?;
                Some((
                    name.clone(),
                    Oas31Schema::boxed(SchemaKey::component(name), schema),
                ))
            })
            .collect()
    }

    fn resolve_reference(&self, reference: &str) -> Option<SchemaRef<'_>> {
        let name = pointer::extract_component_name(reference, "schemas")?;
        let schema = self.components.schemas.get(&name)?;
        Some(Oas31Schema::boxed(SchemaKey::component(&name), schema))
    }

    fn endpoints(&self) -> AppResult<Vec<Endpoint<'_>>> {
        let mut endpoints = Vec::new();
        for (path, item) in &self.paths {
            let path_key = SchemaKey::new("#/paths").child(path);
            for method in METHODS {
                let Some(op) = item.operation(method) else {
                    continue;
                };
                let op_key = path_key.child(method);

                let request_body = match &op.request_body {
                    Some(body) => self.contents(body, "requestBodies", op_key.child("requestBody"))?,
                    None => Vec::new(),
                };

                let responses = op
                    .responses
                    .iter()
                    .map(|(status, body)| {
                        Ok(Response {
                            status: status.clone(),
                            contents: self.contents(
                                body,
                                "responses",
                                op_key.child("responses").child(status),
                            )?,
                        })
                    })
                    .collect::<AppResult<Vec<_>>>()?;

                endpoints.push(Endpoint {
                    path: path.clone(),
                    method: method.to_string(),
                    operation_id: op.operation_id.clone(),
                    deprecated: op.deprecated,
                    parameters: self.parameters(item, &op.parameters, &path_key, &op_key)?,
                    request_body,
                    responses,
                });
            }
        }
        Ok(endpoints)
    }
}

#[derive(Clone, Copy)]
enum Node<'a> {
    Ref(&'a str),
    Item(&'a OasSchema),
}

impl<'a> Node<'a> {
    fn of(schema: &'a RefOr<OasSchema>) -> Self {
        match schema {
            RefOr::Ref(r) => Node::Ref(&r.ref_location),
            RefOr::T(s) => Node::Item(s),
        }
    }
}

/// A `utoipa` schema node.
pub struct Oas31Schema<'a> {
    key: SchemaKey,
    node: Node<'a>,
}

impl<'a> Oas31Schema<'a> {
    fn boxed(key: SchemaKey, schema: &'a RefOr<OasSchema>) -> SchemaRef<'a> {
        Box::new(Self {
            key,
            node: Node::of(schema),
        })
    }

    fn object(&self) -> Option<&'a Object> {
        match self.node {
            Node::Item(OasSchema::Object(o)) => Some(o),
            _ => None,
        }
    }

    fn list(&self, keyword: &str, items: &'a [RefOr<OasSchema>]) -> Vec<SchemaRef<'a>> {
        let base = self.key.child(keyword);
        items
            .iter()
            .enumerate()
            .map(|(i, item)| Self::boxed(base.child(&i.to_string()), item))
            .collect()
    }
}

fn type_str(ty: &Type) -> Option<&'static str> {
    match ty {
        Type::Object => Some("object"),
        Type::String => Some("string"),
        Type::Integer => Some("integer"),
        Type::Number => Some("number"),
        Type::Boolean => Some("boolean"),
        Type::Array => Some("array"),
        _ => None,
    }
}

impl Schema for Oas31Schema<'_> {
    fn key(&self) -> &SchemaKey {
        &self.key
    }

    fn reference(&self) -> Option<&str> {
        match self.node {
            Node::Ref(r) => Some(r),
            Node::Item(_) => None,
        }
    }

    fn type_name(&self) -> Option<&str> {
        match self.node {
            Node::Item(OasSchema::Array(_)) => Some("array"),
            Node::Item(OasSchema::Object(o)) => match &o.schema_type {
                SchemaType::Type(t) => type_str(t),
                SchemaType::Array(types) => types.iter().find_map(type_str),
                SchemaType::AnyValue if !o.properties.is_empty() => Some("object"),
                _ => None,
            },
            _ => None,
        }
    }

    fn format(&self) -> Option<String> {
        self.object()?.format.as_ref().and_then(as_string)
    }

    fn all_of(&self) -> Vec<SchemaRef<'_>> {
        match self.node {
            Node::Item(OasSchema::AllOf(a)) => self.list("allOf", &a.items),
            _ => Vec::new(),
        }
    }

    fn one_of(&self) -> Vec<SchemaRef<'_>> {
        match self.node {
            Node::Item(OasSchema::OneOf(a)) => self.list("oneOf", &a.items),
            _ => Vec::new(),
        }
    }

    fn any_of(&self) -> Vec<SchemaRef<'_>> {
        match self.node {
            Node::Item(OasSchema::AnyOf(a)) => self.list("anyOf", &a.items),
            _ => Vec::new(),
        }
    }

    fn properties(&self) -> Vec<(String, SchemaRef<'_>)> {
        let Some(o) = self.object() else {
            return Vec::new();
        };
        let base = self.key.child("properties");
        o.properties
            .iter()
            .map(|(name, schema)| (name.clone(), Self::boxed(base.child(name), schema)))
            .collect()
    }

    fn required(&self) -> Vec<String> {
        self.object().map(|o| o.required.clone()).unwrap_or_default()
    }

    fn items(&self) -> Option<SchemaRef<'_>> {
        match self.node {
            Node::Item(OasSchema::Array(a)) => match &a.items {
                ArrayItems::RefOrSchema(item) => {
                    Some(Self::boxed(self.key.child("items"), item.as_ref()))
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn additional_properties(&self) -> Additional<'_> {
        let Some(o) = self.object() else {
            return Additional::None;
        };
        match o.additional_properties.as_deref() {
            Some(AdditionalProperties::RefOr(schema)) => Additional::Schema(Self::boxed(
                self.key.child("additionalProperties"),
                schema,
            )),
            Some(AdditionalProperties::FreeForm(true)) => Additional::Any,
            _ => Additional::None,
        }
    }

    fn enum_values(&self) -> Vec<Value> {
        self.object()
            .and_then(|o| o.enum_values.clone())
            .unwrap_or_default()
    }

    fn constraints(&self) -> Constraints {
        match self.node {
            Node::Item(OasSchema::Object(o)) => {
                let exclusive_minimum = o.exclusive_minimum.as_ref().and_then(as_f64);
                let exclusive_maximum = o.exclusive_maximum.as_ref().and_then(as_f64);
                Constraints {
                    nullable: matches!(&o.schema_type, SchemaType::Array(types)
                        if types.iter().any(|t| matches!(t, Type::Null))),
                    default: o.default.clone(),
                    min_length: o.min_length,
                    max_length: o.max_length,
                    minimum: exclusive_minimum.or_else(|| o.minimum.as_ref().and_then(as_f64)),
                    exclusive_minimum: exclusive_minimum.is_some(),
                    maximum: exclusive_maximum.or_else(|| o.maximum.as_ref().and_then(as_f64)),
                    exclusive_maximum: exclusive_maximum.is_some(),
                    pattern: o.pattern.clone(),
                    ..Default::default()
                }
            }
            Node::Item(OasSchema::Array(a)) => Constraints {
                min_items: a.min_items,
                max_items: a.max_items,
                ..Default::default()
            },
            _ => Constraints::default(),
        }
    }

    fn deprecated(&self) -> bool {
        match self.node {
            Node::Item(OasSchema::Object(o)) => matches!(o.deprecated, Some(Deprecated::True)),
            Node::Item(OasSchema::Array(a)) => matches!(a.deprecated, Some(Deprecated::True)),
            _ => false,
        }
    }
}

struct Oas31MediaType<'a> {
    content_type: &'a str,
    key: SchemaKey,
    schema: Option<&'a RefOr<OasSchema>>,
}

impl MediaType for Oas31MediaType<'_> {
    fn content_type(&self) -> &str {
        self.content_type
    }

    fn schema(&self) -> Option<SchemaRef<'_>> {
        self.schema
            .map(|s| Oas31Schema::boxed(self.key.clone(), s))
    }
}
