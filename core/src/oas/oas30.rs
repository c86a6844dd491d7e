#![deny(missing_docs)]

//! # OpenAPI 3.0 Backend
//!
//! Adapts the `openapiv3` model to the parser capability traits.

use super::{
    as_string, pointer, Additional, ApiDocument, Constraints, Endpoint, MediaType, MediaTypeRef,
    Parameter, Response, Schema, SchemaKey, SchemaRef, METHODS,
};
use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use openapiv3::{
    AdditionalProperties, OpenAPI, Operation, Parameter as OasParameter,
    ParameterSchemaOrContent, PathItem, ReferenceOr, Schema as OasSchema, SchemaKind, Type,
    VariantOrUnknownOrEmpty,
};
use serde::Serialize;
use serde_json::Value;

/// An OpenAPI 3.0 document.
pub struct Oas30Document {
    api: OpenAPI,
}

impl Oas30Document {
    /// Parses a document from its YAML (or JSON) text.
    pub fn from_yaml(content: &str) -> AppResult<Self> {
        let raw: Value = serde_yaml::from_str(content)
            .map_err(|e| AppError::Parse(format!("Failed to parse YAML container: {}", e)))?;
        Self::from_value(raw)
    }

    /// Builds the document from an already parsed JSON value.
    pub fn from_value(raw: Value) -> AppResult<Self> {
        let api: OpenAPI = serde_json::from_value(raw)
            .map_err(|e| AppError::Parse(format!("Failed to parse OpenAPI 3.0 document: {}", e)))?;
        Ok(Self { api })
    }

    fn shared_parameter(&self, reference: &str) -> Option<(SchemaKey, &OasParameter)> {
        let name = pointer::extract_component_name(reference, "parameters")?;
        let found = self.api.components.as_ref()?.parameters.get(&name)?;
        match found {
            ReferenceOr::Item(p) => {
                Some((SchemaKey::new("#/components/parameters").child(&name), p))
            }
            ReferenceOr::Reference { .. } => None,
        }
    }

    fn parameters<'s>(
        &'s self,
        item: &'s PathItem,
        op: &'s Operation,
        path_key: &SchemaKey,
        op_key: &SchemaKey,
    ) -> AppResult<Vec<Parameter<'s>>> {
        let declared = item
            .parameters
            .iter()
            .enumerate()
            .map(|(i, p)| (p, path_key.child("parameters").child(&i.to_string())))
            .chain(
                op.parameters
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (p, op_key.child("parameters").child(&i.to_string()))),
            );

        let mut merged: IndexMap<(String, String), Parameter<'s>> = IndexMap::new();
        for (raw, key) in declared {
            let (key, param) = match raw {
                ReferenceOr::Item(p) => (key, p),
                ReferenceOr::Reference { reference } => {
                    self.shared_parameter(reference).ok_or_else(|| {
                        AppError::UnresolvableReference {
                            reference: reference.clone(),
                            location: key.to_string(),
                        }
                    })?
                }
            };

            let data = param.parameter_data_ref();
            let location = match param {
                OasParameter::Query { .. } => "query",
                OasParameter::Header { .. } => "header",
                OasParameter::Path { .. } => "path",
                OasParameter::Cookie { .. } => "cookie",
            };
            let schema = match &data.format {
                ParameterSchemaOrContent::Schema(s) => Some(Oas30Schema::boxed(key.child("schema"), s)),
                ParameterSchemaOrContent::Content(content) => {
                    content.iter().find_map(|(content_type, media)| {
                        let key = key.child("content").child(content_type).child("schema");
                        media.schema.as_ref().map(|s| Oas30Schema::boxed(key, s))
                    })
                }
            };
            let schema = schema.ok_or_else(|| {
                AppError::Parse(format!(
                    "Parameter '{}' at {} has no schema",
                    data.name, key
                ))
            })?;

            merged.insert(
                (data.name.clone(), location.to_string()),
                Parameter {
                    name: data.name.clone(),
                    location: location.to_string(),
                    required: data.required,
                    schema,
                },
            );
        }
        Ok(merged.into_values().collect())
    }

    fn request_body<'s>(
        &'s self,
        op: &'s Operation,
        op_key: &SchemaKey,
    ) -> AppResult<Vec<MediaTypeRef<'s>>> {
        let Some(body) = &op.request_body else {
            return Ok(Vec::new());
        };
        match body {
            ReferenceOr::Item(b) => Ok(contents(&b.content, op_key.child("requestBody"))),
            ReferenceOr::Reference { reference } => {
                let (name, b) = pointer::extract_component_name(reference, "requestBodies")
                    .and_then(|name| {
                        let found = self.api.components.as_ref()?.request_bodies.get(&name)?;
                        match found {
                            ReferenceOr::Item(b) => Some((name, b)),
                            ReferenceOr::Reference { .. } => None,
                        }
                    })
                    .ok_or_else(|| AppError::UnresolvableReference {
                        reference: reference.clone(),
                        location: op_key.child("requestBody").to_string(),
                    })?;
                Ok(contents(
                    &b.content,
                    SchemaKey::new("#/components/requestBodies").child(&name),
                ))
            }
        }
    }

    fn response<'s>(
        &'s self,
        status: String,
        response: &'s ReferenceOr<openapiv3::Response>,
        key: SchemaKey,
    ) -> AppResult<Response<'s>> {
        let contents = match response {
            ReferenceOr::Item(r) => contents(&r.content, key),
            ReferenceOr::Reference { reference } => {
                let (name, r) = pointer::extract_component_name(reference, "responses")
                    .and_then(|name| {
                        let found = self.api.components.as_ref()?.responses.get(&name)?;
                        match found {
                            ReferenceOr::Item(r) => Some((name, r)),
                            ReferenceOr::Reference { .. } => None,
                        }
                    })
                    .ok_or_else(|| AppError::UnresolvableReference {
                        reference: reference.clone(),
                        location: key.to_string(),
                    })?;
                contents(
                    &r.content,
                    SchemaKey::new("#/components/responses").child(&name),
                )
            }
        };
        Ok(Response { status, contents })
    }
}

fn contents<'a>(
    content: &'a IndexMap<String, openapiv3::MediaType>,
    key: SchemaKey,
) -> Vec<MediaTypeRef<'a>> {
    content
        .iter()
        .map(|(content_type, media)| {
            Box::new(Oas30MediaType {
                content_type: content_type.as_str(),
                key: key.child("content").child(content_type).child("schema"),
                schema: media.schema.as_ref(),
            }) as MediaTypeRef<'a>
        })
        .collect()
}

fn operation<'a>(item: &'a PathItem, method: &str) -> Option<&'a Operation> {
    match method {
        "get" => item.get.as_ref(),
        "put" => item.put.as_ref(),
        "post" => item.post.as_ref(),
        "delete" => item.delete.as_ref(),
        "options" => item.options.as_ref(),
        "head" => item.head.as_ref(),
        "patch" => item.patch.as_ref(),
        "trace" => item.trace.as_ref(),
        _ => None,
    }
}

impl ApiDocument for Oas30Document {
    fn version(&self) -> &str {
        &self.api.openapi
    }

    fn schemas(&self) -> Vec<(String, SchemaRef<'_>)> {
        let Some(components) = &self.api.components else {
            return Vec::new();
        };
        components
            .schemas
            .iter()
            .map(|(name, schema)| {
                (
                    name.clone(),
                    Oas30Schema::boxed(SchemaKey::component(name), schema),
                )
            })
            .collect()
    }

    fn resolve_reference(&self, reference: &str) -> Option<SchemaRef<'_>> {
        let name = pointer::extract_component_name(reference, "schemas")?;
        let schema = self.api.components.as_ref()?.schemas.get(&name)?;
        Some(Oas30Schema::boxed(SchemaKey::component(&name), schema))
    }

    fn endpoints(&self) -> AppResult<Vec<Endpoint<'_>>> {
        let mut endpoints = Vec::new();
        for (path, item) in self.api.paths.iter() {
            let path_key = SchemaKey::new("#/paths").child(path);
            let item = match item {
                ReferenceOr::Item(item) => item,
                ReferenceOr::Reference { reference } => {
                    return Err(AppError::UnresolvableReference {
                        reference: reference.clone(),
                        location: path_key.to_string(),
                    })
                }
            };

            for method in METHODS {
                let Some(op) = operation(item, method) else {
                    continue;
                };
                let op_key = path_key.child(method);
                let responses_key = op_key.child("responses");

                let mut responses = op
                    .responses
                    .responses
                    .iter()
                    .map(|(status, response)| {
                        let status = status.to_string();
                        let key = responses_key.child(&status);
                        self.response(status, response, key)
                    })
                    .collect::<AppResult<Vec<_>>>()?;
                if let Some(default) = &op.responses.default {
                    responses.push(self.response(
                        "default".to_string(),
                        default,
                        responses_key.child("default"),
                    )?);
                }

                endpoints.push(Endpoint {
                    path: path.clone(),
                    method: method.to_string(),
                    operation_id: op.operation_id.clone(),
                    deprecated: op.deprecated,
                    parameters: self.parameters(item, op, &path_key, &op_key)?,
                    request_body: self.request_body(op, &op_key)?,
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

/// An `openapiv3` schema node.
pub struct Oas30Schema<'a> {
    key: SchemaKey,
    node: Node<'a>,
}

impl<'a> Oas30Schema<'a> {
    fn boxed(key: SchemaKey, schema: &'a ReferenceOr<OasSchema>) -> SchemaRef<'a> {
        let node = match schema {
            ReferenceOr::Reference { reference } => Node::Ref(reference),
            ReferenceOr::Item(s) => Node::Item(s),
        };
        Box::new(Self { key, node })
    }

    fn boxed_nested(key: SchemaKey, schema: &'a ReferenceOr<Box<OasSchema>>) -> SchemaRef<'a> {
        let node = match schema {
            ReferenceOr::Reference { reference } => Node::Ref(reference),
            ReferenceOr::Item(s) => Node::Item(s.as_ref()),
        };
        Box::new(Self { key, node })
    }

    fn item(&self) -> Option<&'a OasSchema> {
        match self.node {
            Node::Item(s) => Some(s),
            Node::Ref(_) => None,
        }
    }

    fn kind(&self) -> Option<&'a SchemaKind> {
        self.item().map(|s| &s.schema_kind)
    }

    fn list(&self, keyword: &str, items: &'a [ReferenceOr<OasSchema>]) -> Vec<SchemaRef<'a>> {
        let base = self.key.child(keyword);
        items
            .iter()
            .enumerate()
            .map(|(i, item)| Self::boxed(base.child(&i.to_string()), item))
            .collect()
    }

    fn property_list(
        &self,
        properties: &'a IndexMap<String, ReferenceOr<Box<OasSchema>>>,
    ) -> Vec<(String, SchemaRef<'a>)> {
        let base = self.key.child("properties");
        properties
            .iter()
            .map(|(name, schema)| (name.clone(), Self::boxed_nested(base.child(name), schema)))
            .collect()
    }

    fn additional(&self, additional: Option<&'a AdditionalProperties>) -> Additional<'a> {
        match additional {
            Some(AdditionalProperties::Any(true)) => Additional::Any,
            Some(AdditionalProperties::Schema(schema)) => Additional::Schema(Self::boxed(
                self.key.child("additionalProperties"),
                schema.as_ref(),
            )),
            _ => Additional::None,
        }
    }
}

fn format_of<T: Serialize>(format: &VariantOrUnknownOrEmpty<T>) -> Option<String> {
    match format {
        VariantOrUnknownOrEmpty::Item(known) => as_string(known),
        VariantOrUnknownOrEmpty::Unknown(custom) => Some(custom.clone()),
        VariantOrUnknownOrEmpty::Empty => None,
    }
}

impl Schema for Oas30Schema<'_> {
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
        match self.kind()? {
            SchemaKind::Type(Type::String(_)) => Some("string"),
            SchemaKind::Type(Type::Number(_)) => Some("number"),
            SchemaKind::Type(Type::Integer(_)) => Some("integer"),
            SchemaKind::Type(Type::Object(_)) => Some("object"),
            SchemaKind::Type(Type::Array(_)) => Some("array"),
            SchemaKind::Type(Type::Boolean { .. }) => Some("boolean"),
            SchemaKind::Any(any) => match any.typ.as_deref() {
                Some(typ) => Some(typ),
                None if !any.properties.is_empty() => Some("object"),
                None if any.items.is_some() => Some("array"),
                None => None,
            },
            _ => None,
        }
    }

    fn format(&self) -> Option<String> {
        match self.kind()? {
            SchemaKind::Type(Type::String(s)) => format_of(&s.format),
            SchemaKind::Type(Type::Number(n)) => format_of(&n.format),
            SchemaKind::Type(Type::Integer(i)) => format_of(&i.format),
            SchemaKind::Any(any) => any.format.clone(),
            _ => None,
        }
    }

    fn all_of(&self) -> Vec<SchemaRef<'_>> {
        match self.kind() {
            Some(SchemaKind::AllOf { all_of }) => self.list("allOf", all_of),
            Some(SchemaKind::Any(any)) => self.list("allOf", &any.all_of),
            _ => Vec::new(),
        }
    }

    fn one_of(&self) -> Vec<SchemaRef<'_>> {
        match self.kind() {
            Some(SchemaKind::OneOf { one_of }) => self.list("oneOf", one_of),
            Some(SchemaKind::Any(any)) => self.list("oneOf", &any.one_of),
            _ => Vec::new(),
        }
    }

    fn any_of(&self) -> Vec<SchemaRef<'_>> {
        match self.kind() {
            Some(SchemaKind::AnyOf { any_of }) => self.list("anyOf", any_of),
            Some(SchemaKind::Any(any)) => self.list("anyOf", &any.any_of),
            _ => Vec::new(),
        }
    }

    fn properties(&self) -> Vec<(String, SchemaRef<'_>)> {
        match self.kind() {
            Some(SchemaKind::Type(Type::Object(o))) => self.property_list(&o.properties),
            Some(SchemaKind::Any(any)) => self.property_list(&any.properties),
            _ => Vec::new(),
        }
    }

    fn required(&self) -> Vec<String> {
        match self.kind() {
            Some(SchemaKind::Type(Type::Object(o))) => o.required.clone(),
            Some(SchemaKind::Any(any)) => any.required.clone(),
            _ => Vec::new(),
        }
    }

    fn items(&self) -> Option<SchemaRef<'_>> {
        let items = match self.kind()? {
            SchemaKind::Type(Type::Array(a)) => a.items.as_ref()?,
            SchemaKind::Any(any) => any.items.as_ref()?,
            _ => return None,
        };
        Some(Self::boxed_nested(self.key.child("items"), items))
    }

    fn additional_properties(&self) -> Additional<'_> {
        match self.kind() {
            Some(SchemaKind::Type(Type::Object(o))) => {
                self.additional(o.additional_properties.as_ref())
            }
            Some(SchemaKind::Any(any)) => self.additional(any.additional_properties.as_ref()),
            _ => Additional::None,
        }
    }

    fn enum_values(&self) -> Vec<Value> {
        match self.kind() {
            Some(SchemaKind::Type(Type::String(s))) => s
                .enumeration
                .iter()
                .map(|v| v.clone().map(Value::String).unwrap_or(Value::Null))
                .collect(),
            Some(SchemaKind::Type(Type::Integer(i))) => i
                .enumeration
                .iter()
                .map(|v| v.map(Value::from).unwrap_or(Value::Null))
                .collect(),
            Some(SchemaKind::Type(Type::Number(n))) => n
                .enumeration
                .iter()
                .map(|v| v.map(Value::from).unwrap_or(Value::Null))
                .collect(),
            Some(SchemaKind::Any(any)) => any.enumeration.clone(),
            _ => Vec::new(),
        }
    }

    fn constraints(&self) -> Constraints {
        let Some(schema) = self.item() else {
            return Constraints::default();
        };
        let base = Constraints {
            nullable: schema.schema_data.nullable,
            default: schema.schema_data.default.clone(),
            ..Default::default()
        };
        match &schema.schema_kind {
            SchemaKind::Type(Type::String(s)) => Constraints {
                min_length: s.min_length,
                max_length: s.max_length,
                pattern: s.pattern.clone(),
                ..base
            },
            SchemaKind::Type(Type::Integer(i)) => Constraints {
                minimum: i.minimum.map(|v| v as f64),
                exclusive_minimum: i.exclusive_minimum,
                maximum: i.maximum.map(|v| v as f64),
                exclusive_maximum: i.exclusive_maximum,
                ..base
            },
            SchemaKind::Type(Type::Number(n)) => Constraints {
                minimum: n.minimum,
                exclusive_minimum: n.exclusive_minimum,
                maximum: n.maximum,
                exclusive_maximum: n.exclusive_maximum,
                ..base
            },
            SchemaKind::Type(Type::Array(a)) => Constraints {
                min_items: a.min_items,
                max_items: a.max_items,
                ..base
            },
            _ => base,
        }
    }

    fn deprecated(&self) -> bool {
        self.item().is_some_and(|s| s.schema_data.deprecated)
    }
}

struct Oas30MediaType<'a> {
    content_type: &'a str,
    key: SchemaKey,
    schema: Option<&'a ReferenceOr<OasSchema>>,
}

impl MediaType for Oas30MediaType<'_> {
    fn content_type(&self) -> &str {
        self.content_type
    }

    fn schema(&self) -> Option<SchemaRef<'_>> {
        self.schema.map(|s| Oas30Schema::boxed(self.key.clone(), s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
openapi: 3.0.3
info: {title: T, version: '1.0'}
paths:
  /pets:
    post:
      operationId: addPet
      requestBody:
        $ref: '#/components/requestBodies/PetBody'
      responses:
        '201':
          description: created
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
        default:
          description: error
components:
  requestBodies:
    PetBody:
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/Pet'
  schemas:
    Pet:
      type: object
      properties:
        name: { type: string, minLength: 1, nullable: true }
        born: { type: string, format: date }
        kind: { type: string, enum: [cat, dog] }
        weight: { type: number, format: float, minimum: 0.5 }
"#;

    fn pet(doc: &Oas30Document) -> SchemaRef<'_> {
        doc.resolve_reference("#/components/schemas/Pet").unwrap()
    }

    #[test]
    fn test_properties_keep_declaration_order() {
        let doc = Oas30Document::from_yaml(DOC).unwrap();
        let names: Vec<String> = pet(&doc).properties().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["name", "born", "kind", "weight"]);
    }

    #[test]
    fn test_known_and_unknown_formats() {
        let doc = Oas30Document::from_yaml(DOC).unwrap();
        let pet = pet(&doc);
        let props = pet.properties();
        assert_eq!(props[1].1.format().as_deref(), Some("date"));
        assert_eq!(props[3].1.format().as_deref(), Some("float"));
        assert_eq!(props[0].1.format(), None);
    }

    #[test]
    fn test_constraints_and_enum() {
        let doc = Oas30Document::from_yaml(DOC).unwrap();
        let pet = pet(&doc);
        let props = pet.properties();

        let name = props[0].1.constraints();
        assert!(name.nullable);
        assert_eq!(name.min_length, Some(1));

        assert_eq!(
            props[2].1.enum_values(),
            vec![Value::String("cat".into()), Value::String("dog".into())]
        );
        assert_eq!(props[3].1.constraints().minimum, Some(0.5));
    }

    #[test]
    fn test_endpoint_bodies_follow_references() {
        let doc = Oas30Document::from_yaml(DOC).unwrap();
        let endpoints = doc.endpoints().unwrap();
        assert_eq!(endpoints.len(), 1);
        let ep = &endpoints[0];
        assert_eq!(ep.method, "post");

        let body = &ep.request_body[0];
        assert_eq!(
            body.schema().unwrap().key().as_str(),
            "#/components/requestBodies/PetBody/content/application~1json/schema"
        );

        let statuses: Vec<&str> = ep.responses.iter().map(|r| r.status.as_str()).collect();
        assert_eq!(statuses, vec!["201", "default"]);
        assert!(ep.responses[1].contents.is_empty());
    }

    #[test]
    fn test_referenced_path_item_fails() {
        let doc = Oas30Document::from_yaml(
            r#"
openapi: 3.0.3
info: {title: T, version: '1.0'}
paths:
  /a:
    $ref: '#/components/pathItems/A'
"#,
        )
        .unwrap();
        let err = doc.endpoints().err().unwrap();
        assert!(matches!(err, AppError::UnresolvableReference { .. }));
        assert_eq!(err.location(), Some("#/paths/~1a"));
    }

    #[test]
    fn test_unresolvable_parameter_reference_fails() {
        let doc = Oas30Document::from_yaml(
            r#"
openapi: 3.0.3
info: {title: T, version: '1.0'}
paths:
  /a:
    get:
      parameters:
        - $ref: '#/components/parameters/Missing'
      responses:
        '204': {description: none}
"#,
        )
        .unwrap();
        let err = doc.endpoints().err().unwrap();
        assert_eq!(err.location(), Some("#/paths/~1a/get/parameters/0"));
    }

    #[test]
    fn test_content_parameter_uses_media_type_schema() {
        let doc = Oas30Document::from_yaml(
            r#"
openapi: 3.0.3
info: {title: T, version: '1.0'}
paths:
  /search:
    get:
      parameters:
        - name: filter
          in: query
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Pet'}
      responses:
        '204': {description: none}
"#,
        )
        .unwrap();
        let endpoints = doc.endpoints().unwrap();
        let filter = &endpoints[0].parameters[0];
        assert_eq!(filter.location, "query");
        assert_eq!(filter.schema.reference(), Some("#/components/schemas/Pet"));
    }
}
