#![deny(missing_docs)]

//! # Type Mapping Resolution
//!
//! Converts schema nodes into [`DataType`]s, consulting the mapping rules first
//! and falling back to the built-in type table.
//!
//! - **target**: the qualified result of applying a rule.
//! - **validation**: constraint annotations.
//!
//! Resolution is memoized per schema node (and per endpoint when that endpoint
//! carries its own `types` rules). Object like schemas reserve their slot before
//! their children are resolved, so self references terminate on the placeholder.
//!
//! Rules from a `parameters` or `responses` section never touch the memoized
//! slot: a section `Type` rule builds a fresh type for that use, and section
//! annotations are returned with the use in [`Resolved`].

pub mod target;
pub mod validation;

use crate::error::{AppError, AppResult};
use crate::mapping::{MappingFinder, MappingRule, SchemaMatch, Target};
use crate::model::{
    Annotation, CollectionKind, DataType, DataTypeId, DataTypeName, DataTypes, MemoKey,
    PrimitiveKind, PropertyMap,
};
use crate::oas::{pointer, Additional, ApiDocument, Constraints, Schema, SchemaRef};
use crate::options::ApiOptions;
use heck::ToUpperCamelCase;
use serde_json::Value;
use std::collections::HashSet;

pub use target::TargetType;
pub use validation::constraint_annotations;

/// Where a schema is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope<'a> {
    /// Endpoint path, `None` outside of endpoints.
    pub path: Option<&'a str>,
    /// Usage of the schema.
    pub target: Target<'a>,
}

impl<'a> Scope<'a> {
    /// Outside of any endpoint.
    pub fn global() -> Self {
        Self {
            path: None,
            target: Target::Schema,
        }
    }

    /// Schemas used by an endpoint.
    pub fn endpoint(path: &'a str, target: Target<'a>) -> Self {
        Self {
            path: Some(path),
            target,
        }
    }
}

/// A schema resolved for one use (a parameter, body or response entry).
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// The resolved type.
    pub data_type: DataTypeId,
    /// Annotations of `parameters`/`responses` rules, valid for this use only.
    pub annotations: Vec<Annotation>,
}

/// The resolution engine for one run.
pub struct DataTypeConverter<'o> {
    options: &'o ApiOptions,
    finder: MappingFinder<'o>,
    pending: HashSet<MemoKey>,
}

impl<'o> DataTypeConverter<'o> {
    /// Creates a converter over the options and their mapping documents.
    pub fn new(options: &'o ApiOptions) -> Self {
        Self {
            options,
            finder: MappingFinder::new(&options.mappings),
            pending: HashSet::new(),
        }
    }

    /// The rule finder used by this converter.
    pub fn finder(&self) -> MappingFinder<'o> {
        self.finder
    }

    /// Resolves a component schema registered under `name`.
    pub fn convert_schema(
        &mut self,
        doc: &dyn ApiDocument,
        schema: &dyn Schema,
        name: &str,
        types: &mut DataTypes,
    ) -> AppResult<DataTypeId> {
        self.resolve(doc, schema, name, true, None, types)
    }

    /// Resolves the schema of a parameter, body or response entry.
    ///
    /// `name` is the inline model name; it is used for generated types but never
    /// matched against rules. Lookup order: name keyed `Map` rule, section `Type`
    /// rule, then the shared (memoized) resolution.
    pub fn convert(
        &mut self,
        doc: &dyn ApiDocument,
        schema: &dyn Schema,
        name: &str,
        scope: Scope<'_>,
        types: &mut DataTypes,
    ) -> AppResult<Resolved> {
        let followed = dereference(doc, schema)?;
        let (schema, name, named) = match &followed {
            Some((target, ref_name)) => (target.as_ref(), ref_name.as_str(), true),
            None => (schema, name, false),
        };
        let format = schema.format();
        let matcher = SchemaMatch {
            name: named.then_some(name),
            type_name: schema.type_name(),
            format: format.as_deref(),
        };

        let annotations = self
            .finder
            .find_usage_annotate_rules(scope.path, scope.target, &matcher)
            .into_iter()
            .filter_map(rule_annotation)
            .collect();

        if let Some(rule) = self.finder.find_map_rule(scope.path, scope.target) {
            tracing::debug!(source = %rule.source_type, location = %schema.key(), "applying map rule");
            let target = self.rule_target(rule)?;
            let id = self.add_mapped(
                &target,
                Vec::new(),
                rule.target_type_primitive_array,
                schema.constraints(),
                schema.deprecated(),
                types,
            );
            self.annotate(schema, &matcher, scope.path, id, types);
            return Ok(Resolved {
                data_type: id,
                annotations,
            });
        }

        if let Some(rule) = self
            .finder
            .find_usage_type_rule(scope.path, scope.target, &matcher)
        {
            let id = self.build_from_rule(doc, schema, name, scope.path, rule, types)?;
            self.annotate(schema, &matcher, scope.path, id, types);
            return Ok(Resolved {
                data_type: id,
                annotations,
            });
        }

        let data_type = self.resolve(doc, schema, name, named, scope.path, types)?;
        Ok(Resolved {
            data_type,
            annotations,
        })
    }

    /// Shared resolution of a node; `named` marks component/`$ref` names that
    /// name keyed rules may match.
    fn resolve(
        &mut self,
        doc: &dyn ApiDocument,
        schema: &dyn Schema,
        name: &str,
        named: bool,
        path: Option<&str>,
        types: &mut DataTypes,
    ) -> AppResult<DataTypeId> {
        let followed = dereference(doc, schema)?;
        let (schema, name, named) = match &followed {
            Some((target, ref_name)) => (target.as_ref(), ref_name.as_str(), true),
            None => (schema, name, named),
        };

        let memo_scope = path.filter(|p| self.finder.has_endpoint_types(p));
        let key = MemoKey::scoped(memo_scope, schema.key().clone());
        if let Some(id) = types.lookup(&key) {
            tracing::trace!(location = %key.schema, %id, "memo hit");
            return Ok(id);
        }
        if !self.pending.insert(key.clone()) {
            return Err(AppError::CyclicReference {
                location: key.schema.to_string(),
            });
        }

        let format = schema.format();
        let matcher = SchemaMatch {
            name: named.then_some(name),
            type_name: schema.type_name(),
            format: format.as_deref(),
        };
        let built = self.build(doc, schema, name, &matcher, path, &key, types);
        self.pending.remove(&key);
        let id = built?;

        types.remember(key, id);
        self.annotate(schema, &matcher, path, id, types);
        tracing::debug!(%name, %id, type_name = %types.type_name(id), "resolved schema");
        Ok(id)
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        &mut self,
        doc: &dyn ApiDocument,
        schema: &dyn Schema,
        name: &str,
        matcher: &SchemaMatch<'_>,
        path: Option<&str>,
        key: &MemoKey,
        types: &mut DataTypes,
    ) -> AppResult<DataTypeId> {
        if let Some(rule) = self.finder.find_type_rule(path, Target::Schema, matcher) {
            return self.build_from_rule(doc, schema, name, path, rule, types);
        }

        let all_of = schema.all_of();
        if !all_of.is_empty() {
            return self.build_all_of(doc, schema, name, path, key, &all_of, types);
        }

        let mut alternatives = schema.one_of();
        let mut label = "OneOf";
        if alternatives.is_empty() {
            alternatives = schema.any_of();
            label = "AnyOf";
        }
        if !alternatives.is_empty() {
            return self.build_polymorphic(doc, schema, name, path, key, label, &alternatives, types);
        }

        let properties = schema.properties();
        let format = matcher.format;
        match schema.type_name() {
            Some("array") => {
                let item = match schema.items() {
                    Some(items) => Some(self.resolve(
                        doc,
                        items.as_ref(),
                        &format!("{}Item", name),
                        false,
                        path,
                        types,
                    )?),
                    None => None,
                };
                types.build_collection(
                    CollectionKind::Array,
                    item,
                    schema.constraints(),
                    schema.deprecated(),
                    &key.schema,
                )
            }
            Some("object") | None if !properties.is_empty() => {
                self.build_object(doc, schema, name, path, key, properties, types)
            }
            Some("object") => self.build_free_form(doc, schema, name, path, key, types),
            Some("string") if !schema.enum_values().is_empty() => Ok(self.build_enum(schema, name, types)),
            Some(type_name) => {
                let kind = PrimitiveKind::from_schema(type_name, format).ok_or_else(|| {
                    AppError::UnknownSchemaType {
                        schema_type: match format {
                            Some(format) => format!("{}:{}", type_name, format),
                            None => type_name.to_string(),
                        },
                        location: key.schema.to_string(),
                    }
                })?;
                Ok(types.build_primitive(kind, schema.constraints(), schema.deprecated()))
            }
            None => Err(AppError::UnknownSchemaType {
                schema_type: "<none>".to_string(),
                location: key.schema.to_string(),
            }),
        }
    }

    fn build_from_rule(
        &mut self,
        doc: &dyn ApiDocument,
        schema: &dyn Schema,
        name: &str,
        path: Option<&str>,
        rule: &MappingRule,
        types: &mut DataTypes,
    ) -> AppResult<DataTypeId> {
        tracing::debug!(
            source = %rule.source_type,
            target = ?rule.target_type,
            location = %schema.key(),
            "applying type rule"
        );
        let target = self.rule_target(rule)?;

        let mut generics = Vec::new();
        if rule.source_type == "array"
            && schema.type_name() == Some("array")
            && target.generic_types.is_empty()
        {
            let items = schema.items().ok_or_else(|| AppError::InvalidItem {
                location: schema.key().to_string(),
            })?;
            generics.push(self.resolve(
                doc,
                items.as_ref(),
                &format!("{}Item", name),
                false,
                path,
                types,
            )?);
        } else {
            for generic in &target.generic_types {
                generics.push(self.add_generic(generic, types));
            }
        }

        Ok(self.add_mapped(
            &target,
            generics,
            rule.target_type_primitive_array,
            schema.constraints(),
            schema.deprecated(),
            types,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn build_all_of(
        &mut self,
        doc: &dyn ApiDocument,
        schema: &dyn Schema,
        name: &str,
        path: Option<&str>,
        key: &MemoKey,
        constituents: &[SchemaRef<'_>],
        types: &mut DataTypes,
    ) -> AppResult<DataTypeId> {
        let id = types.reserve();
        types.remember(key.clone(), id);

        let mut items = Vec::with_capacity(constituents.len());
        for (index, constituent) in constituents.iter().enumerate() {
            let item_name = format!("{}AllOf{}", name, index);
            let item = self.resolve(doc, constituent.as_ref(), &item_name, false, path, types)?;
            match types.get(item) {
                None | Some(DataType::Object { .. }) | Some(DataType::AllOf { .. }) => {
                    items.push(item)
                }
                Some(other) => tracing::warn!(
                    location = %constituent.key(),
                    kind = other.kind(),
                    "skipping non-object allOf item"
                ),
            }
        }

        types.fill(
            id,
            DataType::AllOf {
                name: self.identity(name),
                package: self.options.model_package(),
                items,
                deprecated: schema.deprecated(),
            },
        );
        Ok(id)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_polymorphic(
        &mut self,
        doc: &dyn ApiDocument,
        schema: &dyn Schema,
        name: &str,
        path: Option<&str>,
        key: &MemoKey,
        label: &str,
        alternatives: &[SchemaRef<'_>],
        types: &mut DataTypes,
    ) -> AppResult<DataTypeId> {
        let id = types.reserve();
        types.remember(key.clone(), id);

        let mut items = Vec::with_capacity(alternatives.len());
        for (index, alternative) in alternatives.iter().enumerate() {
            let item_name = format!("{}{}{}", name, label, index);
            items.push(self.resolve(doc, alternative.as_ref(), &item_name, false, path, types)?);
        }

        types.fill(
            id,
            DataType::Polymorphic {
                name: self.identity(name),
                package: self.options.model_package(),
                items,
                interface: self.options.one_of_interface,
                deprecated: schema.deprecated(),
            },
        );
        Ok(id)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_object(
        &mut self,
        doc: &dyn ApiDocument,
        schema: &dyn Schema,
        name: &str,
        path: Option<&str>,
        key: &MemoKey,
        properties: Vec<(String, SchemaRef<'_>)>,
        types: &mut DataTypes,
    ) -> AppResult<DataTypeId> {
        let id = types.reserve();
        types.remember(key.clone(), id);

        let mut resolved = PropertyMap::new();
        for (property, property_schema) in &properties {
            let property_name = format!("{} {}", name, property).to_upper_camel_case();
            let property_id =
                self.resolve(doc, property_schema.as_ref(), &property_name, false, path, types)?;
            resolved.insert(property.clone(), property_id);
        }

        types.fill(
            id,
            DataType::Object {
                name: self.identity(name),
                package: self.options.model_package(),
                properties: resolved,
                required: schema.required(),
                constraints: schema.constraints(),
                deprecated: schema.deprecated(),
            },
        );
        Ok(id)
    }

    fn build_free_form(
        &mut self,
        doc: &dyn ApiDocument,
        schema: &dyn Schema,
        name: &str,
        path: Option<&str>,
        key: &MemoKey,
        types: &mut DataTypes,
    ) -> AppResult<DataTypeId> {
        let value = match schema.additional_properties() {
            Additional::None => {
                return Ok(types.build_primitive(
                    PrimitiveKind::Object,
                    schema.constraints(),
                    schema.deprecated(),
                ))
            }
            Additional::Any => {
                types.build_primitive(PrimitiveKind::Object, Constraints::default(), false)
            }
            Additional::Schema(value) => self.resolve(
                doc,
                value.as_ref(),
                &format!("{}Value", name),
                false,
                path,
                types,
            )?,
        };
        types.build_collection(
            CollectionKind::Map,
            Some(value),
            schema.constraints(),
            schema.deprecated(),
            &key.schema,
        )
    }

    fn build_enum(&self, schema: &dyn Schema, name: &str, types: &mut DataTypes) -> DataTypeId {
        let values = schema
            .enum_values()
            .into_iter()
            .filter_map(|value| match value {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            })
            .collect();
        types.add(DataType::Enum {
            name: self.identity(name),
            package: self.options.model_package(),
            values,
            constraints: schema.constraints(),
            deprecated: schema.deprecated(),
        })
    }

    fn rule_target(&self, rule: &MappingRule) -> AppResult<TargetType> {
        TargetType::from_rule(rule, &self.options.package_name).ok_or_else(|| {
            AppError::General(format!("mapping rule for '{}' has no target type", rule.source_type))
        })
    }

    fn add_mapped(
        &self,
        target: &TargetType,
        generics: Vec<DataTypeId>,
        primitive_array: bool,
        constraints: Constraints,
        deprecated: bool,
        types: &mut DataTypes,
    ) -> DataTypeId {
        types.add(DataType::Mapped {
            name: target.name().to_string(),
            package: target.pkg().to_string(),
            generics,
            primitive_array,
            constraints,
            deprecated,
        })
    }

    fn add_generic(&self, target: &TargetType, types: &mut DataTypes) -> DataTypeId {
        let generics = target
            .generic_types
            .iter()
            .map(|generic| self.add_generic(generic, types))
            .collect();
        self.add_mapped(target, generics, false, Constraints::default(), false, types)
    }

    fn identity(&self, name: &str) -> DataTypeName {
        let type_name = format!(
            "{}{}",
            name.to_upper_camel_case(),
            self.options.model_name_suffix
        );
        DataTypeName::with_type_name(name, type_name)
    }

    /// Attaches the `types` level annotate rules and the constraint annotations to
    /// the slot itself.
    fn annotate(
        &self,
        schema: &dyn Schema,
        matcher: &SchemaMatch<'_>,
        path: Option<&str>,
        id: DataTypeId,
        types: &mut DataTypes,
    ) {
        let rules = self.finder.find_annotate_rules(path, Target::Schema, matcher);
        for annotation in rules.into_iter().filter_map(rule_annotation) {
            types.annotate(id, annotation);
        }
        for annotation in constraint_annotations(self.options.bean_validation, &schema.constraints()) {
            types.annotate(id, annotation);
        }
    }
}

fn rule_annotation(rule: &MappingRule) -> Option<Annotation> {
    let mut annotation = Annotation::new(rule.annotation_type.clone()?);
    annotation.parameters = rule.annotation_parameters.clone();
    Some(annotation)
}

/// Follows a chain of `$ref`s to the first schema that is not a reference.
///
/// `None` when `schema` is not a reference; otherwise the target and the last
/// segment of the final reference, which names the model.
fn dereference<'d>(
    doc: &'d dyn ApiDocument,
    schema: &dyn Schema,
) -> AppResult<Option<(SchemaRef<'d>, String)>> {
    let Some(first) = schema.reference() else {
        return Ok(None);
    };
    let mut reference = first.to_string();
    let mut location = schema.key().clone();
    let mut followed = HashSet::new();
    loop {
        if !followed.insert(reference.clone()) {
            return Err(AppError::CyclicReference {
                location: location.to_string(),
            });
        }
        let target = doc.resolve_reference(&reference).ok_or_else(|| {
            AppError::UnresolvableReference {
                reference: reference.clone(),
                location: location.to_string(),
            }
        })?;
        match target.reference().map(str::to_string) {
            Some(next) => {
                location = target.key().clone();
                reference = next;
            }
            None => {
                let name = pointer::last_segment(&reference);
                return Ok(Some((target, name)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Mapping;
    use crate::oas::load_document;
    use crate::options::BeanValidation;

    const API: &str = r##"
openapi: 3.0.3
info: {title: T, version: '1'}
paths: {}
components:
  schemas:
    Foo:
      type: object
      properties:
        foo: {type: string}
        foobar: {type: string}
    Bar:
      type: object
      properties:
        bar: {type: string}
        barfoo: {type: string}
    FooBar:
      allOf:
        - $ref: '#/components/schemas/Foo'
        - $ref: '#/components/schemas/Bar'
    Node:
      type: object
      properties:
        next: {$ref: '#/components/schemas/Node'}
        children:
          type: array
          items: {$ref: '#/components/schemas/Node'}
    Ints:
      type: array
      items: {type: integer, format: int32}
    Day: {type: string, format: date}
    Color:
      type: string
      enum: [red, green]
    Loop:
      type: array
      items: {$ref: '#/components/schemas/Loop'}
    Broken:
      type: object
      properties:
        gone: {$ref: '#/components/schemas/Missing'}
    Dict:
      type: object
      additionalProperties: {$ref: '#/components/schemas/Foo'}
    Name:
      type: string
      maxLength: 20
    Author:
      type: object
      properties:
        book: {$ref: '#/components/schemas/Book'}
    Book:
      type: object
      properties:
        author: {$ref: '#/components/schemas/Author'}
    Clash:
      allOf:
        - $ref: '#/components/schemas/Foo'
        - type: object
          properties:
            foo: {type: integer, format: int32}
            extra: {type: boolean}
    RefA: {$ref: '#/components/schemas/RefB'}
    RefB: {$ref: '#/components/schemas/RefA'}
    DayRef: {$ref: '#/components/schemas/Day'}
"##;

    fn resolve(options: &ApiOptions, name: &str) -> (DataTypes, AppResult<DataTypeId>) {
        let doc = load_document(API).unwrap();
        let mut types = DataTypes::new();
        let mut converter = DataTypeConverter::new(options);
        let schema = doc.resolve_reference(&format!("#/components/schemas/{}", name)).unwrap();
        let result = converter.convert_schema(doc.as_ref(), schema.as_ref(), name, &mut types);
        (types, result)
    }

    #[test]
    fn test_all_of_merges_constituents() {
        let options = ApiOptions::new();
        let (types, id) = resolve(&options, "FooBar");
        let id = id.unwrap();

        let keys: Vec<String> = types.properties(id).keys().cloned().collect();
        assert_eq!(keys, vec!["foo", "foobar", "bar", "barfoo"]);
        assert_eq!(types.package_name(id), "io.generated.model");
        assert!(types.imports(id).contains("io.generated.model.FooBar"));
    }

    #[test]
    fn test_self_reference_terminates() {
        let options = ApiOptions::new();
        let (types, id) = resolve(&options, "Node");
        let id = id.unwrap();

        let props = types.properties(id);
        assert_eq!(props.get("next"), Some(id));
        let children = props.get("children").unwrap();
        assert_eq!(types.name(children), "Node[]");
    }

    #[test]
    fn test_array_of_integer() {
        let options = ApiOptions::new();
        let (types, id) = resolve(&options, "Ints");
        let id = id.unwrap();
        assert_eq!(types.name(id), "Integer[]");
        assert_eq!(types.package_name(id), "java.lang");
    }

    #[test]
    fn test_array_self_cycle_fails() {
        let options = ApiOptions::new();
        let (_, result) = resolve(&options, "Loop");
        assert!(matches!(result, Err(AppError::CyclicReference { .. })));
    }

    #[test]
    fn test_unresolvable_reference_carries_location() {
        let options = ApiOptions::new();
        let (_, result) = resolve(&options, "Broken");
        let err = result.unwrap_err();
        assert!(matches!(err, AppError::UnresolvableReference { .. }));
        assert_eq!(
            err.location(),
            Some("#/components/schemas/Broken/properties/gone")
        );
    }

    #[test]
    fn test_enum_and_map() {
        let options = ApiOptions::new();
        let (types, color) = resolve(&options, "Color");
        let color = color.unwrap();
        assert!(matches!(
            types.get(color),
            Some(DataType::Enum { values, .. }) if values == &vec!["red".to_string(), "green".to_string()]
        ));

        let (types, dict) = resolve(&options, "Dict");
        assert_eq!(types.name(dict.unwrap()), "Map<String, Foo>");
    }

    #[test]
    fn test_type_rule_replaces_builtin() {
        let mapping = Mapping::parse(
            "openapi-processor-mapping: v2\nmap:\n  types:\n    - type: string:date => java.time.ZonedDateTime\n",
        )
        .unwrap();
        let options = ApiOptions::new().with_mapping(mapping);
        let (types, id) = resolve(&options, "Day");
        let id = id.unwrap();
        assert_eq!(types.name(id), "ZonedDateTime");
        assert_eq!(types.package_name(id), "java.time");
    }

    #[test]
    fn test_array_rule_uses_item_as_generic() {
        let mapping = Mapping::parse(
            "openapi-processor-mapping: v2\nmap:\n  types:\n    - type: array => java.util.List\n",
        )
        .unwrap();
        let options = ApiOptions::new().with_mapping(mapping);
        let (types, id) = resolve(&options, "Ints");
        let id = id.unwrap();
        assert_eq!(types.name(id), "List<Integer>");
        assert!(types.imports(id).contains("java.util.List"));
        assert!(types.imports(id).contains("java.lang.Integer"));
    }

    #[test]
    fn test_model_name_suffix_and_annotations() {
        let mapping = Mapping::parse(
            "openapi-processor-mapping: v2\nmap:\n  types:\n    - type: Foo @ io.Marker\n",
        )
        .unwrap();
        let mut options = ApiOptions::new().with_mapping(mapping);
        options.model_name_suffix = "Resource".into();
        let (types, id) = resolve(&options, "Foo");
        let id = id.unwrap();

        assert_eq!(types.name(id), "Foo");
        assert_eq!(types.type_name(id), "FooResource");
        assert_eq!(types.annotations(id), &[Annotation::new("io.Marker")]);
    }

    #[test]
    fn test_bean_validation_annotations() {
        let mut options = ApiOptions::new();
        options.bean_validation = BeanValidation::Jakarta;
        let (types, id) = resolve(&options, "Name");
        let rendered: Vec<String> = types.annotations(id.unwrap()).iter().map(Annotation::render).collect();
        assert_eq!(rendered, vec!["@Size(max = 20)".to_string()]);
    }

    #[test]
    fn test_mutual_references_share_types() {
        let options = ApiOptions::new();
        let (types, author) = resolve(&options, "Author");
        let author = author.unwrap();

        let book = types.properties(author).get("book").unwrap();
        assert_eq!(types.name(book), "Book");
        assert_eq!(types.properties(book).get("author"), Some(author));
    }

    #[test]
    fn test_all_of_collision_takes_last_value_at_first_position() {
        let options = ApiOptions::new();
        let (types, id) = resolve(&options, "Clash");
        let props = types.properties(id.unwrap());

        let keys: Vec<String> = props.keys().cloned().collect();
        assert_eq!(keys, vec!["foo", "foobar", "extra"]);
        assert_eq!(types.name(props.get("foo").unwrap()), "Integer");
    }

    #[test]
    fn test_reference_only_cycle_fails() {
        let options = ApiOptions::new();
        let (_, result) = resolve(&options, "RefA");
        let err = result.unwrap_err();
        assert!(matches!(err, AppError::CyclicReference { .. }));
        assert_eq!(err.location(), Some("#/components/schemas/RefA"));
    }

    #[test]
    fn test_name_rule_ignores_inline_names() {
        let mapping = Mapping::parse(
            "openapi-processor-mapping: v2\nmap:\n  types:\n    - type: FooFoo => io.Wrong\n",
        )
        .unwrap();
        let options = ApiOptions::new().with_mapping(mapping);
        let (types, id) = resolve(&options, "Foo");
        let foo = types.properties(id.unwrap()).get("foo").unwrap();
        assert_eq!(types.name(foo), "String");
    }

    #[test]
    fn test_usage_rules_apply_to_referenced_schema() {
        let mapping = Mapping::parse(
            r#"
openapi-processor-mapping: v2
map:
  parameters:
    - type: string:date => java.time.ZonedDateTime
    - type: string:date @ io.ParamOnly
"#,
        )
        .unwrap();
        let options = ApiOptions::new().with_mapping(mapping);
        let doc = load_document(API).unwrap();
        let mut types = DataTypes::new();
        let mut converter = DataTypeConverter::new(&options);

        let day = doc.resolve_reference("#/components/schemas/Day").unwrap();
        let day = converter.convert_schema(doc.as_ref(), day.as_ref(), "Day", &mut types).unwrap();
        assert_eq!(types.name(day), "LocalDate");

        let used = doc.resolve_reference("#/components/schemas/DayRef").unwrap();
        let scope = Scope::endpoint("/days", Target::Parameter("day"));
        let resolved = converter
            .convert(doc.as_ref(), used.as_ref(), "GetDay", scope, &mut types)
            .unwrap();
        assert_eq!(types.name(resolved.data_type), "ZonedDateTime");
        assert_eq!(resolved.annotations, vec![Annotation::new("io.ParamOnly")]);
        assert!(types.annotations(day).is_empty());
        assert!(types.annotations(resolved.data_type).is_empty());
    }
}
