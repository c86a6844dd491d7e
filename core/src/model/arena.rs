//! # Type Arena
//!
//! Owns every resolved [`DataType`] of a run and answers the shared questions
//! (name, package, imports, properties) by dispatching on the variant.
//!
//! Slots can be reserved before their content is known. A reserved slot is a
//! build-in-progress placeholder: recursive references receive its handle and
//! the slot is filled once the outer type is complete.

use crate::error::{AppError, AppResult};
use crate::model::{
    Annotation, CollectionKind, DataType, DataTypeId, DataTypeName, PrimitiveKind, PropertyMap,
};
use crate::oas::{Constraints, SchemaKey};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Memoization key of a resolved schema.
///
/// `scope` is the endpoint path when that endpoint carries its own mapping rules,
/// so the same schema may resolve differently there than globally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoKey {
    /// Endpoint path for endpoint scoped resolution.
    pub scope: Option<String>,
    /// Identity of the schema node.
    pub schema: SchemaKey,
}

impl MemoKey {
    /// Key of a globally resolved schema.
    pub fn global(schema: SchemaKey) -> Self {
        Self {
            scope: None,
            schema,
        }
    }

    /// Key of an endpoint scoped schema.
    pub fn scoped(scope: Option<&str>, schema: SchemaKey) -> Self {
        Self {
            scope: scope.map(str::to_string),
            schema,
        }
    }
}

#[derive(Debug, Default)]
struct Entry {
    data_type: Option<DataType>,
    annotations: Vec<Annotation>,
}

/// Arena of resolved types, scoped to one resolution run.
#[derive(Debug, Default)]
pub struct DataTypes {
    entries: Vec<Entry>,
    memo: HashMap<MemoKey, DataTypeId>,
}

impl DataTypes {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no slot exists.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores a finished type.
    pub fn add(&mut self, data_type: DataType) -> DataTypeId {
        let id = DataTypeId::new(self.entries.len());
        self.entries.push(Entry {
            data_type: Some(data_type),
            annotations: Vec::new(),
        });
        id
    }

    /// Reserves a placeholder slot.
    pub fn reserve(&mut self) -> DataTypeId {
        let id = DataTypeId::new(self.entries.len());
        self.entries.push(Entry::default());
        id
    }

    /// Fills a reserved slot.
    pub fn fill(&mut self, id: DataTypeId, data_type: DataType) {
        if let Some(entry) = self.entries.get_mut(id.index()) {
            entry.data_type = Some(data_type);
        }
    }

    /// Returns the type of a slot; `None` while it is a placeholder.
    pub fn get(&self, id: DataTypeId) -> Option<&DataType> {
        self.entries.get(id.index())?.data_type.as_ref()
    }

    /// Whether a slot is still a placeholder.
    pub fn is_pending(&self, id: DataTypeId) -> bool {
        self.get(id).is_none()
    }

    /// Looks up a memoized resolution.
    pub fn lookup(&self, key: &MemoKey) -> Option<DataTypeId> {
        self.memo.get(key).copied()
    }

    /// Records a resolution.
    pub fn remember(&mut self, key: MemoKey, id: DataTypeId) {
        self.memo.insert(key, id);
    }

    /// Builds a primitive.
    pub fn build_primitive(
        &mut self,
        kind: PrimitiveKind,
        constraints: Constraints,
        deprecated: bool,
    ) -> DataTypeId {
        self.add(DataType::Primitive {
            kind,
            constraints,
            deprecated,
        })
    }

    /// Builds an array or map around `item`.
    pub fn build_collection(
        &mut self,
        kind: CollectionKind,
        item: Option<DataTypeId>,
        constraints: Constraints,
        deprecated: bool,
        location: &SchemaKey,
    ) -> AppResult<DataTypeId> {
        let item = item.ok_or_else(|| AppError::InvalidItem {
            location: location.to_string(),
        })?;
        let data_type = match kind {
            CollectionKind::Array => DataType::Array {
                item,
                constraints,
                deprecated,
            },
            CollectionKind::Map => DataType::Map {
                item,
                constraints,
                deprecated,
            },
        };
        Ok(self.add(data_type))
    }

    /// Builds an object model. Property names are unique by construction.
    pub fn build_object(
        &mut self,
        name: DataTypeName,
        package: impl Into<String>,
        properties: PropertyMap,
    ) -> DataTypeId {
        self.add(DataType::Object {
            name,
            package: package.into(),
            properties,
            required: Vec::new(),
            constraints: Constraints::default(),
            deprecated: false,
        })
    }

    /// Builds a composed model from object constituents.
    pub fn build_all_of(
        &mut self,
        name: DataTypeName,
        package: impl Into<String>,
        items: Vec<DataTypeId>,
    ) -> DataTypeId {
        self.add(DataType::AllOf {
            name,
            package: package.into(),
            items,
            deprecated: false,
        })
    }

    /// Attaches an annotation unless an equal one is already present.
    pub fn annotate(&mut self, id: DataTypeId, annotation: Annotation) {
        if let Some(entry) = self.entries.get_mut(id.index()) {
            if !entry.annotations.contains(&annotation) {
                entry.annotations.push(annotation);
            }
        }
    }

    /// Annotations of a slot in attachment order.
    pub fn annotations(&self, id: DataTypeId) -> &[Annotation] {
        self.entries
            .get(id.index())
            .map(|e| e.annotations.as_slice())
            .unwrap_or_default()
    }

    /// The name of a type (schema name for models).
    pub fn name(&self, id: DataTypeId) -> String {
        let Some(data_type) = self.get(id) else {
            return String::new();
        };
        match data_type {
            DataType::Primitive { kind, .. } => kind.name().to_string(),
            DataType::Array { item, .. } => format!("{}[]", self.name(*item)),
            DataType::Map { item, .. } => format!("Map<String, {}>", self.name(*item)),
            DataType::Object { name, .. }
            | DataType::AllOf { name, .. }
            | DataType::Enum { name, .. } => name.name.clone(),
            DataType::Polymorphic {
                name, interface, ..
            } => {
                if *interface {
                    name.name.clone()
                } else {
                    PrimitiveKind::Object.name().to_string()
                }
            }
            DataType::Mapped {
                name,
                generics,
                primitive_array,
                ..
            } => {
                let mut rendered = name.clone();
                if !generics.is_empty() {
                    let args: Vec<String> = generics.iter().map(|g| self.type_name(*g)).collect();
                    rendered = format!("{}<{}>", rendered, args.join(", "));
                }
                if *primitive_array {
                    rendered.push_str("[]");
                }
                rendered
            }
        }
    }

    /// The generated identifier used when referencing the type.
    pub fn type_name(&self, id: DataTypeId) -> String {
        match self.get(id) {
            Some(DataType::Object { name, .. })
            | Some(DataType::AllOf { name, .. })
            | Some(DataType::Enum { name, .. }) => name.type_name.clone(),
            Some(DataType::Polymorphic {
                name,
                interface: true,
                ..
            }) => name.type_name.clone(),
            Some(DataType::Array { item, .. }) => format!("{}[]", self.type_name(*item)),
            Some(DataType::Map { item, .. }) => {
                format!("Map<String, {}>", self.type_name(*item))
            }
            _ => self.name(id),
        }
    }

    /// Package of a type.
    pub fn package_name(&self, id: DataTypeId) -> String {
        let Some(data_type) = self.get(id) else {
            return String::new();
        };
        match data_type {
            DataType::Primitive { kind, .. } => kind.package().to_string(),
            DataType::Array { item, .. } => self.package_name(*item),
            DataType::Map { .. } => "java.util".to_string(),
            DataType::Object { package, .. }
            | DataType::AllOf { package, .. }
            | DataType::Enum { package, .. }
            | DataType::Mapped { package, .. } => package.clone(),
            DataType::Polymorphic {
                package, interface, ..
            } => {
                if *interface {
                    package.clone()
                } else {
                    PrimitiveKind::Object.package().to_string()
                }
            }
        }
    }

    /// Fully qualified names needed to reference the type.
    pub fn imports(&self, id: DataTypeId) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_imports(id, &mut HashSet::new(), &mut out);
        out
    }

    fn collect_imports(
        &self,
        id: DataTypeId,
        visited: &mut HashSet<DataTypeId>,
        out: &mut BTreeSet<String>,
    ) {
        if !visited.insert(id) {
            return;
        }
        let Some(data_type) = self.get(id) else {
            return;
        };
        match data_type {
            DataType::Primitive { kind, .. } => {
                out.insert(format!("{}.{}", kind.package(), kind.name()));
            }
            DataType::Array { item, .. } | DataType::Map { item, .. } => {
                self.collect_imports(*item, visited, out);
            }
            DataType::Object { name, package, .. }
            | DataType::AllOf { name, package, .. }
            | DataType::Enum { name, package, .. } => {
                out.insert(qualify(package, &name.type_name));
            }
            DataType::Polymorphic {
                name,
                package,
                interface,
                ..
            } => {
                if *interface {
                    out.insert(qualify(package, &name.type_name));
                } else {
                    let object = PrimitiveKind::Object;
                    out.insert(format!("{}.{}", object.package(), object.name()));
                }
            }
            DataType::Mapped {
                name,
                package,
                generics,
                ..
            } => {
                if !package.is_empty() {
                    out.insert(qualify(package, name));
                }
                for generic in generics {
                    self.collect_imports(*generic, visited, out);
                }
            }
        }
    }

    /// Imports needed by everything the type references, including the
    /// annotations on the type and on its properties.
    pub fn referenced_imports(&self, id: DataTypeId) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for annotation in self.annotations(id) {
            out.extend(annotation.imports());
        }
        let Some(data_type) = self.get(id) else {
            return out;
        };
        match data_type {
            DataType::Primitive { .. } | DataType::Enum { .. } => {}
            DataType::Array { item, .. } => out.extend(self.referenced_imports(*item)),
            DataType::Map { item, .. } => {
                out.extend(self.referenced_imports(*item));
                out.insert("java.util.Map".to_string());
            }
            DataType::Object { .. } | DataType::AllOf { .. } => {
                for (_, property) in &self.properties(id) {
                    out.extend(self.imports(*property));
                    for annotation in self.annotations(*property) {
                        out.extend(annotation.imports());
                    }
                }
            }
            DataType::Polymorphic {
                items, interface, ..
            } => {
                if *interface {
                    for item in items {
                        out.extend(self.imports(*item));
                    }
                }
            }
            DataType::Mapped { generics, .. } => {
                for generic in generics {
                    out.extend(self.imports(*generic));
                }
            }
        }
        out
    }

    /// Effective properties: own properties for objects, the merged union for
    /// `allOf` types, empty otherwise.
    pub fn properties(&self, id: DataTypeId) -> PropertyMap {
        let mut out = PropertyMap::new();
        self.collect_properties(id, &mut HashSet::new(), &mut out);
        out
    }

    fn collect_properties(
        &self,
        id: DataTypeId,
        visited: &mut HashSet<DataTypeId>,
        out: &mut PropertyMap,
    ) {
        if !visited.insert(id) {
            return;
        }
        match self.get(id) {
            Some(DataType::Object { properties, .. }) => out.append(properties),
            Some(DataType::AllOf { items, .. }) => {
                for item in items {
                    self.collect_properties(*item, visited, out);
                }
            }
            _ => {}
        }
    }

    /// Required property names, merged across `allOf` constituents.
    pub fn required(&self, id: DataTypeId) -> Vec<String> {
        match self.get(id) {
            Some(DataType::Object { required, .. }) => required.clone(),
            Some(DataType::AllOf { items, .. }) => {
                let mut out: Vec<String> = Vec::new();
                for item in items {
                    for name in self.required(*item) {
                        if !out.contains(&name) {
                            out.push(name);
                        }
                    }
                }
                out
            }
            _ => Vec::new(),
        }
    }
}

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", package, name)
    }
}
