//! # Data Types
//!
//! The closed set of resolved type kinds.
//!
//! Variants refer to each other through [`DataTypeId`] handles into a
//! [`DataTypes`](crate::model::DataTypes) arena, so that recursive schemas can
//! point back at a type that is still being built.

use crate::oas::Constraints;
use crate::model::PropertyMap;
use std::fmt;

/// Stable handle of a type inside its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataTypeId(usize);

impl DataTypeId {
    /// Wraps a raw slot index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DataTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a named type: the schema name and the generated type name.
///
/// They differ when a model name suffix is configured (`Foo` / `FooResource`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTypeName {
    /// The name in the API description.
    pub name: String,
    /// The generated identifier.
    pub type_name: String,
}

impl DataTypeName {
    /// Same schema and type name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            type_name: name.clone(),
            name,
        }
    }

    /// Distinct schema and type names.
    pub fn with_type_name(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Built-in primitive targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `string`
    String,
    /// `integer`, `integer:int32`
    Integer,
    /// `integer:int64`
    Long,
    /// `number`, `number:float`
    Float,
    /// `number:double`
    Double,
    /// `boolean`
    Boolean,
    /// `string:date`
    LocalDate,
    /// `string:date-time`
    OffsetDateTime,
    /// Free-form `object`.
    Object,
}

impl PrimitiveKind {
    /// The built-in mapping for a `(type, format)` pair.
    ///
    /// Unknown formats of a known type fall back to the type's default.
    pub fn from_schema(type_name: &str, format: Option<&str>) -> Option<Self> {
        let kind = match (type_name, format) {
            ("string", Some("date")) => Self::LocalDate,
            ("string", Some("date-time")) => Self::OffsetDateTime,
            ("string", _) => Self::String,
            ("integer", Some("int64")) => Self::Long,
            ("integer", _) => Self::Integer,
            ("number", Some("double")) => Self::Double,
            ("number", _) => Self::Float,
            ("boolean", _) => Self::Boolean,
            ("object", _) => Self::Object,
            _ => return None,
        };
        Some(kind)
    }

    /// Generated name.
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Long => "Long",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Boolean => "Boolean",
            Self::LocalDate => "LocalDate",
            Self::OffsetDateTime => "OffsetDateTime",
            Self::Object => "Object",
        }
    }

    /// Package of the target representation.
    pub fn package(self) -> &'static str {
        match self {
            Self::LocalDate | Self::OffsetDateTime => "java.time",
            _ => "java.lang",
        }
    }
}

/// The two collection shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// `type: array`
    Array,
    /// `additionalProperties`
    Map,
}

/// A resolved type.
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    /// A built-in leaf type.
    Primitive {
        /// Which primitive.
        kind: PrimitiveKind,
        /// Schema constraints.
        constraints: Constraints,
        /// `deprecated: true`
        deprecated: bool,
    },
    /// An array of `item`.
    Array {
        /// Item type.
        item: DataTypeId,
        /// Schema constraints.
        constraints: Constraints,
        /// `deprecated: true`
        deprecated: bool,
    },
    /// A string keyed map of `item`.
    Map {
        /// Value type.
        item: DataTypeId,
        /// Schema constraints.
        constraints: Constraints,
        /// `deprecated: true`
        deprecated: bool,
    },
    /// A generated model with properties.
    Object {
        /// Identity.
        name: DataTypeName,
        /// Package of the generated type.
        package: String,
        /// Properties in declaration order.
        properties: PropertyMap,
        /// Required property names.
        required: Vec<String>,
        /// Schema constraints.
        constraints: Constraints,
        /// `deprecated: true`
        deprecated: bool,
    },
    /// A generated model merged from `allOf` constituents.
    AllOf {
        /// Identity.
        name: DataTypeName,
        /// Package of the generated type.
        package: String,
        /// Constituents in declaration order.
        items: Vec<DataTypeId>,
        /// `deprecated: true`
        deprecated: bool,
    },
    /// A `oneOf` / `anyOf` type.
    Polymorphic {
        /// Identity.
        name: DataTypeName,
        /// Package of the generated interface.
        package: String,
        /// Alternatives in declaration order.
        items: Vec<DataTypeId>,
        /// Whether a marker interface is generated; otherwise `Object` is used.
        interface: bool,
        /// `deprecated: true`
        deprecated: bool,
    },
    /// A generated string enum.
    Enum {
        /// Identity.
        name: DataTypeName,
        /// Package of the generated type.
        package: String,
        /// Values in declaration order.
        values: Vec<String>,
        /// Schema constraints.
        constraints: Constraints,
        /// `deprecated: true`
        deprecated: bool,
    },
    /// A type chosen by a mapping rule.
    Mapped {
        /// Simple name (no package, no generics).
        name: String,
        /// Package, empty for root namespace or language primitives.
        package: String,
        /// Generic arguments in order.
        generics: Vec<DataTypeId>,
        /// Whether the target is a language primitive array (`byte[]`).
        primitive_array: bool,
        /// Schema constraints.
        constraints: Constraints,
        /// `deprecated: true`
        deprecated: bool,
    },
}

impl DataType {
    /// Short kind label used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            DataType::Primitive { .. } => "primitive",
            DataType::Array { .. } => "array",
            DataType::Map { .. } => "map",
            DataType::Object { .. } => "object",
            DataType::AllOf { .. } => "all-of",
            DataType::Polymorphic { .. } => "polymorphic",
            DataType::Enum { .. } => "enum",
            DataType::Mapped { .. } => "mapped",
        }
    }

    /// Whether the type is deprecated.
    pub fn deprecated(&self) -> bool {
        match self {
            DataType::Primitive { deprecated, .. }
            | DataType::Array { deprecated, .. }
            | DataType::Map { deprecated, .. }
            | DataType::Object { deprecated, .. }
            | DataType::AllOf { deprecated, .. }
            | DataType::Polymorphic { deprecated, .. }
            | DataType::Enum { deprecated, .. }
            | DataType::Mapped { deprecated, .. } => *deprecated,
        }
    }

    /// Constraints of the schema the type was built from.
    pub fn constraints(&self) -> Option<&Constraints> {
        match self {
            DataType::Primitive { constraints, .. }
            | DataType::Array { constraints, .. }
            | DataType::Map { constraints, .. }
            | DataType::Object { constraints, .. }
            | DataType::Enum { constraints, .. }
            | DataType::Mapped { constraints, .. } => Some(constraints),
            DataType::AllOf { .. } | DataType::Polymorphic { .. } => None,
        }
    }
}
