#![deny(missing_docs)]

//! # OAP Core
//!
//! Type resolution core of an OpenAPI driven code generator: turns the schemas
//! of an API description plus user mapping rules into a graph of resolved types.

/// Shared error types.
pub mod error;

/// OpenAPI parser abstraction and backends.
pub mod oas;

/// Resolved data-type model.
pub mod model;

/// Mapping configuration model.
pub mod mapping;

/// Generator options.
pub mod options;

/// Schema to data-type resolution.
pub mod resolver;

/// Whole document resolution.
pub mod api;

/// Serializable resolution summary.
pub mod report;

pub use api::{
    resolve_api, ApiConverter, ResolvedApi, ResolvedContent, ResolvedEndpoint, ResolvedParameter,
    ResolvedResponse,
};
pub use error::{AppError, AppResult};
pub use mapping::{resolve_version, Mapping, MappingFinder, MappingRule, RuleKind, Version};
pub use model::{Annotation, DataType, DataTypeId, DataTypeName, DataTypes, PrimitiveKind};
pub use oas::{load_document, ApiDocument, Schema, SchemaKey};
pub use options::{ApiOptions, BeanValidation};
pub use report::ApiReport;
pub use resolver::{DataTypeConverter, Resolved, Scope, TargetType};
