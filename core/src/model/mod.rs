#![deny(missing_docs)]

//! # Data-Type Model
//!
//! The resolved type graph handed to code emitters.
//!
//! - **datatype**: the `DataType` variants and their identities.
//! - **properties**: insertion ordered property maps with append/overwrite merging.
//! - **arena**: slot storage, memoization and the shared name/package/import logic.
//! - **annotation**: annotation markers and their literal arguments.

pub mod annotation;
pub mod arena;
pub mod datatype;
pub mod properties;

pub use annotation::{Annotation, ParameterValue};
pub use arena::{DataTypes, MemoKey};
pub use datatype::{CollectionKind, DataType, DataTypeId, DataTypeName, PrimitiveKind};
pub use properties::PropertyMap;
