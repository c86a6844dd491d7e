#![deny(missing_docs)]

//! # Mapping Configuration Model
//!
//! User authored override rules.
//!
//! - **config**: the versioned [`Mapping`] root and its parsing.
//! - **document**: raw serde shape of the YAML document.
//! - **rule**: a single rule and the one-line rule grammar.
//! - **finder**: rule lookup with scope and declaration order precedence.

pub mod config;
pub mod document;
pub mod finder;
pub mod rule;

pub use config::{resolve_version, Mapping, MappingOptions, PathMapping, RuleSet, Version};
pub use finder::{MappingFinder, SchemaMatch, Target};
pub use rule::{MappingRule, MappingType, RuleKind};
