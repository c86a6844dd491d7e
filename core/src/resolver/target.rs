//! # Target Types
//!
//! The transient, fully qualified result of applying a mapping rule.

use crate::mapping::{MappingRule, MappingType};

const PACKAGE_NAME_PLACEHOLDER: &str = "{package-name}";

/// A resolved rule target: qualified name plus generic arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetType {
    /// Fully qualified name.
    pub type_name: String,
    /// Raw names of the generic arguments, in order.
    pub generic_names: Vec<String>,
    /// The generic arguments as target types, parallel to `generic_names`.
    pub generic_types: Vec<TargetType>,
}

impl TargetType {
    /// A target without generics.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            generic_names: Vec::new(),
            generic_types: Vec::new(),
        }
    }

    /// Resolves a rule's target, substituting `{package-name}`.
    pub fn from_rule(rule: &MappingRule, package_name: &str) -> Option<Self> {
        let type_name = rule.target_type.as_deref()?;
        let mut target = Self::new(substitute(type_name, package_name));
        for generic in &rule.target_generic_types {
            target.push_generic(Self::from_mapping_type(generic, package_name));
        }
        Some(target)
    }

    /// Resolves a nested rule level type.
    pub fn from_mapping_type(mapping_type: &MappingType, package_name: &str) -> Self {
        let mut target = Self::new(substitute(&mapping_type.target_type, package_name));
        for generic in &mapping_type.generics {
            target.push_generic(Self::from_mapping_type(generic, package_name));
        }
        target
    }

    /// Appends a generic argument.
    pub fn push_generic(&mut self, generic: TargetType) {
        self.generic_names.push(generic.type_name.clone());
        self.generic_types.push(generic);
    }

    /// Simple name: everything after the last `.`.
    pub fn name(&self) -> &str {
        match self.type_name.rfind('.') {
            Some(dot) => &self.type_name[dot + 1..],
            None => &self.type_name,
        }
    }

    /// Package: everything before the last `.`, empty for root namespace types.
    pub fn pkg(&self) -> &str {
        match self.type_name.rfind('.') {
            Some(dot) => &self.type_name[..dot],
            None => "",
        }
    }
}

fn substitute(type_name: &str, package_name: &str) -> String {
    type_name.replace(PACKAGE_NAME_PLACEHOLDER, package_name)
}
