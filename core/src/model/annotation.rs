//! # Annotations
//!
//! Annotation markers attached to resolved types, either by `@` mapping rules or
//! derived from schema constraints.

use indexmap::IndexMap;
use std::collections::BTreeSet;

/// A literal annotation argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterValue {
    /// The literal source text (`"x"`, `42`, `true`, `Foo.class`).
    pub value: String,
    /// Import required by the value (class literals only).
    pub import: Option<String>,
}

impl ParameterValue {
    /// A value without an import.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            import: None,
        }
    }

    /// A value that needs an import.
    pub fn with_import(value: impl Into<String>, import: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            import: Some(import.into()),
        }
    }
}

/// An annotation: fully qualified type and its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Fully qualified annotation type.
    pub type_name: String,
    /// Arguments by name, in emission order.
    pub parameters: IndexMap<String, ParameterValue>,
}

impl Annotation {
    /// An annotation without arguments.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            parameters: IndexMap::new(),
        }
    }

    /// Adds an argument (builder style).
    pub fn param(mut self, name: impl Into<String>, value: ParameterValue) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    /// Simple name without the package.
    pub fn name(&self) -> &str {
        self.type_name
            .rsplit_once('.')
            .map(|(_, name)| name)
            .unwrap_or(&self.type_name)
    }

    /// The annotation's own import plus the imports of its arguments.
    pub fn imports(&self) -> BTreeSet<String> {
        let mut imports = BTreeSet::new();
        if self.type_name.contains('.') {
            imports.insert(self.type_name.clone());
        }
        imports.extend(self.parameters.values().filter_map(|v| v.import.clone()));
        imports
    }

    /// Renders the annotation as source text (`@Size(min = 1)`).
    pub fn render(&self) -> String {
        if self.parameters.is_empty() {
            return format!("@{}", self.name());
        }
        let args: Vec<String> = self
            .parameters
            .iter()
            .map(|(name, v)| {
                if name == "value" && self.parameters.len() == 1 {
                    v.value.clone()
                } else {
                    format!("{} = {}", name, v.value)
                }
            })
            .collect();
        format!("@{}({})", self.name(), args.join(", "))
    }
}
