//! # Options
//!
//! Read-once generator settings consulted by the resolver.

use crate::error::AppError;
use crate::mapping::Mapping;
use std::fmt;
use std::str::FromStr;

/// Default root package of generated code.
pub const DEFAULT_PACKAGE: &str = "io.generated";

/// Constraint annotation flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BeanValidation {
    /// No constraint annotations.
    #[default]
    Disabled,
    /// `javax.validation.constraints`
    Javax,
    /// `jakarta.validation.constraints`
    Jakarta,
}

impl BeanValidation {
    /// Package of the constraint annotations, `None` when disabled.
    pub fn package(self) -> Option<&'static str> {
        match self {
            BeanValidation::Disabled => None,
            BeanValidation::Javax => Some("javax.validation.constraints"),
            BeanValidation::Jakarta => Some("jakarta.validation.constraints"),
        }
    }
}

impl FromStr for BeanValidation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "false" | "disabled" => Ok(BeanValidation::Disabled),
            "true" | "javax" => Ok(BeanValidation::Javax),
            "jakarta" => Ok(BeanValidation::Jakarta),
            other => Err(AppError::ConfigFormat(format!(
                "unknown bean-validation value '{}' (expected true, false, javax or jakarta)",
                other
            ))),
        }
    }
}

impl fmt::Display for BeanValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BeanValidation::Disabled => "disabled",
            BeanValidation::Javax => "javax",
            BeanValidation::Jakarta => "jakarta",
        };
        write!(f, "{}", s)
    }
}

/// Settings for one resolution run.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiOptions {
    /// Root package; models go to `{package_name}.model`.
    pub package_name: String,
    /// Constraint annotations.
    pub bean_validation: BeanValidation,
    /// Suffix appended to generated model type names.
    pub model_name_suffix: String,
    /// Generate marker interfaces for `oneOf`/`anyOf`.
    pub one_of_interface: bool,
    /// Mapping documents; later documents take precedence.
    pub mappings: Vec<Mapping>,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            package_name: DEFAULT_PACKAGE.to_string(),
            bean_validation: BeanValidation::Disabled,
            model_name_suffix: String::new(),
            one_of_interface: false,
            mappings: Vec::new(),
        }
    }
}

impl ApiOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Package of generated models.
    pub fn model_package(&self) -> String {
        format!("{}.model", self.package_name)
    }

    /// Adds a mapping document (builder style).
    pub fn with_mapping(mut self, mapping: Mapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    /// Copies the `options` blocks of the mapping documents into these options,
    /// later documents overriding earlier ones per field.
    pub fn apply_mapping_options(&mut self) {
        for mapping in &self.mappings {
            let options = &mapping.options;
            if let Some(package_name) = &options.package_name {
                self.package_name = package_name.clone();
            }
            if let Some(bean_validation) = options.bean_validation {
                self.bean_validation = bean_validation;
            }
            if let Some(suffix) = &options.model_name_suffix {
                self.model_name_suffix = suffix.clone();
            }
            if let Some(one_of_interface) = options.one_of_interface {
                self.one_of_interface = one_of_interface;
            }
        }
    }
}
