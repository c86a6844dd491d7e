//! # Mapping Configuration
//!
//! Parses a mapping document into an immutable [`Mapping`].
//!
//! Both format generations are accepted. v1 structured entries and v2 one-line
//! rules normalize into the same [`MappingRule`] model.

use crate::error::{AppError, AppResult};
use crate::mapping::document::{RawDocument, RawEntry, RawOptions};
use crate::mapping::rule::{MappingRule, RuleKind};
use crate::options::BeanValidation;
use indexmap::IndexMap;
use serde_json::Value;

/// Accepted names of the version field and whether the name is deprecated.
pub const VERSION_KEYS: [(&str, bool); 2] = [
    ("openapi-processor-mapping", false),
    ("openapi-processor-spring", true),
];

/// Mapping format generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    /// Structured `from`/`to` entries.
    V1,
    /// One-line rule strings.
    V2,
}

/// Generator toggles carried by a mapping document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingOptions {
    /// `package-name`
    pub package_name: Option<String>,
    /// `bean-validation`
    pub bean_validation: Option<BeanValidation>,
    /// `model-name-suffix`
    pub model_name_suffix: Option<String>,
    /// `one-of-interface`
    pub one_of_interface: Option<bool>,
}

impl MappingOptions {
    fn from_raw(raw: RawOptions) -> AppResult<Self> {
        let bean_validation = match raw.bean_validation {
            None | Some(Value::Null) => None,
            Some(Value::Bool(true)) => Some(BeanValidation::Javax),
            Some(Value::Bool(false)) => Some(BeanValidation::Disabled),
            Some(Value::String(s)) => Some(s.parse()?),
            Some(other) => {
                return Err(AppError::ConfigFormat(format!(
                    "invalid bean-validation value '{}'",
                    other
                )))
            }
        };
        Ok(Self {
            package_name: raw.package_name,
            bean_validation,
            model_name_suffix: raw.model_name_suffix,
            one_of_interface: raw.one_of_interface,
        })
    }
}

/// Rules of one scope (global or a single endpoint), each list in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    /// `Type` and `Annotate` rules.
    pub types: Vec<MappingRule>,
    /// Parameter `Map` rules plus contextual type rules.
    pub parameters: Vec<MappingRule>,
    /// Response `Map` rules plus contextual type rules.
    pub responses: Vec<MappingRule>,
}

impl RuleSet {
    /// True when the scope has no rules.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.parameters.is_empty() && self.responses.is_empty()
    }

    fn from_raw(
        types: &[RawEntry],
        parameters: &[RawEntry],
        responses: &[RawEntry],
    ) -> AppResult<Self> {
        Ok(Self {
            types: normalize(types, Section::Types)?,
            parameters: normalize(parameters, Section::Parameters)?,
            responses: normalize(responses, Section::Responses)?,
        })
    }
}

/// Endpoint scoped rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathMapping {
    /// Skip the endpoint.
    pub exclude: bool,
    /// Rules of the endpoint.
    pub rules: RuleSet,
}

/// A parsed mapping document.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    /// Raw version string (`v2`, `v2.1`, `v1.0`).
    pub version: String,
    /// The version was given under a deprecated key.
    pub deprecated_version_key: bool,
    /// `options` block.
    pub options: MappingOptions,
    /// Global rules.
    pub global: RuleSet,
    /// Endpoint rules by path, in declaration order.
    pub paths: IndexMap<String, PathMapping>,
}

impl Mapping {
    /// Parses a YAML mapping document.
    pub fn parse(content: &str) -> AppResult<Self> {
        let value: Value = serde_yaml::from_str(content)
            .map_err(|e| AppError::ConfigFormat(format!("Failed to parse mapping YAML: {}", e)))?;
        Self::from_value(value)
    }

    /// Builds a mapping from an already parsed document.
    pub fn from_value(value: Value) -> AppResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| AppError::ConfigFormat("mapping document is not a map".into()))?;

        let (version, deprecated_version_key) = VERSION_KEYS
            .iter()
            .find_map(|(key, deprecated)| object.get(*key).map(|v| (v, *deprecated)))
            .ok_or_else(|| {
                AppError::ConfigFormat(format!("missing version key '{}'", VERSION_KEYS[0].0))
            })?;
        let version = match version {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        if !(version.starts_with("v1") || version.starts_with("v2")) {
            return Err(AppError::ConfigFormat(format!(
                "unrecognized mapping version '{}'",
                version
            )));
        }
        if deprecated_version_key {
            tracing::warn!(
                "'{}' is deprecated, use '{}'",
                VERSION_KEYS[1].0,
                VERSION_KEYS[0].0
            );
        }

        let raw: RawDocument = serde_json::from_value(value)
            .map_err(|e| AppError::ConfigFormat(format!("invalid mapping document: {}", e)))?;

        let global = RuleSet::from_raw(&raw.map.types, &raw.map.parameters, &raw.map.responses)?;
        let mut paths = IndexMap::new();
        for (path, raw_path) in &raw.map.paths {
            paths.insert(
                path.clone(),
                PathMapping {
                    exclude: raw_path.exclude,
                    rules: RuleSet::from_raw(
                        &raw_path.types,
                        &raw_path.parameters,
                        &raw_path.responses,
                    )?,
                },
            );
        }

        let mapping = Self {
            version,
            deprecated_version_key,
            options: MappingOptions::from_raw(raw.options)?,
            global,
            paths,
        };
        tracing::debug!(version = %mapping.version, v2 = mapping.is_v2(), "parsed mapping");
        Ok(mapping)
    }

    /// True iff the version string starts with `v2`.
    pub fn is_v2(&self) -> bool {
        self.version.starts_with("v2")
    }

    /// The format generation.
    pub fn version(&self) -> Version {
        resolve_version(self)
    }
}

/// `V2` iff the version has the exact, case-sensitive prefix `v2`; anything else is `V1`.
pub fn resolve_version(mapping: &Mapping) -> Version {
    if mapping.is_v2() {
        Version::V2
    } else {
        Version::V1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Types,
    Parameters,
    Responses,
}

impl Section {
    fn label(self) -> &'static str {
        match self {
            Section::Types => "types",
            Section::Parameters => "parameters",
            Section::Responses => "responses",
        }
    }
}

fn normalize(entries: &[RawEntry], section: Section) -> AppResult<Vec<MappingRule>> {
    let mut rules = Vec::with_capacity(entries.len());
    for entry in entries {
        let mut rule = match entry {
            RawEntry {
                type_rule: Some(text),
                ..
            } => MappingRule::parse_type(text)?,
            RawEntry {
                from: Some(from),
                to: Some(to),
                ..
            } => MappingRule::from_parts(from, to)?,
            RawEntry {
                name: Some(name), ..
            } if section == Section::Parameters => map_entry(name, entry.to.as_deref())?,
            RawEntry {
                content: Some(content),
                ..
            } if section == Section::Responses => map_entry(content, entry.to.as_deref())?,
            _ => {
                return Err(AppError::ConfigFormat(format!(
                    "unsupported entry in '{}': {:?}",
                    section.label(),
                    entry
                )))
            }
        };
        if rule.kind != RuleKind::Annotate {
            rule.add_generics(&entry.generics)?;
        }
        rules.push(rule);
    }
    Ok(rules)
}

fn map_entry(source: &str, to: Option<&str>) -> AppResult<MappingRule> {
    match to {
        Some(to) => MappingRule::map_from_parts(source, to),
        None => MappingRule::parse_map(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V2: &str = r#"
openapi-processor-mapping: v2.1
options:
  package-name: io.example
  bean-validation: jakarta
map:
  types:
    - type: array => java.util.List
    - type: Paged => io.Page
      generics: [java.lang.String]
  parameters:
    - name: foo => java.lang.String
  responses:
    - content: application/vnd.any => java.lang.Object
  paths:
    /foo:
      types:
        - type: string:date => java.lang.String
    /skip:
      exclude: true
"#;

    #[test]
    fn test_parse_v2_document() {
        let mapping = Mapping::parse(V2).unwrap();
        assert!(mapping.is_v2());
        assert_eq!(mapping.version(), Version::V2);
        assert!(!mapping.deprecated_version_key);
        assert_eq!(mapping.options.package_name.as_deref(), Some("io.example"));
        assert_eq!(mapping.options.bean_validation, Some(BeanValidation::Jakarta));

        assert_eq!(mapping.global.types.len(), 2);
        assert_eq!(mapping.global.types[1].target_generic_types.len(), 1);
        assert_eq!(mapping.global.parameters[0].kind, RuleKind::Map);
        assert_eq!(mapping.global.parameters[0].source_type, "foo");
        assert_eq!(mapping.global.responses[0].source_type, "application/vnd.any");

        let paths: Vec<&str> = mapping.paths.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["/foo", "/skip"]);
        assert!(mapping.paths["/skip"].exclude);
        assert!(mapping.paths["/skip"].rules.is_empty());
    }

    #[test]
    fn test_deprecated_version_key() {
        let mapping = Mapping::parse("openapi-processor-spring: v2\n").unwrap();
        assert!(mapping.deprecated_version_key);
        assert!(mapping.is_v2());
    }

    #[test]
    fn test_version_detection() {
        let v1 = Mapping::parse("openapi-processor-mapping: v1\n").unwrap();
        assert!(!v1.is_v2());
        assert_eq!(resolve_version(&v1), Version::V1);

        let v21 = Mapping::parse("openapi-processor-mapping: v2.1\n").unwrap();
        assert!(v21.is_v2());
    }

    #[test]
    fn test_missing_or_unknown_version() {
        assert!(matches!(
            Mapping::parse("map: {}\n"),
            Err(AppError::ConfigFormat(_))
        ));
        assert!(matches!(
            Mapping::parse("openapi-processor-mapping: V2\n"),
            Err(AppError::ConfigFormat(_))
        ));
    }

    #[test]
    fn test_v1_structured_entries() {
        let doc = r#"
openapi-processor-spring: v1.0
options:
  bean-validation: true
map:
  types:
    - from: string:date-time
      to: java.time.ZonedDateTime
  parameters:
    - name: foo
      to: io.Foo
  responses:
    - content: application/xml
      to: io.Xml
"#;
        let mapping = Mapping::parse(doc).unwrap();
        assert!(!mapping.is_v2());
        assert_eq!(mapping.options.bean_validation, Some(BeanValidation::Javax));

        let rule = &mapping.global.types[0];
        assert_eq!(rule.kind, RuleKind::Type);
        assert_eq!(rule.source_format.as_deref(), Some("date-time"));
        assert_eq!(mapping.global.parameters[0].target_type.as_deref(), Some("io.Foo"));
        assert_eq!(mapping.global.responses[0].source_type, "application/xml");
    }

    #[test]
    fn test_unsupported_entry() {
        let doc = "openapi-processor-mapping: v2\nmap:\n  types:\n    - name: foo => io.Foo\n";
        assert!(matches!(Mapping::parse(doc), Err(AppError::ConfigFormat(_))));
    }
}
