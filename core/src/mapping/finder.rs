//! # Rule Lookup
//!
//! Finds the rules that apply to a schema across all active mapping documents.
//!
//! Precedence:
//! - endpoint scoped rules before global rules;
//! - inside one scope, later documents and later rules win;
//! - for parameters/responses, name (`Map`) rules before type rules.
//!
//! `types` rules shape the type itself. Rules from a `parameters` or
//! `responses` section only apply where the schema is used.

use crate::mapping::config::{Mapping, RuleSet};
use crate::mapping::rule::{MappingRule, RuleKind};

/// Where the schema being resolved is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// A component or nested schema.
    Schema,
    /// The schema of the named parameter.
    Parameter(&'a str),
    /// The schema of a response with the given content type.
    Response(&'a str),
}

/// What a `Type` or `Annotate` rule can match on.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaMatch<'a> {
    /// Model name of a named schema.
    pub name: Option<&'a str>,
    /// Declared `type`.
    pub type_name: Option<&'a str>,
    /// Declared `format`.
    pub format: Option<&'a str>,
}

impl SchemaMatch<'_> {
    /// A rule matches by model name (no format) or by type with a matching or
    /// wildcard format.
    pub fn matches(&self, rule: &MappingRule) -> bool {
        let source = rule.source_type.as_str();
        if rule.source_format.is_none() && self.name == Some(source) {
            return true;
        }
        self.type_name == Some(source)
            && match &rule.source_format {
                None => true,
                Some(format) => self.format == Some(format.as_str()),
            }
    }
}

/// Lookup over an ordered list of mapping documents.
#[derive(Debug, Clone, Copy)]
pub struct MappingFinder<'a> {
    mappings: &'a [Mapping],
}

impl<'a> MappingFinder<'a> {
    /// Wraps the active mappings (earlier = lower precedence).
    pub fn new(mappings: &'a [Mapping]) -> Self {
        Self { mappings }
    }

    fn endpoint_sets(&self, path: Option<&str>) -> Vec<&'a RuleSet> {
        let Some(path) = path else {
            return Vec::new();
        };
        self.mappings
            .iter()
            .filter_map(|m| m.paths.get(path))
            .map(|p| &p.rules)
            .collect()
    }

    fn global_sets(&self) -> Vec<&'a RuleSet> {
        self.mappings.iter().map(|m| &m.global).collect()
    }

    /// Whether any document has `types` rules for the endpoint path, i.e. whether
    /// schemas resolve differently inside that endpoint.
    pub fn has_endpoint_types(&self, path: &str) -> bool {
        self.endpoint_sets(Some(path))
            .iter()
            .any(|r| !r.types.is_empty())
    }

    /// Whether the last document mentioning the path excludes it.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.mappings
            .iter()
            .rev()
            .find_map(|m| m.paths.get(path))
            .is_some_and(|p| p.exclude)
    }

    /// The `Map` rule for a parameter name or a response content type.
    pub fn find_map_rule(&self, path: Option<&str>, target: Target<'_>) -> Option<&'a MappingRule> {
        let find = |sets: Vec<&'a RuleSet>| {
            sets.into_iter()
                .flat_map(|set| section(set, target))
                .filter(|rule| rule.kind == RuleKind::Map)
                .filter(|rule| match target {
                    Target::Parameter(name) | Target::Response(name) => rule.source_type == name,
                    Target::Schema => false,
                })
                .last()
        };
        find(self.endpoint_sets(path)).or_else(|| find(self.global_sets()))
    }

    /// The `Type` rule for a schema; endpoint scope first, last match wins.
    pub fn find_type_rule(
        &self,
        path: Option<&str>,
        target: Target<'_>,
        schema: &SchemaMatch<'_>,
    ) -> Option<&'a MappingRule> {
        let find = |sets: Vec<&'a RuleSet>| {
            sets.into_iter()
                .flat_map(|set| candidates(set, target))
                .filter(|rule| rule.kind == RuleKind::Type && schema.matches(rule))
                .last()
        };
        find(self.endpoint_sets(path)).or_else(|| find(self.global_sets()))
    }

    /// The winning `Type` rule for a parameter or response schema, but only when
    /// it comes from the `parameters`/`responses` section rather than `types`.
    pub fn find_usage_type_rule(
        &self,
        path: Option<&str>,
        target: Target<'_>,
        schema: &SchemaMatch<'_>,
    ) -> Option<&'a MappingRule> {
        let rule = self.find_type_rule(path, target, schema)?;
        let plain = self.find_type_rule(path, Target::Schema, schema);
        match plain {
            Some(plain) if std::ptr::eq(plain, rule) => None,
            _ => Some(rule),
        }
    }

    /// Every matching `Annotate` rule, endpoint scope first, in declaration order.
    pub fn find_annotate_rules(
        &self,
        path: Option<&str>,
        target: Target<'_>,
        schema: &SchemaMatch<'_>,
    ) -> Vec<&'a MappingRule> {
        self.annotate_rules(path, schema, |set| candidates(set, target))
    }

    /// The matching `Annotate` rules of the `parameters`/`responses` section only.
    pub fn find_usage_annotate_rules(
        &self,
        path: Option<&str>,
        target: Target<'_>,
        schema: &SchemaMatch<'_>,
    ) -> Vec<&'a MappingRule> {
        self.annotate_rules(path, schema, |set| section(set, target).iter())
    }

    fn annotate_rules<I>(
        &self,
        path: Option<&str>,
        schema: &SchemaMatch<'_>,
        rules: impl Fn(&'a RuleSet) -> I,
    ) -> Vec<&'a MappingRule>
    where
        I: Iterator<Item = &'a MappingRule>,
    {
        let mut found: Vec<&'a MappingRule> = Vec::new();
        let sets = self
            .endpoint_sets(path)
            .into_iter()
            .chain(self.global_sets());
        for rule in sets.flat_map(rules) {
            if rule.kind == RuleKind::Annotate && schema.matches(rule) && !found.contains(&rule) {
                found.push(rule);
            }
        }
        found
    }
}

/// Type level rules of a scope: `types`, then the entries of the section the
/// target belongs to.
fn candidates<'a>(set: &'a RuleSet, target: Target<'_>) -> impl Iterator<Item = &'a MappingRule> {
    set.types.iter().chain(section(set, target))
}

/// The `parameters` or `responses` list of a scope, empty for plain schemas.
fn section<'a>(set: &'a RuleSet, target: Target<'_>) -> &'a [MappingRule] {
    match target {
        Target::Schema => Default::default(),
        Target::Parameter(_) => &set.parameters,
        Target::Response(_) => &set.responses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> Mapping {
        Mapping::parse(yaml).unwrap()
    }

    fn string_date() -> SchemaMatch<'static> {
        SchemaMatch {
            name: None,
            type_name: Some("string"),
            format: Some("date"),
        }
    }

    #[test]
    fn test_last_rule_wins_in_scope() {
        let m = mapping(
            r#"
openapi-processor-mapping: v2
map:
  types:
    - type: string:date => io.First
    - type: string:date => io.Second
"#,
        );
        let mappings = [m];
        let finder = MappingFinder::new(&mappings);
        let rule = finder
            .find_type_rule(None, Target::Schema, &string_date())
            .unwrap();
        assert_eq!(rule.target_type.as_deref(), Some("io.Second"));
    }

    #[test]
    fn test_later_document_wins() {
        let a = mapping("openapi-processor-mapping: v2\nmap:\n  types:\n    - type: string:date => io.A\n");
        let b = mapping("openapi-processor-mapping: v2\nmap:\n  types:\n    - type: string:date => io.B\n");
        let mappings = [a, b];
        let finder = MappingFinder::new(&mappings);
        let rule = finder
            .find_type_rule(None, Target::Schema, &string_date())
            .unwrap();
        assert_eq!(rule.target_type.as_deref(), Some("io.B"));
    }

    #[test]
    fn test_endpoint_scope_before_global() {
        let m = mapping(
            r#"
openapi-processor-mapping: v2
map:
  types:
    - type: string:date => io.Global
  paths:
    /foo:
      types:
        - type: string:date => io.Endpoint
"#,
        );
        let mappings = [m];
        let finder = MappingFinder::new(&mappings);

        let scoped = finder.find_type_rule(Some("/foo"), Target::Schema, &string_date());
        assert_eq!(scoped.unwrap().target_type.as_deref(), Some("io.Endpoint"));
        let other = finder.find_type_rule(Some("/bar"), Target::Schema, &string_date());
        assert_eq!(other.unwrap().target_type.as_deref(), Some("io.Global"));
        assert!(finder.has_endpoint_types("/foo"));
        assert!(!finder.has_endpoint_types("/bar"));
    }

    #[test]
    fn test_wildcard_format_and_named_rules() {
        let m = mapping(
            r#"
openapi-processor-mapping: v2
map:
  types:
    - type: string => io.AnyString
    - type: Pet => io.ExternalPet
"#,
        );
        let mappings = [m];
        let finder = MappingFinder::new(&mappings);

        let any = finder.find_type_rule(None, Target::Schema, &string_date());
        assert_eq!(any.unwrap().target_type.as_deref(), Some("io.AnyString"));

        let pet = SchemaMatch {
            name: Some("Pet"),
            type_name: Some("object"),
            format: None,
        };
        let rule = finder.find_type_rule(None, Target::Schema, &pet).unwrap();
        assert_eq!(rule.target_type.as_deref(), Some("io.ExternalPet"));
    }

    #[test]
    fn test_parameter_name_rules() {
        let m = mapping(
            r#"
openapi-processor-mapping: v2
map:
  parameters:
    - name: foo => io.Global
    - type: string:date => io.ParamDate
  paths:
    /foo:
      parameters:
        - name: foo => io.Endpoint
"#,
        );
        let mappings = [m];
        let finder = MappingFinder::new(&mappings);

        let scoped = finder.find_map_rule(Some("/foo"), Target::Parameter("foo"));
        assert_eq!(scoped.unwrap().target_type.as_deref(), Some("io.Endpoint"));
        let global = finder.find_map_rule(None, Target::Parameter("foo"));
        assert_eq!(global.unwrap().target_type.as_deref(), Some("io.Global"));
        assert!(finder.find_map_rule(None, Target::Parameter("bar")).is_none());

        let typed = finder.find_type_rule(None, Target::Parameter("bar"), &string_date());
        assert_eq!(typed.unwrap().target_type.as_deref(), Some("io.ParamDate"));
        assert!(finder
            .find_type_rule(None, Target::Schema, &string_date())
            .is_none());
    }

    #[test]
    fn test_annotate_rules_all_apply() {
        let m = mapping(
            r#"
openapi-processor-mapping: v2
map:
  types:
    - type: string @ io.First
    - type: string:date @ io.Second
    - type: string:date => io.Date
"#,
        );
        let mappings = [m];
        let finder = MappingFinder::new(&mappings);
        let rules = finder.find_annotate_rules(None, Target::Schema, &string_date());
        let names: Vec<&str> = rules
            .iter()
            .filter_map(|r| r.annotation_type.as_deref())
            .collect();
        assert_eq!(names, vec!["io.First", "io.Second"]);

        let rule = finder.find_type_rule(None, Target::Schema, &string_date());
        assert_eq!(rule.unwrap().target_type.as_deref(), Some("io.Date"));
    }

    #[test]
    fn test_exclude() {
        let m = mapping("openapi-processor-mapping: v2\nmap:\n  paths:\n    /x:\n      exclude: true\n");
        let mappings = [m];
        let finder = MappingFinder::new(&mappings);
        assert!(finder.is_excluded("/x"));
        assert!(!finder.is_excluded("/y"));
    }

    #[test]
    fn test_usage_rules_come_from_sections_only() {
        let m = mapping(
            r#"
openapi-processor-mapping: v2
map:
  types:
    - type: string:date => io.Date
    - type: string:date @ io.Everywhere
  parameters:
    - type: string:date @ io.ParamOnly
  responses:
    - type: string:date => io.ResponseDate
  paths:
    /foo:
      parameters:
        - name: since => io.Since
"#,
        );
        let mappings = [m];
        let finder = MappingFinder::new(&mappings);

        assert!(finder
            .find_usage_type_rule(None, Target::Parameter("since"), &string_date())
            .is_none());
        let response = finder.find_usage_type_rule(None, Target::Response("application/json"), &string_date());
        assert_eq!(response.unwrap().target_type.as_deref(), Some("io.ResponseDate"));

        let usage = finder.find_usage_annotate_rules(None, Target::Parameter("since"), &string_date());
        let names: Vec<&str> = usage.iter().filter_map(|r| r.annotation_type.as_deref()).collect();
        assert_eq!(names, vec!["io.ParamOnly"]);

        let plain = finder.find_annotate_rules(None, Target::Schema, &string_date());
        assert_eq!(plain.len(), 1);
        assert!(!finder.has_endpoint_types("/foo"));
    }
}
