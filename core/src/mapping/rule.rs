//! # Mapping Rules
//!
//! A single override rule and the parser for its one-line text form:
//!
//! ```text
//! string:date-time => java.time.ZonedDateTime
//! Wrapped => io.Wrapper<java.lang.String, {package-name}.model.Foo>
//! string:uuid @ io.Ann(value = "x", kind = io.Kind.class)
//! ```

use crate::error::{AppError, AppResult};
use crate::model::ParameterValue;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

/// What a rule does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Replaces the type of a matching schema.
    Type,
    /// Replaces the type of a parameter (by name) or a response (by content type).
    Map,
    /// Adds an annotation and leaves the type alone.
    Annotate,
}

/// A rule level target type with its (possibly nested) generic arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingType {
    /// Fully qualified target name, may contain `{package-name}`.
    pub target_type: String,
    /// Generic arguments in order.
    pub generics: Vec<MappingType>,
}

impl MappingType {
    /// A target without generics.
    pub fn new(target_type: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            generics: Vec::new(),
        }
    }
}

/// One override rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRule {
    /// Rule kind.
    pub kind: RuleKind,
    /// Schema type, schema name, parameter name or content type.
    pub source_type: String,
    /// Schema format; `None` matches any format.
    pub source_format: Option<String>,
    /// Target of `Type`/`Map` rules.
    pub target_type: Option<String>,
    /// The target is a language primitive (`int`, `byte`, ...).
    pub target_type_primitive: bool,
    /// The target carries a `[]` suffix.
    pub target_type_primitive_array: bool,
    /// Generic arguments of the target.
    pub target_generic_types: Vec<MappingType>,
    /// Annotation of `Annotate` rules.
    pub annotation_type: Option<String>,
    /// Annotation arguments in emission order.
    pub annotation_parameters: IndexMap<String, ParameterValue>,
}

impl MappingRule {
    fn empty(kind: RuleKind, source_type: String, source_format: Option<String>) -> Self {
        Self {
            kind,
            source_type,
            source_format,
            target_type: None,
            target_type_primitive: false,
            target_type_primitive_array: false,
            target_generic_types: Vec::new(),
            annotation_type: None,
            annotation_parameters: IndexMap::new(),
        }
    }

    /// Parses a `types` entry: `source[:format] => target` or `source[:format] @ annotation`.
    pub fn parse_type(text: &str) -> AppResult<Self> {
        let (source, body, annotate) = split_rule(text)?;
        let (source_type, source_format) = parse_source(source, text)?;
        if annotate {
            let mut rule = Self::empty(RuleKind::Annotate, source_type, source_format);
            let (annotation, parameters) = parse_annotation(body, text)?;
            rule.annotation_type = Some(annotation);
            rule.annotation_parameters = parameters;
            Ok(rule)
        } else {
            let mut rule = Self::empty(RuleKind::Type, source_type, source_format);
            rule.set_target(body, text)?;
            Ok(rule)
        }
    }

    /// Parses a name keyed entry (`name:` or `content:`): `source => target`.
    pub fn parse_map(text: &str) -> AppResult<Self> {
        let (source, body, annotate) = split_rule(text)?;
        if annotate {
            return Err(AppError::ConfigFormat(format!(
                "annotation rules are only supported for types: '{}'",
                text
            )));
        }
        let source = source.trim();
        if source.is_empty() {
            return Err(AppError::ConfigFormat(format!("missing source in '{}'", text)));
        }
        let mut rule = Self::empty(RuleKind::Map, source.to_string(), None);
        rule.set_target(body, text)?;
        Ok(rule)
    }

    /// Builds a `Type` rule from the structured `from`/`to` form.
    pub fn from_parts(from: &str, to: &str) -> AppResult<Self> {
        let (source_type, source_format) = parse_source(from, from)?;
        let mut rule = Self::empty(RuleKind::Type, source_type, source_format);
        rule.set_target(to, to)?;
        Ok(rule)
    }

    /// Builds a `Map` rule from the structured `name`/`content` + `to` form.
    pub fn map_from_parts(source: &str, to: &str) -> AppResult<Self> {
        let mut rule = Self::empty(RuleKind::Map, source.trim().to_string(), None);
        rule.set_target(to, to)?;
        Ok(rule)
    }

    /// Appends generic arguments given as a separate list.
    pub fn add_generics(&mut self, generics: &[String]) -> AppResult<()> {
        for generic in generics {
            let (target, _) = parse_target(generic)?;
            self.target_generic_types.push(target);
        }
        Ok(())
    }

    fn set_target(&mut self, body: &str, text: &str) -> AppResult<()> {
        let (target, array) = parse_target(body).map_err(|_| {
            AppError::ConfigFormat(format!("invalid target type in '{}'", text))
        })?;
        self.target_type_primitive = is_java_primitive(&target.target_type);
        self.target_type_primitive_array = array;
        self.target_type = Some(target.target_type);
        self.target_generic_types = target.generics;
        Ok(())
    }
}

fn is_java_primitive(name: &str) -> bool {
    matches!(
        name,
        "byte" | "short" | "int" | "long" | "float" | "double" | "boolean" | "char"
    )
}

/// Splits into `(source, body, is_annotation)` on whichever of `=>` / `@` comes first.
fn split_rule(text: &str) -> AppResult<(&str, &str, bool)> {
    let arrow = text.find("=>");
    let at = text.find('@');
    match (arrow, at) {
        (Some(a), Some(b)) if b < a => Ok((&text[..b], &text[b + 1..], true)),
        (Some(a), _) => Ok((&text[..a], &text[a + 2..], false)),
        (None, Some(b)) => Ok((&text[..b], &text[b + 1..], true)),
        (None, None) => Err(AppError::ConfigFormat(format!(
            "expected '=>' or '@' in mapping '{}'",
            text
        ))),
    }
}

fn parse_source(source: &str, text: &str) -> AppResult<(String, Option<String>)> {
    static SOURCE_RE: OnceLock<Regex> = OnceLock::new();
    let source_re = SOURCE_RE.get_or_init(|| {
        Regex::new(r"^\s*([^\s:]+)(?:\s*:\s*(\S+))?\s*$").expect("Invalid regex")
    });

    let caps = source_re
        .captures(source)
        .ok_or_else(|| AppError::ConfigFormat(format!("invalid source in '{}'", text)))?;
    let source_type = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
    let source_format = caps.get(2).map(|m| m.as_str().to_string());
    Ok((source_type, source_format))
}

/// Parses `qualified [<target, ...>] [[]]`. Returns the target and whether the
/// top level carried `[]`.
pub fn parse_target(text: &str) -> AppResult<(MappingType, bool)> {
    let mut parser = TargetParser { rest: text };
    let mut target = parser.target()?;
    parser.skip_ws();
    if !parser.rest.is_empty() {
        return Err(AppError::ConfigFormat(format!(
            "unexpected '{}' in target '{}'",
            parser.rest, text
        )));
    }
    let array = match target.target_type.strip_suffix("[]") {
        Some(stripped) => {
            target.target_type = stripped.to_string();
            true
        }
        None => false,
    };
    Ok((target, array))
}

struct TargetParser<'a> {
    rest: &'a str,
}

impl TargetParser<'_> {
    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        match self.rest.strip_prefix(token) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn qualified(&mut self) -> AppResult<String> {
        static QUALIFIED_RE: OnceLock<Regex> = OnceLock::new();
        let qualified_re = QUALIFIED_RE.get_or_init(|| {
            Regex::new(r"^[A-Za-z_$?{][A-Za-z0-9_$.{}?\-]*").expect("Invalid regex")
        });

        self.skip_ws();
        let m = qualified_re
            .find(self.rest)
            .ok_or_else(|| AppError::ConfigFormat(format!("expected a type at '{}'", self.rest)))?;
        let name = m.as_str().to_string();
        self.rest = &self.rest[m.end()..];
        Ok(name)
    }

    fn target(&mut self) -> AppResult<MappingType> {
        let mut target_type = self.qualified()?;
        let mut generics = Vec::new();

        if self.eat("<") {
            loop {
                generics.push(self.target()?);
                if self.eat(",") {
                    continue;
                }
                if self.eat(">") {
                    break;
                }
                return Err(AppError::ConfigFormat(format!(
                    "expected ',' or '>' at '{}'",
                    self.rest
                )));
            }
        }
        if self.eat("[]") {
            target_type.push_str("[]");
        }

        Ok(MappingType {
            target_type,
            generics,
        })
    }
}

/// Parses `qualified [( [value | name = value {, name = value}] )]`.
fn parse_annotation(
    body: &str,
    text: &str,
) -> AppResult<(String, IndexMap<String, ParameterValue>)> {
    static ANNOTATION_RE: OnceLock<Regex> = OnceLock::new();
    let annotation_re = ANNOTATION_RE.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z_$][A-Za-z0-9_$.]*)\s*(?:\((.*)\))?\s*$").expect("Invalid regex")
    });

    let caps = annotation_re
        .captures(body)
        .ok_or_else(|| AppError::ConfigFormat(format!("invalid annotation in '{}'", text)))?;
    let annotation_type = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();

    let mut parameters = IndexMap::new();
    let args = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
    if args.is_empty() {
        return Ok((annotation_type, parameters));
    }

    let parts = split_top_level(args);
    for part in &parts {
        let (name, value) = match split_assignment(part) {
            Some((name, value)) => (name.trim().to_string(), value.trim()),
            None if parts.len() == 1 => ("value".to_string(), part.trim()),
            None => {
                return Err(AppError::ConfigFormat(format!(
                    "annotation parameter without a name in '{}'",
                    text
                )))
            }
        };
        parameters.insert(name, parse_value(value, text)?);
    }

    Ok((annotation_type, parameters))
}

/// Splits on commas outside of string literals.
fn split_top_level(args: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in args.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            ',' if !in_string => {
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    parts.push(current);
    parts
}

/// Splits `name = value` on the first `=` outside of a string literal.
fn split_assignment(part: &str) -> Option<(&str, &str)> {
    let quote = part.find('"').unwrap_or(part.len());
    let eq = part.find('=')?;
    if eq < quote {
        Some((&part[..eq], &part[eq + 1..]))
    } else {
        None
    }
}

fn parse_value(value: &str, text: &str) -> AppResult<ParameterValue> {
    static STRING_RE: OnceLock<Regex> = OnceLock::new();
    let string_re =
        STRING_RE.get_or_init(|| Regex::new(r#"^"(?:[^"\\]|\\.)*"$"#).expect("Invalid regex"));

    static NUMBER_RE: OnceLock<Regex> = OnceLock::new();
    let number_re =
        NUMBER_RE.get_or_init(|| Regex::new(r"^-?\d+(?:\.\d+)?$").expect("Invalid regex"));

    static CLASS_RE: OnceLock<Regex> = OnceLock::new();
    let class_re = CLASS_RE
        .get_or_init(|| Regex::new(r"^([A-Za-z_$][A-Za-z0-9_$.]*)\.class$").expect("Invalid regex"));

    if string_re.is_match(value)
        || number_re.is_match(value)
        || value == "true"
        || value == "false"
    {
        return Ok(ParameterValue::new(value));
    }
    if let Some(caps) = class_re.captures(value) {
        let class = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let simple = class.rsplit('.').next().unwrap_or(class);
        return Ok(ParameterValue::with_import(format!("{}.class", simple), class));
    }
    Err(AppError::ConfigFormat(format!(
        "invalid annotation parameter value '{}' in '{}'",
        value, text
    )))
}
