//! # Mapping Document Shape
//!
//! Raw serde view of a mapping YAML document, before rule strings are parsed.
//! The version marker is read separately (see [`super::config::VERSION_KEYS`]).

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Root of the document (version key excluded).
#[derive(Debug, Deserialize, Default)]
pub struct RawDocument {
    /// `options` block.
    #[serde(default)]
    pub options: RawOptions,
    /// `map` block.
    #[serde(default)]
    pub map: RawMap,
}

/// `options` block.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct RawOptions {
    /// `package-name`
    pub package_name: Option<String>,
    /// `bean-validation`: a boolean or `javax` / `jakarta`.
    pub bean_validation: Option<Value>,
    /// `model-name-suffix`
    pub model_name_suffix: Option<String>,
    /// `one-of-interface`
    pub one_of_interface: Option<bool>,
}

/// `map` block.
#[derive(Debug, Deserialize, Default)]
pub struct RawMap {
    /// Global type rules.
    #[serde(default)]
    pub types: Vec<RawEntry>,
    /// Global parameter rules.
    #[serde(default)]
    pub parameters: Vec<RawEntry>,
    /// Global response rules.
    #[serde(default)]
    pub responses: Vec<RawEntry>,
    /// Endpoint scoped rules by path.
    #[serde(default)]
    pub paths: IndexMap<String, RawPath>,
}

/// Rules of one endpoint path.
#[derive(Debug, Deserialize, Default)]
pub struct RawPath {
    /// Skip the endpoint entirely.
    #[serde(default)]
    pub exclude: bool,
    /// Type rules.
    #[serde(default)]
    pub types: Vec<RawEntry>,
    /// Parameter rules.
    #[serde(default)]
    pub parameters: Vec<RawEntry>,
    /// Response rules.
    #[serde(default)]
    pub responses: Vec<RawEntry>,
}

/// One rule entry, either the one-line form (`type:`, `name:`, `content:`) or
/// the structured form (`from`/`name`/`content` + `to`).
#[derive(Debug, Deserialize, Default)]
pub struct RawEntry {
    /// `type: source => target`
    #[serde(rename = "type")]
    pub type_rule: Option<String>,
    /// Parameter name rule.
    pub name: Option<String>,
    /// Response content type rule.
    pub content: Option<String>,
    /// Structured source `type[:format]`.
    pub from: Option<String>,
    /// Structured target.
    pub to: Option<String>,
    /// Extra generic arguments of the target.
    #[serde(default)]
    pub generics: Vec<String>,
}
