#![deny(missing_docs)]

//! # Resolve Command
//!
//! Resolves an API description against mapping files and prints the report.

use std::fs;
use std::path::{Path, PathBuf};

use oap_core::{resolve_api, ApiOptions, BeanValidation, Mapping};

use crate::error::{CliError, CliResult};

/// Report output format.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// YAML document.
    #[default]
    Yaml,
    /// Pretty printed JSON.
    Json,
}

/// Arguments for the resolve command.
#[derive(clap::Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Path to the OpenAPI description (3.0.x or 3.1.x, YAML or JSON).
    #[clap(long, env = "OAP_API")]
    pub api: PathBuf,

    /// Mapping files; later files take precedence.
    #[clap(long = "mapping")]
    pub mappings: Vec<PathBuf>,

    /// Root package, overrides the mapping options.
    #[clap(long)]
    pub package_name: Option<String>,

    /// Constraint annotations: false, true/javax or jakarta.
    #[clap(long)]
    pub bean_validation: Option<BeanValidation>,

    /// Suffix of generated model names.
    #[clap(long)]
    pub model_name_suffix: Option<String>,

    /// Generate marker interfaces for oneOf/anyOf.
    #[clap(long)]
    pub one_of_interface: bool,

    /// Report format.
    #[clap(long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout.
    #[clap(long, short)]
    pub output: Option<PathBuf>,
}

/// Reads and parses a mapping file.
pub fn read_mapping(path: &Path) -> CliResult<Mapping> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::General(format!("Failed to read mapping {:?}: {}", path, e))
    })?;
    Ok(Mapping::parse(&content)?)
}

/// Builds the options: mapping `options` blocks first, then command line flags.
pub fn build_options(args: &ResolveArgs) -> CliResult<ApiOptions> {
    let mut options = ApiOptions::new();
    for path in &args.mappings {
        options = options.with_mapping(read_mapping(path)?);
    }
    options.apply_mapping_options();

    if let Some(package_name) = &args.package_name {
        options.package_name = package_name.clone();
    }
    if let Some(bean_validation) = args.bean_validation {
        options.bean_validation = bean_validation;
    }
    if let Some(suffix) = &args.model_name_suffix {
        options.model_name_suffix = suffix.clone();
    }
    if args.one_of_interface {
        options.one_of_interface = true;
    }
    Ok(options)
}

/// Executes the resolution and returns the rendered report.
pub fn render(args: &ResolveArgs) -> CliResult<String> {
    if !args.api.exists() {
        return Err(CliError::General(format!(
            "OpenAPI file not found: {:?}",
            args.api
        )));
    }
    let options = build_options(args)?;
    let content = fs::read_to_string(&args.api)?;

    let api = resolve_api(&content, &options)?;
    let report = api.report();

    match args.format {
        OutputFormat::Yaml => {
            serde_yaml::to_string(&report).map_err(|e| CliError::Output(e.to_string()))
        }
        OutputFormat::Json => {
            serde_json::to_string_pretty(&report).map_err(|e| CliError::Output(e.to_string()))
        }
    }
}

/// Executes the command.
pub fn execute(args: &ResolveArgs) -> CliResult<()> {
    let rendered = render(args)?;
    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, rendered)?;
            tracing::info!(output = ?path, "wrote resolution report");
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
