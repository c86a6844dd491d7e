#![deny(missing_docs)]

//! # Check Mapping Command
//!
//! Parses mapping files and prints a short summary of each.

use std::path::PathBuf;

use oap_core::{Mapping, RuleKind};

use crate::error::CliResult;
use crate::resolve::read_mapping;

/// Arguments for the check-mapping command.
#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    /// Mapping files to validate.
    #[clap(required = true)]
    pub files: Vec<PathBuf>,
}

/// One line summary of a parsed mapping.
pub fn summary(mapping: &Mapping) -> String {
    let count = |kind: RuleKind| {
        std::iter::once(&mapping.global)
            .chain(mapping.paths.values().map(|p| &p.rules))
            .flat_map(|set| set.types.iter().chain(&set.parameters).chain(&set.responses))
            .filter(|rule| rule.kind == kind)
            .count()
    };
    let deprecated = if mapping.deprecated_version_key {
        ", deprecated version key"
    } else {
        ""
    };
    format!(
        "version {} ({:?}{}): {} type, {} map, {} annotate rules, {} paths",
        mapping.version,
        mapping.version(),
        deprecated,
        count(RuleKind::Type),
        count(RuleKind::Map),
        count(RuleKind::Annotate),
        mapping.paths.len()
    )
}

/// Executes the command; the first invalid file fails the run.
pub fn execute(args: &CheckArgs) -> CliResult<()> {
    for file in &args.files {
        let mapping = read_mapping(file)?;
        println!("{}: {}", file.display(), summary(&mapping));
    }
    Ok(())
}
