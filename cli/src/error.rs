#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use oap_core::AppError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Failure reported by the resolution core.
    #[display("{}", _0)]
    Core(AppError),

    /// Report serialization failure.
    #[from(ignore)]
    #[display("Failed to write report: {}", _0)]
    Output(String),

    /// General failure message.
    #[display("Operation failed: {}", _0)]
    General(String),
}

/// Manual implementation of the standard Error trait.
///
/// `AppError` and `String` payloads are rendered through `Display`; no source
/// chain is exposed.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;
