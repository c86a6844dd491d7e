//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Every resolution error is fatal for the run: the resolver never retries and
//! never hands a partial graph to the caller. Variants that describe a schema
//! problem carry the JSON pointer of the offending node in `location`.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The mapping document has no recognizable version marker, or a rule in it
    /// cannot be parsed.
    #[from(ignore)]
    #[display("Mapping Format Error: {_0}")]
    ConfigFormat(String),

    /// The API description could not be deserialized by any backend.
    #[from(ignore)]
    #[display("Parse Error: {_0}")]
    Parse(String),

    /// A `$ref` points to a schema the parser layer cannot locate.
    #[from(ignore)]
    #[display("Unresolvable reference '{reference}' at {location}")]
    UnresolvableReference {
        /// The raw `$ref` value.
        reference: String,
        /// Pointer of the node holding the reference.
        location: String,
    },

    /// A schema has no type/format the engine knows and no rule matched it.
    #[from(ignore)]
    #[display("Unknown schema type '{schema_type}' at {location}")]
    UnknownSchemaType {
        /// The declared `type[:format]`, or `<none>`.
        schema_type: String,
        /// Pointer of the schema.
        location: String,
    },

    /// An array schema without `items`.
    #[from(ignore)]
    #[display("Missing or invalid item schema at {location}")]
    InvalidItem {
        /// Pointer of the array schema.
        location: String,
    },

    /// A non-object schema (e.g. an array) that contains itself.
    #[from(ignore)]
    #[display("Cyclic reference without an object in between at {location}")]
    CyclicReference {
        /// Pointer of the schema that was re-entered.
        location: String,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Returns the schema location carried by resolution errors.
    pub fn location(&self) -> Option<&str> {
        match self {
            AppError::UnresolvableReference { location, .. }
            | AppError::UnknownSchemaType { location, .. }
            | AppError::InvalidItem { location }
            | AppError::CyclicReference { location } => Some(location),
            _ => None,
        }
    }
}
