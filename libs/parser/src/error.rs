//! Error types for the Newton parser

use crate::token::SourceLocation;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while lexing, parsing or propagating dimensions.
///
/// Every variant produced from source text carries the location of the
/// offending token.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Lex error at {location}: {message}")]
    Lex {
        message: String,
        location: SourceLocation,
    },

    #[error("Parse error at {location}: expected {expected}, found {found}")]
    Syntax {
        expected: String,
        found: String,
        location: SourceLocation,
    },

    #[error("Unknown identifier '{name}' at {location}")]
    UnknownIdentifier {
        name: String,
        location: SourceLocation,
    },

    #[error("Identifier '{name}' at {location} is not a constant")]
    NotConstant {
        name: String,
        location: SourceLocation,
    },

    #[error("Identifier '{name}' at {location} has dimensions '{dimensions}' where a dimensionless value is required")]
    NotDimensionless {
        name: String,
        dimensions: String,
        location: SourceLocation,
    },

    #[error("Expression too deeply nested (max depth: {0})")]
    TooDeep(usize),

    #[error("Dimension error at {location}: {source}")]
    Dimension {
        #[source]
        source: newton_physics::Error,
        location: SourceLocation,
    },

    #[error("Scope configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            Error::Lex { location, .. }
            | Error::Syntax { location, .. }
            | Error::UnknownIdentifier { location, .. }
            | Error::NotConstant { location, .. }
            | Error::NotDimensionless { location, .. }
            | Error::Dimension { location, .. } => Some(*location),
            Error::TooDeep(_) | Error::Config(_) => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
