//! Error types for the rewriter

use thiserror::Error;

use crate::parser::semantic_validator::ValidationError;
use crate::parser::ParseError;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{}", describe_validation(.0))]
    Validation(Vec<ValidationError>),

    /// A built-in code template failed to parse
    #[error("template '{name}' is invalid: {source}")]
    Template {
        name: String,
        #[source]
        source: ParseError,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

fn describe_validation(errors: &[ValidationError]) -> String {
    match errors {
        [] => "validation failed".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for RewriteError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Invalid(message) => RewriteError::InvalidConfig(message),
            other => RewriteError::InvalidConfig(other.to_string()),
        }
    }
}
