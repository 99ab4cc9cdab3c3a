//! Rules configuration errors

use thiserror::Error;

/// Errors raised while loading or compiling a rules file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the rules file
    #[error("Failed to read rules file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse JSON
    #[error("Failed to parse rules file: {0}")]
    Parse(#[from] serde_json::Error),

    /// garde validation failed
    #[error("Invalid rules file: {0}")]
    Validation(#[from] garde::Report),

    /// A pattern does not compile
    #[error("Invalid regex '{pattern}' in {field}: {source}")]
    InvalidPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl ConfigError {
    /// Create an IO error with path context
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
