//! Error types and handling for the CLI
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use schemantic::loader::LoaderError;
use schemantic::SchemaError;
use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Schema could not be compiled or validation could not run
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A schema or instance document could not be read or parsed
    #[error("{0}")]
    Loader(#[from] LoaderError),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more instances failed validation
    #[error("{invalid} of {total} document(s) failed validation")]
    ValidationFailed { invalid: usize, total: usize },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ValidationFailed { .. } => 1,
            Self::Schema(_) => 2,
            Self::FileNotFound { .. } => 3,
            Self::Loader(_) => 4,
            Self::Config(_) => 5,
            Self::Io(_) => 6,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Other { .. } => 99,
        }
    }

    /// Whether the error was already reported in the command's own output
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    let mut message = if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    };

    if let Error::Schema(SchemaError::MetaSchemaViolation { violations }) = error {
        for violation in violations {
            message.push_str(&format!("\n  - {}", violation));
        }
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemantic::{InstancePath, Keyword, ValidationError};
    use serde_json::json;

    #[test]
    fn test_exit_codes() {
        let failed = Error::ValidationFailed {
            invalid: 1,
            total: 2,
        };
        assert_eq!(failed.exit_code(), 1);
        assert!(failed.is_reported());

        let schema = Error::from(SchemaError::RecursionLimit { depth: 4 });
        assert_eq!(schema.exit_code(), 2);
        assert!(!schema.is_reported());

        assert_eq!(Error::config("bad").exit_code(), 5);
        assert_eq!(Error::other("oops").exit_code(), 99);
    }

    #[test]
    fn test_format_error_plain() {
        let error = Error::FileNotFound {
            path: PathBuf::from("missing.json"),
        };
        assert_eq!(format_error(&error, false), "Error: File not found: missing.json");
    }

    #[test]
    fn test_format_meta_schema_violations() {
        let error = Error::from(SchemaError::MetaSchemaViolation {
            violations: vec![ValidationError::new(
                InstancePath::root().child("type"),
                Keyword::AnyOf,
                json!([]),
            )],
        });
        let formatted = format_error(&error, false);
        assert!(formatted.starts_with("Error: Schema error: Schema does not conform"));
        assert!(formatted.contains("\n  - Validation error at '$.type'"));
    }
}
