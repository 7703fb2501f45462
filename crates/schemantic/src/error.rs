//! Error types for schema compilation and reference resolution
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use crate::node::NodeId;
use crate::report::ValidationError;
use thiserror::Error;

/// Result type for compilation and resolution operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Fatal errors raised while compiling a schema or resolving its references
///
/// Instance violations are never reported through this type; they are
/// collected as [`ValidationError`] records in a report.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A `$ref` could not be satisfied by the table, a JSON pointer or the resolver
    #[error("Failed to resolve reference '{reference}' (resolved to '{uri}')")]
    UnresolvedReference { reference: String, uri: String },

    /// A chain of references loops back on itself or grows too long
    #[error("Circular reference detected: {chain}")]
    CircularReference { chain: String },

    /// A keyword value has the wrong shape for its parse routine
    #[error("Invalid value for keyword '{keyword}': {reason}")]
    InvalidKeyword { keyword: String, reason: String },

    /// A `pattern` or `patternProperties` key is not a valid regular expression
    #[error("Invalid regular expression '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// A schema position holds something other than an object
    #[error("Invalid schema at '{location}': {reason}")]
    InvalidSchema { location: String, reason: String },

    /// An `id`, `$ref` or base URI could not be parsed or merged
    #[error("Invalid URI '{uri}': {source}")]
    InvalidUri {
        uri: String,
        source: url::ParseError,
    },

    /// The schema document itself violates the meta-schema
    #[error("Schema does not conform to the meta-schema ({} violation(s))", violations.len())]
    MetaSchemaViolation { violations: Vec<ValidationError> },

    /// Validation recursed deeper than the configured limit
    #[error("Validation exceeded the maximum depth of {depth}")]
    RecursionLimit { depth: usize },

    /// A node handle does not belong to this context
    #[error("Unknown schema node {id}")]
    UnknownNode { id: NodeId },
}

impl SchemaError {
    /// Create an unresolved reference error
    pub fn unresolved_reference(reference: impl Into<String>, uri: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            reference: reference.into(),
            uri: uri.into(),
        }
    }

    /// Create a circular reference error from the URIs visited so far
    pub fn circular_reference<I, S>(chain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let chain = chain
            .into_iter()
            .map(|uri| uri.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        Self::CircularReference { chain }
    }

    /// Create a malformed keyword error
    pub fn invalid_keyword(keyword: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKeyword {
            keyword: keyword.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create an invalid schema error
    pub fn invalid_schema(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid URI error
    pub fn invalid_uri(uri: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            source,
        }
    }

    /// The reference text associated with this error, if any
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::UnresolvedReference { reference, .. } => Some(reference),
            Self::InvalidUri { uri, .. } => Some(uri),
            _ => None,
        }
    }

    /// Whether a different resolver setup could make the same schema compile
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnresolvedReference { .. })
    }
}
