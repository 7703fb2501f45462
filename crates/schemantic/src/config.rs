//! Context configuration
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use crate::error::{SchemaError, SchemaResult};
use url::Url;

/// Base URI used when neither the caller nor the document supplies one
pub const DEFAULT_BASE_URI: &str = "http://localhost/";

/// Default limit on nested schema evaluations for a single instance
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default limit on `$ref` hops followed before giving up
pub const DEFAULT_MAX_REFERENCE_CHAIN: usize = 32;

/// Configuration for a [`Context`](crate::Context)
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// URI that root documents without an `id` are identified against
    pub base_uri: Url,
    /// Check each compiled document against the draft-04 meta-schema
    pub validate_schema: bool,
    /// Maximum nesting of schema evaluations during validation
    pub max_depth: usize,
    /// Maximum number of references followed in a single chain
    pub max_reference_chain: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            base_uri: Url::parse(DEFAULT_BASE_URI).expect("default base URI is a valid URL"),
            validate_schema: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_reference_chain: DEFAULT_MAX_REFERENCE_CHAIN,
        }
    }
}

impl ContextConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URI from a string
    pub fn with_base_uri(mut self, uri: &str) -> SchemaResult<Self> {
        self.base_uri = Url::parse(uri).map_err(|e| SchemaError::invalid_uri(uri, e))?;
        Ok(self)
    }

    /// Enable meta-schema validation of compiled documents
    pub fn with_schema_validation(mut self) -> Self {
        self.validate_schema = true;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_reference_chain(mut self, hops: usize) -> Self {
        self.max_reference_chain = hops;
        self
    }
}
