//! Draft-04 meta-schema checks for schema documents
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use crate::config::ContextConfig;
use crate::context::Context;
use crate::error::{SchemaError, SchemaResult};
use crate::node::NodeId;
use serde_json::Value;
use tracing::debug;

/// URI of the bundled meta-schema
pub const DRAFT4_META_SCHEMA_URI: &str = "http://json-schema.org/draft-04/schema#";

const DRAFT4_META_SCHEMA: &str = include_str!("meta/draft-04.json");

/// The bundled meta-schema compiled into its own context
#[derive(Debug)]
pub(crate) struct MetaSchema {
    context: Context,
    root: NodeId,
}

impl MetaSchema {
    pub(crate) fn load() -> SchemaResult<Self> {
        let document: Value = serde_json::from_str(DRAFT4_META_SCHEMA)
            .map_err(|e| SchemaError::invalid_schema(DRAFT4_META_SCHEMA_URI, e.to_string()))?;
        let mut context = Context::with_config(ContextConfig::default());
        let root = context.compile(&document)?;
        debug!(nodes = context.node_count(), "Loaded draft-04 meta-schema");
        Ok(Self { context, root })
    }

    /// Fail with every violation if `document` is not a valid schema
    pub(crate) fn check(&mut self, document: &Value) -> SchemaResult<()> {
        let report = self.context.validate(self.root, document)?;
        if report.is_valid() {
            Ok(())
        } else {
            Err(SchemaError::MetaSchemaViolation {
                violations: report.into_errors(),
            })
        }
    }
}

/// The bundled draft-04 meta-schema document
pub fn draft4_meta_schema() -> SchemaResult<Value> {
    serde_json::from_str(DRAFT4_META_SCHEMA)
        .map_err(|e| SchemaError::invalid_schema(DRAFT4_META_SCHEMA_URI, e.to_string()))
}
