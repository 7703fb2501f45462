//! Schema combinators: not, oneOf, anyOf, allOf
//!
//! Sub-schemas are evaluated speculatively: whatever they log is discarded
//! and only the combinator's own verdict is recorded.
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use super::Validator;
use crate::compiler::Scope;
use crate::context::Context;
use crate::error::{SchemaError, SchemaResult};
use crate::keyword::Keyword;
use crate::node::NodeId;
use crate::report::InstancePath;
use serde_json::Value;

pub(super) fn parse_schema(
    ctx: &mut Context,
    scope: &Scope,
    keyword: Keyword,
    raw: &Value,
) -> SchemaResult<NodeId> {
    if !raw.is_object() {
        return Err(SchemaError::invalid_keyword(keyword.as_str(), "expected a schema object"));
    }
    ctx.compile_child(raw, scope)
}

pub(super) fn parse_schema_list(
    ctx: &mut Context,
    scope: &Scope,
    keyword: Keyword,
    raw: &Value,
) -> SchemaResult<Vec<NodeId>> {
    let schemas = raw
        .as_array()
        .ok_or_else(|| SchemaError::invalid_keyword(keyword.as_str(), "expected a list of schemas"))?;
    schemas
        .iter()
        .map(|schema| parse_schema(ctx, scope, keyword, schema))
        .collect()
}

pub(super) fn check_not(
    ctx: &mut Context,
    validator: &Validator,
    schema: NodeId,
    instance: &Value,
    path: &InstancePath,
) -> SchemaResult<bool> {
    let inner = ctx.speculate(|ctx| ctx.validate_node(schema, instance, path))?;
    if inner {
        ctx.report(path.clone(), validator.keyword(), validator.params().clone());
    }
    Ok(!inner)
}

/// Count passing sub-schemas and let `accept(passed, total)` decide
///
/// Every sub-schema is evaluated even once the outcome is known.
pub(super) fn check_combinator<F>(
    ctx: &mut Context,
    validator: &Validator,
    schemas: &[NodeId],
    instance: &Value,
    path: &InstancePath,
    accept: F,
) -> SchemaResult<bool>
where
    F: FnOnce(usize, usize) -> bool,
{
    let passed = ctx.speculate(|ctx| {
        let mut passed = 0;
        for schema in schemas {
            if ctx.validate_node(*schema, instance, path)? {
                passed += 1;
            }
        }
        Ok(passed)
    })?;

    let ok = accept(passed, schemas.len());
    if !ok {
        ctx.report(path.clone(), validator.keyword(), validator.params().clone());
    }
    Ok(ok)
}
