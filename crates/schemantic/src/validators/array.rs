//! Array keywords
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use super::{json_equal, Additional, Items, Validator, ValidatorKind};
use crate::compiler::Scope;
use crate::context::Context;
use crate::error::{SchemaError, SchemaResult};
use crate::keyword::Keyword;
use crate::node::SchemaNode;
use crate::report::InstancePath;
use serde_json::Value;

pub(super) fn parse_items(ctx: &mut Context, scope: &Scope, raw: &Value) -> SchemaResult<Items> {
    match raw {
        Value::Object(_) => Ok(Items::Uniform(ctx.compile_child(raw, scope)?)),
        Value::Array(schemas) => schemas
            .iter()
            .map(|schema| ctx.compile_child(schema, scope))
            .collect::<SchemaResult<Vec<_>>>()
            .map(Items::Tuple),
        _ => Err(SchemaError::invalid_keyword(
            "items",
            "expected a schema or a list of schemas",
        )),
    }
}

/// Validate list elements against `items`, consulting `additionalItems` for tuples
pub(super) fn check_items(
    ctx: &mut Context,
    node: &SchemaNode,
    items: &Items,
    list: &[Value],
    path: &InstancePath,
) -> SchemaResult<bool> {
    let schemas = match items {
        Items::Uniform(schema) => {
            let mut valid = true;
            for (index, element) in list.iter().enumerate() {
                valid &= ctx.validate_node(*schema, element, &path.child_index(index))?;
            }
            return Ok(valid);
        }
        Items::Tuple(schemas) => schemas,
    };

    let additional = node.validator(Keyword::AdditionalItems);
    let additional_kind = additional.map(Validator::kind);

    if list.len() > schemas.len() {
        if let (Some(validator), Some(ValidatorKind::AdditionalItems(Additional::Allowed(false)))) =
            (additional, additional_kind)
        {
            ctx.report(path.clone(), Keyword::AdditionalItems, validator.params().clone());
            return Ok(false);
        }
    }

    let mut valid = true;
    for (index, element) in list.iter().enumerate() {
        let schema = match (schemas.get(index), additional_kind) {
            (Some(schema), _) => *schema,
            (None, Some(ValidatorKind::AdditionalItems(Additional::Schema(schema)))) => *schema,
            (None, _) => break,
        };
        valid &= ctx.validate_node(schema, element, &path.child_index(index))?;
    }
    Ok(valid)
}

/// Pairwise check with numeric-value equality; non-lists are trivially unique
pub(super) fn all_unique(instance: &Value) -> bool {
    let Some(list) = instance.as_array() else {
        return true;
    };
    list.iter()
        .enumerate()
        .all(|(i, item)| list[i + 1..].iter().all(|other| !json_equal(item, other)))
}
