//! Object keywords: properties, required and dependencies
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use super::{scalar, Additional, Dependency, PatternSchema, Validator, ValidatorKind};
use crate::compiler::Scope;
use crate::context::Context;
use crate::error::{SchemaError, SchemaResult};
use crate::keyword::Keyword;
use crate::node::{NodeId, SchemaNode};
use crate::report::InstancePath;
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};

fn schema_map<'a>(keyword: Keyword, raw: &'a Value) -> SchemaResult<&'a Map<String, Value>> {
    raw.as_object()
        .ok_or_else(|| SchemaError::invalid_keyword(keyword.as_str(), "expected an object of schemas"))
}

pub(super) fn parse_properties(
    ctx: &mut Context,
    scope: &Scope,
    raw: &Value,
) -> SchemaResult<IndexMap<String, NodeId>> {
    let mut properties = IndexMap::new();
    for (name, schema) in schema_map(Keyword::Properties, raw)? {
        properties.insert(name.clone(), ctx.compile_child(schema, scope)?);
    }
    Ok(properties)
}

pub(super) fn parse_pattern_properties(
    ctx: &mut Context,
    scope: &Scope,
    raw: &Value,
) -> SchemaResult<Vec<PatternSchema>> {
    let mut patterns = Vec::new();
    for (pattern, schema) in schema_map(Keyword::PatternProperties, raw)? {
        let regex = scalar::compile_regex(pattern)?;
        let schema = ctx.compile_child(schema, scope)?;
        patterns.push(PatternSchema { regex, schema });
    }
    Ok(patterns)
}

pub(super) fn parse_required(raw: &Value) -> SchemaResult<Vec<String>> {
    let invalid = || SchemaError::invalid_keyword("required", "expected a list of property names");
    raw.as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|name| name.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

pub(super) fn parse_dependencies(
    ctx: &mut Context,
    scope: &Scope,
    raw: &Value,
) -> SchemaResult<IndexMap<String, Dependency>> {
    let mut dependencies = IndexMap::new();
    for (trigger, value) in schema_map(Keyword::Dependencies, raw)? {
        let dependency = match value {
            Value::Object(_) => Dependency::Schema(ctx.compile_child(value, scope)?),
            Value::Array(names) => Dependency::Properties(
                names
                    .iter()
                    .map(|name| {
                        name.as_str().map(str::to_string).ok_or_else(|| {
                            SchemaError::invalid_keyword("dependencies", "property lists must hold strings")
                        })
                    })
                    .collect::<SchemaResult<_>>()?,
            ),
            _ => {
                return Err(SchemaError::invalid_keyword(
                    "dependencies",
                    format!("entry '{}' must be a schema or a list of property names", trigger),
                ))
            }
        };
        dependencies.insert(trigger.clone(), dependency);
    }
    Ok(dependencies)
}

/// Validate declared, pattern-matched and additional properties in one pass
///
/// Keys are consumed by `properties` first, then by every matching
/// pattern; whatever is left is governed by `additionalProperties`.
pub(super) fn check_properties(
    ctx: &mut Context,
    node: &SchemaNode,
    object: &Map<String, Value>,
    path: &InstancePath,
) -> SchemaResult<bool> {
    let mut valid = true;
    let mut pending: IndexSet<&str> = object.keys().map(String::as_str).collect();

    if let Some(ValidatorKind::Properties(declared)) = node.validator(Keyword::Properties).map(Validator::kind) {
        for (name, schema) in declared {
            if !pending.shift_remove(name.as_str()) {
                continue;
            }
            if let Some(value) = object.get(name) {
                valid &= ctx.validate_node(*schema, value, &path.child(name.as_str()))?;
            }
        }
    }

    if let Some(ValidatorKind::PatternProperties(patterns)) =
        node.validator(Keyword::PatternProperties).map(Validator::kind)
    {
        for pattern in patterns {
            let matched: Vec<&str> = pending
                .iter()
                .copied()
                .filter(|key| pattern.regex.is_match(key))
                .collect();
            for key in matched {
                pending.shift_remove(key);
                if let Some(value) = object.get(key) {
                    valid &= ctx.validate_node(pattern.schema, value, &path.child(key))?;
                }
            }
        }
    }

    match node.validator(Keyword::AdditionalProperties) {
        Some(validator) => match validator.kind() {
            ValidatorKind::AdditionalProperties(Additional::Allowed(false)) if !pending.is_empty() => {
                ctx.report(path.clone(), Keyword::AdditionalProperties, validator.params().clone());
                Ok(false)
            }
            ValidatorKind::AdditionalProperties(Additional::Schema(schema)) => {
                for key in pending {
                    if let Some(value) = object.get(key) {
                        valid &= ctx.validate_node(*schema, value, &path.child(key))?;
                    }
                }
                Ok(valid)
            }
            _ => Ok(valid),
        },
        None => Ok(valid),
    }
}

/// Check every dependency whose trigger property is present
///
/// A missing dependent property records one violation per trigger with
/// the whole `dependencies` value as params; a schema dependency
/// validates the entire instance.
pub(super) fn check_dependencies(
    ctx: &mut Context,
    validator: &Validator,
    dependencies: &IndexMap<String, Dependency>,
    instance: &Value,
    object: &Map<String, Value>,
    path: &InstancePath,
) -> SchemaResult<bool> {
    let mut valid = true;
    for (trigger, dependency) in dependencies {
        if !object.contains_key(trigger) {
            continue;
        }
        valid &= match dependency {
            Dependency::Schema(schema) => ctx.validate_node(*schema, instance, path)?,
            Dependency::Properties(names) => {
                let present = names.iter().all(|name| object.contains_key(name));
                if !present {
                    ctx.report(path.clone(), Keyword::Dependencies, validator.params().clone());
                }
                present
            }
        };
    }
    Ok(valid)
}
