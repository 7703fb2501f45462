//! Compiled keyword validators
//!
//! Each keyword has a parse routine that turns its raw value into a
//! [`ValidatorKind`] when the schema is compiled, and a check that runs it
//! against an instance. Checks that fail append a [`ValidationError`] to
//! the context log carrying the raw keyword value as params.
//!
//! [`ValidationError`]: crate::ValidationError
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

mod array;
mod combinators;
mod object;
mod scalar;

pub use scalar::json_equal;

use crate::compiler::Scope;
use crate::context::Context;
use crate::error::{SchemaError, SchemaResult};
use crate::keyword::Keyword;
use crate::node::{NodeId, SchemaNode};
use crate::report::InstancePath;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Number, Value};

/// `additionalProperties` / `additionalItems` value
#[derive(Debug, Clone)]
pub enum Additional {
    Allowed(bool),
    Schema(NodeId),
}

/// `items` value
#[derive(Debug, Clone)]
pub enum Items {
    /// One schema for every element
    Uniform(NodeId),
    /// One schema per position
    Tuple(Vec<NodeId>),
}

/// One entry of `dependencies`
#[derive(Debug, Clone)]
pub enum Dependency {
    Properties(Vec<String>),
    Schema(NodeId),
}

/// A `patternProperties` entry
#[derive(Debug, Clone)]
pub struct PatternSchema {
    pub regex: Regex,
    pub schema: NodeId,
}

#[derive(Debug, Clone)]
pub enum ValidatorKind {
    Type(Vec<String>),
    Enum(Vec<Value>),
    Not(NodeId),
    OneOf(Vec<NodeId>),
    AnyOf(Vec<NodeId>),
    AllOf(Vec<NodeId>),
    MultipleOf(Number),
    Minimum(Number),
    Maximum(Number),
    Properties(IndexMap<String, NodeId>),
    PatternProperties(Vec<PatternSchema>),
    AdditionalProperties(Additional),
    MaxProperties(u64),
    MinProperties(u64),
    Required(Vec<String>),
    Dependencies(IndexMap<String, Dependency>),
    MinLength(u64),
    MaxLength(u64),
    Pattern(Regex),
    Items(Items),
    AdditionalItems(Additional),
    MinItems(u64),
    MaxItems(u64),
    UniqueItems(bool),
}

/// A keyword compiled from a schema object
#[derive(Debug, Clone)]
pub struct Validator {
    keyword: Keyword,
    raw: Value,
    kind: ValidatorKind,
}

impl Validator {
    /// Compile the value of `keyword`, compiling any nested schemas as children of `scope`
    pub(crate) fn parse(
        ctx: &mut Context,
        scope: &Scope,
        keyword: Keyword,
        raw: &Value,
    ) -> SchemaResult<Self> {
        let kind = match keyword {
            Keyword::Type => ValidatorKind::Type(scalar::parse_types(raw)?),
            Keyword::Enum => ValidatorKind::Enum(scalar::parse_enum(raw)?),
            Keyword::Not => ValidatorKind::Not(combinators::parse_schema(ctx, scope, keyword, raw)?),
            Keyword::OneOf => ValidatorKind::OneOf(combinators::parse_schema_list(ctx, scope, keyword, raw)?),
            Keyword::AnyOf => ValidatorKind::AnyOf(combinators::parse_schema_list(ctx, scope, keyword, raw)?),
            Keyword::AllOf => ValidatorKind::AllOf(combinators::parse_schema_list(ctx, scope, keyword, raw)?),
            Keyword::MultipleOf => ValidatorKind::MultipleOf(scalar::parse_number(keyword, raw)?),
            Keyword::Minimum => ValidatorKind::Minimum(scalar::parse_number(keyword, raw)?),
            Keyword::Maximum => ValidatorKind::Maximum(scalar::parse_number(keyword, raw)?),
            Keyword::Properties => ValidatorKind::Properties(object::parse_properties(ctx, scope, raw)?),
            Keyword::PatternProperties => {
                ValidatorKind::PatternProperties(object::parse_pattern_properties(ctx, scope, raw)?)
            }
            Keyword::AdditionalProperties => {
                ValidatorKind::AdditionalProperties(parse_additional(ctx, scope, keyword, raw)?)
            }
            Keyword::MaxProperties => ValidatorKind::MaxProperties(scalar::parse_count(keyword, raw)?),
            Keyword::MinProperties => ValidatorKind::MinProperties(scalar::parse_count(keyword, raw)?),
            Keyword::Required => ValidatorKind::Required(object::parse_required(raw)?),
            Keyword::Dependencies => {
                ValidatorKind::Dependencies(object::parse_dependencies(ctx, scope, raw)?)
            }
            Keyword::MinLength => ValidatorKind::MinLength(scalar::parse_count(keyword, raw)?),
            Keyword::MaxLength => ValidatorKind::MaxLength(scalar::parse_count(keyword, raw)?),
            Keyword::Pattern => ValidatorKind::Pattern(scalar::parse_pattern(raw)?),
            Keyword::Items => ValidatorKind::Items(array::parse_items(ctx, scope, raw)?),
            Keyword::AdditionalItems => {
                ValidatorKind::AdditionalItems(parse_additional(ctx, scope, keyword, raw)?)
            }
            Keyword::MinItems => ValidatorKind::MinItems(scalar::parse_count(keyword, raw)?),
            Keyword::MaxItems => ValidatorKind::MaxItems(scalar::parse_count(keyword, raw)?),
            Keyword::UniqueItems => ValidatorKind::UniqueItems(scalar::parse_flag(keyword, raw)?),
        };

        Ok(Self {
            keyword,
            raw: raw.clone(),
            kind,
        })
    }

    pub fn keyword(&self) -> Keyword {
        self.keyword
    }

    /// The keyword value as declared in the schema
    pub fn params(&self) -> &Value {
        &self.raw
    }

    pub fn kind(&self) -> &ValidatorKind {
        &self.kind
    }

    /// The nested schema when this keyword holds exactly one
    pub(crate) fn single_schema(&self) -> Option<NodeId> {
        match &self.kind {
            ValidatorKind::Not(schema)
            | ValidatorKind::Items(Items::Uniform(schema))
            | ValidatorKind::AdditionalProperties(Additional::Schema(schema))
            | ValidatorKind::AdditionalItems(Additional::Schema(schema)) => Some(*schema),
            _ => None,
        }
    }

    /// The nested schema addressed by one JSON pointer segment below this keyword
    pub(crate) fn child(&self, segment: &str) -> Option<NodeId> {
        let index = || segment.parse::<usize>().ok();
        match &self.kind {
            ValidatorKind::Properties(properties) => properties.get(segment).copied(),
            ValidatorKind::PatternProperties(patterns) => patterns
                .iter()
                .find(|pattern| pattern.regex.as_str() == segment)
                .map(|pattern| pattern.schema),
            ValidatorKind::OneOf(schemas)
            | ValidatorKind::AnyOf(schemas)
            | ValidatorKind::AllOf(schemas)
            | ValidatorKind::Items(Items::Tuple(schemas)) => {
                index().and_then(|i| schemas.get(i).copied())
            }
            ValidatorKind::Dependencies(dependencies) => match dependencies.get(segment) {
                Some(Dependency::Schema(schema)) => Some(*schema),
                _ => None,
            },
            _ => None,
        }
    }

    /// Run this keyword against an instance it applies to
    pub(crate) fn validate(
        &self,
        ctx: &mut Context,
        node: &SchemaNode,
        instance: &Value,
        path: &InstancePath,
    ) -> SchemaResult<bool> {
        match &self.kind {
            ValidatorKind::Type(types) => Ok(self.check(ctx, path, scalar::matches_type(types, instance))),
            ValidatorKind::Enum(allowed) => Ok(self.check(
                ctx,
                path,
                allowed.iter().any(|value| json_equal(value, instance)),
            )),
            ValidatorKind::Not(schema) => combinators::check_not(ctx, self, *schema, instance, path),
            ValidatorKind::OneOf(schemas) => {
                combinators::check_combinator(ctx, self, schemas, instance, path, |passed, _| passed == 1)
            }
            ValidatorKind::AnyOf(schemas) => {
                combinators::check_combinator(ctx, self, schemas, instance, path, |passed, _| passed > 0)
            }
            ValidatorKind::AllOf(schemas) => combinators::check_combinator(
                ctx,
                self,
                schemas,
                instance,
                path,
                |passed, total| passed == total,
            ),
            ValidatorKind::MultipleOf(divisor) => Ok(self.check_number(ctx, instance, path, |n| {
                scalar::is_multiple_of(n, divisor)
            })),
            ValidatorKind::Minimum(bound) => {
                let exclusive = node.raw_value("exclusiveMinimum") == Some(&Value::Bool(true));
                Ok(self.check_number(ctx, instance, path, |n| {
                    scalar::above_minimum(n, bound, exclusive)
                }))
            }
            ValidatorKind::Maximum(bound) => {
                let exclusive = node.raw_value("exclusiveMaximum") == Some(&Value::Bool(true));
                Ok(self.check_number(ctx, instance, path, |n| {
                    scalar::below_maximum(n, bound, exclusive)
                }))
            }
            ValidatorKind::Properties(_) | ValidatorKind::PatternProperties(_) => match instance {
                Value::Object(object) => object::check_properties(ctx, node, object, path),
                _ => Ok(true),
            },
            // Read by the properties check; never fails on its own
            ValidatorKind::AdditionalProperties(_) => Ok(true),
            ValidatorKind::MaxProperties(max) => {
                Ok(self.check(ctx, path, object_len(instance) <= *max))
            }
            ValidatorKind::MinProperties(min) => {
                Ok(self.check(ctx, path, object_len(instance) >= *min))
            }
            ValidatorKind::Required(names) => {
                let ok = match instance {
                    Value::Object(object) => names.iter().all(|name| object.contains_key(name)),
                    _ => true,
                };
                Ok(self.check(ctx, path, ok))
            }
            ValidatorKind::Dependencies(dependencies) => match instance {
                Value::Object(object) => {
                    object::check_dependencies(ctx, self, dependencies, instance, object, path)
                }
                _ => Ok(true),
            },
            ValidatorKind::MinLength(min) => {
                Ok(self.check(ctx, path, scalar::char_count(instance) >= *min))
            }
            ValidatorKind::MaxLength(max) => {
                Ok(self.check(ctx, path, scalar::char_count(instance) <= *max))
            }
            ValidatorKind::Pattern(regex) => {
                let ok = instance.as_str().map_or(true, |text| regex.is_match(text));
                Ok(self.check(ctx, path, ok))
            }
            ValidatorKind::Items(items) => match instance {
                Value::Array(list) => array::check_items(ctx, node, items, list, path),
                _ => Ok(true),
            },
            // Only meaningful next to tuple `items`, which enforces it
            ValidatorKind::AdditionalItems(_) => Ok(true),
            ValidatorKind::MinItems(min) => Ok(self.check(ctx, path, array_len(instance) >= *min)),
            ValidatorKind::MaxItems(max) => Ok(self.check(ctx, path, array_len(instance) <= *max)),
            ValidatorKind::UniqueItems(unique) => {
                let ok = !unique || array::all_unique(instance);
                Ok(self.check(ctx, path, ok))
            }
        }
    }

    /// Record a violation when `ok` is false
    fn check(&self, ctx: &mut Context, path: &InstancePath, ok: bool) -> bool {
        if !ok {
            ctx.report(path.clone(), self.keyword, self.raw.clone());
        }
        ok
    }

    fn check_number<F>(&self, ctx: &mut Context, instance: &Value, path: &InstancePath, predicate: F) -> bool
    where
        F: FnOnce(&Number) -> bool,
    {
        let ok = match instance {
            Value::Number(number) => predicate(number),
            _ => true,
        };
        self.check(ctx, path, ok)
    }
}

fn parse_additional(
    ctx: &mut Context,
    scope: &Scope,
    keyword: Keyword,
    raw: &Value,
) -> SchemaResult<Additional> {
    match raw {
        Value::Bool(allowed) => Ok(Additional::Allowed(*allowed)),
        Value::Object(_) => Ok(Additional::Schema(ctx.compile_child(raw, scope)?)),
        _ => Err(SchemaError::invalid_keyword(
            keyword.as_str(),
            "expected a boolean or a schema object",
        )),
    }
}

fn object_len(instance: &Value) -> u64 {
    instance.as_object().map_or(0, |object| object.len() as u64)
}

fn array_len(instance: &Value) -> u64 {
    instance.as_array().map_or(0, |list| list.len() as u64)
}
