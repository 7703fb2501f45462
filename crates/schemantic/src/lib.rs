//! Schemantic - JSON Schema (draft-04 style) compiler and validator
//!
//! Schema documents are compiled once into a graph of nodes owned by a
//! [`Context`]; instances are then validated against any compiled node,
//! collecting every violation rather than stopping at the first.
//!
//! ## Features
//!
//! - **Draft-04 keywords**: type, enum, combinators, numeric, string, object
//!   and array constraints
//! - **Lazy `$ref` resolution**: by `id`, by JSON pointer, or through an
//!   external resolver that is consulted at most once per document
//! - **Complete reports**: violations carry the instance path, the keyword
//!   and the keyword's declared value
//! - **Meta-schema checks**: optional validation of schema documents
//!   against the bundled draft-04 meta-schema
//!
//! ## Quick Start
//!
//! ```rust
//! use schemantic::{Context, Keyword};
//! use serde_json::json;
//!
//! let mut ctx = Context::new();
//! let schema = ctx.compile(&json!({
//!     "type": "object",
//!     "required": ["a", "b"],
//!     "properties": {"a": {"type": "integer"}}
//! })).unwrap();
//!
//! let report = ctx.validate(schema, &json!({"a": 1})).unwrap();
//! assert!(!report.is_valid());
//! assert_eq!(report.errors()[0].validator, Keyword::Required);
//! assert_eq!(report.errors()[0].params, json!(["a", "b"]));
//! ```
//!
//! ## External documents
//!
//! ```rust
//! use schemantic::Context;
//! use serde_json::json;
//! use url::Url;
//!
//! let mut ctx = Context::new();
//! ctx.set_resolver(|uri: &Url| match uri.as_str() {
//!     "http://localhost/name.json" => Some(json!({"type": "string", "minLength": 1})),
//!     _ => None,
//! });
//!
//! let schema = ctx.compile(&json!({"items": {"$ref": "name.json"}})).unwrap();
//! assert!(ctx.is_valid(schema, &json!(["ada", "grace"])).unwrap());
//! assert!(!ctx.is_valid(schema, &json!(["ada", ""])).unwrap());
//! ```
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

mod compiler;
pub mod config;
mod context;
pub mod error;
pub mod keyword;
pub mod loader;
mod meta;
pub mod node;
pub mod report;
mod resolver;
pub mod validators;

pub use config::{ContextConfig, DEFAULT_BASE_URI};
pub use context::Context;
pub use error::{SchemaError, SchemaResult};
pub use keyword::{InstanceKind, Keyword, KeywordClass};
pub use meta::{draft4_meta_schema, DRAFT4_META_SCHEMA_URI};
pub use node::NodeId;
pub use report::{InstancePath, PathSegment, ValidationError, ValidationReport};
pub use resolver::ExternalResolver;
pub use url::Url;

use serde_json::Value;

/// Compile `schema` into a fresh [`Context`] and validate `instance` against it
///
/// References must resolve within `schema` itself.
pub fn validate(schema: &Value, instance: &Value) -> SchemaResult<ValidationReport> {
    let mut ctx = Context::new();
    let root = ctx.compile(schema)?;
    ctx.validate(root, instance)
}
