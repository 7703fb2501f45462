//! Compilation and validation context
//!
//! The [`Context`] owns every compiled node, the URI table used to resolve
//! `$ref`, the external resolver and the violation log of the validation
//! in progress.
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use crate::config::ContextConfig;
use crate::error::{SchemaError, SchemaResult};
use crate::keyword::{InstanceKind, Keyword};
use crate::meta::MetaSchema;
use crate::node::{NodeId, SchemaNode};
use crate::report::{InstancePath, ValidationError, ValidationReport};
use crate::resolver::{table_key, ExternalResolver};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace, warn};
use url::Url;

/// Arena and table sizes to return to when a compilation fails
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    nodes: usize,
    table: usize,
}

/// Compiles schema documents and validates instances against them
///
/// # Example
///
/// ```
/// use schemantic::Context;
/// use serde_json::json;
///
/// let mut ctx = Context::new();
/// let schema = ctx.compile(&json!({"type": "integer", "maximum": 10})).unwrap();
///
/// assert!(ctx.validate(schema, &json!(7)).unwrap().is_valid());
/// let report = ctx.validate(schema, &json!(11)).unwrap();
/// assert_eq!(report.errors()[0].validator, schemantic::Keyword::Maximum);
/// ```
pub struct Context {
    config: ContextConfig,
    nodes: Vec<Option<Rc<SchemaNode>>>,
    table: IndexMap<String, NodeId>,
    base_uris: Vec<Url>,
    fetched: HashSet<String>,
    resolver: Option<Box<dyn ExternalResolver>>,
    errors: Vec<ValidationError>,
    depth: usize,
    meta: Option<Box<MetaSchema>>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("nodes", &self.nodes.len())
            .field("table", &self.table)
            .field("has_resolver", &self.resolver.is_some())
            .finish()
    }
}

impl Context {
    pub fn new() -> Self {
        Self::with_config(ContextConfig::default())
    }

    pub fn with_config(config: ContextConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            table: IndexMap::new(),
            base_uris: Vec::new(),
            fetched: HashSet::new(),
            resolver: None,
            errors: Vec::new(),
            depth: 0,
            meta: None,
        }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Install the resolver consulted for documents not compiled into this context
    pub fn set_resolver<R>(&mut self, resolver: R)
    where
        R: ExternalResolver + 'static,
    {
        self.resolver = Some(Box::new(resolver));
    }

    /// Change the URI that later root documents without `id` are identified against
    pub fn set_base_uri(&mut self, uri: &str) -> SchemaResult<()> {
        self.config.base_uri = Url::parse(uri).map_err(|e| SchemaError::invalid_uri(uri, e))?;
        Ok(())
    }

    /// Compile a root schema document
    ///
    /// Either the whole document is compiled and its identifiers registered,
    /// or nothing is added to the context.
    pub fn compile(&mut self, document: &Value) -> SchemaResult<NodeId> {
        if self.config.validate_schema {
            self.check_meta_schema(document)?;
        }
        self.compile_atomic(|ctx| ctx.compile_document(document, None))
    }

    /// Validate an instance, collecting every violation
    ///
    /// Violations are reported in the returned value; `Err` is reserved for
    /// problems with the schema itself such as an unresolvable `$ref`.
    pub fn validate(&mut self, schema: NodeId, instance: &Value) -> SchemaResult<ValidationReport> {
        self.node(schema)?;
        self.errors.clear();
        self.depth = 0;

        let result = self.validate_node(schema, instance, &InstancePath::root());
        let errors = std::mem::take(&mut self.errors);
        self.depth = 0;
        let valid = result?;

        debug!(schema = %schema, valid, violations = errors.len(), "Validated instance");
        Ok(ValidationReport::new(valid, errors))
    }

    pub fn is_valid(&mut self, schema: NodeId, instance: &Value) -> SchemaResult<bool> {
        Ok(self.validate(schema, instance)?.is_valid())
    }

    /// The absolute URI identifying a compiled node
    pub fn node_uri(&self, id: NodeId) -> SchemaResult<Url> {
        Ok(self.node(id)?.uri().clone())
    }

    /// Look up a registered URI without fetching or walking pointers
    pub fn lookup(&self, uri: &str) -> Option<NodeId> {
        let uri = Url::parse(uri).ok()?;
        self.table_get(&table_key(&uri))
    }

    /// Number of compiled nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> SchemaResult<Rc<SchemaNode>> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .cloned()
            .ok_or(SchemaError::UnknownNode { id })
    }

    // Arena and table plumbing used by the compiler and resolver

    pub(crate) fn current_base(&self) -> &Url {
        self.base_uris.last().unwrap_or(&self.config.base_uri)
    }

    pub(crate) fn push_base(&mut self, uri: Url) {
        self.base_uris.push(uri);
    }

    pub(crate) fn pop_base(&mut self) {
        self.base_uris.pop();
    }

    pub(crate) fn reserve_node(&mut self) -> NodeId {
        self.nodes.push(None);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn fill_node(&mut self, id: NodeId, node: SchemaNode) {
        if let Some(slot) = self.nodes.get_mut(id.0) {
            *slot = Some(Rc::new(node));
        }
    }

    pub(crate) fn push_node(&mut self, node: SchemaNode) -> NodeId {
        self.nodes.push(Some(Rc::new(node)));
        NodeId(self.nodes.len() - 1)
    }

    /// Register a node under its URI; the first registration wins
    pub(crate) fn register(&mut self, uri: &Url, id: NodeId) {
        let key = table_key(uri);
        match self.table.get(&key) {
            Some(existing) if *existing != id => {
                warn!(uri = %key, existing = %existing, ignored = %id, "URI already registered");
            }
            Some(_) => {}
            None => {
                trace!(uri = %key, node = %id, "Registered schema URI");
                self.table.insert(key, id);
            }
        }
    }

    pub(crate) fn table_get(&self, key: &str) -> Option<NodeId> {
        self.table.get(key).copied()
    }

    /// Record that a document URI was handed to the resolver; false if it already was
    pub(crate) fn mark_fetched(&mut self, key: &str) -> bool {
        self.fetched.insert(key.to_string())
    }

    pub(crate) fn resolver_mut(&mut self) -> Option<&mut (dyn ExternalResolver + 'static)> {
        self.resolver.as_deref_mut()
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            nodes: self.nodes.len(),
            table: self.table.len(),
        }
    }

    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        self.nodes.truncate(checkpoint.nodes);
        self.table.truncate(checkpoint.table);
    }

    pub(crate) fn check_meta_schema(&mut self, document: &Value) -> SchemaResult<()> {
        if self.meta.is_none() {
            self.meta = Some(Box::new(MetaSchema::load()?));
        }
        match self.meta.as_mut() {
            Some(meta) => meta.check(document),
            None => Ok(()),
        }
    }

    // Validation

    /// Validate an instance value against a node, following references
    pub(crate) fn validate_node(
        &mut self,
        id: NodeId,
        instance: &Value,
        path: &InstancePath,
    ) -> SchemaResult<bool> {
        if self.depth >= self.config.max_depth {
            return Err(SchemaError::RecursionLimit {
                depth: self.config.max_depth,
            });
        }
        let target = self.resolve_target(id)?;
        let node = self.node(target)?;

        self.depth += 1;
        let result = self.run_validators(&node, instance, path);
        self.depth -= 1;
        result
    }

    fn run_validators(
        &mut self,
        node: &SchemaNode,
        instance: &Value,
        path: &InstancePath,
    ) -> SchemaResult<bool> {
        let kind = InstanceKind::of(instance);
        let mut valid = true;
        let mut properties_checked = false;

        for validator in node.validators() {
            let keyword = validator.keyword();
            if !keyword.applies_to(kind) {
                continue;
            }
            // properties and patternProperties share one combined check
            if matches!(keyword, Keyword::Properties | Keyword::PatternProperties) {
                if properties_checked {
                    continue;
                }
                properties_checked = true;
            }
            valid &= validator.validate(self, node, instance, path)?;
        }
        Ok(valid)
    }

    /// Run sub-validations whose violations must not reach the log
    pub(crate) fn speculate<T, F>(&mut self, run: F) -> SchemaResult<T>
    where
        F: FnOnce(&mut Self) -> SchemaResult<T>,
    {
        let checkpoint = self.errors.len();
        let result = run(self);
        let discarded = self.errors.len().saturating_sub(checkpoint);
        if discarded > 0 {
            trace!(discarded, "Discarded speculative violations");
        }
        self.errors.truncate(checkpoint);
        result
    }

    pub(crate) fn report(&mut self, path: InstancePath, validator: Keyword, params: Value) {
        trace!(path = %path, validator = %validator, "Recorded violation");
        self.errors.push(ValidationError::new(path, validator, params));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_node() {
        let mut ctx = Context::new();
        let err = ctx.validate(NodeId(42), &json!(1)).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownNode { .. }));
    }

    #[test]
    fn test_errors_reset_between_validations() {
        let mut ctx = Context::new();
        let schema = ctx.compile(&json!({"type": "string"})).unwrap();

        assert_eq!(ctx.validate(schema, &json!(1)).unwrap().len(), 1);
        assert!(ctx.validate(schema, &json!("ok")).unwrap().is_empty());
        assert_eq!(ctx.validate(schema, &json!(null)).unwrap().len(), 1);
    }

    #[test]
    fn test_recursion_limit() {
        let mut ctx = Context::with_config(ContextConfig::default().with_max_depth(3));
        let schema = ctx
            .compile(&json!({"items": {"$ref": "#"}}))
            .unwrap();

        assert!(ctx.is_valid(schema, &json!([[1]])).unwrap());
        let err = ctx.validate(schema, &json!([[[[1]]]])).unwrap_err();
        assert!(matches!(err, SchemaError::RecursionLimit { depth: 3 }));

        // the context stays usable after the error
        assert!(ctx.is_valid(schema, &json!([])).unwrap());
    }

    #[test]
    fn test_set_base_uri() {
        let mut ctx = Context::new();
        ctx.set_base_uri("http://example.com/root.json").unwrap();
        let schema = ctx.compile(&json!({"type": "null"})).unwrap();

        assert_eq!(
            ctx.node_uri(schema).unwrap().as_str(),
            "http://example.com/root.json#"
        );
        assert_eq!(ctx.lookup("http://example.com/root.json"), Some(schema));
        assert!(ctx.set_base_uri("::").is_err());
    }

    #[test]
    fn test_first_registration_wins() {
        let mut ctx = Context::new();
        let first = ctx.compile(&json!({"id": "http://x.test/a.json", "type": "string"})).unwrap();
        let second = ctx.compile(&json!({"id": "http://x.test/a.json", "type": "integer"})).unwrap();

        assert_ne!(first, second);
        assert_eq!(ctx.lookup("http://x.test/a.json#"), Some(first));
    }

    #[test]
    fn test_anonymous_roots_resolve_their_own_fragments() {
        let mut ctx = Context::new();
        let first = ctx.compile(&json!({"type": "string"})).unwrap();
        let second = ctx
            .compile(&json!({"type": "array", "items": {"$ref": "#"}}))
            .unwrap();
        let third = ctx
            .compile(&json!({
                "properties": {"x": {"$ref": "#/definitions/n"}},
                "definitions": {"n": {"type": "null"}}
            }))
            .unwrap();

        assert_eq!(ctx.lookup("http://localhost/#"), Some(first));
        assert!(ctx.validate(second, &json!([[], [[]]])).unwrap().is_valid());
        let report = ctx.validate(second, &json!([["x"]])).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.errors()[0].validator, Keyword::Type);
        assert!(ctx.is_valid(first, &json!("still a string")).unwrap());
        assert!(ctx.is_valid(third, &json!({"x": null})).unwrap());
        assert!(!ctx.is_valid(third, &json!({"x": 1})).unwrap());
    }

    #[test]
    fn test_parent_links() {
        let mut ctx = Context::new();
        let root = ctx
            .compile(&json!({"properties": {"a": {"items": {"$ref": "#"}}}}))
            .unwrap();

        let a = ctx.walk_pointer(root, "/properties/a").unwrap().unwrap();
        let items = ctx.walk_pointer(root, "/properties/a/items").unwrap().unwrap();
        assert_eq!(ctx.node(root).unwrap().parent(), None);
        assert_eq!(ctx.node(a).unwrap().parent(), Some(root));

        let reference = ctx.node(items).unwrap();
        assert!(reference.is_reference());
        assert_eq!(reference.parent(), Some(a));
    }
}
