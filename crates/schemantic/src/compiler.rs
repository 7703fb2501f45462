//! Schema document compilation
//!
//! Turns a JSON document into nodes in the context arena. Every node gets
//! an absolute URI: a root without `id` is identified as `<base>#`, a node
//! with `id` merges it against its parent's URI, anything else inherits
//! its parent's URI. Only the first two are registered for lookup.
//! A `$ref` into the document being compiled keeps that document's root so
//! `#` fragments resolve within it even when another root owns `<base>#`.
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use crate::context::Context;
use crate::error::{SchemaError, SchemaResult};
use crate::keyword::Keyword;
use crate::node::{NodeId, SchemaNode, TreeEntry};
use crate::resolver::document_uri;
use crate::validators::Validator;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

/// The node nested keywords are compiled under
#[derive(Debug, Clone)]
pub(crate) struct Scope {
    pub(crate) id: NodeId,
    pub(crate) uri: Url,
    /// Root node and fragment-less URI of the document being compiled
    pub(crate) root: NodeId,
    pub(crate) document: Url,
}

/// Merge a relative or absolute reference against a base URI
pub(crate) fn join_uri(base: &Url, reference: &str) -> SchemaResult<Url> {
    base.join(reference)
        .map_err(|e| SchemaError::invalid_uri(reference, e))
}

impl Context {
    /// Compile a schema nested under `scope`
    pub(crate) fn compile_child(&mut self, document: &Value, scope: &Scope) -> SchemaResult<NodeId> {
        self.compile_document(document, Some(scope))
    }

    /// Compile `document` as a root (no parent) or as a child of `parent`
    pub(crate) fn compile_document(
        &mut self,
        document: &Value,
        parent: Option<&Scope>,
    ) -> SchemaResult<NodeId> {
        let base = match parent {
            Some(scope) => scope.uri.clone(),
            None => self.current_base().clone(),
        };
        let object = document.as_object().ok_or_else(|| {
            SchemaError::invalid_schema(base.as_str(), "expected a schema object")
        })?;

        if let Some(reference) = object.get("$ref") {
            let reference = reference
                .as_str()
                .ok_or_else(|| SchemaError::invalid_keyword("$ref", "expected a URI reference string"))?;
            let uri = join_uri(&base, reference)?;
            // references into the document being compiled resolve against its own root
            let anchor = parent
                .filter(|scope| document_uri(&uri) == scope.document)
                .map(|scope| scope.root);
            trace!(reference, uri = %uri, "Compiled reference node");
            let node = SchemaNode::reference(uri, parent.map(|scope| scope.id), reference, anchor);
            return Ok(self.push_node(node));
        }

        let id = self.reserve_node();
        let uri = match object.get("id") {
            Some(Value::String(local)) => {
                let uri = join_uri(&base, local)?;
                self.register(&uri, id);
                uri
            }
            Some(_) => return Err(SchemaError::invalid_keyword("id", "expected a URI string")),
            None if parent.is_none() => {
                let uri = join_uri(&base, "#")?;
                self.register(&uri, id);
                uri
            }
            None => base,
        };

        let (root, document) = match parent {
            Some(scope) => (scope.root, scope.document.clone()),
            None => (id, document_uri(&uri)),
        };
        let scope = Scope {
            id,
            uri: uri.clone(),
            root,
            document,
        };
        let mut tree = IndexMap::with_capacity(object.len());
        for (name, value) in object {
            let entry = match Keyword::from_name(name) {
                Some(keyword) => TreeEntry::Validator(Validator::parse(self, &scope, keyword, value)?),
                None if value.is_object() => TreeEntry::Schema(self.compile_child(value, &scope)?),
                None => TreeEntry::Value(value.clone()),
            };
            tree.insert(name.clone(), entry);
        }

        if parent.is_none() {
            debug!(uri = %uri, keywords = tree.len(), "Compiled schema document");
        }
        self.fill_node(id, SchemaNode::schema(uri, parent.map(|scope| scope.id), tree));
        Ok(id)
    }

    /// Run a compilation, discarding every node and table entry it added on failure
    pub(crate) fn compile_atomic<F>(&mut self, compile: F) -> SchemaResult<NodeId>
    where
        F: FnOnce(&mut Self) -> SchemaResult<NodeId>,
    {
        let checkpoint = self.checkpoint();
        let result = compile(self);
        if let Err(e) = &result {
            debug!(error = %e, "Rolling back failed compilation");
            self.rollback(checkpoint);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_uri() {
        let base = Url::parse("http://localhost/").unwrap();
        assert_eq!(join_uri(&base, "#").unwrap().as_str(), "http://localhost/#");
        assert_eq!(
            join_uri(&base, "outer.json#foo").unwrap().as_str(),
            "http://localhost/outer.json#foo"
        );

        let nested = Url::parse("http://localhost/a/b.json#").unwrap();
        assert_eq!(
            join_uri(&nested, "c.json").unwrap().as_str(),
            "http://localhost/a/c.json"
        );
        assert_eq!(
            join_uri(&nested, "#/definitions/x").unwrap().as_str(),
            "http://localhost/a/b.json#/definitions/x"
        );
    }

    #[test]
    fn test_node_uris() {
        let mut ctx = Context::new();
        let root = ctx
            .compile(&json!({
                "properties": {
                    "a": {"type": "string"},
                    "b": {"id": "#bee", "type": "number"},
                    "c": {"$ref": "#/definitions/c"}
                },
                "definitions": {"c": {"type": "null"}}
            }))
            .unwrap();

        assert_eq!(ctx.node_uri(root).unwrap().as_str(), "http://localhost/#");
        assert!(ctx.lookup("http://localhost/#").is_some());
        assert!(ctx.lookup("http://localhost/#bee").is_some());
        assert_eq!(ctx.lookup("http://localhost/#/definitions/c"), None);
    }

    #[test]
    fn test_ref_siblings_are_ignored() {
        let mut ctx = Context::new();
        let root = ctx
            .compile(&json!({
                "definitions": {"s": {"type": "string"}},
                "properties": {"x": {"$ref": "#/definitions/s", "type": "integer"}}
            }))
            .unwrap();

        assert!(ctx.is_valid(root, &json!({"x": "text"})).unwrap());
        assert!(!ctx.is_valid(root, &json!({"x": 3})).unwrap());
    }

    #[test]
    fn test_malformed_documents() {
        let mut ctx = Context::new();
        assert!(matches!(
            ctx.compile(&json!([1, 2])).unwrap_err(),
            SchemaError::InvalidSchema { .. }
        ));
        assert!(matches!(
            ctx.compile(&json!({"$ref": 5})).unwrap_err(),
            SchemaError::InvalidKeyword { .. }
        ));
        assert!(matches!(
            ctx.compile(&json!({"minLength": "three"})).unwrap_err(),
            SchemaError::InvalidKeyword { .. }
        ));
        assert!(matches!(
            ctx.compile(&json!({"patternProperties": {"(": {}}})).unwrap_err(),
            SchemaError::InvalidPattern { .. }
        ));
        assert_eq!(ctx.node_count(), 0);
    }

    #[test]
    fn test_failed_compile_leaves_no_registrations() {
        let mut ctx = Context::new();
        let result = ctx.compile(&json!({
            "id": "http://example.com/broken.json",
            "properties": {"ok": {"id": "#ok"}, "bad": {"pattern": "["}}
        }));
        assert!(result.is_err());
        assert_eq!(ctx.lookup("http://example.com/broken.json"), None);
        assert_eq!(ctx.lookup("http://example.com/broken.json#ok"), None);

        let root = ctx
            .compile(&json!({"id": "http://example.com/broken.json", "type": "string"}))
            .unwrap();
        assert_eq!(ctx.lookup("http://example.com/broken.json"), Some(root));
    }
}
