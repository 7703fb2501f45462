//! Reference resolution
//!
//! A `$ref` is looked up in three steps: an exact hit in the resolution
//! table, a JSON pointer walked from its document's root node, then the
//! external resolver for documents the context has not seen. Each document
//! URI is handed to the resolver at most once, whatever it returns.
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use crate::context::Context;
use crate::error::{SchemaError, SchemaResult};
use crate::keyword::Keyword;
use crate::node::{NodeId, NodeKind, TreeEntry};
use percent_encoding::percent_decode_str;
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

/// Source of schema documents that are not compiled into the context
///
/// Called with the document URI (fragment removed). Returning `None`
/// means the document is unknown; the context will not ask again.
pub trait ExternalResolver {
    fn resolve(&mut self, uri: &Url) -> Option<Value>;
}

impl<F> ExternalResolver for F
where
    F: FnMut(&Url) -> Option<Value>,
{
    fn resolve(&mut self, uri: &Url) -> Option<Value> {
        self(uri)
    }
}

/// Table key for a URI; a missing fragment is treated as an empty one
pub(crate) fn table_key(uri: &Url) -> String {
    if uri.fragment().is_some() {
        uri.as_str().to_string()
    } else {
        format!("{}#", uri.as_str())
    }
}

/// The URI with its fragment removed
pub(crate) fn document_uri(uri: &Url) -> Url {
    let mut document = uri.clone();
    document.set_fragment(None);
    document
}

/// Decode one JSON pointer segment taken from a URI fragment
fn unescape_segment(segment: &str) -> String {
    percent_decode_str(segment)
        .decode_utf8_lossy()
        .replace("~1", "/")
        .replace("~0", "~")
}

/// Position reached while walking a JSON pointer through compiled nodes
enum Cursor {
    Node(NodeId),
    /// Inside a keyword whose value holds several schemas
    Keyword(NodeId, Keyword),
}

impl Context {
    /// Follow references from `id` to the first schema node
    pub(crate) fn resolve_target(&mut self, id: NodeId) -> SchemaResult<NodeId> {
        let mut current = id;
        let mut chain: Vec<NodeId> = Vec::new();

        loop {
            let node = self.node(current)?;
            let reference = match node.kind() {
                NodeKind::Schema(_) => return Ok(current),
                NodeKind::Reference(reference) => reference,
            };

            if chain.contains(&current) || chain.len() >= self.config().max_reference_chain {
                chain.push(current);
                return Err(self.circular_error(&chain));
            }
            chain.push(current);

            current = match reference.target() {
                Some(target) => target,
                None => {
                    let local = match reference.anchor() {
                        Some(root) => self.lookup_in_document(root, node.uri())?,
                        None => None,
                    };
                    let target = match local {
                        Some(target) => Some(target),
                        None => self.lookup_reference(node.uri())?,
                    };
                    let target = target.ok_or_else(|| {
                        SchemaError::unresolved_reference(reference.reference(), node.uri().as_str())
                    })?;
                    debug!(
                        reference = reference.reference(),
                        uri = %node.uri(),
                        target = %target,
                        "Resolved reference"
                    );
                    reference.cache_target(target)
                }
            };
        }
    }

    fn circular_error(&self, chain: &[NodeId]) -> SchemaError {
        let uris: Vec<String> = chain
            .iter()
            .map(|id| match self.node(*id) {
                Ok(node) => node.uri().to_string(),
                Err(_) => id.to_string(),
            })
            .collect();
        SchemaError::circular_reference(uris)
    }

    /// Resolve an empty or JSON pointer fragment against a known document root
    fn lookup_in_document(&mut self, root: NodeId, uri: &Url) -> SchemaResult<Option<NodeId>> {
        match uri.fragment() {
            None | Some("") => Ok(Some(root)),
            Some(fragment) if fragment.starts_with('/') => self.walk_pointer(root, fragment),
            Some(_) => Ok(None),
        }
    }

    /// Find the node for an absolute URI, fetching its document if needed
    pub(crate) fn lookup_reference(&mut self, uri: &Url) -> SchemaResult<Option<NodeId>> {
        if let Some(id) = self.lookup_local(uri)? {
            return Ok(Some(id));
        }
        if self.fetch_external(uri)? {
            return self.lookup_local(uri);
        }
        Ok(None)
    }

    fn lookup_local(&mut self, uri: &Url) -> SchemaResult<Option<NodeId>> {
        if let Some(id) = self.table_get(&table_key(uri)) {
            return Ok(Some(id));
        }

        let pointer = match uri.fragment() {
            Some(fragment) if fragment.starts_with('/') => fragment.to_string(),
            _ => return Ok(None),
        };
        match self.table_get(&table_key(&document_uri(uri))) {
            Some(root) => self.walk_pointer(root, &pointer),
            None => Ok(None),
        }
    }

    /// Walk a JSON pointer from a document root through the compiled tree
    ///
    /// The walk passes through references and must end on a node; raw
    /// values and keywords holding several schemas are not targets.
    pub(crate) fn walk_pointer(&mut self, root: NodeId, pointer: &str) -> SchemaResult<Option<NodeId>> {
        let mut cursor = Cursor::Node(root);

        for raw_segment in pointer.split('/').skip(1) {
            let segment = unescape_segment(raw_segment);
            cursor = match cursor {
                Cursor::Node(id) => {
                    let target = self.resolve_target(id)?;
                    let node = self.node(target)?;
                    match node.entry(&segment) {
                        Some(TreeEntry::Schema(child)) => Cursor::Node(*child),
                        Some(TreeEntry::Validator(validator)) => match validator.single_schema() {
                            Some(child) => Cursor::Node(child),
                            None => Cursor::Keyword(target, validator.keyword()),
                        },
                        Some(TreeEntry::Value(_)) | None => return Ok(None),
                    }
                }
                Cursor::Keyword(id, keyword) => {
                    let node = self.node(id)?;
                    match node.validator(keyword).and_then(|v| v.child(&segment)) {
                        Some(child) => Cursor::Node(child),
                        None => return Ok(None),
                    }
                }
            };
        }

        match cursor {
            Cursor::Node(id) => {
                trace!(pointer, node = %id, "Walked JSON pointer");
                Ok(Some(id))
            }
            Cursor::Keyword(..) => Ok(None),
        }
    }

    /// Ask the resolver for the document behind `uri` and compile it
    ///
    /// Returns whether a new document was compiled.
    fn fetch_external(&mut self, uri: &Url) -> SchemaResult<bool> {
        let document_uri = document_uri(uri);
        let key = table_key(&document_uri);
        if self.resolver_mut().is_none()
            || self.table_get(&key).is_some()
            || !self.mark_fetched(&key)
        {
            return Ok(false);
        }

        let Some(resolver) = self.resolver_mut() else {
            return Ok(false);
        };
        debug!(uri = %document_uri, "Fetching external schema document");
        let Some(document) = resolver.resolve(&document_uri) else {
            warn!(uri = %document_uri, "Resolver has no document for URI");
            return Ok(false);
        };

        let root = self.compile_external(&document, &document_uri)?;
        let mut root_uri = document_uri;
        root_uri.set_fragment(Some(""));
        self.register(&root_uri, root);
        Ok(true)
    }

    /// Compile a fetched document with its own URI as the base
    fn compile_external(&mut self, document: &Value, uri: &Url) -> SchemaResult<NodeId> {
        if self.config().validate_schema {
            self.check_meta_schema(document)?;
        }
        let mut base = uri.clone();
        base.set_fragment(Some(""));
        self.push_base(base);
        let result = self.compile_atomic(|ctx| ctx.compile_document(document, None));
        self.pop_base();
        result
    }
}
