//! Compiled schema nodes
//!
//! Nodes live in the [`Context`](crate::Context) arena and refer to each
//! other by [`NodeId`]. A node is either a schema with a keyword tree or a
//! `$ref` whose target is looked up on first use.
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use crate::keyword::Keyword;
use crate::validators::Validator;
use indexmap::IndexMap;
use serde_json::Value;
use std::cell::OnceCell;
use std::fmt;
use url::Url;

/// Handle to a compiled node inside a [`Context`](crate::Context)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Value stored under one key of a schema node
#[derive(Debug)]
pub enum TreeEntry {
    /// A recognized keyword
    Validator(Validator),
    /// An unrecognized key whose value is itself an object
    Schema(NodeId),
    /// Any other value, kept as written
    Value(Value),
}

/// `$ref` target, looked up lazily and cached
#[derive(Debug)]
pub struct Reference {
    reference: String,
    anchor: Option<NodeId>,
    target: OnceCell<NodeId>,
}

impl Reference {
    /// The `$ref` text as written in the document
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Root of the enclosing document when the reference points into it
    pub fn anchor(&self) -> Option<NodeId> {
        self.anchor
    }

    /// The node this reference resolved to, once resolved
    pub fn target(&self) -> Option<NodeId> {
        self.target.get().copied()
    }

    pub(crate) fn cache_target(&self, target: NodeId) -> NodeId {
        *self.target.get_or_init(|| target)
    }
}

#[derive(Debug)]
pub enum NodeKind {
    Schema(IndexMap<String, TreeEntry>),
    Reference(Reference),
}

#[derive(Debug)]
pub struct SchemaNode {
    uri: Url,
    parent: Option<NodeId>,
    kind: NodeKind,
}

impl SchemaNode {
    pub(crate) fn schema(uri: Url, parent: Option<NodeId>, tree: IndexMap<String, TreeEntry>) -> Self {
        Self {
            uri,
            parent,
            kind: NodeKind::Schema(tree),
        }
    }

    pub(crate) fn reference(
        uri: Url,
        parent: Option<NodeId>,
        reference: &str,
        anchor: Option<NodeId>,
    ) -> Self {
        Self {
            uri,
            parent,
            kind: NodeKind::Reference(Reference {
                reference: reference.to_string(),
                anchor,
                target: OnceCell::new(),
            }),
        }
    }

    /// Absolute URI of this node; for a reference, the URI it points at
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// The node this one was compiled under; `None` for document roots
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.kind, NodeKind::Reference(_))
    }

    pub fn entry(&self, name: &str) -> Option<&TreeEntry> {
        match &self.kind {
            NodeKind::Schema(tree) => tree.get(name),
            NodeKind::Reference(_) => None,
        }
    }

    /// The compiled validator for a keyword, if the schema declares it
    pub fn validator(&self, keyword: Keyword) -> Option<&Validator> {
        match self.entry(keyword.as_str()) {
            Some(TreeEntry::Validator(validator)) => Some(validator),
            _ => None,
        }
    }

    /// Compiled validators in document order
    pub fn validators(&self) -> impl Iterator<Item = &Validator> {
        let tree = match &self.kind {
            NodeKind::Schema(tree) => Some(tree),
            NodeKind::Reference(_) => None,
        };
        tree.into_iter().flat_map(|tree| {
            tree.values().filter_map(|entry| match entry {
                TreeEntry::Validator(validator) => Some(validator),
                _ => None,
            })
        })
    }

    /// A raw (non-keyword, non-schema) value stored under `name`
    pub fn raw_value(&self, name: &str) -> Option<&Value> {
        match self.entry(name) {
            Some(TreeEntry::Value(value)) => Some(value),
            _ => None,
        }
    }
}
