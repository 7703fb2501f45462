//! Resolver serving schema documents from a directory
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use crate::loader::parser::{self, Format};
use crate::resolver::ExternalResolver;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

/// Maps document URIs to files under a root directory
///
/// A URI below `base_uri` is mapped by its remaining path; `file://` URIs
/// are used as-is. Either way the file must lie inside `root`. Files
/// without a `.json`/`.yaml`/`.yml` extension are parsed as JSON.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
    base_uri: Url,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>, base_uri: Url) -> Self {
        Self {
            root: root.into(),
            base_uri,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    /// The file a URI maps to, or `None` if the URI is not served from this directory
    pub fn path_for(&self, uri: &Url) -> LoaderResult<Option<PathBuf>> {
        let relative = if uri.scheme() == "file" {
            match uri.to_file_path() {
                Ok(path) => path,
                Err(()) => return Ok(None),
            }
        } else {
            match uri.as_str().strip_prefix(self.base_uri.as_str()) {
                Some(rest) => {
                    let rest = rest.split(['#', '?']).next().unwrap_or_default();
                    if rest.is_empty() {
                        return Ok(None);
                    }
                    rest.split('/')
                        .filter(|segment| !segment.is_empty())
                        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
                        .collect::<PathBuf>()
                }
                None => return Ok(None),
            }
        };

        if relative
            .components()
            .any(|component| matches!(component, Component::ParentDir))
            || !self.is_safe_path(&relative)
        {
            return Err(LoaderError::path_traversal(uri.as_str(), self.root.clone()));
        }

        Ok(Some(if relative.is_absolute() {
            relative
        } else {
            self.root.join(relative)
        }))
    }

    /// Check that a path stays within the root directory
    pub fn is_safe_path(&self, path: &Path) -> bool {
        let full_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let Ok(canonical_root) = self.root.canonicalize() else {
            return false;
        };

        match full_path.canonicalize() {
            Ok(canonical) => canonical.starts_with(&canonical_root),
            // The file may not exist; judge by its parent directory
            Err(_) => full_path
                .parent()
                .and_then(|parent| parent.canonicalize().ok())
                .is_some_and(|parent| parent.starts_with(&canonical_root)),
        }
    }

    /// Load the document behind a URI
    pub fn load(&self, uri: &Url) -> LoaderResult<Option<Value>> {
        let Some(path) = self.path_for(uri)? else {
            return Ok(None);
        };
        if !path.is_file() {
            debug!(uri = %uri, path = %path.display(), "No schema file for URI");
            return Ok(None);
        }

        let format = Format::from_path(&path).unwrap_or(Format::Json);
        let content =
            std::fs::read_to_string(&path).map_err(|e| LoaderError::io_error(path.clone(), e))?;
        debug!(uri = %uri, path = %path.display(), "Loaded schema file");
        parser::parse_str(&content, format, &path).map(Some)
    }
}

impl ExternalResolver for DirectoryResolver {
    fn resolve(&mut self, uri: &Url) -> Option<Value> {
        match self.load(uri) {
            Ok(document) => document,
            Err(e) => {
                warn!(uri = %uri, error = %e, "Failed to load schema file");
                None
            }
        }
    }
}
