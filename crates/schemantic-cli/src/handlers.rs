//! Command handlers for CLI subcommands
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

mod check;
mod completions;
mod validate;

pub use check::handle_check;
pub use completions::handle_completions;
pub use validate::handle_validate;

use crate::config::Config;
use crate::error::{Error, Result};
use schemantic::loader::{self, DirectoryResolver};
use schemantic::{Context, Url};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read a JSON or YAML document
pub(crate) fn load_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(loader::parse_file(path)?)
}

/// A context whose external references are served from the schema directory
///
/// The schema itself is identified by its path below the directory, so
/// relative `$ref`s resolve next to it.
pub(crate) fn schema_context(
    config: &Config,
    schema: &Path,
    schema_dir: Option<&Path>,
) -> Result<Context> {
    let context_config = config.context_config()?;
    let base = context_config.base_uri.clone();
    let root = schema_dir
        .map(Path::to_path_buf)
        .or_else(|| config.schema_dir.clone())
        .unwrap_or_else(|| default_schema_dir(schema));

    let document_uri = schema_uri(&base, &root, schema)?;
    debug!(
        root = %root.display(),
        uri = %document_uri,
        "Serving referenced schemas from directory"
    );

    let mut ctx = Context::with_config(context_config);
    ctx.set_resolver(DirectoryResolver::new(root, base));
    ctx.set_base_uri(document_uri.as_str())?;
    Ok(ctx)
}

fn default_schema_dir(schema: &Path) -> PathBuf {
    match schema.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// The URI a schema file is identified by below `base`
fn schema_uri(base: &Url, root: &Path, schema: &Path) -> Result<Url> {
    let relative = schema
        .strip_prefix(root)
        .ok()
        .filter(|relative| !relative.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(|| schema.file_name().map(PathBuf::from))
        .ok_or_else(|| Error::other(format!("Not a schema file: {}", schema.display())))?;

    let relative = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    base.join(&relative)
        .map_err(|e| Error::config(format!("Cannot place '{}' under '{}': {}", relative, base, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_schema_uri() {
        let base = Url::parse("http://localhost/").unwrap();
        let uri = schema_uri(&base, Path::new("schemas"), Path::new("schemas/v1/order.json"))
            .unwrap();
        assert_eq!(uri.as_str(), "http://localhost/v1/order.json");

        let uri = schema_uri(&base, Path::new("elsewhere"), Path::new("schemas/order.yaml"))
            .unwrap();
        assert_eq!(uri.as_str(), "http://localhost/order.yaml");
    }

    #[test]
    fn test_default_schema_dir() {
        assert_eq!(default_schema_dir(Path::new("order.json")), PathBuf::from("."));
        assert_eq!(
            default_schema_dir(Path::new("schemas/order.json")),
            PathBuf::from("schemas")
        );
    }

    #[test]
    fn test_load_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.yaml");
        fs::write(&path, "name: ada\n").unwrap();
        assert_eq!(load_document(&path).unwrap(), serde_json::json!({"name": "ada"}));

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_document(&missing).unwrap_err(),
            Error::FileNotFound { .. }
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{").unwrap();
        assert!(matches!(load_document(&broken).unwrap_err(), Error::Loader(_)));
    }
}
