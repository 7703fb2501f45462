//! JSON and YAML document parsing
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use serde_json::Value;
use std::path::Path;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> LoaderResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(LoaderError::unsupported_format(path.to_path_buf())),
        }
    }

    /// File extensions for this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Yaml => &["yaml", "yml"],
            Format::Json => &["json"],
        }
    }
}

/// Read and parse a document, detecting the format from its extension
pub fn parse_file(path: &Path) -> LoaderResult<Value> {
    let format = Format::from_path(path)?;
    let content =
        std::fs::read_to_string(path).map_err(|e| LoaderError::io_error(path.to_path_buf(), e))?;
    parse_str(&content, format, path)
}

/// Parse document text in the given format; `path` is only used in errors
pub fn parse_str(content: &str, format: Format, path: &Path) -> LoaderResult<Value> {
    match format {
        Format::Yaml => {
            let yaml_value: serde_yaml::Value = serde_yaml::from_str(content)
                .map_err(|e| LoaderError::yaml_parse_error(path.to_path_buf(), e))?;
            serde_json::to_value(yaml_value)
                .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
        }
        Format::Json => serde_json::from_str(content)
            .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path(Path::new("a.json")).unwrap(), Format::Json);
        assert_eq!(Format::from_path(Path::new("a.YAML")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("a.yml")).unwrap(), Format::Yaml);
        assert!(Format::from_path(Path::new("a.txt")).is_err());
        assert!(Format::from_path(Path::new("schema")).is_err());
        assert_eq!(Format::Yaml.extensions(), &["yaml", "yml"]);
    }

    #[test]
    fn test_parse_yaml_and_json_agree() {
        let path = Path::new("inline");
        let yaml = "type: object\nrequired: [a]\nproperties:\n  a:\n    maximum: 3\n";
        let json = r#"{"type": "object", "required": ["a"], "properties": {"a": {"maximum": 3}}}"#;

        assert_eq!(
            parse_str(yaml, Format::Yaml, path).unwrap(),
            parse_str(json, Format::Json, path).unwrap()
        );
    }

    #[test]
    fn test_parse_file() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"minItems": 2}}"#).unwrap();
        assert_eq!(parse_file(file.path()).unwrap(), json!({"minItems": 2}));

        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(file, "type: [\n").unwrap();
        assert!(matches!(
            parse_file(file.path()).unwrap_err(),
            LoaderError::YamlParseError { .. }
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_file(Path::new("/nonexistent/schema.json")).unwrap_err();
        assert!(err.is_recoverable());
    }
}
