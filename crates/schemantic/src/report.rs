//! Violation records and instance paths
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use crate::keyword::Keyword;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One step from a parent instance value to a child
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Location of a value inside the validated instance
///
/// Serializes as a plain array of keys and indices, displays in the
/// `$.field[0]` form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstancePath(Vec<PathSegment>);

impl InstancePath {
    /// The instance root
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path to a property of the value at this path
    pub fn child<K: Into<String>>(&self, key: K) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    /// Path to an array element of the value at this path
    pub fn child_index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a JSON Pointer (`""` for the root)
    pub fn to_pointer(&self) -> String {
        self.0
            .iter()
            .map(|segment| match segment {
                PathSegment::Key(key) => format!("/{}", key.replace('~', "~0").replace('/', "~1")),
                PathSegment::Index(index) => format!("/{}", index),
            })
            .collect()
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for InstancePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// A single failed keyword check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Where in the instance the check failed
    pub path: InstancePath,
    /// The keyword whose check failed
    pub validator: Keyword,
    /// The keyword's value as declared in the schema
    pub params: Value,
}

impl ValidationError {
    pub fn new(path: InstancePath, validator: Keyword, params: Value) -> Self {
        Self {
            path,
            validator,
            params,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Validation error at '{}': '{}' violated (expected {})",
            self.path, self.validator, self.params
        )
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of validating one instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    valid: bool,
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub(crate) fn new(valid: bool, errors: Vec<ValidationError>) -> Self {
        Self { valid, errors }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Violations in the order their validators ran
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Ok if the instance conforms, otherwise the collected violations
    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        if self.valid {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return write!(f, "Instance is valid");
        }
        write!(f, "Instance is invalid:")?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, error)?;
        }
        Ok(())
    }
}
