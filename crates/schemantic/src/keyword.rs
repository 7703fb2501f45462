//! Keyword registry and instance shape dispatch
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Structural category of an instance value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceKind {
    Null,
    Bool,
    Number,
    Text,
    List,
    Map,
}

impl InstanceKind {
    /// Classify a JSON value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::Text,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Map,
        }
    }
}

/// Group of instances a keyword applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordClass {
    /// Checked against every instance
    Common,
    Numeric,
    String,
    Object,
    Array,
}

impl KeywordClass {
    /// Whether keywords of this class are evaluated for the given instance kind
    pub fn applies_to(self, kind: InstanceKind) -> bool {
        match (self, kind) {
            (KeywordClass::Common, _) => true,
            (KeywordClass::Numeric, InstanceKind::Number) => true,
            (KeywordClass::String, InstanceKind::Text) => true,
            (KeywordClass::Object, InstanceKind::Map) => true,
            (KeywordClass::Array, InstanceKind::List) => true,
            _ => false,
        }
    }
}

/// Every schema keyword with a compiled validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Keyword {
    Type,
    Enum,
    Not,
    OneOf,
    AnyOf,
    AllOf,
    MultipleOf,
    Minimum,
    Maximum,
    Properties,
    PatternProperties,
    AdditionalProperties,
    MaxProperties,
    MinProperties,
    Required,
    Dependencies,
    MinLength,
    MaxLength,
    Pattern,
    Items,
    AdditionalItems,
    MinItems,
    MaxItems,
    UniqueItems,
}

impl Keyword {
    pub const ALL: [Keyword; 24] = [
        Keyword::Type,
        Keyword::Enum,
        Keyword::Not,
        Keyword::OneOf,
        Keyword::AnyOf,
        Keyword::AllOf,
        Keyword::MultipleOf,
        Keyword::Minimum,
        Keyword::Maximum,
        Keyword::Properties,
        Keyword::PatternProperties,
        Keyword::AdditionalProperties,
        Keyword::MaxProperties,
        Keyword::MinProperties,
        Keyword::Required,
        Keyword::Dependencies,
        Keyword::MinLength,
        Keyword::MaxLength,
        Keyword::Pattern,
        Keyword::Items,
        Keyword::AdditionalItems,
        Keyword::MinItems,
        Keyword::MaxItems,
        Keyword::UniqueItems,
    ];

    /// Look up a keyword by its name in a schema document
    pub fn from_name(name: &str) -> Option<Self> {
        let keyword = match name {
            "type" => Keyword::Type,
            "enum" => Keyword::Enum,
            "not" => Keyword::Not,
            "oneOf" => Keyword::OneOf,
            "anyOf" => Keyword::AnyOf,
            "allOf" => Keyword::AllOf,
            "multipleOf" => Keyword::MultipleOf,
            "minimum" => Keyword::Minimum,
            "maximum" => Keyword::Maximum,
            "properties" => Keyword::Properties,
            "patternProperties" => Keyword::PatternProperties,
            "additionalProperties" => Keyword::AdditionalProperties,
            "maxProperties" => Keyword::MaxProperties,
            "minProperties" => Keyword::MinProperties,
            "required" => Keyword::Required,
            "dependencies" => Keyword::Dependencies,
            "minLength" => Keyword::MinLength,
            "maxLength" => Keyword::MaxLength,
            "pattern" => Keyword::Pattern,
            "items" => Keyword::Items,
            "additionalItems" => Keyword::AdditionalItems,
            "minItems" => Keyword::MinItems,
            "maxItems" => Keyword::MaxItems,
            "uniqueItems" => Keyword::UniqueItems,
            _ => return None,
        };
        Some(keyword)
    }

    /// The keyword's name as written in schema documents
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Type => "type",
            Keyword::Enum => "enum",
            Keyword::Not => "not",
            Keyword::OneOf => "oneOf",
            Keyword::AnyOf => "anyOf",
            Keyword::AllOf => "allOf",
            Keyword::MultipleOf => "multipleOf",
            Keyword::Minimum => "minimum",
            Keyword::Maximum => "maximum",
            Keyword::Properties => "properties",
            Keyword::PatternProperties => "patternProperties",
            Keyword::AdditionalProperties => "additionalProperties",
            Keyword::MaxProperties => "maxProperties",
            Keyword::MinProperties => "minProperties",
            Keyword::Required => "required",
            Keyword::Dependencies => "dependencies",
            Keyword::MinLength => "minLength",
            Keyword::MaxLength => "maxLength",
            Keyword::Pattern => "pattern",
            Keyword::Items => "items",
            Keyword::AdditionalItems => "additionalItems",
            Keyword::MinItems => "minItems",
            Keyword::MaxItems => "maxItems",
            Keyword::UniqueItems => "uniqueItems",
        }
    }

    pub fn class(self) -> KeywordClass {
        match self {
            Keyword::Type
            | Keyword::Enum
            | Keyword::Not
            | Keyword::OneOf
            | Keyword::AnyOf
            | Keyword::AllOf => KeywordClass::Common,
            Keyword::MultipleOf | Keyword::Minimum | Keyword::Maximum => KeywordClass::Numeric,
            Keyword::Properties
            | Keyword::PatternProperties
            | Keyword::AdditionalProperties
            | Keyword::MaxProperties
            | Keyword::MinProperties
            | Keyword::Required
            | Keyword::Dependencies => KeywordClass::Object,
            Keyword::MinLength | Keyword::MaxLength | Keyword::Pattern => KeywordClass::String,
            Keyword::Items
            | Keyword::AdditionalItems
            | Keyword::MinItems
            | Keyword::MaxItems
            | Keyword::UniqueItems => KeywordClass::Array,
        }
    }

    /// Whether this keyword is evaluated for an instance of the given kind
    pub fn applies_to(self, kind: InstanceKind) -> bool {
        self.class().applies_to(kind)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_round_trips_every_keyword() {
        for keyword in Keyword::ALL {
            assert_eq!(Keyword::from_name(keyword.as_str()), Some(keyword));
        }
        assert_eq!(Keyword::from_name("id"), None);
        assert_eq!(Keyword::from_name("$ref"), None);
        assert_eq!(Keyword::from_name("exclusiveMinimum"), None);
        assert_eq!(Keyword::from_name("definitions"), None);
    }

    #[test]
    fn test_applicability_by_instance_kind() {
        assert!(Keyword::Type.applies_to(InstanceKind::Null));
        assert!(Keyword::OneOf.applies_to(InstanceKind::Bool));
        assert!(Keyword::Maximum.applies_to(InstanceKind::Number));
        assert!(!Keyword::Maximum.applies_to(InstanceKind::Text));
        assert!(Keyword::MaxLength.applies_to(InstanceKind::Text));
        assert!(!Keyword::MaxLength.applies_to(InstanceKind::List));
        assert!(Keyword::Required.applies_to(InstanceKind::Map));
        assert!(!Keyword::Required.applies_to(InstanceKind::List));
        assert!(Keyword::UniqueItems.applies_to(InstanceKind::List));
        assert!(!Keyword::Items.applies_to(InstanceKind::Bool));
    }

    #[test]
    fn test_instance_kind_of() {
        assert_eq!(InstanceKind::of(&json!(null)), InstanceKind::Null);
        assert_eq!(InstanceKind::of(&json!(false)), InstanceKind::Bool);
        assert_eq!(InstanceKind::of(&json!(1.5)), InstanceKind::Number);
        assert_eq!(InstanceKind::of(&json!("x")), InstanceKind::Text);
        assert_eq!(InstanceKind::of(&json!([1])), InstanceKind::List);
        assert_eq!(InstanceKind::of(&json!({})), InstanceKind::Map);
    }

    #[test]
    fn test_keyword_serializes_as_schema_name() {
        assert_eq!(serde_json::to_value(Keyword::OneOf).unwrap(), json!("oneOf"));
        assert_eq!(
            serde_json::to_value(Keyword::AdditionalProperties).unwrap(),
            json!("additionalProperties")
        );
    }
}
