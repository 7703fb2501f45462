//! Type, enum, numeric and string keywords
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use crate::error::{SchemaError, SchemaResult};
use crate::keyword::Keyword;
use regex::Regex;
use serde_json::{Number, Value};
use std::cmp::Ordering;

pub(super) fn parse_types(raw: &Value) -> SchemaResult<Vec<String>> {
    match raw {
        Value::String(name) => Ok(vec![name.clone()]),
        Value::Array(names) => names
            .iter()
            .map(|name| {
                name.as_str().map(str::to_string).ok_or_else(|| {
                    SchemaError::invalid_keyword("type", "expected a type name or a list of type names")
                })
            })
            .collect(),
        _ => Err(SchemaError::invalid_keyword(
            "type",
            "expected a type name or a list of type names",
        )),
    }
}

pub(super) fn parse_enum(raw: &Value) -> SchemaResult<Vec<Value>> {
    raw.as_array()
        .cloned()
        .ok_or_else(|| SchemaError::invalid_keyword("enum", "expected a list of values"))
}

pub(super) fn parse_number(keyword: Keyword, raw: &Value) -> SchemaResult<Number> {
    match raw {
        Value::Number(number) => Ok(number.clone()),
        _ => Err(SchemaError::invalid_keyword(keyword.as_str(), "expected a number")),
    }
}

/// Non-negative integer bound; integral floats such as `2.0` are accepted
pub(super) fn parse_count(keyword: Keyword, raw: &Value) -> SchemaResult<u64> {
    let count = match raw {
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        _ => None,
    };
    count.ok_or_else(|| SchemaError::invalid_keyword(keyword.as_str(), "expected a non-negative integer"))
}

pub(super) fn parse_flag(keyword: Keyword, raw: &Value) -> SchemaResult<bool> {
    raw.as_bool()
        .ok_or_else(|| SchemaError::invalid_keyword(keyword.as_str(), "expected a boolean"))
}

pub(super) fn parse_pattern(raw: &Value) -> SchemaResult<Regex> {
    let pattern = raw
        .as_str()
        .ok_or_else(|| SchemaError::invalid_keyword("pattern", "expected a regular expression string"))?;
    compile_regex(pattern)
}

pub(super) fn compile_regex(pattern: &str) -> SchemaResult<Regex> {
    Regex::new(pattern).map_err(|e| SchemaError::invalid_pattern(pattern, e))
}

/// Whether the instance matches at least one of the named types
///
/// Unknown type names never match.
pub(super) fn matches_type(types: &[String], instance: &Value) -> bool {
    types.iter().any(|name| type_matches(name, instance))
}

fn type_matches(name: &str, instance: &Value) -> bool {
    match (name, instance) {
        ("null", Value::Null) => true,
        ("boolean", Value::Bool(_)) => true,
        ("string", Value::String(_)) => true,
        ("array", Value::Array(_)) => true,
        ("object", Value::Object(_)) => true,
        ("number", Value::Number(_)) => true,
        ("integer", Value::Number(number)) => number.is_i64() || number.is_u64(),
        _ => false,
    }
}

/// Structural equality where numbers compare by value, so `1` equals `1.0`
pub fn json_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b) == Some(Ordering::Equal),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| json_equal(x, y)))
        }
        _ => left == right,
    }
}

pub(super) fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y),
        _ => None,
    }
}

pub(super) fn above_minimum(instance: &Number, bound: &Number, exclusive: bool) -> bool {
    match compare_numbers(instance, bound) {
        Some(Ordering::Greater) => true,
        Some(Ordering::Equal) => !exclusive,
        _ => false,
    }
}

pub(super) fn below_maximum(instance: &Number, bound: &Number, exclusive: bool) -> bool {
    match compare_numbers(instance, bound) {
        Some(Ordering::Less) => true,
        Some(Ordering::Equal) => !exclusive,
        _ => false,
    }
}

/// A zero divisor never divides anything
pub(super) fn is_multiple_of(instance: &Number, divisor: &Number) -> bool {
    if let (Some(x), Some(y)) = (instance.as_i64(), divisor.as_i64()) {
        // i64::MIN % -1 overflows but is a multiple
        return x.checked_rem(y).map_or(y == -1, |rem| rem == 0);
    }
    if let (Some(x), Some(y)) = (instance.as_u64(), divisor.as_u64()) {
        return y != 0 && x % y == 0;
    }
    match (instance.as_f64(), divisor.as_f64()) {
        (Some(x), Some(y)) if y != 0.0 => (x % y) == 0.0,
        _ => false,
    }
}

/// Length in characters, zero for non-strings
pub(super) fn char_count(instance: &Value) -> u64 {
    instance.as_str().map_or(0, |text| text.chars().count() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn number(value: Value) -> Number {
        match value {
            Value::Number(n) => n,
            other => panic!("not a number: {other}"),
        }
    }

    #[test]
    fn test_type_names() {
        let types = vec!["integer".to_string()];
        assert!(matches_type(&types, &json!(3)));
        assert!(matches_type(&types, &json!(-3)));
        assert!(!matches_type(&types, &json!(3.5)));
        assert!(!matches_type(&types, &json!(1.0)));

        let types = vec!["string".to_string(), "null".to_string()];
        assert!(matches_type(&types, &json!("x")));
        assert!(matches_type(&types, &json!(null)));
        assert!(!matches_type(&types, &json!(false)));

        assert!(!matches_type(&["any".to_string()], &json!(1)));
    }

    #[test]
    fn test_parse_types_rejects_non_strings() {
        assert_eq!(parse_types(&json!("number")).unwrap(), vec!["number"]);
        assert!(parse_types(&json!(["number", 4])).is_err());
        assert!(parse_types(&json!(4)).is_err());
    }

    #[test]
    fn test_json_equal_compares_numbers_by_value() {
        assert!(json_equal(&json!(1), &json!(1.0)));
        assert!(json_equal(&json!({"a": [1, 2]}), &json!({"a": [1.0, 2]})));
        assert!(!json_equal(&json!([1, 2]), &json!([2, 1])));
        assert!(!json_equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(!json_equal(&json!("1"), &json!(1)));
    }

    #[test]
    fn test_bounds() {
        let ten = number(json!(10));
        assert!(below_maximum(&number(json!(10)), &ten, false));
        assert!(!below_maximum(&number(json!(10)), &ten, true));
        assert!(below_maximum(&number(json!(9.5)), &ten, true));
        assert!(above_minimum(&number(json!(10.0)), &ten, false));
        assert!(!above_minimum(&number(json!(-1)), &ten, false));
        assert!(above_minimum(&number(json!(u64::MAX)), &number(json!(-1)), true));
    }

    #[test]
    fn test_multiple_of() {
        assert!(is_multiple_of(&number(json!(10)), &number(json!(5))));
        assert!(!is_multiple_of(&number(json!(11)), &number(json!(5))));
        assert!(is_multiple_of(&number(json!(7.5)), &number(json!(2.5))));
        assert!(!is_multiple_of(&number(json!(7)), &number(json!(0))));
        assert!(is_multiple_of(&number(json!(i64::MIN)), &number(json!(-1))));
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(Keyword::MaxLength, &json!(4)).unwrap(), 4);
        assert_eq!(parse_count(Keyword::MaxLength, &json!(2.0)).unwrap(), 2);
        assert!(parse_count(Keyword::MaxLength, &json!(-1)).is_err());
        assert!(parse_count(Keyword::MaxLength, &json!(1.5)).is_err());
        assert!(parse_count(Keyword::MaxLength, &json!("3")).is_err());
    }

    #[test]
    fn test_char_count_uses_characters() {
        assert_eq!(char_count(&json!("héllo")), 5);
        assert_eq!(char_count(&json!(12345)), 0);
    }
}
