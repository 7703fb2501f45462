//! Reference resolution tests
//!
//! Covers `id` scopes, JSON pointers, recursion, external documents and
//! the resolver call discipline.

use schemantic::loader::DirectoryResolver;
use schemantic::{Context, ContextConfig, Keyword, SchemaError, Url};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Resolver answering from a fixed table and counting calls per URI
fn counting_resolver(
    documents: Vec<(&'static str, Value)>,
) -> (impl FnMut(&Url) -> Option<Value>, Rc<RefCell<Vec<String>>>) {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&calls);
    let resolver = move |uri: &Url| -> Option<Value> {
        seen.borrow_mut().push(uri.to_string());
        documents
            .iter()
            .find(|(name, _)| *name == uri.as_str())
            .map(|(_, document)| document.clone())
    };
    (resolver, calls)
}

#[cfg(test)]
mod scopes {
    use super::*;

    fn schema() -> Value {
        json!({
            "definitions": {
                "int": {"type": "integer"},
                "str": {"id": "#str", "type": "string"}
            },
            "properties": {
                "a": {"$ref": "#/definitions/int"},
                "b": {"$ref": "#str"}
            }
        })
    }

    #[test]
    fn test_pointer_and_id_references() {
        let mut ctx = Context::new();
        let root = ctx.compile(&schema()).unwrap();

        assert!(ctx.is_valid(root, &json!({})).unwrap());
        assert!(ctx.is_valid(root, &json!({"a": 1, "b": "foo"})).unwrap());
        assert!(!ctx.is_valid(root, &json!({"a": "foo"})).unwrap());
        assert!(!ctx.is_valid(root, &json!({"b": 123})).unwrap());
    }

    #[test]
    fn test_reference_violations_point_at_instance() {
        let mut ctx = Context::new();
        let root = ctx.compile(&schema()).unwrap();

        let report = ctx.validate(root, &json!({"a": "foo"})).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.errors()[0].path.to_string(), "$.a");
        assert_eq!(report.errors()[0].validator, Keyword::Type);
    }

    #[test]
    fn test_nested_id_changes_resolution_scope() {
        let mut ctx = Context::new();
        let root = ctx
            .compile(&json!({
                "id": "http://example.com/root.json",
                "definitions": {
                    "nested": {
                        "id": "nested/",
                        "definitions": {"leaf": {"id": "leaf.json", "type": "boolean"}},
                        "properties": {"flag": {"$ref": "leaf.json"}}
                    }
                },
                "properties": {"inner": {"$ref": "nested/"}}
            }))
            .unwrap();

        assert!(ctx.lookup("http://example.com/nested/leaf.json").is_some());
        assert!(ctx.is_valid(root, &json!({"inner": {"flag": true}})).unwrap());
        assert!(!ctx.is_valid(root, &json!({"inner": {"flag": "yes"}})).unwrap());
    }

    #[test]
    fn test_pointer_through_keyword_containers() {
        let mut ctx = Context::new();
        let root = ctx
            .compile(&json!({
                "properties": {
                    "name": {"type": "string", "maxLength": 3},
                    "alias": {"$ref": "#/properties/name"},
                    "first": {"$ref": "#/items/0"},
                    "choice": {"$ref": "#/anyOf/1/not"}
                },
                "items": [{"type": "integer"}],
                "anyOf": [{}, {"not": {"type": "null"}}]
            }))
            .unwrap();

        assert!(ctx.is_valid(root, &json!({"alias": "abc", "first": 1, "choice": 0})).unwrap());
        assert!(!ctx.is_valid(root, &json!({"alias": "abcd"})).unwrap());
        assert!(!ctx.is_valid(root, &json!({"first": "one"})).unwrap());
        assert!(!ctx.is_valid(root, &json!({"choice": null})).unwrap());
    }

    #[test]
    fn test_escaped_pointer_segments() {
        let mut ctx = Context::new();
        let root = ctx
            .compile(&json!({
                "definitions": {"a/b": {"type": "integer"}, "m~n": {"type": "string"}},
                "properties": {
                    "x": {"$ref": "#/definitions/a~1b"},
                    "y": {"$ref": "#/definitions/m~0n"}
                }
            }))
            .unwrap();

        assert!(ctx.is_valid(root, &json!({"x": 1, "y": "s"})).unwrap());
        assert!(!ctx.is_valid(root, &json!({"x": "1"})).unwrap());
        assert!(!ctx.is_valid(root, &json!({"y": 2})).unwrap());
    }
}

#[cfg(test)]
mod recursion {
    use super::*;

    fn tree() -> Value {
        json!({
            "oneOf": [
                {
                    "type": "object",
                    "properties": {"left": {"$ref": "#"}, "right": {"$ref": "#"}},
                    "required": ["left", "right"]
                },
                {"type": "integer"},
                {"type": "null"}
            ]
        })
    }

    #[test]
    fn test_recursive_tree() {
        let mut ctx = Context::new();
        let root = ctx.compile(&tree()).unwrap();

        let valid = json!({"left": 1, "right": {"left": 3, "right": {"left": null, "right": 5}}});
        assert!(ctx.is_valid(root, &valid).unwrap());

        let report = ctx
            .validate(root, &json!({"left": 1, "right": {"left": "hello", "right": null}}))
            .unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.len(), 1);
        assert_eq!(report.errors()[0].validator, Keyword::OneOf);
        assert!(report.errors()[0].path.is_root());

        assert!(!ctx.is_valid(root, &json!({"left": 1, "right": "foo"})).unwrap());
    }

    #[test]
    fn test_recursion_never_calls_resolver() {
        let (resolver, calls) = counting_resolver(Vec::new());
        let mut ctx = Context::new();
        ctx.set_resolver(resolver);
        let root = ctx.compile(&tree()).unwrap();

        let mut deep = json!(1);
        for _ in 0..20 {
            deep = json!({"left": deep, "right": null});
        }
        assert!(ctx.is_valid(root, &deep).unwrap());
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_validation_is_repeatable() {
        let mut ctx = Context::new();
        let root = ctx.compile(&tree()).unwrap();
        let instance = json!({"left": 1, "right": {"left": "x", "right": 2}});

        let first = ctx.validate(root, &instance).unwrap();
        let second = ctx.validate(root, &instance).unwrap();
        assert_eq!(first, second);
    }
}

#[cfg(test)]
mod external {
    use super::*;

    fn schema() -> Value {
        json!({
            "inner": {"id": "inner.json", "type": "string"},
            "properties": {
                "a": {"$ref": "inner.json"},
                "b": {"$ref": "outer.json"}
            }
        })
    }

    #[test]
    fn test_local_id_and_fetched_document() {
        let (resolver, calls) =
            counting_resolver(vec![("http://localhost/outer.json", json!({"type": "integer"}))]);
        let mut ctx = Context::new();
        ctx.set_resolver(resolver);
        let root = ctx.compile(&schema()).unwrap();

        assert!(ctx.is_valid(root, &json!({"a": "foo", "b": 123})).unwrap());
        assert!(!ctx.is_valid(root, &json!({"a": 1, "b": "foo"})).unwrap());
        assert!(!ctx.is_valid(root, &json!({"a": "foo", "b": "bar"})).unwrap());

        assert_eq!(*calls.borrow(), vec!["http://localhost/outer.json".to_string()]);
        assert!(ctx.lookup("http://localhost/outer.json").is_some());
    }

    #[test]
    fn test_external_document_fetched_once() {
        let outer = json!({
            "foo": {"id": "#foo", "type": "string"},
            "definitions": {"bar": {"type": "integer"}}
        });
        let (resolver, calls) = counting_resolver(vec![("http://localhost/outer.json", outer)]);
        let mut ctx = Context::new();
        ctx.set_resolver(resolver);
        let root = ctx
            .compile(&json!({
                "properties": {
                    "a": {"$ref": "outer.json#foo"},
                    "b": {"$ref": "outer.json#/definitions/bar"}
                }
            }))
            .unwrap();

        assert!(ctx.is_valid(root, &json!({"a": "foo", "b": 123})).unwrap());
        assert!(!ctx.is_valid(root, &json!({"a": 1, "b": 123})).unwrap());
        assert!(!ctx.is_valid(root, &json!({"a": "foo", "b": "bar"})).unwrap());
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_absent_document_is_not_requested_again() {
        let (resolver, calls) = counting_resolver(Vec::new());
        let mut ctx = Context::new();
        ctx.set_resolver(resolver);
        let root = ctx
            .compile(&json!({"properties": {"a": {"$ref": "missing.json"}}}))
            .unwrap();

        // references are resolved on first use, not at compile time
        assert!(ctx.is_valid(root, &json!({})).unwrap());
        assert!(calls.borrow().is_empty());

        for _ in 0..2 {
            let err = ctx.validate(root, &json!({"a": 1})).unwrap_err();
            assert!(matches!(err, SchemaError::UnresolvedReference { .. }));
            assert_eq!(err.reference(), Some("missing.json"));
        }
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_unresolved_without_resolver() {
        let mut ctx = Context::new();
        let root = ctx.compile(&json!({"items": {"$ref": "#/definitions/none"}})).unwrap();
        let err = ctx.validate(root, &json!([1])).unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedReference { .. }));

        // an empty list never reaches the reference
        assert!(ctx.is_valid(root, &json!([])).unwrap());
    }

    #[test]
    fn test_fetched_document_resolves_relative_to_itself() {
        let (resolver, calls) = counting_resolver(vec![
            (
                "http://localhost/types/person.json",
                json!({"properties": {"name": {"$ref": "name.json"}}, "required": ["name"]}),
            ),
            ("http://localhost/types/name.json", json!({"type": "string", "minLength": 1})),
        ]);
        let mut ctx = Context::new();
        ctx.set_resolver(resolver);
        let root = ctx.compile(&json!({"items": {"$ref": "types/person.json"}})).unwrap();

        assert!(ctx.is_valid(root, &json!([{"name": "ada"}])).unwrap());
        assert!(!ctx.is_valid(root, &json!([{"name": ""}])).unwrap());
        assert!(!ctx.is_valid(root, &json!([{}])).unwrap());
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn test_invalid_fetched_document_is_an_error() {
        let (resolver, _calls) =
            counting_resolver(vec![("http://localhost/bad.json", json!({"minimum": "zero"}))]);
        let mut ctx = Context::new();
        ctx.set_resolver(resolver);
        let root = ctx.compile(&json!({"$ref": "bad.json"})).unwrap();

        let err = ctx.validate(root, &json!(1)).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidKeyword { .. }));
        assert_eq!(ctx.lookup("http://localhost/bad.json"), None);
    }

    #[test]
    fn test_directory_resolver() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("age.yaml"), "type: integer\nminimum: 0\n").unwrap();

        let mut ctx = Context::new();
        ctx.set_resolver(DirectoryResolver::new(
            dir.path(),
            Url::parse("http://localhost/").unwrap(),
        ));
        let root = ctx.compile(&json!({"properties": {"age": {"$ref": "age.yaml"}}})).unwrap();

        assert!(ctx.is_valid(root, &json!({"age": 30})).unwrap());
        assert!(!ctx.is_valid(root, &json!({"age": -1})).unwrap());
    }
}

#[cfg(test)]
mod chains {
    use super::*;

    #[test]
    fn test_reference_chain_is_followed() {
        let mut ctx = Context::new();
        let root = ctx
            .compile(&json!({
                "definitions": {
                    "a": {"$ref": "#/definitions/b"},
                    "b": {"$ref": "#/definitions/c"},
                    "c": {"type": "string"}
                },
                "properties": {"x": {"$ref": "#/definitions/a"}}
            }))
            .unwrap();

        assert!(ctx.is_valid(root, &json!({"x": "ok"})).unwrap());
        assert!(!ctx.is_valid(root, &json!({"x": 1})).unwrap());
    }

    #[test]
    fn test_circular_chain_is_an_error() {
        let mut ctx = Context::new();
        let root = ctx
            .compile(&json!({
                "definitions": {
                    "a": {"$ref": "#/definitions/b"},
                    "b": {"$ref": "#/definitions/a"}
                },
                "properties": {"x": {"$ref": "#/definitions/a"}}
            }))
            .unwrap();

        let err = ctx.validate(root, &json!({"x": 1})).unwrap_err();
        assert!(matches!(err, SchemaError::CircularReference { .. }));
        assert!(err.to_string().contains("#/definitions/a"));
    }

    #[test]
    fn test_chain_length_limit() {
        let mut ctx = Context::with_config(ContextConfig::default().with_max_reference_chain(2));
        let root = ctx
            .compile(&json!({
                "definitions": {
                    "a": {"$ref": "#/definitions/b"},
                    "b": {"$ref": "#/definitions/c"},
                    "c": {"$ref": "#/definitions/d"},
                    "d": {"type": "null"}
                },
                "$ref": "#/definitions/a"
            }))
            .unwrap();

        assert!(matches!(
            ctx.validate(root, &json!(null)).unwrap_err(),
            SchemaError::CircularReference { .. }
        ));
    }
}

#[cfg(test)]
mod meta_schema {
    use super::*;

    #[test]
    fn test_schema_validation_disabled_by_default() {
        let mut ctx = Context::new();
        assert!(ctx.compile(&json!({"type": "text"})).is_ok());
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let mut ctx = Context::with_config(ContextConfig::default().with_schema_validation());
        let err = ctx.compile(&json!({"type": "text"})).unwrap_err();
        match err {
            SchemaError::MetaSchemaViolation { violations } => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].path.to_string(), "$.type");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ctx.node_count(), 0);

        let root = ctx.compile(&json!({"type": "string"})).unwrap();
        assert!(ctx.is_valid(root, &json!("x")).unwrap());
    }

    #[test]
    fn test_fetched_documents_are_checked() {
        let (resolver, _calls) =
            counting_resolver(vec![("http://localhost/item.json", json!({"minItems": -2}))]);
        let mut ctx = Context::with_config(ContextConfig::default().with_schema_validation());
        ctx.set_resolver(resolver);
        let root = ctx.compile(&json!({"items": {"$ref": "item.json"}})).unwrap();

        assert!(matches!(
            ctx.validate(root, &json!([[1]])).unwrap_err(),
            SchemaError::MetaSchemaViolation { .. }
        ));
    }
}
