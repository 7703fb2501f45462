//! Reference Resolution Demonstration
//!
//! Compiles a schema split across several documents served from a
//! temporary directory, then validates a few instances against it.
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use schemantic::loader::DirectoryResolver;
use schemantic::{Context, ContextConfig, SchemaResult, Url};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Schemantic Reference Demonstration");
    println!("==================================\n");

    let temp_dir = TempDir::new()?;
    create_example_files(temp_dir.path())?;

    let base = Url::parse("http://schemas.example/")?;
    let mut ctx = Context::with_config(
        ContextConfig::new()
            .with_base_uri("http://schemas.example/order.json")?
            .with_schema_validation(),
    );
    ctx.set_resolver(DirectoryResolver::new(temp_dir.path(), base));

    let order = ctx.compile(&json!({
        "type": "object",
        "required": ["id", "customer", "lines"],
        "properties": {
            "id": {"type": "integer", "minimum": 1},
            "customer": {"$ref": "person.json"},
            "lines": {"type": "array", "minItems": 1, "items": {"$ref": "#/definitions/line"}}
        },
        "definitions": {
            "line": {
                "type": "object",
                "required": ["sku", "quantity"],
                "properties": {
                    "sku": {"type": "string", "pattern": "^[A-Z]{3}-[0-9]+$"},
                    "quantity": {"type": "integer", "minimum": 1}
                }
            }
        }
    }))?;

    demo_instance(
        &mut ctx,
        order,
        "valid order",
        json!({
            "id": 7,
            "customer": {"name": "Ada", "email": "ada@example.com"},
            "lines": [{"sku": "ABC-1", "quantity": 2}]
        }),
    )?;

    demo_instance(
        &mut ctx,
        order,
        "broken order",
        json!({
            "id": 0,
            "customer": {"email": 5},
            "lines": [{"sku": "abc", "quantity": 0}]
        }),
    )?;

    println!("\nCompiled {} schema nodes", ctx.node_count());
    Ok(())
}

fn demo_instance(
    ctx: &mut Context,
    schema: schemantic::NodeId,
    label: &str,
    instance: serde_json::Value,
) -> SchemaResult<()> {
    println!("--- {} ---", label);
    let report = ctx.validate(schema, &instance)?;
    println!("{}\n", report);
    Ok(())
}

fn create_example_files(dir: &Path) -> std::io::Result<()> {
    fs::write(
        dir.join("person.json"),
        r#"{
  "type": "object",
  "required": ["name"],
  "properties": {
    "name": {"type": "string", "minLength": 1},
    "email": {"$ref": "email.yaml"}
  }
}"#,
    )?;
    fs::write(dir.join("email.yaml"), "type: string\nmaxLength: 254\n")?;
    Ok(())
}
