//! Check command handler
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use super::{load_document, schema_context};
use crate::cli::{CheckArgs, OutputFormat};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use schemantic::{SchemaError, ValidationError};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Outcome of checking one schema file
#[derive(Debug, Serialize)]
struct CheckReport {
    schema: String,
    valid: bool,
    nodes: usize,
    errors: Vec<ValidationError>,
}

/// Handle the check command
///
/// The schema is checked against the draft-04 meta-schema and then
/// compiled; a meta-schema failure is reported like a failed document.
#[instrument(skip(config, output), fields(schema = %args.schema.display()))]
pub fn handle_check(args: CheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("check_command", &args.schema.display().to_string());

    let mut config = config.clone();
    config.validate_schema = true;

    let document = load_document(&args.schema)?;
    let mut ctx = schema_context(&config, &args.schema, args.schema_dir.as_deref())?;

    let mut report = CheckReport {
        schema: args.schema.display().to_string(),
        valid: true,
        nodes: 0,
        errors: Vec::new(),
    };
    match ctx.compile(&document) {
        Ok(root) => {
            report.nodes = ctx.node_count();
            info!(root = %root, nodes = report.nodes, "Schema is valid");
        }
        Err(SchemaError::MetaSchemaViolation { violations }) => {
            warn!(violations = violations.len(), "Schema does not conform to the meta-schema");
            report.valid = false;
            report.errors = violations;
        }
        Err(e) => return Err(e.into()),
    }

    if output.format() == OutputFormat::Human {
        if report.valid {
            output.success(&format!(
                "✓ {} is a valid schema ({} nodes)",
                report.schema, report.nodes
            ))?;
        } else {
            output.error(&format!("✗ {} is not a valid schema", report.schema))?;
            for violation in &report.errors {
                output.writeln(&format!("  {}", violation))?;
            }
        }
    } else {
        output.data(&report)?;
    }

    if report.valid {
        Ok(())
    } else {
        Err(Error::ValidationFailed {
            invalid: 1,
            total: 1,
        })
    }
}
