//! Validate command handler
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use super::{load_document, schema_context};
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{DocumentReport, OutputWriter, ValidationSummary};
use tracing::{debug, info, instrument, warn};

/// Handle the validate command
#[instrument(skip(config, output), fields(schema = %args.schema.display(), documents = args.instances.len()))]
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("validate_command", &args.schema.display().to_string());

    let mut config = config.clone();
    config.validate_schema |= args.check_schema;

    output.info(&format!("Compiling schema: {}", args.schema.display()))?;
    let schema_document = load_document(&args.schema)?;
    let mut ctx = schema_context(&config, &args.schema, args.schema_dir.as_deref())?;
    let compile_timer = Timer::new("schema_compilation");
    let schema = ctx.compile(&schema_document)?;
    debug!(
        nodes = ctx.node_count(),
        elapsed_ms = compile_timer.elapsed().as_millis() as u64,
        "Schema compiled"
    );
    drop(compile_timer);

    let mut documents = Vec::with_capacity(args.instances.len());
    for path in &args.instances {
        let instance = load_document(path)?;
        let report = ctx.validate(schema, &instance)?;
        if report.is_valid() {
            info!(document = %path.display(), "Document is valid");
        } else {
            warn!(
                document = %path.display(),
                violations = report.len(),
                "Document failed validation"
            );
        }
        documents.push(DocumentReport::new(path.display().to_string(), report));
    }

    let summary = ValidationSummary::new(args.schema.display().to_string(), documents);
    output.summary(&summary)?;

    if summary.valid {
        Ok(())
    } else {
        Err(Error::ValidationFailed {
            invalid: summary.invalid_count(),
            total: summary.documents.len(),
        })
    }
}
