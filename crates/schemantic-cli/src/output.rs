//! Output formatting and writing utilities
//!
//! Results are written either human-readable or serialized as JSON or
//! YAML. Status messages are only shown in human mode.
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use schemantic::{ValidationError, ValidationReport};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use tracing::{debug, trace};

/// Outcome of validating one document, as printed by the CLI
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    /// Path of the validated document
    pub document: String,
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl DocumentReport {
    pub fn new(document: impl Into<String>, report: ValidationReport) -> Self {
        Self {
            document: document.into(),
            valid: report.is_valid(),
            errors: report.into_errors(),
        }
    }
}

/// Outcome of one `validate` run
#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub schema: String,
    pub valid: bool,
    pub documents: Vec<DocumentReport>,
}

impl ValidationSummary {
    pub fn new(schema: impl Into<String>, documents: Vec<DocumentReport>) -> Self {
        Self {
            schema: schema.into(),
            valid: documents.iter().all(|d| d.valid),
            documents,
        }
    }

    pub fn invalid_count(&self) -> usize {
        self.documents.iter().filter(|d| !d.valid).count()
    }
}

/// Formats serializable values
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format the reports of a `validate` run
    fn format_summary(&self, summary: &ValidationSummary, use_color: bool) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => {
                let value = serde_json::to_value(value)?;
                Ok(format_value_human(&value, 0))
            }
        }
    }

    fn format_summary(&self, summary: &ValidationSummary, use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_summary_human(summary, use_color)),
            _ => self.format(summary),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&message.red().to_string())
        } else {
            self.writeln(&format!("ERROR: {}", message))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        self.emit(formatted)
    }

    /// Write the reports of a `validate` run
    pub fn summary(&mut self, summary: &ValidationSummary) -> Result<()> {
        trace!(
            documents = summary.documents.len(),
            valid = summary.valid,
            "Writing validation summary"
        );
        // Failures are still shown in quiet mode
        if self.quiet && summary.valid && self.format == OutputFormat::Human {
            return Ok(());
        }
        let formatted = self.format.format_summary(summary, self.use_color)?;
        self.emit(formatted)
    }

    fn emit(&mut self, formatted: String) -> Result<()> {
        if formatted.ends_with('\n') {
            self.write(&formatted)
        } else {
            self.writeln(&formatted)
        }
    }
}

fn format_summary_human(summary: &ValidationSummary, use_color: bool) -> String {
    let mut lines = Vec::new();

    for document in &summary.documents {
        let status = if document.valid {
            let text = format!("✓ {} is valid", document.document);
            if use_color {
                text.green().to_string()
            } else {
                text
            }
        } else {
            let text = format!(
                "✗ {} is invalid ({} violation(s))",
                document.document,
                document.errors.len()
            );
            if use_color {
                text.red().to_string()
            } else {
                text
            }
        };
        lines.push(status);

        for error in &document.errors {
            let path = if use_color {
                error.path.to_string().cyan().to_string()
            } else {
                error.path.to_string()
            };
            lines.push(format!(
                "  {} {}: expected {}",
                path,
                error.validator,
                format_value_compact(&error.params)
            ));
        }
    }

    lines.join("\n")
}

fn format_value_human(value: &Value, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| match value {
                Value::Object(_) | Value::Array(_) => {
                    format!("{}{}:\n{}", pad, key, format_value_human(value, indent + 1))
                }
                _ => format!("{}{}: {}", pad, key, format_value_compact(value)),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Array(items) => items
            .iter()
            .map(|item| format!("{}- {}", pad, format_value_compact(item)))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => format!("{}{}", pad, format_value_compact(value)),
    }
}

/// Render a value on one line, truncating long strings
fn format_value_compact(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > 60 => {
            let truncated: String = s.chars().take(57).collect();
            format!("\"{}...\"", truncated)
        }
        _ => value.to_string(),
    }
}
