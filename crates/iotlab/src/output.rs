//! Output formatting: JSON, YAML, table.
//!
//! API answers are schemaless JSON, so tables are built on the fly from
//! `items` arrays of objects; anything else falls back to pretty JSON.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde_json::Value;
use tabled::{builder::Builder, settings::Style};

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Render dispatcher ────────────────────────────────────────────────

/// Render a JSON value in the chosen format.
pub fn render_value(format: OutputFormat, value: &Value) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(value)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        OutputFormat::Table => match render_table(value) {
            Some(table) => Ok(table),
            None => Ok(serde_json::to_string_pretty(value)?),
        },
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Status line on stderr, green on a terminal.
pub fn print_status(message: &str, quiet: bool) {
    if quiet {
        return;
    }
    if io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none() {
        eprintln!("{}", message.green());
    } else {
        eprintln!("{message}");
    }
}

// ── Tables ───────────────────────────────────────────────────────────

/// Table for `{"items": [{..}, ..]}` documents or arrays of scalars.
fn render_table(value: &Value) -> Option<String> {
    let rows = match value {
        Value::Array(scalars) if scalars.iter().all(is_scalar) => {
            return Some(scalars.iter().map(cell).collect::<Vec<_>>().join("\n"));
        }
        Value::Object(doc) => doc.get("items")?.as_array()?,
        _ => return None,
    };
    if rows.is_empty() || !rows.iter().all(Value::is_object) {
        return None;
    }

    // Column order: first appearance across rows.
    let mut columns: Vec<&str> = Vec::new();
    for key in rows.iter().filter_map(Value::as_object).flat_map(|row| row.keys()) {
        if !columns.contains(&key.as_str()) {
            columns.push(key);
        }
    }

    let mut builder = Builder::default();
    builder.push_record(columns.iter().copied());
    for row in rows {
        builder.push_record(
            columns
                .iter()
                .map(|col| row.get(*col).map(cell).unwrap_or_default()),
        );
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    Some(table.to_string())
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
