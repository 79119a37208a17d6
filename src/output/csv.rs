//! CSV rendering of extracted records
//!
//! Columns are the union of record keys in sorted order. List values are
//! joined with `"; "` and nested objects are written as compact JSON.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::extract::AdRecord;
use crate::output::OutputResult;

/// Renders records as CSV text with a header row
pub fn format_csv(records: &[AdRecord]) -> OutputResult<String> {
    let rows = records
        .iter()
        .map(|record| match serde_json::to_value(record)? {
            Value::Object(map) => Ok(map),
            other => Err(crate::output::OutputError::Write(format!(
                "record did not serialize to an object: {}",
                other
            ))),
        })
        .collect::<OutputResult<Vec<Map<String, Value>>>>()?;

    let columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut csv = String::new();
    push_row(&mut csv, columns.iter().map(|c| c.to_string()));

    for row in &rows {
        push_row(
            &mut csv,
            columns
                .iter()
                .map(|column| row.get(*column).map(cell_text).unwrap_or_default()),
        );
    }

    Ok(csv)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        // Objects and scalars use their JSON text
        other => other.to_string(),
    }
}

fn push_row(csv: &mut String, cells: impl Iterator<Item = String>) {
    let line = cells.map(|cell| escape(&cell)).collect::<Vec<_>>().join(",");
    csv.push_str(&line);
    csv.push_str("\r\n");
}

/// Quotes a field when it holds a delimiter, quote or line break
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
