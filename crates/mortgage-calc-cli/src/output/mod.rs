pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` object of a computation envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Rows of a comparison result, if the result is one.
pub(crate) fn rows_of(result: &Value) -> Option<&Vec<Value>> {
    result.get("rows").and_then(Value::as_array)
}

/// Column names for a list of row objects: every key that appears in any row,
/// sorted. A field present only on later rows still gets a column.
pub(crate) fn row_headers(rows: &[Value]) -> Vec<String> {
    rows.iter()
        .filter_map(Value::as_object)
        .flat_map(Map::keys)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Scalar fields of an object, skipping nested arrays and objects.
pub(crate) fn scalar_fields(map: &Map<String, Value>) -> impl Iterator<Item = (&String, &Value)> {
    map.iter().filter(|(_, v)| !v.is_array() && !v.is_object())
}

/// Plain-text rendering of a JSON scalar. Missing values render as `null_text`.
pub(crate) fn cell(value: &Value, null_text: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => null_text.to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
