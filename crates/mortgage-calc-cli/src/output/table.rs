use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, result_of, row_headers, rows_of, scalar_fields};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    for table in build_tables(value) {
        println!("{}", table);
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn build_tables(value: &Value) -> Vec<Table> {
    let result = result_of(value);
    let mut tables = Vec::new();

    if let Value::Object(map) = result {
        tables.push(field_table(map));
    }
    if let Some(rows) = rows_of(result) {
        if let Some(table) = rows_table(rows) {
            tables.push(table);
        }
    }
    tables
}

fn field_table(map: &Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in scalar_fields(map) {
        builder.push_record([key.clone(), cell(val, "-")]);
    }
    builder.build()
}

fn rows_table(rows: &[Value]) -> Option<Table> {
    let headers = row_headers(rows);
    if headers.is_empty() {
        return None;
    }

    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in rows {
        builder.push_record(headers.iter().map(|h| cell(&row[h.as_str()], "-")));
    }
    Some(builder.build())
}
