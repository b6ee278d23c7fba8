use serde_json::Value;
use std::io;

use super::{cell, result_of, row_headers, rows_of, scalar_fields};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    if let Err(e) = write_csv(&mut wtr, value) {
        eprintln!("CSV output error: {}", e);
    }
}

/// Comparisons become one record per row; everything else a field,value list.
fn write_csv<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    let result = result_of(value);

    if let Some(rows) = rows_of(result) {
        let headers = row_headers(rows);
        if !headers.is_empty() {
            wtr.write_record(&headers)?;
            for row in rows {
                wtr.write_record(headers.iter().map(|h| cell(&row[h.as_str()], "")))?;
            }
        }
    } else if let Value::Object(map) = result {
        wtr.write_record(["field", "value"])?;
        for (key, val) in scalar_fields(map) {
            wtr.write_record([key.clone(), cell(val, "")])?;
        }
    } else {
        wtr.write_record([cell(result, "")])?;
    }

    wtr.flush()?;
    Ok(())
}
