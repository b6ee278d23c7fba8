use serde_json::Value;

use super::{cell, result_of, rows_of};

/// Fields that answer "when is it paid off", best first.
const PRIORITY_KEYS: [&str; 4] = [
    "completion_date",
    "payoff_error",
    "remaining_payments",
    "base_monthly_payment",
];

/// Print just the headline answer.
pub fn print_minimal(value: &Value) {
    for line in minimal_lines(value) {
        println!("{}", line);
    }
}

fn minimal_lines(value: &Value) -> Vec<String> {
    let result = result_of(value);

    // Comparison: one headline per row, labelled by its extra payment.
    if let Some(rows) = rows_of(result) {
        return rows
            .iter()
            .map(|row| {
                let extra = cell(&row["extra_monthly_payment"], "0");
                format!("{}: {}", extra, headline(row).unwrap_or_default())
            })
            .collect();
    }

    match headline(result) {
        Some(line) => vec![line],
        None => vec![cell(result, "null")],
    }
}

fn headline(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    PRIORITY_KEYS
        .iter()
        .find_map(|key| map.get(*key).filter(|v| !v.is_null()))
        .map(|v| cell(v, "null"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_prefers_completion_date() {
        let v = json!({ "result": {
            "base_monthly_payment": "1432.25",
            "remaining_payments": 360,
            "completion_date": "2056-10-17"
        }});
        assert_eq!(minimal_lines(&v), vec!["2056-10-17"]);
    }

    #[test]
    fn test_minimal_shows_payoff_error_when_no_date() {
        let v = json!({ "result": {
            "base_monthly_payment": "0",
            "remaining_payments": null,
            "completion_date": null,
            "payoff_error": "Payment insufficient"
        }});
        assert_eq!(minimal_lines(&v), vec!["Payment insufficient"]);
    }

    #[test]
    fn test_minimal_one_line_per_row() {
        let v = json!({ "result": { "rows": [
            { "extra_monthly_payment": "0", "completion_date": "2056-10-17" },
            { "extra_monthly_payment": "500", "completion_date": "2045-02-17" }
        ]}});
        assert_eq!(minimal_lines(&v), vec!["0: 2056-10-17", "500: 2045-02-17"]);
    }

    #[test]
    fn test_minimal_falls_back_to_whole_value() {
        assert_eq!(minimal_lines(&json!("plain")), vec!["plain"]);
    }
}
