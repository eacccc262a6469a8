use serde_json::Value;

use super::{find_analysis, format_figure, format_scalar, metric_label, summary_rows};

/// Print just the key answer from the output.
///
/// A written report prints its path; a peer analysis prints each metric's
/// percentile rank; anything else falls back to the first result field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Priority list of key output fields
    let priority_keys = ["pdf_path", "reports_written"];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key).filter(|v| !v.is_null()) {
                println!("{}", format_minimal(val));
                return;
            }
        }
    }

    if let Some(analysis) = find_analysis(value) {
        for row in summary_rows(analysis) {
            let rank = row.get("percentile_rank").map(format_figure).unwrap_or_default();
            println!("{}: {}", metric_label(row), rank);
        }
        return;
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Array(items) => items.iter().map(format_scalar).collect::<Vec<_>>().join("\n"),
        _ => format_scalar(value),
    }
}
