pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The peer analysis inside an envelope: `result` for `summary`,
/// `result.analysis` for `report`.
pub(crate) fn find_analysis(value: &Value) -> Option<&Map<String, Value>> {
    let result = value.get("result")?;
    let analysis = result.get("analysis").unwrap_or(result);
    analysis
        .as_object()
        .filter(|map| map.contains_key("summaries"))
}

/// Rows of the per-metric summary table.
pub(crate) fn summary_rows(analysis: &Map<String, Value>) -> &[Value] {
    analysis
        .get("summaries")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Column header of a summary row, falling back to its serde name.
pub(crate) fn metric_label(row: &Value) -> String {
    let metric = row.get("metric").and_then(Value::as_str).unwrap_or_default();
    metric_column(metric).unwrap_or(metric).to_string()
}

fn metric_column(name: &str) -> Option<&'static str> {
    eet_peer_core::Metric::ALL.into_iter().find_map(|m| {
        let serialised = serde_json::to_value(m).ok()?;
        (serialised.as_str() == Some(name)).then(|| m.column())
    })
}

pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Decimal figures to one place, everything else as-is.
pub(crate) fn format_figure(value: &Value) -> String {
    let text = format_scalar(value);
    match text.parse::<rust_decimal::Decimal>() {
        Ok(d) => eet_peer_core::fmt_one_dp(d),
        Err(_) => text,
    }
}
