use serde_json::Value;
use std::io;

use super::{find_analysis, format_scalar, metric_label, summary_rows};

const SUMMARY_FIELDS: [&str; 5] = ["user_value", "mean", "median", "percentile_rank", "peer_count"];

/// Write output as CSV to stdout.
///
/// A peer analysis becomes one row per compared metric at full precision;
/// anything else is written as field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(analysis) = find_analysis(value) {
        let identifier = analysis
            .get("overview")
            .and_then(|o| o.get("identifier"))
            .map(format_scalar)
            .unwrap_or_default();

        let mut header = vec!["isin", "metric"];
        header.extend(SUMMARY_FIELDS);
        let _ = wtr.write_record(&header);

        for row in summary_rows(analysis) {
            let mut record = vec![identifier.clone(), metric_label(row)];
            record.extend(
                SUMMARY_FIELDS
                    .iter()
                    .map(|f| row.get(*f).map(format_scalar).unwrap_or_default()),
            );
            let _ = wtr.write_record(&record);
        }
    } else {
        let fields = value.get("result").unwrap_or(value);
        let _ = wtr.write_record(["field", "value"]);
        match fields {
            Value::Object(map) => {
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_scalar(val)]);
                }
            }
            other => {
                let _ = wtr.write_record(["value", &format_scalar(other)]);
            }
        }
    }

    let _ = wtr.flush();
}
