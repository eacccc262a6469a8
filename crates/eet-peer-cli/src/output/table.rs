use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{find_analysis, format_figure, format_scalar, metric_label, summary_rows};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match find_analysis(value) {
        Some(analysis) => print_analysis(analysis),
        None => match value.get("result") {
            Some(result) => print_flat_object(result),
            None => print_flat_object(value),
        },
    }

    if let Some(Value::Object(result)) = value.get("result") {
        print_report_files(result);
    }

    // Print warnings if any
    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_analysis(analysis: &Map<String, Value>) {
    if let Some(overview) = analysis.get("overview") {
        let field = |k: &str| overview.get(k).map(format_scalar).unwrap_or_default();
        let peers = analysis
            .get("peer_group_size")
            .map(format_scalar)
            .unwrap_or_default();
        println!(
            "ISIN: {}  Classification: {}  Peer group size: {}\n",
            field("identifier"),
            field("classification_label"),
            peers
        );
    }

    let rows = summary_rows(analysis);
    if rows.is_empty() {
        println!("(no metric could be compared)");
    } else {
        let mut builder = Builder::default();
        builder.push_record(["Metric", "ISIN value", "Mean", "Median", "% lower", "Peers"]);
        for row in rows {
            let figure = |k: &str| row.get(k).map(format_figure).unwrap_or_default();
            builder.push_record([
                metric_label(row),
                figure("user_value"),
                figure("mean"),
                figure("median"),
                figure("percentile_rank"),
                row.get("peer_count").map(format_scalar).unwrap_or_default(),
            ]);
        }
        println!("{}", Table::from(builder));
    }

    if let Some(Value::Array(skipped)) = analysis.get("skipped") {
        if !skipped.is_empty() {
            println!("\nSkipped:");
            for s in skipped {
                let reason = s.get("reason").map(format_scalar).unwrap_or_default();
                println!("  - {}: {}", metric_label(s), reason);
            }
        }
    }
}

fn print_report_files(result: &Map<String, Value>) {
    let mut builder = Builder::default();
    let mut any = false;
    for key in ["file_name", "pdf_path"] {
        if let Some(val) = result.get(key).filter(|v| !v.is_null()) {
            builder.push_record([key, format_scalar(val).as_str()]);
            any = true;
        }
    }
    if let Some(Value::Array(pngs)) = result.get("png_paths") {
        for png in pngs {
            builder.push_record(["png_path", format_scalar(png).as_str()]);
            any = true;
        }
    }
    if any {
        println!("\n{}", Table::from(builder));
    }
}

fn print_flat_object(value: &Value) {
    match value {
        Value::Object(map) => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            for (key, val) in map {
                builder.push_record([key.as_str(), &format_value(val)]);
            }
            println!("{}", Table::from(builder));
        }
        _ => println!("{}", format_value(value)),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        _ => format_scalar(value),
    }
}
