use clap::Args;
use colored::Colorize;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tabled::{builder::Builder, Table};

use eet_peer_core::analysis::{build_report, PeerAnalysis};
use eet_peer_core::dataset::DatasetCache;
use eet_peer_core::{fmt_one_dp, EetError};

use crate::commands::analysis::{write_report, StyleArgs};
use crate::input;

/// Arguments for the interactive prompt
#[derive(Args)]
pub struct ShellArgs {
    #[command(flatten)]
    pub style: StyleArgs,

    /// Directory the PDF reports are written to
    #[arg(long, default_value = ".")]
    pub out_dir: String,
}

/// Prompt for ISINs until an empty line or end of input.
///
/// Unknown ISINs are reported and the prompt continues; any other failure
/// ends the session.
pub fn run_shell(cache: &DatasetCache, args: ShellArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let style = args.style.resolve()?;
    let dataset = cache.get()?;
    let interactive = input::stdin::is_interactive();

    if interactive {
        println!(
            "{} records loaded from {}. Enter an ISIN, or an empty line to quit.",
            dataset.len(),
            dataset.source()
        );
    }

    let mut reports: Vec<String> = Vec::new();
    let mut not_found: Vec<String> = Vec::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        if interactive {
            print!("ISIN> ");
            io::stdout().flush()?;
        }
        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let isin = line.trim();
        if isin.is_empty() {
            break;
        }

        let output = match build_report(&dataset, isin, &style) {
            Ok(output) => output,
            Err(e @ EetError::NotFound { .. }) => {
                eprintln!("{}: {}", "error".red().bold(), e);
                not_found.push(isin.to_string());
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        print_record_panel(&output.result.analysis);
        print_metric_panels(&output.result.analysis);
        for warning in &output.warnings {
            println!("{} {}", "warning:".yellow(), warning);
        }

        let written = write_report(&output.result, Path::new(&args.out_dir), None)?;
        match written.pdf {
            Some(path) => {
                println!("Report written to {}\n", path.display());
                reports.push(path.display().to_string());
            }
            None => println!("No metric could be compared; no report written.\n"),
        }
    }

    Ok(json!({
        "result": {
            "reports_written": reports,
            "not_found": not_found,
        }
    }))
}

fn print_record_panel(analysis: &PeerAnalysis) {
    let overview = &analysis.overview;
    println!(
        "\n{} ({}, {} peers)",
        overview.identifier.bold(),
        overview.classification_label,
        analysis.peer_group_size
    );

    let mut builder = Builder::default();
    builder.push_record(["Metric", "Value"]);
    for reading in &overview.values {
        let value = reading
            .value
            .map(fmt_one_dp)
            .unwrap_or_else(|| "n/a".to_string());
        builder.push_record([reading.column.as_str(), value.as_str()]);
    }
    println!("{}", Table::from(builder));
}

fn print_metric_panels(analysis: &PeerAnalysis) {
    for summary in &analysis.summaries {
        println!();
        for line in summary.describe(&analysis.overview.identifier) {
            println!("  {}", line);
        }
    }
}
