mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::filter::LevelFilter;

use eet_peer_core::dataset::DEFAULT_DATA_PATH;

use commands::analysis::{ReportArgs, SummaryArgs};
use commands::shell::ShellArgs;

/// Peer-group comparison of EET sustainability metrics
#[derive(Parser)]
#[command(
    name = "eet-peer",
    version,
    about = "Peer-group comparison of EET sustainability metrics",
    long_about = "Compares one ISIN's EET sustainability metrics against every ISIN \
                  sharing its SFDR classification. Computes mean, median and percentile \
                  rank per metric and renders a histogram report as PDF."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Path to the EET sheet (CSV with a header row)
    #[arg(long, default_value = DEFAULT_DATA_PATH, global = true)]
    data: String,

    /// Field delimiter of the sheet; use ';' for German-locale exports
    #[arg(long, default_value_t = ',', global = true)]
    delimiter: char,

    /// Log level for diagnostics on stderr (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Peer statistics for one ISIN, without charts
    Summary(SummaryArgs),
    /// Peer statistics plus the histogram PDF report
    Report(ReportArgs),
    /// Interactive prompt: enter ISINs one after another
    Shell(ShellArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(level: &str) {
    let filter = level.parse::<LevelFilter>().unwrap_or(LevelFilter::WARN);

    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let cache = match commands::dataset_cache(&cli.data, cli.delimiter) {
        Ok(cache) => cache,
        Err(e) => fail(e),
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Summary(args) => commands::analysis::run_summary(&cache, args),
        Commands::Report(args) => commands::analysis::run_report(&cache, args),
        Commands::Shell(args) => commands::shell::run_shell(&cache, args),
        Commands::Version => {
            println!("eet-peer {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => fail(e),
    }
}

fn fail(e: Box<dyn std::error::Error>) -> ! {
    eprintln!("{}: {}", "error".red().bold(), e);
    process::exit(1);
}
