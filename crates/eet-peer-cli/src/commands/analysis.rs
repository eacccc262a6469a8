use clap::Args;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::info;

use eet_peer_core::analysis::{analyze, build_report, PeerReport};
use eet_peer_core::chart::ChartStyle;
use eet_peer_core::dataset::DatasetCache;

use crate::input;

/// Arguments for summary statistics
#[derive(Args)]
pub struct SummaryArgs {
    /// ISIN to compare (or pipe {"isin": "..."} on stdin)
    #[arg(long)]
    pub isin: Option<String>,
}

/// Chart options shared by every command that renders pages
#[derive(Args)]
pub struct StyleArgs {
    /// Path to a JSON chart style file
    #[arg(long)]
    pub style: Option<String>,

    /// Leave the summary and legend boxes off the pages
    #[arg(long)]
    pub no_overlay: bool,

    /// Caption each chart with the metric and classification
    #[arg(long)]
    pub titled: bool,
}

impl StyleArgs {
    pub fn resolve(&self) -> Result<ChartStyle, Box<dyn std::error::Error>> {
        let mut style: ChartStyle = match self.style {
            Some(ref path) => input::file::read_json(path)?,
            None => ChartStyle::default(),
        };
        if self.no_overlay {
            style.include_annotation_overlay = false;
        }
        if self.titled {
            style.titled = true;
        }
        style.validate()?;
        Ok(style)
    }
}

/// Arguments for the PDF report
#[derive(Args)]
pub struct ReportArgs {
    /// ISIN to compare (or pipe {"isin": "..."} on stdin)
    #[arg(long)]
    pub isin: Option<String>,

    #[command(flatten)]
    pub style: StyleArgs,

    /// Directory the PDF is written to
    #[arg(long, default_value = ".")]
    pub out_dir: String,

    /// Also write every page as PNG into this directory
    #[arg(long)]
    pub png_dir: Option<String>,
}

/// Files produced for one report.
pub struct WrittenReport {
    pub pdf: Option<PathBuf>,
    pub pngs: Vec<PathBuf>,
}

pub fn run_summary(
    cache: &DatasetCache,
    args: SummaryArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let isin = resolve_isin(args.isin, "summary")?;
    let dataset = cache.get()?;
    let result = analyze(&dataset, &isin)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_report(cache: &DatasetCache, args: ReportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let isin = resolve_isin(args.isin, "report")?;
    let style = args.style.resolve()?;
    let dataset = cache.get()?;

    let output = build_report(&dataset, &isin, &style)?;
    let written = write_report(
        &output.result,
        Path::new(&args.out_dir),
        args.png_dir.as_deref().map(Path::new),
    )?;

    let mut value = serde_json::to_value(&output)?;
    if let Some(result) = value.get_mut("result").and_then(Value::as_object_mut) {
        result.insert("pdf_path".into(), json!(written.pdf.map(|p| p.display().to_string())));
        if !written.pngs.is_empty() {
            let pngs: Vec<String> = written.pngs.iter().map(|p| p.display().to_string()).collect();
            result.insert("png_paths".into(), json!(pngs));
        }
    }
    Ok(value)
}

/// Write the PDF (when there is one) and optionally every page as PNG.
pub fn write_report(
    report: &PeerReport,
    out_dir: &Path,
    png_dir: Option<&Path>,
) -> Result<WrittenReport, Box<dyn std::error::Error>> {
    let pdf = match report.document {
        Some(ref document) => {
            let path = input::file::write_into(out_dir, &report.file_name, &document.bytes)?;
            info!(path = %path.display(), pages = document.page_count(), "wrote report");
            Some(path)
        }
        None => None,
    };

    let mut pngs = Vec::new();
    if let Some(dir) = png_dir {
        input::file::ensure_dir(dir)?;
        let identifier = &report.analysis.overview.identifier;
        for (i, page) in report.pages.iter().enumerate() {
            let path = dir.join(format!("{}_{}.png", identifier, i + 1));
            page.save_png(&path)?;
            pngs.push(path);
        }
    }

    Ok(WrittenReport { pdf, pngs })
}

/// Take the ISIN from the flag, else from a piped `{"isin": "..."}` document.
fn resolve_isin(
    flag: Option<String>,
    command: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(isin) = flag {
        return Ok(isin);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        if let Some(isin) = data.get("isin").and_then(Value::as_str) {
            return Ok(isin.to_string());
        }
        return Err("stdin JSON must contain an \"isin\" string".into());
    }
    Err(format!("--isin <ISIN> or stdin required for {}", command).into())
}
