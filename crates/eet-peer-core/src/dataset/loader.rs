use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::dataset::peers::normalize_identifier;
use crate::error::EetError;
use crate::types::{Classification, Metric, MetricValue};
use crate::EetResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Location of the sample sheet, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "EET_Beispieldaten_100_ISINs_variiert.csv";

pub const IDENTIFIER_COLUMN: &str = "ISIN";
pub const CLASSIFICATION_COLUMN: &str = "Klassifikation";

const READER_SOURCE: &str = "<reader>";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderOptions {
    /// Field delimiter. German spreadsheet exports commonly use `;`.
    pub delimiter: u8,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        LoaderOptions { delimiter: b',' }
    }
}

/// One security row of the EET sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub identifier: String,
    pub classification: Classification,
    /// Indexed by [`Metric::index`]. `None` for empty or non-numeric cells.
    pub values: [Option<MetricValue>; 7],
}

impl Record {
    pub fn value(&self, metric: Metric) -> Option<MetricValue> {
        self.values[metric.index()]
    }
}

/// Immutable in-memory copy of the sheet.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: String,
    records: Vec<Record>,
    metrics: Vec<Metric>,
}

impl Dataset {
    pub fn new(source: impl Into<String>, records: Vec<Record>) -> Self {
        Dataset {
            source: source.into(),
            records,
            metrics: Metric::ALL.to_vec(),
        }
    }

    /// Parse a CSV table with a header row from any reader.
    pub fn from_reader<R: Read>(reader: R, options: &LoaderOptions) -> EetResult<Self> {
        parse_table(reader, options, READER_SOURCE)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Metrics analysed for every request, in report order.
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Load the sheet from `path` with default options.
pub fn load(path: impl AsRef<Path>) -> EetResult<Dataset> {
    load_with_options(path, &LoaderOptions::default())
}

pub fn load_with_options(path: impl AsRef<Path>, options: &LoaderOptions) -> EetResult<Dataset> {
    let path = path.as_ref();
    let source = path.display().to_string();

    if !path.is_file() {
        return Err(EetError::DataUnavailable {
            path: source,
            reason: "file not found".into(),
        });
    }

    let file = File::open(path).map_err(|e| EetError::DataUnavailable {
        path: source.clone(),
        reason: e.to_string(),
    })?;

    let dataset = parse_table(file, options, &source)?;
    info!(path = %source, records = dataset.len(), "loaded EET dataset");
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

struct ColumnLayout {
    identifier: usize,
    classification: usize,
    metrics: [usize; 7],
}

fn parse_table<R: Read>(reader: R, options: &LoaderOptions, source: &str) -> EetResult<Dataset> {
    let unavailable = |reason: String| EetError::DataUnavailable {
        path: source.to_string(),
        reason,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| unavailable(e.to_string()))?.clone();
    let layout = resolve_columns(&headers).map_err(unavailable)?;

    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for (row, result) in rdr.records().enumerate() {
        let raw = result.map_err(|e| unavailable(e.to_string()))?;
        // Header is line 1.
        let line = row + 2;

        let identifier = raw.get(layout.identifier).unwrap_or_default().trim().to_string();
        let classification = raw
            .get(layout.classification)
            .and_then(parse_classification)
            .ok_or_else(|| {
                unavailable(format!(
                    "line {line}: '{CLASSIFICATION_COLUMN}' is not an integer article number"
                ))
            })?;

        let mut values = [None; 7];
        for (slot, &col) in values.iter_mut().zip(layout.metrics.iter()) {
            *slot = raw.get(col).and_then(parse_metric_cell);
        }

        if !seen.insert(normalize_identifier(&identifier)) {
            warn!(identifier = %identifier, line, "duplicate identifier, keeping first occurrence");
            continue;
        }

        records.push(Record {
            identifier,
            classification,
            values,
        });
    }

    debug!(source, records = records.len(), "parsed table");
    Ok(Dataset::new(source, records))
}

fn resolve_columns(headers: &csv::StringRecord) -> Result<ColumnLayout, String> {
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| format!("missing column '{name}'"))
    };

    let identifier = find(IDENTIFIER_COLUMN)?;
    let classification = find(CLASSIFICATION_COLUMN)?;
    let mut metrics = [0usize; 7];
    for (slot, metric) in metrics.iter_mut().zip(Metric::ALL) {
        *slot = find(metric.column())?;
    }

    Ok(ColumnLayout {
        identifier,
        classification,
        metrics,
    })
}

/// Empty, `NaN` and otherwise non-numeric cells map to `None`. Accepts a
/// decimal comma as written by German-locale exports.
pub(crate) fn parse_metric_cell(cell: &str) -> Option<Decimal> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    Decimal::from_str(cell)
        .or_else(|_| Decimal::from_scientific(cell))
        .or_else(|_| Decimal::from_str(&cell.replace(',', ".")))
        .ok()
}

fn parse_classification(cell: &str) -> Option<Classification> {
    let value = parse_metric_cell(cell)?;
    if !value.fract().is_zero() {
        return None;
    }
    value.to_u32().map(Classification)
}
