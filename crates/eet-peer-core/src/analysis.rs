//! Request flow: locate the record, derive its peer group, summarise every
//! metric and, with the `report` feature, render and assemble the PDF.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::dataset::{find_record, peer_group, Dataset, PeerGroup, Record};
use crate::error::EetError;
use crate::stats::{summarize, MetricSummary};
use crate::types::{with_metadata, Classification, ComputationOutput, Metric, MetricValue};
use crate::EetResult;

#[cfg(feature = "report")]
use crate::chart::{render, ChartStyle, PageSubject, ReportPage};
#[cfg(feature = "report")]
use crate::report::{pdf::assemble_with_title, report_file_name, ReportDocument};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Raw values of the looked-up record, shown before any chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordOverview {
    pub identifier: String,
    pub classification: Classification,
    /// e.g. "Art. 8"
    pub classification_label: String,
    pub values: Vec<MetricReading>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricReading {
    pub metric: Metric,
    pub column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<MetricValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedMetric {
    pub metric: Metric,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerAnalysis {
    pub overview: RecordOverview,
    /// Records sharing the classification, target included.
    pub peer_group_size: usize,
    /// In metric-list order; skipped metrics are absent.
    pub summaries: Vec<MetricSummary>,
    pub skipped: Vec<SkippedMetric>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare the record identified by `identifier` against its peer group.
pub fn analyze(
    dataset: &Dataset,
    identifier: &str,
) -> EetResult<ComputationOutput<PeerAnalysis>> {
    let start = Instant::now();
    let evaluation = evaluate(dataset, identifier)?;
    let analysis = evaluation.into_analysis();

    let warnings = skipped_warnings(&analysis.skipped);
    let assumptions = assumptions(&analysis);
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "EET peer-group comparison (same SFDR classification)",
        &assumptions,
        warnings,
        elapsed,
        analysis,
    ))
}

/// Full report for one record: statistics, rendered pages and the PDF.
#[cfg(feature = "report")]
#[derive(Debug, Clone, Serialize)]
pub struct PeerReport {
    pub analysis: PeerAnalysis,
    #[serde(skip)]
    pub pages: Vec<ReportPage>,
    /// `None` when no metric could be summarised.
    pub document: Option<ReportDocument>,
    pub file_name: String,
}

#[cfg(feature = "report")]
pub fn build_report(
    dataset: &Dataset,
    identifier: &str,
    style: &ChartStyle,
) -> EetResult<ComputationOutput<PeerReport>> {
    let start = Instant::now();
    style.validate()?;

    let evaluation = evaluate(dataset, identifier)?;
    let subject = PageSubject {
        identifier: evaluation.record.identifier.clone(),
        classification: evaluation.record.classification,
    };

    let mut pages = Vec::with_capacity(evaluation.summaries.len());
    for summary in &evaluation.summaries {
        let values = evaluation.peers.values(summary.metric);
        pages.push(render(&subject, summary, &values, style)?);
    }

    let title = format!("{} peer analysis", subject.identifier);
    let document = assemble_with_title(&pages, Some(&title))?;
    let file_name = report_file_name(&subject.identifier);

    let analysis = evaluation.into_analysis();
    let warnings = skipped_warnings(&analysis.skipped);
    let assumptions = assumptions(&analysis);
    let elapsed = start.elapsed().as_micros() as u64;

    info!(
        identifier = %subject.identifier,
        pages = pages.len(),
        "built peer report"
    );

    Ok(with_metadata(
        "EET peer-group comparison (same SFDR classification), histogram report",
        &assumptions,
        warnings,
        elapsed,
        PeerReport {
            analysis,
            pages,
            document,
            file_name,
        },
    ))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

struct Evaluation<'a> {
    record: &'a Record,
    peers: PeerGroup<'a>,
    summaries: Vec<MetricSummary>,
    skipped: Vec<SkippedMetric>,
}

impl Evaluation<'_> {
    fn into_analysis(self) -> PeerAnalysis {
        PeerAnalysis {
            overview: overview(self.record),
            peer_group_size: self.peers.len(),
            summaries: self.summaries,
            skipped: self.skipped,
        }
    }
}

fn evaluate<'a>(dataset: &'a Dataset, identifier: &str) -> EetResult<Evaluation<'a>> {
    let record = find_record(dataset, identifier)?;
    let peers = peer_group(dataset, record);

    let mut summaries = Vec::new();
    let mut skipped = Vec::new();

    for &metric in dataset.metrics() {
        let outcome = match record.value(metric) {
            Some(user_value) => summarize(&peers, metric, user_value),
            None => Err(EetError::SkippedMetric {
                metric: metric.column().to_string(),
                reason: "no value for this ISIN".into(),
            }),
        };

        match outcome {
            Ok(summary) => {
                debug!(
                    metric = %metric,
                    peer_count = summary.peer_count,
                    percentile = %summary.percentile_rank,
                    "summarised metric"
                );
                summaries.push(summary);
            }
            Err(EetError::SkippedMetric { reason, .. }) => {
                warn!(identifier = %record.identifier, metric = %metric, %reason, "skipping metric");
                skipped.push(SkippedMetric { metric, reason });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(Evaluation {
        record,
        peers,
        summaries,
        skipped,
    })
}

fn overview(record: &Record) -> RecordOverview {
    RecordOverview {
        identifier: record.identifier.clone(),
        classification: record.classification,
        classification_label: record.classification.label(),
        values: Metric::ALL
            .iter()
            .map(|&metric| MetricReading {
                metric,
                column: metric.column().to_string(),
                value: record.value(metric),
            })
            .collect(),
    }
}

fn skipped_warnings(skipped: &[SkippedMetric]) -> Vec<String> {
    skipped
        .iter()
        .map(|s| format!("{} skipped: {}", s.metric, s.reason))
        .collect()
}

fn assumptions(analysis: &PeerAnalysis) -> serde_json::Value {
    serde_json::json!({
        "peer_group": format!(
            "all ISINs classified {}",
            analysis.overview.classification_label
        ),
        "target_in_peer_group": true,
        "percentile_rank": "share of peer values strictly below the ISIN value",
        "median": "average of the two central values for even peer counts",
        "missing_values": "excluded from every statistic",
    })
}
