use tracing::debug;

use crate::dataset::loader::{Dataset, Record};
use crate::error::EetError;
use crate::types::{Classification, Metric, MetricValue};
use crate::EetResult;

/// Records sharing one classification, borrowed from the dataset.
#[derive(Debug, Clone)]
pub struct PeerGroup<'a> {
    classification: Classification,
    members: Vec<&'a Record>,
}

impl<'a> PeerGroup<'a> {
    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn members(&self) -> &[&'a Record] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Non-missing values of `metric` across the group, in dataset order.
    pub fn values(&self, metric: Metric) -> Vec<MetricValue> {
        self.members.iter().filter_map(|r| r.value(metric)).collect()
    }
}

/// Upper-case and trim an identifier for comparison.
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_uppercase()
}

/// Look up the single record whose normalised identifier equals the
/// normalised input.
pub fn find_record<'a>(dataset: &'a Dataset, identifier: &str) -> EetResult<&'a Record> {
    let wanted = normalize_identifier(identifier);
    dataset
        .records()
        .iter()
        .find(|r| !wanted.is_empty() && normalize_identifier(&r.identifier) == wanted)
        .ok_or(EetError::NotFound { identifier: wanted })
}

/// All records classified like `record`, including `record` itself.
pub fn peer_group<'a>(dataset: &'a Dataset, record: &Record) -> PeerGroup<'a> {
    let members: Vec<&Record> = dataset
        .records()
        .iter()
        .filter(|r| r.classification == record.classification)
        .collect();

    debug!(
        classification = %record.classification,
        peers = members.len(),
        "derived peer group"
    );

    PeerGroup {
        classification: record.classification,
        members,
    }
}
