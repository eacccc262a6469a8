use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metric values as read from the sheet. Percentages are on a 0-100 scale,
/// emissions in metric tons.
pub type MetricValue = Decimal;

/// Percentile rank on a 0-100 scale.
pub type Percentile = Decimal;

/// The fixed set of EET metrics under analysis, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    MinSustainableShare,
    ActualSustainableShare,
    MinTaxonomyAlignedShare,
    ActualTaxonomyAlignedShare,
    Scope1Emissions,
    Scope2Emissions,
    Scope3Emissions,
}

impl Metric {
    /// Report order. Pages and panels always follow this sequence.
    pub const ALL: [Metric; 7] = [
        Metric::MinSustainableShare,
        Metric::ActualSustainableShare,
        Metric::MinTaxonomyAlignedShare,
        Metric::ActualTaxonomyAlignedShare,
        Metric::Scope1Emissions,
        Metric::Scope2Emissions,
        Metric::Scope3Emissions,
    ];

    /// Exact header text of the column in the source sheet.
    pub fn column(self) -> &'static str {
        match self {
            Metric::MinSustainableShare => "Mindestanteil nachhaltiger Investionen (in %)",
            Metric::ActualSustainableShare => {
                "Tatsächlicher Anteil nachhaltiger Investitionen (in %)"
            }
            Metric::MinTaxonomyAlignedShare => {
                "Mindestanteil taxonomiekonformer Investitionen (in %)"
            }
            Metric::ActualTaxonomyAlignedShare => {
                "Tatsächlicher Anteil taxonomiekonformer Investitionen (in %)"
            }
            Metric::Scope1Emissions => "Scope 1 Emissionen (in MT)",
            Metric::Scope2Emissions => "Scope 2 Emissionen (in MT)",
            Metric::Scope3Emissions => "Scope 3 Emissionen (in MT)",
        }
    }

    pub fn from_column(header: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.column() == header.trim())
    }

    /// Position in [`Metric::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// SFDR article a product is classified under (6, 8 or 9 in practice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Classification(pub u32);

impl Classification {
    pub fn label(self) -> String {
        format!("Art. {}", self.0)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Format a decimal with exactly one fractional digit, rounding half away
/// from zero.
pub fn fmt_one_dp(value: Decimal) -> String {
    format!(
        "{:.1}",
        value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
