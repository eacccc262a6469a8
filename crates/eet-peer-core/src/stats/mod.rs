pub mod histogram;
pub mod summary;

pub use histogram::{bin_values, HistogramBins, DEFAULT_BIN_COUNT};
pub use summary::{summarize, MetricSummary};
