use serde::{Deserialize, Serialize};

pub const DEFAULT_BIN_COUNT: usize = 10;

/// Equal-width histogram bins. `edges` has `counts.len() + 1` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBins {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl HistogramBins {
    pub fn lower(&self) -> f64 {
        self.edges[0]
    }

    pub fn upper(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(lower edge, upper edge, count)` per bin.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(self.counts.iter())
            .map(|(w, &c)| (w[0], w[1], c))
    }
}

/// Bin `values` into `bins` equal-width intervals spanning `[min, max]`.
///
/// Every interval is half-open except the last, which also takes `max`. A
/// zero-width range is widened to `[v - 0.5, v + 0.5]`. Non-finite values are
/// ignored. Returns `None` when nothing is left to bin or `bins` is zero.
pub fn bin_values(values: &[f64], bins: usize) -> Option<HistogramBins> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return None;
    }

    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| if i == bins { hi } else { lo + width * i as f64 })
        .collect();

    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Some(HistogramBins { edges, counts })
}
