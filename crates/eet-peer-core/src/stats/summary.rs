use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::dataset::PeerGroup;
use crate::error::EetError;
use crate::types::{fmt_one_dp, Metric, MetricValue, Percentile};
use crate::EetResult;

/// Position of one record's metric value within its peer group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub metric: Metric,
    pub user_value: MetricValue,
    pub mean: MetricValue,
    pub median: MetricValue,
    /// Share of peer values strictly below `user_value`, 0-100.
    pub percentile_rank: Percentile,
    /// Number of non-missing peer values.
    pub peer_count: usize,
}

impl MetricSummary {
    /// Human-readable summary lines, figures to one decimal place.
    pub fn describe(&self, identifier: &str) -> Vec<String> {
        vec![
            format!("ISIN: {identifier}"),
            format!("{}: {}", self.metric, fmt_one_dp(self.user_value)),
            format!("Anzahl ISINs Peergroup: {}", self.peer_count),
            format!("Mittelwert: {}", fmt_one_dp(self.mean)),
            format!("Median: {}", fmt_one_dp(self.median)),
            format!("{}% der Werte sind kleiner", fmt_one_dp(self.percentile_rank)),
        ]
    }
}

/// Summarise `metric` for a record holding `user_value` against `peers`.
///
/// Fails soft with [`EetError::SkippedMetric`] when the peer group carries no
/// value for the metric.
pub fn summarize(
    peers: &PeerGroup<'_>,
    metric: Metric,
    user_value: MetricValue,
) -> EetResult<MetricSummary> {
    let values = peers.values(metric);
    summarize_values(&values, metric, user_value)
}

/// Same as [`summarize`] over an explicit value set.
pub fn summarize_values(
    values: &[MetricValue],
    metric: Metric,
    user_value: MetricValue,
) -> EetResult<MetricSummary> {
    if values.is_empty() {
        return Err(EetError::SkippedMetric {
            metric: metric.column().to_string(),
            reason: "no peer values".into(),
        });
    }

    let peer_count = values.len();
    let count = Decimal::from(peer_count as u64);
    let (mean, median) = match (mean(values), median(values)) {
        (Some(mean), Some(median)) => (mean, median),
        _ => {
            return Err(EetError::SkippedMetric {
                metric: metric.column().to_string(),
                reason: "peer values exceed the decimal range".into(),
            })
        }
    };

    Ok(MetricSummary {
        metric,
        user_value,
        mean,
        median,
        percentile_rank: count_below(values, user_value) * dec!(100) / count,
        peer_count,
    })
}

/// `None` when the running sum leaves the decimal range.
fn mean(values: &[Decimal]) -> Option<Decimal> {
    let sum = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, &v| acc.checked_add(v))?;
    sum.checked_div(Decimal::from(values.len() as u64))
}

fn median(values: &[Decimal]) -> Option<Decimal> {
    let mut sorted = values.to_vec();
    sorted.sort();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        sorted[mid - 1].checked_add(sorted[mid])?.checked_div(dec!(2))
    } else {
        Some(sorted[mid])
    }
}

/// Count of values strictly below `target`. Ties do not count.
fn count_below(values: &[Decimal], target: Decimal) -> Decimal {
    let below = values.iter().filter(|&&v| v < target).count();
    Decimal::from(below as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_three_peer_scenario() {
        let values = [dec!(10), dec!(20), dec!(30)];
        let s = summarize_values(&values, Metric::Scope1Emissions, dec!(20)).unwrap();

        assert_eq!(s.mean, dec!(20));
        assert_eq!(s.median, dec!(20));
        assert_eq!(s.peer_count, 3);
        // 1 of 3 values below 20
        assert_eq!(s.percentile_rank.round_dp(1), dec!(33.3));
    }

    #[test]
    fn test_even_count_median_averages_centre() {
        let values = [dec!(40), dec!(10), dec!(30), dec!(20)];
        let s = summarize_values(&values, Metric::Scope2Emissions, dec!(10)).unwrap();
        assert_eq!(s.median, dec!(25));
        assert_eq!(s.mean, dec!(25));
        assert_eq!(s.percentile_rank, dec!(0));
    }

    #[test]
    fn test_ties_are_not_counted_below() {
        let values = [dec!(5), dec!(5), dec!(5), dec!(10)];
        let s = summarize_values(&values, Metric::Scope3Emissions, dec!(5)).unwrap();
        assert_eq!(s.percentile_rank, dec!(0));

        let s = summarize_values(&values, Metric::Scope3Emissions, dec!(10)).unwrap();
        assert_eq!(s.percentile_rank, dec!(75));
    }

    #[test]
    fn test_sole_maximum_rank() {
        let values = [dec!(1), dec!(2), dec!(3), dec!(4), dec!(9)];
        let s = summarize_values(&values, Metric::MinSustainableShare, dec!(9)).unwrap();
        // 100 * (N - 1) / N
        assert_eq!(s.percentile_rank, dec!(80));
    }

    #[test]
    fn test_single_peer() {
        let s = summarize_values(&[dec!(7.5)], Metric::ActualSustainableShare, dec!(7.5)).unwrap();
        assert_eq!(s.mean, dec!(7.5));
        assert_eq!(s.median, dec!(7.5));
        assert_eq!(s.percentile_rank, dec!(0));
        assert_eq!(s.peer_count, 1);
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let err = summarize_values(&[], Metric::Scope1Emissions, dec!(1)).unwrap_err();
        assert!(err.is_soft());
    }

    #[test]
    fn test_percentile_monotonic_in_user_value() {
        let values = [dec!(3), dec!(8), dec!(8), dec!(15), dec!(21), dec!(40)];
        let mut last = dec!(-1);
        for step in 0..50 {
            let user = Decimal::from(step);
            let s = summarize_values(&values, Metric::Scope1Emissions, user).unwrap();
            assert!(s.percentile_rank >= last, "rank decreased at {user}");
            last = s.percentile_rank;
        }
    }

    #[test]
    fn test_mean_and_median_within_range() {
        let sets: [&[Decimal]; 4] = [
            &[dec!(1)],
            &[dec!(0), dec!(100)],
            &[dec!(3.3), dec!(1.1), dec!(2.2), dec!(9.9), dec!(4.4)],
            &[dec!(-5), dec!(12.25), dec!(7), dec!(7)],
        ];
        for values in sets {
            let min = values.iter().copied().min().unwrap();
            let max = values.iter().copied().max().unwrap();
            let s = summarize_values(values, Metric::Scope2Emissions, values[0]).unwrap();
            assert!(s.mean >= min && s.mean <= max);
            assert!(s.median >= min && s.median <= max);
        }
    }

    #[test]
    fn test_describe_formats_one_decimal() {
        let values = [dec!(10), dec!(20), dec!(30)];
        let s = summarize_values(&values, Metric::Scope1Emissions, dec!(20)).unwrap();
        assert_eq!(
            s.describe("DE000A1EWWW0"),
            vec![
                "ISIN: DE000A1EWWW0",
                "Scope 1 Emissionen (in MT): 20.0",
                "Anzahl ISINs Peergroup: 3",
                "Mittelwert: 20.0",
                "Median: 20.0",
                "33.3% der Werte sind kleiner",
            ]
        );
    }

    #[test]
    fn test_sum_beyond_decimal_range_is_skipped() {
        let huge: Decimal = "50000000000000000000000000000".parse().unwrap();
        let err = summarize_values(&[huge, huge], Metric::Scope1Emissions, huge).unwrap_err();
        match err {
            EetError::SkippedMetric { reason, .. } => assert!(reason.contains("decimal range")),
            other => panic!("expected SkippedMetric, got {other:?}"),
        }

        // A single huge value needs no addition.
        let s = summarize_values(&[huge], Metric::Scope1Emissions, huge).unwrap();
        assert_eq!(s.mean, huge);
        assert_eq!(s.median, huge);
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let values = [dec!(1.7), dec!(2.9), dec!(0.3)];
        let a = summarize_values(&values, Metric::Scope1Emissions, dec!(2.9)).unwrap();
        let b = summarize_values(&values, Metric::Scope1Emissions, dec!(2.9)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.mean.serialize(), b.mean.serialize());
    }
}
