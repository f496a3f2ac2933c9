use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::model::CellValue;

// ---------------------------------------------------------------------------
// Aggregate series: category → number
// ---------------------------------------------------------------------------

/// A per-category summary used as chart input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateSeries {
    /// The grouping column.
    pub column: String,
    /// (category, value) pairs in category order.
    pub entries: Vec<(CellValue, f64)>,
}

impl AggregateSeries {
    pub fn from_counts(column: &str, counts: BTreeMap<CellValue, usize>) -> Self {
        AggregateSeries {
            column: column.to_string(),
            entries: counts.into_iter().map(|(k, n)| (k, n as f64)).collect(),
        }
    }

    /// Groups whose mean is undefined (all values null) are dropped.
    pub fn from_means(column: &str, means: BTreeMap<CellValue, Option<f64>>) -> Self {
        AggregateSeries {
            column: column.to_string(),
            entries: means
                .into_iter()
                .filter_map(|(k, m)| m.map(|m| (k, m)))
                .collect(),
        }
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    /// Share of the total per category; empty when the total is zero.
    pub fn proportions(&self) -> Vec<(CellValue, f64)> {
        let total = self.total();
        if total <= 0.0 {
            return Vec::new();
        }
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v / total))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins over the observed range of `values`.
///
/// Nulls and non-finite values are ignored. The last bin is closed on the
/// right. When every value is identical a single unit-wide bin is returned.
pub fn histogram(values: &[Option<f64>], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range.abs() < f64::EPSILON {
        return vec![HistogramBin {
            start: min - 0.5,
            end: min + 0.5,
            count: finite.len(),
        }];
    }

    let width = range / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportions_sum_to_one() {
        let mut counts = BTreeMap::new();
        counts.insert(CellValue::Text("F".into()), 3);
        counts.insert(CellValue::Text("M".into()), 1);
        let series = AggregateSeries::from_counts("Gender", counts);
        assert_eq!(series.total(), 4.0);
        let p = series.proportions();
        assert_eq!(p[0].1, 0.75);
        assert!((p.iter().map(|(_, v)| v).sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_series_has_no_proportions() {
        let series = AggregateSeries::from_counts("Gender", BTreeMap::new());
        assert!(series.proportions().is_empty());
    }

    #[test]
    fn undefined_means_are_dropped() {
        let mut means = BTreeMap::new();
        means.insert(CellValue::Text("A".into()), Some(2.0));
        means.insert(CellValue::Null, None);
        let series = AggregateSeries::from_means("Edu", means);
        assert_eq!(series.entries, vec![(CellValue::Text("A".into()), 2.0)]);
    }

    #[test]
    fn histogram_counts_every_value() {
        let values: Vec<Option<f64>> = (0..=100).map(|i| Some(i as f64)).chain([None]).collect();
        let bins = histogram(&values, 20);
        assert_eq!(bins.len(), 20);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 101);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[19].end, 100.0);
        // max lands in the last bin
        assert_eq!(bins[19].count, 6);
    }

    #[test]
    fn histogram_of_constant_values() {
        let bins = histogram(&[Some(3.0), Some(3.0)], 20);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);
    }

    #[test]
    fn histogram_of_nothing() {
        assert!(histogram(&[], 20).is_empty());
        assert!(histogram(&[None], 20).is_empty());
    }
}
