use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How a sample set is meant to be viewed.
///
/// Log-scale quantities (packet sizes, inter-arrival times, file sizes) only
/// keep strictly positive values; linear ones keep every finite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scale {
    Linear,
    Log,
}

impl Scale {
    pub fn accepts(self, value: f64) -> bool {
        value.is_finite()
            && match self {
                Scale::Linear => true,
                Scale::Log => value > 0.0,
            }
    }
}

/// Summary statistics of one sample set. Every statistic is `None` when no
/// value survived filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub p50: Option<f64>,
    pub p95: Option<f64>,
    pub p99: Option<f64>,
    pub max: Option<f64>,
}

impl DistributionSummary {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Point on a complementary CDF: fraction of the sample strictly above `value`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CcdfPoint {
    pub value: f64,
    pub exceedance: f64,
}

/// Keep the values the scale accepts, sorted ascending
pub fn filter_sorted<I>(values: I, scale: Scale) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut filtered: Vec<f64> = values.into_iter().filter(|v| scale.accepts(*v)).collect();
    filtered.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    filtered
}

pub fn summarize(values: &[f64], scale: Scale) -> DistributionSummary {
    summarize_sorted(&filter_sorted(values.iter().copied(), scale))
}

/// Summarize a series whose undefined entries are `None`
pub fn summarize_defined(values: &[Option<f64>], scale: Scale) -> DistributionSummary {
    summarize_sorted(&filter_sorted(values.iter().flatten().copied(), scale))
}

/// Summarize values that are already filtered and sorted ascending
pub fn summarize_sorted(sorted: &[f64]) -> DistributionSummary {
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return DistributionSummary::default();
    };

    let count = sorted.len();
    let sum: f64 = sorted.iter().sum();

    DistributionSummary {
        count,
        mean: Some(sum / count as f64),
        min: Some(min),
        p50: percentile(sorted, 0.50),
        p95: percentile(sorted, 0.95),
        p99: percentile(sorted, 0.99),
        max: Some(max),
    }
}

/// Percentile `q` (0..=1) of sorted values, linearly interpolating between
/// the order statistics around rank `q * (n - 1)`
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }

    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;

    Some(if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * frac
    })
}

/// Complementary CDF over the finite, strictly positive values.
///
/// For the k-th smallest of n values the exceedance is `1 - k/n`. Repeated
/// values collapse onto their last occurrence, which is exactly the fraction
/// of the sample strictly greater than them. The curve is strictly
/// decreasing and every exceedance lies in `[0, 1)`.
pub fn ccdf(values: &[f64]) -> Vec<CcdfPoint> {
    ccdf_sorted(&filter_sorted(values.iter().copied(), Scale::Log))
}

/// [`ccdf`] over values already filtered to positive and sorted ascending
pub fn ccdf_sorted(sorted: &[f64]) -> Vec<CcdfPoint> {
    let n = sorted.len() as f64;
    let mut points: Vec<CcdfPoint> = Vec::new();

    for (idx, &value) in sorted.iter().enumerate() {
        let exceedance = 1.0 - (idx + 1) as f64 / n;
        match points.last_mut() {
            Some(last) if last.value == value => last.exceedance = exceedance,
            _ => points.push(CcdfPoint { value, exceedance }),
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_size_summary() {
        let summary = summarize(&[1.0, 10.0, 100.0, 1000.0, 10000.0], Scale::Log);

        assert_eq!(summary.count, 5);
        assert_eq!(summary.p50, Some(100.0));
        assert_eq!(summary.max, Some(10000.0));
        assert_eq!(summary.min, Some(1.0));
        assert_eq!(summary.mean, Some(2222.2));
        let p95 = summary.p95.unwrap();
        assert!((p95 - 8200.0).abs() < 1e-9);
        let p99 = summary.p99.unwrap();
        assert!((p99 - 9640.0).abs() < 1e-9);
    }

    #[test]
    fn test_scale_filters() {
        let values = [0.0, -3.0, f64::NAN, f64::INFINITY, 4.0, 2.0];

        let linear = summarize(&values, Scale::Linear);
        assert_eq!(linear.count, 4);
        assert_eq!(linear.min, Some(-3.0));
        assert_eq!(linear.p50, Some(1.0));

        let log = summarize(&values, Scale::Log);
        assert_eq!(log.count, 2);
        assert_eq!(log.p50, Some(3.0));
    }

    #[test]
    fn test_empty_summary_is_undefined() {
        let summary = summarize_defined(&[None, None, Some(f64::NAN)], Scale::Linear);
        assert!(summary.is_empty());
        assert_eq!(summary, DistributionSummary::default());
        assert_eq!(summary.mean, None);
        assert_eq!(summary.p99, None);
    }

    #[test]
    fn test_summary_is_deterministic() {
        let values = [3.5, 0.2, 9.0, 9.0, 1e6, 42.0];
        assert_eq!(
            summarize(&values, Scale::Log),
            summarize(&values, Scale::Log)
        );
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile(&sorted, 0.0), Some(10.0));
        assert_eq!(percentile(&sorted, 0.5), Some(25.0));
        assert_eq!(percentile(&sorted, 1.0), Some(40.0));
        assert_eq!(percentile(&[7.0], 0.95), Some(7.0));
        assert_eq!(percentile(&[], 0.5), None);
        assert_eq!(percentile(&sorted, 1.5), None);
    }

    #[test]
    fn test_ccdf_shape() {
        let points = ccdf(&[1.0, 10.0, 100.0, 1000.0, 10000.0]);
        let exceedances: Vec<f64> = points.iter().map(|p| p.exceedance).collect();

        assert_eq!(points.len(), 5);
        assert_eq!(points[0].value, 1.0);
        assert!((exceedances[0] - 0.8).abs() < 1e-12);
        assert_eq!(exceedances[4], 0.0);
    }

    #[test]
    fn test_ccdf_monotone_and_bounded_with_duplicates() {
        let points = ccdf(&[5.0, 1.0, 5.0, 0.0, -1.0, 2.0, 5.0, 9.0, f64::NAN]);

        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 5.0, 9.0]);
        // 6 positive values: 1, 2, 5, 5, 5, 9
        assert!((points[2].exceedance - 1.0 / 6.0).abs() < 1e-12);

        assert!(points.windows(2).all(|w| w[0].exceedance >= w[1].exceedance));
        assert!(points.iter().all(|p| (0.0..1.0).contains(&p.exceedance)));
    }

    #[test]
    fn test_ccdf_empty() {
        assert!(ccdf(&[0.0, -2.0]).is_empty());
    }
}
