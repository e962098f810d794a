use crate::{
    bins::{FILE_SIZE_OFFSET, log_bin_edges},
    distribution::{
        CcdfPoint, DistributionSummary, Scale, ccdf_sorted, filter_sorted, summarize_sorted,
    },
    histogram::Histogram,
};
use serde::Serialize;
use tracing::{info, warn};

pub const DEFAULT_FILE_SIZE_BINS: usize = 60;

/// Size distribution of the files seen by a directory scan
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileSizeAnalysis {
    /// Files sampled, including empty ones
    pub files_scanned: usize,
    /// Empty files; they have no place on a log axis and are left out of the statistics
    pub empty_files: usize,
    pub summary: DistributionSummary,
    pub histogram: Histogram,
    pub ccdf: Vec<CcdfPoint>,
    /// Positive sizes, ascending
    pub sorted_sizes: Vec<f64>,
}

impl FileSizeAnalysis {
    pub fn from_sizes(sizes: &[u64], bins: usize) -> Self {
        let sorted = filter_sorted(sizes.iter().map(|&s| s as f64), Scale::Log);
        let empty_files = sizes.iter().filter(|s| **s == 0).count();

        if sorted.is_empty() {
            warn!(
                "No non-empty files among {} sampled, file size statistics are undefined",
                sizes.len()
            );
        }

        let edges = log_bin_edges(&sorted, bins, FILE_SIZE_OFFSET);
        let analysis = Self {
            files_scanned: sizes.len(),
            empty_files,
            summary: summarize_sorted(&sorted),
            histogram: Histogram::from_edges(&sorted, &edges),
            ccdf: ccdf_sorted(&sorted),
            sorted_sizes: sorted,
        };

        info!(
            "File size analysis: scanned={}, empty={}, distinct_sizes={}",
            analysis.files_scanned,
            analysis.empty_files,
            analysis.ccdf.len()
        );
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decades_of_sizes() {
        let analysis = FileSizeAnalysis::from_sizes(&[10000, 1, 1000, 10, 100], 10);

        assert_eq!(analysis.files_scanned, 5);
        assert_eq!(analysis.summary.p50, Some(100.0));
        assert_eq!(analysis.summary.max, Some(10000.0));
        assert_eq!(analysis.histogram.bins.len(), 10);
        assert_eq!(analysis.histogram.total, 5);
        assert_eq!(
            analysis.sorted_sizes,
            vec![1.0, 10.0, 100.0, 1000.0, 10000.0]
        );
        assert_eq!(analysis.ccdf.last().map(|p| p.exceedance), Some(0.0));
    }

    #[test]
    fn test_empty_files_left_out() {
        let analysis = FileSizeAnalysis::from_sizes(&[0, 0, 4096], 60);
        assert_eq!(analysis.files_scanned, 3);
        assert_eq!(analysis.empty_files, 2);
        assert_eq!(analysis.summary.count, 1);
        assert_eq!(analysis.summary.mean, Some(4096.0));
    }

    #[test]
    fn test_no_files() {
        let analysis = FileSizeAnalysis::from_sizes(&[], 60);
        assert!(analysis.summary.is_empty());
        assert!(analysis.ccdf.is_empty());
        assert!(analysis.histogram.is_empty());
        assert_eq!(analysis.histogram.bins.len(), 60);
    }
}
