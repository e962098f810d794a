use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
    /// Probability density, so the bins integrate to 1 over the edges
    pub density: f64,
}

/// Density histogram over caller-supplied edges
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
    pub total: u64,
}

impl Histogram {
    /// Bins are half-open `[lower, upper)` except the last, which also holds
    /// its upper edge. Values outside the edges, and non-finite values, are
    /// not counted.
    pub fn from_edges(values: &[f64], edges: &[f64]) -> Self {
        if edges.len() < 2 {
            return Self::default();
        }

        let last_bin = edges.len() - 2;
        let (first_edge, last_edge) = (edges[0], edges[edges.len() - 1]);
        let mut counts = vec![0u64; edges.len() - 1];

        for &value in values {
            if !value.is_finite() || value < first_edge || value > last_edge {
                continue;
            }
            let idx = edges.partition_point(|edge| *edge <= value) - 1;
            counts[idx.min(last_bin)] += 1;
        }

        let total: u64 = counts.iter().sum();
        let bins = edges
            .windows(2)
            .zip(counts)
            .map(|(pair, count)| {
                let width = pair[1] - pair[0];
                let density = if total > 0 && width > 0.0 {
                    count as f64 / (total as f64 * width)
                } else {
                    0.0
                };
                HistogramBin {
                    lower: pair[0],
                    upper: pair[1],
                    count,
                    density,
                }
            })
            .collect();

        Self { bins, total }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
