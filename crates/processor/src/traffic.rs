use crate::{
    bins::{INTER_ARRIVAL_OFFSET, PACKET_SIZE_OFFSET, log_bin_edges},
    delta::{build_delta_samples, count_resets},
    distribution::{DistributionSummary, Scale, summarize_defined},
    error::{Error, Result},
    histogram::Histogram,
    rates::{RateMetric, RateSample, derive_rates, metric_column},
    smoothing::{DEFAULT_SMOOTHING_WINDOW, SeriesPoint, smooth_series},
};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ingestor::{
    jsonl::order_by_timestamp,
    types::{Counter, CounterRecord},
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tracing::{debug, info, warn};

/// Series that get a rolling-median companion for time plots
pub const SMOOTHED_METRICS: [RateMetric; 4] = [
    RateMetric::BpsReceived,
    RateMetric::BpsSent,
    RateMetric::PpsReceived,
    RateMetric::PpsSent,
];

/// Series summarized in the report, with the scale their statistics use
pub const SUMMARY_METRICS: [(RateMetric, Scale); 10] = [
    (RateMetric::BpsReceived, Scale::Linear),
    (RateMetric::BpsSent, Scale::Linear),
    (RateMetric::PpsReceived, Scale::Linear),
    (RateMetric::PpsSent, Scale::Linear),
    (RateMetric::AvgPacketSizeReceived, Scale::Log),
    (RateMetric::AvgPacketSizeSent, Scale::Log),
    (RateMetric::InterArrivalReceived, Scale::Log),
    (RateMetric::InterArrivalSent, Scale::Log),
    (RateMetric::DiscardsPerSec, Scale::Linear),
    (RateMetric::ErrorsPerSec, Scale::Linear),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficParams {
    pub smoothing_window: usize,
    pub packet_size_bins: usize,
    pub inter_arrival_bins: usize,
}

impl Default for TrafficParams {
    fn default() -> Self {
        Self {
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            packet_size_bins: 50,
            inter_arrival_bins: 50,
        }
    }
}

/// Everything derived from one counter record file
#[derive(Debug, Clone, Serialize)]
pub struct TrafficAnalysis {
    pub rates: Vec<RateSample>,
    /// Keyed `<metric>_smooth`, aligned with `rates`
    pub smoothed: IndexMap<String, Vec<SeriesPoint>>,
    pub summaries: IndexMap<String, DistributionSummary>,
    /// Per-direction histograms; both directions of a quantity share edges
    pub histograms: IndexMap<String, Histogram>,
    /// Resets seen per counter
    pub resets: IndexMap<String, usize>,
}

impl Display for TrafficAnalysis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let total_resets: usize = self.resets.values().sum();
        write!(
            f,
            "TrafficAnalysis: samples={}, smoothed_series={}, summaries={}, histograms={}, resets={}",
            self.rates.len(),
            self.smoothed.len(),
            self.summaries.len(),
            self.histograms.len(),
            total_resets,
        )
    }
}

impl TrafficAnalysis {
    pub fn run(records: Vec<CounterRecord>, params: &TrafficParams) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::NoRecords);
        }
        if params.smoothing_window == 0 {
            return Err(Error::InvalidWindow(params.smoothing_window));
        }

        let records = order_by_timestamp(records);
        let deltas = build_delta_samples(&records);

        let resets: IndexMap<String, usize> = Counter::ALL
            .iter()
            .map(|&counter| (counter.field_name().to_string(), count_resets(&deltas, counter)))
            .collect();
        for (counter, count) in resets.iter().filter(|(_, count)| **count > 0) {
            debug!("{} resets detected on {}", count, counter);
        }

        let rates = derive_rates(&deltas);
        let timestamps: Vec<DateTime<Utc>> = rates.iter().map(|r| r.timestamp).collect();

        let smoothed = SMOOTHED_METRICS
            .iter()
            .map(|&metric| {
                let series = smooth_series(
                    &timestamps,
                    &metric_column(&rates, metric),
                    params.smoothing_window,
                )?;
                Ok((format!("{}_smooth", metric.name()), series))
            })
            .collect::<Result<IndexMap<_, _>>>()?;

        // Independent series, summarized in parallel; collect keeps the declared order
        let summaries: IndexMap<String, DistributionSummary> = SUMMARY_METRICS
            .par_iter()
            .map(|&(metric, scale)| {
                let summary = summarize_defined(&metric_column(&rates, metric), scale);
                (metric.name().to_string(), summary)
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect();

        for (name, summary) in summaries.iter().filter(|(_, s)| s.is_empty()) {
            warn!("No valid values for {}, statistics are undefined", name);
        }

        let mut histograms = IndexMap::new();
        histograms.extend(paired_histograms(
            &rates,
            [
                RateMetric::AvgPacketSizeReceived,
                RateMetric::AvgPacketSizeSent,
            ],
            params.packet_size_bins,
            PACKET_SIZE_OFFSET,
        ));
        histograms.extend(paired_histograms(
            &rates,
            [
                RateMetric::InterArrivalReceived,
                RateMetric::InterArrivalSent,
            ],
            params.inter_arrival_bins,
            INTER_ARRIVAL_OFFSET,
        ));

        let analysis = Self {
            rates,
            smoothed,
            summaries,
            histograms,
            resets,
        };
        info!("{}", analysis);

        Ok(analysis)
    }

    pub fn summary(&self, metric: RateMetric) -> Option<&DistributionSummary> {
        self.summaries.get(metric.name())
    }

    pub fn column(&self, metric: RateMetric) -> Vec<Option<f64>> {
        metric_column(&self.rates, metric)
    }
}

/// Histograms for two directions of the same quantity over shared log edges,
/// so they can be drawn on one axis
fn paired_histograms(
    rates: &[RateSample],
    metrics: [RateMetric; 2],
    bins: usize,
    offset: f64,
) -> Vec<(String, Histogram)> {
    let columns: Vec<Vec<f64>> = metrics
        .iter()
        .map(|&metric| {
            metric_column(rates, metric)
                .into_iter()
                .flatten()
                .collect()
        })
        .collect();

    let combined: Vec<f64> = columns.iter().flatten().copied().collect();
    let edges = log_bin_edges(&combined, bins, offset);

    metrics
        .iter()
        .zip(&columns)
        .map(|(metric, values)| {
            (
                metric.name().to_string(),
                Histogram::from_edges(values, &edges),
            )
        })
        .collect()
}
