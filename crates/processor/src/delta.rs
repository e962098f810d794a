use chrono::{DateTime, Utc};
use ingestor::types::{Counter, CounterRecord, counter_column};
use serde::Serialize;
use tracing::debug;

/// Difference between two consecutive readings of a monotonic counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CounterDelta {
    Observed(u64),
    /// The counter went backwards (interface reset, reboot or rollover)
    Reset,
}

impl CounterDelta {
    /// Value used for rate computation: a reset contributes nothing
    pub fn coerced(self) -> u64 {
        match self {
            CounterDelta::Observed(delta) => delta,
            CounterDelta::Reset => 0,
        }
    }

    pub fn is_reset(self) -> bool {
        matches!(self, CounterDelta::Reset)
    }
}

/// Difference a counter column. The output has the same length as the input
/// and starts with `Observed(0)`.
pub fn reset_safe_deltas(values: &[u64]) -> Vec<CounterDelta> {
    if values.is_empty() {
        return Vec::new();
    }

    std::iter::once(CounterDelta::Observed(0))
        .chain(values.windows(2).map(|pair| {
            pair[1]
                .checked_sub(pair[0])
                .map_or(CounterDelta::Reset, CounterDelta::Observed)
        }))
        .collect()
}

/// Seconds elapsed since the previous sample. `None` for the first sample and
/// for any non-positive interval (duplicate or skewed timestamps).
pub fn elapsed_seconds(timestamps: &[DateTime<Utc>]) -> Vec<Option<f64>> {
    if timestamps.is_empty() {
        return Vec::new();
    }

    std::iter::once(None)
        .chain(timestamps.windows(2).map(|pair| {
            let delta = pair[1] - pair[0];
            let secs = match delta.num_microseconds() {
                Some(us) => us as f64 / 1e6,
                None => delta.num_milliseconds() as f64 / 1e3,
            };
            (secs > 0.0).then_some(secs)
        }))
        .collect()
}

/// Per-interval deltas derived from a consecutive pair of records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaSample {
    pub timestamp: DateTime<Utc>,
    /// Interval length in seconds, always > 0 when present
    pub elapsed: Option<f64>,
    pub received_bytes: CounterDelta,
    pub sent_bytes: CounterDelta,
    pub received_unicast_packets: CounterDelta,
    pub sent_unicast_packets: CounterDelta,
    pub received_discards: CounterDelta,
    pub received_errors: CounterDelta,
}

impl DeltaSample {
    pub fn get(&self, counter: Counter) -> CounterDelta {
        match counter {
            Counter::ReceivedBytes => self.received_bytes,
            Counter::SentBytes => self.sent_bytes,
            Counter::ReceivedUnicastPackets => self.received_unicast_packets,
            Counter::SentUnicastPackets => self.sent_unicast_packets,
            Counter::ReceivedDiscards => self.received_discards,
            Counter::ReceivedErrors => self.received_errors,
        }
    }
}

/// Difference every counter column of a timestamp-ordered record sequence independently
pub fn build_delta_samples(records: &[CounterRecord]) -> Vec<DeltaSample> {
    let timestamps: Vec<DateTime<Utc>> = records.iter().map(|r| r.timestamp).collect();
    let elapsed = elapsed_seconds(&timestamps);
    let columns: Vec<Vec<CounterDelta>> = Counter::ALL
        .iter()
        .map(|&counter| reset_safe_deltas(&counter_column(records, counter)))
        .collect();

    let samples: Vec<DeltaSample> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let delta = |counter: Counter| columns[counter.index()][i];
            DeltaSample {
                timestamp: record.timestamp,
                elapsed: elapsed[i],
                received_bytes: delta(Counter::ReceivedBytes),
                sent_bytes: delta(Counter::SentBytes),
                received_unicast_packets: delta(Counter::ReceivedUnicastPackets),
                sent_unicast_packets: delta(Counter::SentUnicastPackets),
                received_discards: delta(Counter::ReceivedDiscards),
                received_errors: delta(Counter::ReceivedErrors),
            }
        })
        .collect();

    let invalid_intervals = samples.iter().skip(1).filter(|s| s.elapsed.is_none()).count();
    debug!(
        "Built {} delta samples ({} invalid intervals)",
        samples.len(),
        invalid_intervals
    );

    samples
}

/// Number of resets observed on one counter
pub fn count_resets(samples: &[DeltaSample], counter: Counter) -> usize {
    samples.iter().filter(|s| s.get(counter).is_reset()).count()
}
