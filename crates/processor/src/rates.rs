//! Per-interval rates derived from counter deltas.
//!
//! A rate is `None` whenever its denominator is missing or zero. Nothing in
//! here ever yields an infinite or NaN value.

use crate::delta::{CounterDelta, DeltaSample};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Rates for one traffic direction over one sampling interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DirectionRates {
    /// Bytes per second
    pub bps: Option<f64>,
    /// Packets per second
    pub pps: Option<f64>,
    /// Mean bytes per packet over the interval
    pub avg_packet_size: Option<f64>,
    /// Seconds between packets, approximated as `1 / pps`.
    ///
    /// Only cumulative counters are observed, so true per-packet timing is
    /// unknowable; this is the mean spacing assuming packets were spread
    /// evenly over the interval.
    pub inter_arrival: Option<f64>,
}

/// `delta / elapsed`, undefined when the interval is
pub fn per_second(delta: u64, elapsed: Option<f64>) -> Option<f64> {
    elapsed
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .map(|secs| delta as f64 / secs)
}

pub fn derive_direction(
    elapsed: Option<f64>,
    bytes: CounterDelta,
    packets: CounterDelta,
) -> DirectionRates {
    let byte_delta = bytes.coerced();
    let packet_delta = packets.coerced();

    let bps = per_second(byte_delta, elapsed);
    let pps = per_second(packet_delta, elapsed);
    let avg_packet_size = (packet_delta > 0).then(|| byte_delta as f64 / packet_delta as f64);
    let inter_arrival = pps.filter(|rate| *rate > 0.0).map(|rate| 1.0 / rate);

    DirectionRates {
        bps,
        pps,
        avg_packet_size,
        inter_arrival,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSample {
    pub timestamp: DateTime<Utc>,
    pub received: DirectionRates,
    pub sent: DirectionRates,
    pub discards_per_sec: Option<f64>,
    pub errors_per_sec: Option<f64>,
}

impl RateSample {
    pub fn from_delta(delta: &DeltaSample) -> Self {
        Self {
            timestamp: delta.timestamp,
            received: derive_direction(
                delta.elapsed,
                delta.received_bytes,
                delta.received_unicast_packets,
            ),
            sent: derive_direction(delta.elapsed, delta.sent_bytes, delta.sent_unicast_packets),
            discards_per_sec: per_second(delta.received_discards.coerced(), delta.elapsed),
            errors_per_sec: per_second(delta.received_errors.coerced(), delta.elapsed),
        }
    }

    pub fn get(&self, metric: RateMetric) -> Option<f64> {
        match metric {
            RateMetric::BpsReceived => self.received.bps,
            RateMetric::BpsSent => self.sent.bps,
            RateMetric::PpsReceived => self.received.pps,
            RateMetric::PpsSent => self.sent.pps,
            RateMetric::AvgPacketSizeReceived => self.received.avg_packet_size,
            RateMetric::AvgPacketSizeSent => self.sent.avg_packet_size,
            RateMetric::InterArrivalReceived => self.received.inter_arrival,
            RateMetric::InterArrivalSent => self.sent.inter_arrival,
            RateMetric::DiscardsPerSec => self.discards_per_sec,
            RateMetric::ErrorsPerSec => self.errors_per_sec,
        }
    }
}

/// Named columns of a rate series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RateMetric {
    BpsReceived,
    BpsSent,
    PpsReceived,
    PpsSent,
    AvgPacketSizeReceived,
    AvgPacketSizeSent,
    InterArrivalReceived,
    InterArrivalSent,
    DiscardsPerSec,
    ErrorsPerSec,
}

impl RateMetric {
    pub const ALL: [RateMetric; 10] = [
        RateMetric::BpsReceived,
        RateMetric::BpsSent,
        RateMetric::PpsReceived,
        RateMetric::PpsSent,
        RateMetric::AvgPacketSizeReceived,
        RateMetric::AvgPacketSizeSent,
        RateMetric::InterArrivalReceived,
        RateMetric::InterArrivalSent,
        RateMetric::DiscardsPerSec,
        RateMetric::ErrorsPerSec,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            RateMetric::BpsReceived => "bps_recv",
            RateMetric::BpsSent => "bps_sent",
            RateMetric::PpsReceived => "pps_recv",
            RateMetric::PpsSent => "pps_sent",
            RateMetric::AvgPacketSizeReceived => "avg_pkt_size_recv",
            RateMetric::AvgPacketSizeSent => "avg_pkt_size_sent",
            RateMetric::InterArrivalReceived => "iat_recv",
            RateMetric::InterArrivalSent => "iat_sent",
            RateMetric::DiscardsPerSec => "discards_per_sec",
            RateMetric::ErrorsPerSec => "errors_per_sec",
        }
    }
}

impl Display for RateMetric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub fn derive_rates(deltas: &[DeltaSample]) -> Vec<RateSample> {
    deltas.iter().map(RateSample::from_delta).collect()
}

/// One column of a rate series, aligned with the input samples
pub fn metric_column(rates: &[RateSample], metric: RateMetric) -> Vec<Option<f64>> {
    rates.iter().map(|r| r.get(metric)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_rates() {
        let rates = derive_direction(
            Some(2.0),
            CounterDelta::Observed(3000),
            CounterDelta::Observed(4),
        );
        assert_eq!(rates.bps, Some(1500.0));
        assert_eq!(rates.pps, Some(2.0));
        assert_eq!(rates.avg_packet_size, Some(750.0));
        assert_eq!(rates.inter_arrival, Some(0.5));
    }

    #[test]
    fn test_undefined_elapsed_yields_undefined_rates() {
        let rates = derive_direction(None, CounterDelta::Observed(10), CounterDelta::Observed(2));
        assert_eq!(rates.bps, None);
        assert_eq!(rates.pps, None);
        assert_eq!(rates.inter_arrival, None);
        // Packet size does not depend on the interval length
        assert_eq!(rates.avg_packet_size, Some(5.0));
    }

    #[test]
    fn test_zero_packets() {
        let rates = derive_direction(
            Some(1.0),
            CounterDelta::Observed(10),
            CounterDelta::Observed(0),
        );
        assert_eq!(rates.pps, Some(0.0));
        assert_eq!(rates.avg_packet_size, None);
        assert_eq!(rates.inter_arrival, None);
    }

    #[test]
    fn test_reset_coerces_to_zero_rate() {
        let rates = derive_direction(Some(1.0), CounterDelta::Reset, CounterDelta::Reset);
        assert_eq!(rates.bps, Some(0.0));
        assert_eq!(rates.avg_packet_size, None);
    }

    #[test]
    fn test_per_second_rejects_bad_intervals() {
        assert_eq!(per_second(10, Some(0.0)), None);
        assert_eq!(per_second(10, Some(-1.0)), None);
        assert_eq!(per_second(10, Some(f64::NAN)), None);
        assert_eq!(per_second(10, Some(4.0)), Some(2.5));
    }

    #[test]
    fn test_metric_names_unique() {
        let mut names: Vec<&str> = RateMetric::ALL.iter().map(|m| m.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), RateMetric::ALL.len());
    }
}
