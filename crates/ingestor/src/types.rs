use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Monotonic interface counters carried by every sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    ReceivedBytes,
    SentBytes,
    ReceivedUnicastPackets,
    SentUnicastPackets,
    ReceivedDiscards,
    ReceivedErrors,
}

impl Counter {
    pub const ALL: [Counter; 6] = [
        Counter::ReceivedBytes,
        Counter::SentBytes,
        Counter::ReceivedUnicastPackets,
        Counter::SentUnicastPackets,
        Counter::ReceivedDiscards,
        Counter::ReceivedErrors,
    ];

    /// Key used for this counter in the record stream
    pub const fn field_name(self) -> &'static str {
        match self {
            Counter::ReceivedBytes => "received_bytes",
            Counter::SentBytes => "sent_bytes",
            Counter::ReceivedUnicastPackets => "received_unicast_packets",
            Counter::SentUnicastPackets => "sent_unicast_packets",
            Counter::ReceivedDiscards => "received_discards",
            Counter::ReceivedErrors => "received_errors",
        }
    }

    /// Position of this counter in [`Counter::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl Display for Counter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

/// One observation of the interface counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterRecord {
    pub timestamp: DateTime<Utc>,
    pub received_bytes: u64,
    pub sent_bytes: u64,
    pub received_unicast_packets: u64,
    pub sent_unicast_packets: u64,
    pub received_discards: u64,
    pub received_errors: u64,
}

impl CounterRecord {
    pub const TIMESTAMP_FIELD: &'static str = "timestamp";

    pub const REQUIRED_FIELDS: [&'static str; 7] = [
        Self::TIMESTAMP_FIELD,
        Counter::ReceivedBytes.field_name(),
        Counter::SentBytes.field_name(),
        Counter::ReceivedUnicastPackets.field_name(),
        Counter::SentUnicastPackets.field_name(),
        Counter::ReceivedDiscards.field_name(),
        Counter::ReceivedErrors.field_name(),
    ];

    /// Record with every counter at zero, mostly useful for building fixtures
    pub fn zeroed(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            received_bytes: 0,
            sent_bytes: 0,
            received_unicast_packets: 0,
            sent_unicast_packets: 0,
            received_discards: 0,
            received_errors: 0,
        }
    }

    pub fn get(&self, counter: Counter) -> u64 {
        match counter {
            Counter::ReceivedBytes => self.received_bytes,
            Counter::SentBytes => self.sent_bytes,
            Counter::ReceivedUnicastPackets => self.received_unicast_packets,
            Counter::SentUnicastPackets => self.sent_unicast_packets,
            Counter::ReceivedDiscards => self.received_discards,
            Counter::ReceivedErrors => self.received_errors,
        }
    }

    pub fn set(&mut self, counter: Counter, value: u64) {
        let slot = match counter {
            Counter::ReceivedBytes => &mut self.received_bytes,
            Counter::SentBytes => &mut self.sent_bytes,
            Counter::ReceivedUnicastPackets => &mut self.received_unicast_packets,
            Counter::SentUnicastPackets => &mut self.sent_unicast_packets,
            Counter::ReceivedDiscards => &mut self.received_discards,
            Counter::ReceivedErrors => &mut self.received_errors,
        };
        *slot = value;
    }
}

/// Extract one counter column from an ordered record sequence
pub fn counter_column(records: &[CounterRecord], counter: Counter) -> Vec<u64> {
    records.iter().map(|r| r.get(counter)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_index_matches_all() {
        for (idx, counter) in Counter::ALL.iter().enumerate() {
            assert_eq!(counter.index(), idx);
        }
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(CounterRecord::REQUIRED_FIELDS[0], "timestamp");
        assert!(CounterRecord::REQUIRED_FIELDS.contains(&"received_unicast_packets"));
        assert_eq!(CounterRecord::REQUIRED_FIELDS.len(), Counter::ALL.len() + 1);
    }

    #[test]
    fn test_get_set_roundtrip_per_counter() {
        let mut record = CounterRecord::zeroed(DateTime::<Utc>::UNIX_EPOCH);
        for (idx, counter) in Counter::ALL.iter().enumerate() {
            record.set(*counter, idx as u64 * 10);
        }
        assert_eq!(record.sent_bytes, 10);
        assert_eq!(record.received_errors, 50);
        assert_eq!(
            counter_column(&[record.clone(), record], Counter::ReceivedDiscards),
            vec![40, 40]
        );
    }
}
