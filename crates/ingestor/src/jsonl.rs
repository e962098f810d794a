//! Reader for the line-delimited JSON files produced by the interface sampler.
//!
//! Every non-blank line is one JSON object carrying a timestamp and the
//! cumulative interface counters. Loading is all-or-nothing: the first
//! malformed or incomplete record aborts the whole load.

use crate::{
    error::{Error, Result},
    types::{Counter, CounterRecord},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};
use tracing::{debug, info};

const BYTE_ORDER_MARK: char = '\u{feff}';

const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Load and validate every record of a JSONL file
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<CounterRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::MissingPath(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_records(BufReader::new(file))?;

    info!(
        "Loaded {} counter records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Parse records from any buffered reader
pub fn parse_records<R: BufRead>(reader: R) -> Result<Vec<CounterRecord>> {
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|source| Error::Line {
            line: line_no,
            source,
        })?;
        let content = if idx == 0 {
            line.trim_start_matches(BYTE_ORDER_MARK)
        } else {
            line.as_str()
        }
        .trim();

        if content.is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(content).map_err(|source| Error::Json {
            line: line_no,
            source,
        })?;
        records.push(parse_record(line_no, &value)?);
    }

    if records.is_empty() {
        return Err(Error::EmptyInput);
    }

    Ok(records)
}

/// Sort records by timestamp. The sort is stable so duplicate timestamps keep file order.
pub fn order_by_timestamp(mut records: Vec<CounterRecord>) -> Vec<CounterRecord> {
    let already_ordered = records
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp);

    if !already_ordered {
        debug!("Records out of timestamp order, sorting {}", records.len());
        records.sort_by_key(|r| r.timestamp);
    }

    let duplicates = records
        .windows(2)
        .filter(|pair| pair[0].timestamp == pair[1].timestamp)
        .count();
    if duplicates > 0 {
        debug!("{} records share a timestamp with their predecessor", duplicates);
    }

    records
}

fn parse_record(line: usize, value: &Value) -> Result<CounterRecord> {
    let object = value.as_object().ok_or(Error::NotAnObject { line })?;

    let mut missing: Vec<&'static str> = CounterRecord::REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| object.get(*field).is_none_or(Value::is_null))
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(Error::MissingFields {
            line,
            fields: missing,
        });
    }

    let raw_timestamp = &object[CounterRecord::TIMESTAMP_FIELD];
    let timestamp = parse_timestamp(raw_timestamp).ok_or_else(|| Error::InvalidField {
        line,
        field: CounterRecord::TIMESTAMP_FIELD,
        value: raw_timestamp.to_string(),
    })?;

    let mut record = CounterRecord::zeroed(timestamp);
    for counter in Counter::ALL {
        record.set(counter, counter_value(line, object, counter)?);
    }

    Ok(record)
}

fn counter_value(line: usize, object: &Map<String, Value>, counter: Counter) -> Result<u64> {
    let field = counter.field_name();
    let raw = &object[field];
    parse_counter(raw).ok_or_else(|| Error::InvalidField {
        line,
        field,
        value: raw.to_string(),
    })
}

/// Counters must be non-negative JSON integers; floats are accepted only when integral
/// and below 2^64
fn parse_counter(value: &Value) -> Option<u64> {
    let Value::Number(number) = value else {
        return None;
    };
    number.as_u64().or_else(|| {
        let v = number.as_f64()?;
        // `u64::MAX as f64` rounds up to 2^64, which is already out of range
        (v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v < u64::MAX as f64)
            .then_some(v as u64)
    })
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                return Some(ts.with_timezone(&Utc));
            }
            NAIVE_TIMESTAMP_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|naive| naive.and_utc())
        }
        // Unix epoch seconds
        Value::Number(number) => {
            let secs = number.as_f64()?;
            if !secs.is_finite() {
                return None;
            }
            let whole = secs.floor();
            let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
            DateTime::from_timestamp(whole as i64, nanos)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Cursor;

    fn line(ts: &str, received_bytes: u64) -> String {
        format!(
            r#"{{"timestamp":"{ts}","received_bytes":{received_bytes},"sent_bytes":10,"received_unicast_packets":2,"sent_unicast_packets":1,"received_discards":0,"received_errors":0}}"#
        )
    }

    #[test]
    fn test_parse_valid_records() {
        let input = format!(
            "{}\n{}\n",
            line("2024-05-01T10:00:00Z", 100),
            line("2024-05-01T10:00:05Z", 250)
        );
        let records = parse_records(Cursor::new(input)).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].received_bytes, 250);
        assert_eq!(records[0].sent_unicast_packets, 1);
        assert_eq!(
            records[1].timestamp,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 5).unwrap()
        );
    }

    #[test]
    fn test_skips_bom_and_blank_lines() {
        let input = format!(
            "\u{feff}{}\n\n   \n{}\n",
            line("2024-05-01T10:00:00Z", 1),
            line("2024-05-01T10:00:01Z", 2)
        );
        let records = parse_records(Cursor::new(input)).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_missing_fields_are_enumerated() {
        let input = r#"{"timestamp":"2024-05-01T10:00:00Z","received_bytes":1,"sent_bytes":2}"#;
        let err = parse_records(Cursor::new(input)).unwrap_err();

        match err {
            Error::MissingFields { line, fields } => {
                assert_eq!(line, 1);
                assert_eq!(
                    fields,
                    vec![
                        "received_discards",
                        "received_errors",
                        "received_unicast_packets",
                        "sent_unicast_packets",
                    ]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_null_field_counts_as_missing() {
        let input = line("2024-05-01T10:00:00Z", 1).replace(r#""sent_bytes":10"#, r#""sent_bytes":null"#);
        let err = parse_records(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("sent_bytes"));
    }

    #[test]
    fn test_negative_counter_rejected() {
        let input = line("2024-05-01T10:00:00Z", 1).replace(r#""sent_bytes":10"#, r#""sent_bytes":-4"#);
        let err = parse_records(Cursor::new(input)).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidField {
                field: "sent_bytes",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_json_reports_line() {
        let input = format!("{}\n{{not json\n", line("2024-05-01T10:00:00Z", 1));
        let err = parse_records(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, Error::Json { line: 2, .. }));
    }

    #[test]
    fn test_string_counter_rejected() {
        let input =
            line("2024-05-01T10:00:00Z", 1).replace(r#""sent_bytes":10"#, r#""sent_bytes":"10""#);
        let err = parse_records(Cursor::new(input)).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidField {
                line: 1,
                field: "sent_bytes",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_utf8_reports_line() {
        let mut input = line("2024-05-01T10:00:00Z", 1).into_bytes();
        input.extend_from_slice(b"\n{\"timestamp\":\"\xff\xfe\"}\n");
        let err = parse_records(Cursor::new(input)).unwrap_err();

        assert!(matches!(err, Error::Line { line: 2, .. }));
        assert!(err.to_string().starts_with("line 2:"));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let err = parse_records(Cursor::new("\n\n")).unwrap_err();
        assert!(matches!(err, Error::EmptyInput));
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();

        for raw in [
            Value::from("2024-05-01T10:00:00Z"),
            Value::from("2024-05-01T05:00:00-05:00"),
            Value::from("2024-05-01T10:00:00"),
            Value::from("2024-05-01 10:00:00"),
            Value::from(expected.timestamp()),
        ] {
            assert_eq!(parse_timestamp(&raw), Some(expected), "{raw}");
        }

        let fractional = parse_timestamp(&Value::from("2024-05-01T10:00:00.1234567+00:00")).unwrap();
        assert_eq!(fractional.timestamp_subsec_nanos(), 123_456_700);
        assert_eq!(parse_timestamp(&Value::from("yesterday")), None);
        assert_eq!(parse_timestamp(&Value::Bool(true)), None);
    }

    #[test]
    fn test_counter_formats() {
        assert_eq!(parse_counter(&Value::from(42u64)), Some(42));
        assert_eq!(parse_counter(&serde_json::json!(42.0)), Some(42));
        assert_eq!(parse_counter(&serde_json::json!(1e15)), Some(1_000_000_000_000_000));
        assert_eq!(parse_counter(&Value::from(u64::MAX)), Some(u64::MAX));
        assert_eq!(parse_counter(&Value::from("17")), None);
        assert_eq!(parse_counter(&serde_json::json!(18446744073709551616.0)), None);
        assert_eq!(parse_counter(&serde_json::json!(1.5)), None);
        assert_eq!(parse_counter(&serde_json::json!(-1)), None);
        assert_eq!(parse_counter(&Value::Bool(false)), None);
    }

    #[test]
    fn test_order_by_timestamp_is_stable() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 1).unwrap();

        let mut late = CounterRecord::zeroed(t1);
        late.received_bytes = 3;
        let mut first_dup = CounterRecord::zeroed(t0);
        first_dup.received_bytes = 1;
        let mut second_dup = CounterRecord::zeroed(t0);
        second_dup.received_bytes = 2;

        let ordered = order_by_timestamp(vec![late, first_dup, second_dup]);
        let bytes: Vec<u64> = ordered.iter().map(|r| r.received_bytes).collect();
        assert_eq!(bytes, vec![1, 2, 3]);
    }
}
