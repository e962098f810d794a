use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Default trailing window, in samples.
///
/// The interface sampler emits one record per second, so 30 samples smooth
/// over roughly half a minute. Scale it with the sampling cadence.
pub const DEFAULT_SMOOTHING_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

/// Trailing rolling median.
///
/// Position `i` is the median of the defined values in
/// `series[i + 1 - window ..= i]`, clamped at the start of the series so the
/// first positions use whatever history exists. Never looks ahead. Undefined
/// when the window holds no defined value.
pub fn rolling_median(series: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(Error::InvalidWindow(window));
    }

    let mut scratch = Vec::with_capacity(window.min(series.len()));
    let smoothed = (0..series.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            scratch.clear();
            scratch.extend(
                series[start..=i]
                    .iter()
                    .flatten()
                    .copied()
                    .filter(|v| v.is_finite()),
            );
            median(&mut scratch)
        })
        .collect();

    Ok(smoothed)
}

/// Smooth a series and pair it back with its timestamps
pub fn smooth_series(
    timestamps: &[DateTime<Utc>],
    values: &[Option<f64>],
    window: usize,
) -> Result<Vec<SeriesPoint>> {
    let smoothed = rolling_median(values, window)?;
    Ok(timestamps
        .iter()
        .zip(smoothed)
        .map(|(timestamp, value)| SeriesPoint {
            timestamp: *timestamp,
            value,
        })
        .collect())
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let len = values.len();
    Some(if len % 2 == 0 {
        (values[len / 2 - 1] + values[len / 2]) / 2.0
    } else {
        values[len / 2]
    })
}
