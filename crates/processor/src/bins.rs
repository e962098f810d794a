/// Offset substituted for a non-positive minimum, per quantity
pub const PACKET_SIZE_OFFSET: f64 = 1.0;
pub const INTER_ARRIVAL_OFFSET: f64 = 1e-6;
pub const FILE_SIZE_OFFSET: f64 = 1.0;

/// `bins + 1` edges spaced geometrically between the smallest and largest
/// finite positive value.
///
/// With nothing to bin the edges fall back to a linear `[0, 1]` range so a
/// histogram can always be built. `offset` stands in for a non-positive
/// minimum. A single distinct value gets a one-decade range centred on it.
pub fn log_bin_edges(values: &[f64], bins: usize, offset: f64) -> Vec<f64> {
    let bins = bins.max(1);

    let (min, max) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return linear_edges(0.0, 1.0, bins);
    }

    let mut min = if min <= 0.0 { offset } else { min };
    let mut max = max.max(min);
    if min == max {
        min /= 10f64.sqrt();
        max *= 10f64.sqrt();
    }

    let lo = min.log10();
    let hi = max.log10();
    let step = (hi - lo) / bins as f64;

    let mut edges: Vec<f64> = (0..=bins)
        .map(|i| 10f64.powf(lo + step * i as f64))
        .collect();
    // Pin the ends so rounding never leaves the extremes outside the range
    edges[0] = min;
    edges[bins] = max;
    edges
}

pub fn linear_edges(start: f64, end: f64, bins: usize) -> Vec<f64> {
    let bins = bins.max(1);
    let step = (end - start) / bins as f64;
    (0..=bins).map(|i| start + step * i as f64).collect()
}
