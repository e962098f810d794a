use crate::settings::OutputSettings;
use anyhow::{Context, Result};
use clap::ValueEnum;
use csv::Writer;
use processor::{
    distribution::DistributionSummary, file_sizes::FileSizeAnalysis, histogram::Histogram,
    rates::RateMetric, traffic::TrafficAnalysis,
};
use rand::{SeedableRng, rngs::StdRng, seq::index};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    fs::{File, create_dir_all},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Output format of the summary exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[value(name = "csv")]
    Csv,
    #[value(name = "json")]
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::JsonPretty => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
            Self::JsonPretty => write!(f, "json-pretty"),
        }
    }
}

/// One row of a summary table; undefined statistics are left empty
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub series: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub p50: Option<f64>,
    pub p95: Option<f64>,
    pub p99: Option<f64>,
    pub max: Option<f64>,
}

impl SummaryRow {
    pub fn new(series: &str, summary: &DistributionSummary) -> Self {
        Self {
            series: series.to_string(),
            count: summary.count,
            mean: summary.mean,
            min: summary.min,
            p50: summary.p50,
            p95: summary.p95,
            p99: summary.p99,
            max: summary.max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSizeSummaryRow {
    pub files_scanned: usize,
    pub empty_files: usize,
    pub count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub p50: Option<f64>,
    pub p95: Option<f64>,
    pub p99: Option<f64>,
    pub max: Option<f64>,
}

impl From<&FileSizeAnalysis> for FileSizeSummaryRow {
    fn from(analysis: &FileSizeAnalysis) -> Self {
        let summary = &analysis.summary;
        Self {
            files_scanned: analysis.files_scanned,
            empty_files: analysis.empty_files,
            count: summary.count,
            mean: summary.mean,
            min: summary.min,
            p50: summary.p50,
            p95: summary.p95,
            p99: summary.p99,
            max: summary.max,
        }
    }
}

#[derive(Debug, Serialize)]
struct FileSizeRow {
    bytes: u64,
}

pub fn summary_rows(analysis: &TrafficAnalysis) -> Vec<SummaryRow> {
    analysis
        .summaries
        .iter()
        .map(|(name, summary)| SummaryRow::new(name, summary))
        .collect()
}

/// Writes analysis results under one output directory
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
    format: OutputFormat,
    max_file_size_rows: usize,
    sample_seed: u64,
}

impl Exporter {
    pub fn new(settings: &OutputSettings) -> Self {
        Self {
            dir: settings.dir.clone(),
            format: settings.format,
            max_file_size_rows: settings.max_file_size_rows,
            sample_seed: settings.sample_seed,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the summary, per-sample rates, smoothed series and histograms.
    /// Returns the files written.
    pub fn export_traffic(&self, analysis: &TrafficAnalysis) -> Result<Vec<PathBuf>> {
        self.ensure_dir()?;
        let mut written = Vec::new();

        written.push(self.write_rows("summary", &summary_rows(analysis))?);
        written.push(self.write_rates(analysis)?);
        written.push(self.write_smoothed(analysis)?);

        for (name, histogram) in &analysis.histograms {
            written.push(self.write_histogram(name, histogram)?);
        }

        info!(
            "Exported {} traffic files to {}",
            written.len(),
            self.dir.display()
        );
        Ok(written)
    }

    /// Write the file size summary, histogram, CCDF and the size listing
    pub fn export_file_sizes(&self, analysis: &FileSizeAnalysis) -> Result<Vec<PathBuf>> {
        self.ensure_dir()?;
        let written = vec![
            self.write_rows(
                "file_sizes_summary",
                &[FileSizeSummaryRow::from(analysis)],
            )?,
            self.write_histogram("file_size", &analysis.histogram)?,
            self.write_csv("file_sizes_ccdf.csv", &analysis.ccdf)?,
            self.write_file_size_listing(&analysis.sorted_sizes)?,
        ];

        info!(
            "Exported {} file size files to {}",
            written.len(),
            self.dir.display()
        );
        Ok(written)
    }

    fn ensure_dir(&self) -> Result<()> {
        create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create output dir {}", self.dir.display()))
    }

    /// Rows in the configured format, `<stem>.csv` or `<stem>.json`
    fn write_rows<T: Serialize>(&self, stem: &str, rows: &[T]) -> Result<PathBuf> {
        let filename = format!("{stem}.{}", self.format.extension());
        match self.format {
            OutputFormat::Csv => self.write_csv(&filename, rows),
            OutputFormat::Json => self.write_json(&filename, rows, false),
            OutputFormat::JsonPretty => self.write_json(&filename, rows, true),
        }
    }

    fn write_csv<T: Serialize>(&self, filename: &str, rows: &[T]) -> Result<PathBuf> {
        let path = self.dir.join(filename);
        let mut writer = Writer::from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(path)
    }

    fn write_json<T: Serialize>(&self, filename: &str, data: &T, pretty: bool) -> Result<PathBuf>
    where
        T: ?Sized,
    {
        let path = self.dir.join(filename);
        let content = if pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        let mut file =
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        file.write_all(content.as_bytes())?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }

    fn write_rates(&self, analysis: &TrafficAnalysis) -> Result<PathBuf> {
        let path = self.dir.join("rates.csv");
        let mut writer = Writer::from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        let mut header = vec!["timestamp"];
        header.extend(RateMetric::ALL.iter().map(|m| m.name()));
        writer.write_record(&header)?;

        for sample in &analysis.rates {
            let mut row = vec![sample.timestamp.to_rfc3339()];
            row.extend(
                RateMetric::ALL
                    .iter()
                    .map(|&metric| format_cell(sample.get(metric))),
            );
            writer.write_record(&row)?;
        }
        writer.flush()?;
        debug!("Wrote {} rows to {}", analysis.rates.len(), path.display());
        Ok(path)
    }

    fn write_smoothed(&self, analysis: &TrafficAnalysis) -> Result<PathBuf> {
        let path = self.dir.join("smoothed.csv");
        let mut writer = Writer::from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        let mut header = vec!["timestamp"];
        header.extend(analysis.smoothed.keys().map(String::as_str));
        writer.write_record(&header)?;

        for (idx, sample) in analysis.rates.iter().enumerate() {
            let mut row = vec![sample.timestamp.to_rfc3339()];
            row.extend(
                analysis
                    .smoothed
                    .values()
                    .map(|series| format_cell(series.get(idx).and_then(|p| p.value))),
            );
            writer.write_record(&row)?;
        }
        writer.flush()?;
        debug!("Wrote {} rows to {}", analysis.rates.len(), path.display());
        Ok(path)
    }

    fn write_histogram(&self, name: &str, histogram: &Histogram) -> Result<PathBuf> {
        self.write_csv(&format!("histogram_{name}.csv"), &histogram.bins)
    }

    /// Ascending file sizes. Listings above `max_file_size_rows` are reduced
    /// to a seeded uniform sample, still ascending.
    fn write_file_size_listing(&self, sorted_sizes: &[f64]) -> Result<PathBuf> {
        let rows: Vec<FileSizeRow> =
            downsample(sorted_sizes, self.max_file_size_rows, self.sample_seed)
                .into_iter()
                .map(|size| FileSizeRow {
                    bytes: size as u64,
                })
                .collect();
        self.write_csv("file_sizes.csv", &rows)
    }
}

/// Keep at most `limit` values, chosen uniformly with a fixed seed. Input
/// order is preserved, so sorted input stays sorted.
pub fn downsample(values: &[f64], limit: usize, seed: u64) -> Vec<f64> {
    if values.len() <= limit {
        return values.to_vec();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = index::sample(&mut rng, values.len(), limit).into_vec();
    picked.sort_unstable();
    debug!(
        "Down-sampled {} file sizes to {}",
        values.len(),
        picked.len()
    );
    picked.into_iter().map(|idx| values[idx]).collect()
}

fn format_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
