pub mod validation;

use crate::export::OutputFormat;
use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File};
use ingestor::disk::DiskScanConfig;
use processor::{
    file_sizes::DEFAULT_FILE_SIZE_BINS, smoothing::DEFAULT_SMOOTHING_WINDOW,
    traffic::TrafficParams,
};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, path::PathBuf, time::Duration};
use validation::validate_config;

/// Main settings configuration for traffic-analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log level for application logging (e.g., "info", "debug", "warn", "error")
    pub log_level: String,
    /// Counter record source
    pub input: InputSettings,
    /// Where and how reports are written
    pub output: OutputSettings,
    /// Rolling median parameters
    pub smoothing: SmoothingSettings,
    /// Log-binned histogram resolution
    pub histogram: HistogramSettings,
    /// Directory size scan
    pub disk: DiskSettings,
}

/// Line-delimited JSON file written by the interface sampler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory receiving exported files
    pub dir: PathBuf,
    /// Format of the summary exports
    pub format: OutputFormat,
    /// Skip writing files and only print the report
    pub print_only: bool,
    /// Largest number of rows written to the file size listing
    /// Bigger scans are down-sampled
    pub max_file_size_rows: usize,
    /// Seed for the file size down-sampling, so reruns write identical files
    pub sample_seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingSettings {
    /// Trailing window in samples
    /// e.g., 30 with a 1s sampling interval smooths over ~30s
    pub window: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramSettings {
    pub packet_size_bins: usize,
    pub inter_arrival_bins: usize,
    pub file_size_bins: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskSettings {
    /// Directory to scan
    pub root: PathBuf,
    /// Absolute path prefixes pruned from the scan
    pub exclude: Vec<PathBuf>,
    /// Stop after this many files (unset = no limit)
    pub max_files: Option<usize>,
    /// Stop the scan after this many seconds (unset = no limit)
    pub timeout_seconds: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            input: InputSettings::default(),
            output: OutputSettings::default(),
            smoothing: SmoothingSettings::default(),
            histogram: HistogramSettings::default(),
            disk: DiskSettings::default(),
        }
    }
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("net_samples.jsonl"),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("traffic_analysis"),
            format: OutputFormat::Csv,
            print_only: false,
            max_file_size_rows: 1_000_000,
            sample_seed: 42,
        }
    }
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        Self {
            window: DEFAULT_SMOOTHING_WINDOW,
        }
    }
}

impl Default for HistogramSettings {
    fn default() -> Self {
        let traffic = TrafficParams::default();
        Self {
            packet_size_bins: traffic.packet_size_bins,
            inter_arrival_bins: traffic.inter_arrival_bins,
            file_size_bins: DEFAULT_FILE_SIZE_BINS,
        }
    }
}

impl Default for DiskSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            exclude: Vec::new(),
            max_files: None,
            timeout_seconds: None,
        }
    }
}

impl Settings {
    /// Load configuration from a specific config file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        // Construct settings, env vars take priority still
        let settings: Settings = ConfigBuilder::builder()
            .add_source(File::with_name(&path.as_ref().to_string_lossy()))
            .add_source(environment())
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Validate the configuration
        validate_config(&settings)?;

        Ok(settings)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        // NOTE: It's ok if this fails (file might not exist)
        let _ = dotenvy::dotenv();

        let settings: Settings = ConfigBuilder::builder()
            .add_source(environment())
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Validate the configuration
        validate_config(&settings)?;

        Ok(settings)
    }

    pub fn traffic_params(&self) -> TrafficParams {
        TrafficParams {
            smoothing_window: self.smoothing.window,
            packet_size_bins: self.histogram.packet_size_bins,
            inter_arrival_bins: self.histogram.inter_arrival_bins,
        }
    }

    pub fn disk_scan_config(&self) -> DiskScanConfig {
        DiskScanConfig {
            root: self.disk.root.clone(),
            exclude_prefixes: self.disk.exclude.clone(),
            max_entries: self.disk.max_files,
            time_limit: self.disk.timeout_seconds.map(Duration::from_secs),
        }
    }
}

// TA__SMOOTHING__WINDOW=60, TA__DISK__EXCLUDE=/proc,/sys
fn environment() -> Environment {
    Environment::with_prefix("TA")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("disk.exclude")
        .try_parsing(true)
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings {{\n\
             \tLog Level: {}\n\
             \tInput: {}\n\
             \tOutput Dir: {}\n\
             \tOutput Format: {}\n\
             \tSmoothing Window: {}\n\
             \tHistogram Bins (size/iat/files): {}/{}/{}\n\
             \tDisk Root: {}\n\
             \tDisk Exclusions: {}\n\
             \tDisk Max Files: {:?}\n\
             }}",
            self.log_level,
            self.input.path.display(),
            self.output.dir.display(),
            self.output.format,
            self.smoothing.window,
            self.histogram.packet_size_bins,
            self.histogram.inter_arrival_bins,
            self.histogram.file_size_bins,
            self.disk.root.display(),
            self.disk.exclude.len(),
            self.disk.max_files,
        )
    }
}
