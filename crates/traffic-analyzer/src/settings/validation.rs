use crate::settings::Settings;
use anyhow::{Result, bail};

/// Validate the configuration values
pub fn validate_config(settings: &Settings) -> Result<()> {
    // Validate log level
    let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&settings.log_level.to_lowercase().as_str()) {
        bail!(
            "Invalid log level '{}'. Valid options are: {:?}",
            settings.log_level,
            valid_log_levels
        );
    }

    if settings.input.path.as_os_str().is_empty() {
        bail!("Input path cannot be empty");
    }

    // Validate output settings
    if settings.output.dir.as_os_str().is_empty() {
        bail!("Output dir cannot be empty");
    }

    if settings.output.max_file_size_rows == 0 {
        bail!("Output max_file_size_rows must be greater than 0");
    }

    // Validate smoothing settings
    if settings.smoothing.window == 0 {
        bail!("Smoothing window must be at least 1 sample");
    }

    // Validate histogram settings
    if settings.histogram.packet_size_bins == 0 {
        bail!("Histogram packet_size_bins must be greater than 0");
    }

    if settings.histogram.inter_arrival_bins == 0 {
        bail!("Histogram inter_arrival_bins must be greater than 0");
    }

    if settings.histogram.file_size_bins == 0 {
        bail!("Histogram file_size_bins must be greater than 0");
    }

    // Validate disk settings
    if settings.disk.root.as_os_str().is_empty() {
        bail!("Disk root cannot be empty");
    }

    if settings.disk.max_files == Some(0) {
        bail!("Disk max_files must be greater than 0 when set");
    }

    if settings.disk.timeout_seconds == Some(0) {
        bail!("Disk timeout_seconds must be greater than 0 when set");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        export::OutputFormat,
        settings::{
            DiskSettings, HistogramSettings, InputSettings, OutputSettings, SmoothingSettings,
        },
    };
    use std::path::PathBuf;

    fn create_valid_config() -> Settings {
        Settings {
            log_level: "info".to_string(),
            input: InputSettings {
                path: PathBuf::from("/var/log/net_samples.jsonl"),
            },
            output: OutputSettings {
                dir: PathBuf::from("/tmp/traffic_analysis"),
                format: OutputFormat::Json,
                print_only: false,
                max_file_size_rows: 500_000,
                sample_seed: 42,
            },
            smoothing: SmoothingSettings { window: 30 },
            histogram: HistogramSettings {
                packet_size_bins: 50,
                inter_arrival_bins: 50,
                file_size_bins: 60,
            },
            disk: DiskSettings {
                root: PathBuf::from("/"),
                exclude: vec![PathBuf::from("/proc"), PathBuf::from("/sys")],
                max_files: Some(2_000_000),
                timeout_seconds: Some(600),
            },
        }
    }

    #[test]
    fn test_valid_config() {
        let config = create_valid_config();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&Settings::default()).is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = create_valid_config();
        config.log_level = "invalid".to_string();
        assert!(validate_config(&config).is_err());

        config.log_level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_smoothing_window() {
        let mut config = create_valid_config();
        config.smoothing.window = 0;
        assert!(validate_config(&config).is_err());

        config.smoothing.window = 1;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_histogram_bins() {
        let mut config = create_valid_config();
        config.histogram.packet_size_bins = 0;
        assert!(validate_config(&config).is_err());
        config.histogram.packet_size_bins = 50;

        config.histogram.inter_arrival_bins = 0;
        assert!(validate_config(&config).is_err());
        config.histogram.inter_arrival_bins = 50;

        config.histogram.file_size_bins = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_disk_limits() {
        let mut config = create_valid_config();
        config.disk.max_files = Some(0);
        assert!(validate_config(&config).is_err());
        config.disk.max_files = None;
        assert!(validate_config(&config).is_ok());

        config.disk.timeout_seconds = Some(0);
        assert!(validate_config(&config).is_err());
        config.disk.timeout_seconds = None;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_output() {
        let mut config = create_valid_config();
        config.output.max_file_size_rows = 0;
        assert!(validate_config(&config).is_err());
        config.output.max_file_size_rows = 1;

        config.output.dir = PathBuf::new();
        assert!(validate_config(&config).is_err());
    }
}
