use std::{fs, path::Path};
use traffic_analyzer::{
    export::OutputFormat,
    settings::{
        DiskSettings, HistogramSettings, InputSettings, OutputSettings, Settings,
        SmoothingSettings,
    },
};

/// Create test settings reading `input`, scanning `disk_root` and writing to `output_dir`
pub fn create_test_settings(input: &Path, disk_root: &Path, output_dir: &Path) -> Settings {
    Settings {
        log_level: "info".to_string(),
        input: InputSettings {
            path: input.to_path_buf(),
        },
        output: OutputSettings {
            dir: output_dir.to_path_buf(),
            format: OutputFormat::Csv,
            print_only: false,
            max_file_size_rows: 1_000,
            sample_seed: 42,
        },
        smoothing: SmoothingSettings { window: 3 },
        histogram: HistogramSettings {
            packet_size_bins: 10,
            inter_arrival_bins: 10,
            file_size_bins: 12,
        },
        disk: DiskSettings {
            root: disk_root.to_path_buf(),
            exclude: Vec::new(),
            max_files: None,
            timeout_seconds: None,
        },
    }
}

/// Counter samples one second apart; the third sample follows a received_bytes reset
pub fn write_counter_samples(path: &Path) {
    let lines = [
        r#"{"timestamp":"2024-05-01T10:00:00Z","received_bytes":1000,"sent_bytes":500,"received_unicast_packets":10,"sent_unicast_packets":5,"received_discards":0,"received_errors":0}"#,
        r#"{"timestamp":"2024-05-01T10:00:01Z","received_bytes":1500,"sent_bytes":900,"received_unicast_packets":15,"sent_unicast_packets":9,"received_discards":1,"received_errors":0}"#,
        r#"{"timestamp":"2024-05-01T10:00:02Z","received_bytes":1200,"sent_bytes":1300,"received_unicast_packets":20,"sent_unicast_packets":13,"received_discards":1,"received_errors":0}"#,
        r#"{"timestamp":"2024-05-01T10:00:03Z","received_bytes":2200,"sent_bytes":1700,"received_unicast_packets":25,"sent_unicast_packets":17,"received_discards":1,"received_errors":0}"#,
    ];
    fs::write(path, lines.join("\n")).unwrap();
}

/// Small tree: three files of 10, 200 and 3000 bytes plus an empty one
pub fn write_disk_tree(root: &Path) {
    fs::create_dir_all(root.join("a/b")).unwrap();
    fs::write(root.join("small.bin"), vec![0u8; 10]).unwrap();
    fs::write(root.join("a/medium.bin"), vec![0u8; 200]).unwrap();
    fs::write(root.join("a/b/large.bin"), vec![0u8; 3000]).unwrap();
    fs::write(root.join("a/empty"), b"").unwrap();
}
