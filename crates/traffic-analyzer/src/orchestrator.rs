use crate::{
    export::Exporter,
    report::{print_file_size_summary, print_resets, print_traffic_summary},
    settings::Settings,
};
use anyhow::{Context, Result};
use ingestor::{
    disk::{DiskSizeSampler, ScanStats},
    jsonl::read_records,
    types::CounterRecord,
};
use processor::{file_sizes::FileSizeAnalysis, traffic::TrafficAnalysis};
use std::path::PathBuf;
use tracing::info;

/// File size analysis together with how the scan went
#[derive(Debug, Clone)]
pub struct DiskReport {
    pub analysis: FileSizeAnalysis,
    pub stats: ScanStats,
}

#[derive(Debug, Clone)]
pub struct Orchestrator {
    settings: Settings,
}

impl Orchestrator {
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn load_records(&self) -> Result<Vec<CounterRecord>> {
        let path = &self.settings.input.path;
        read_records(path)
            .with_context(|| format!("Failed to load counter records from {}", path.display()))
    }

    /// Read the counter records and derive rates, smoothed series and summaries
    pub fn analyze_traffic(&self) -> Result<TrafficAnalysis> {
        let records = self.load_records()?;
        self.analyze_records(records)
    }

    pub fn analyze_records(&self, records: Vec<CounterRecord>) -> Result<TrafficAnalysis> {
        TrafficAnalysis::run(records, &self.settings.traffic_params())
            .context("Failed to analyze counter records")
    }

    /// Walk the configured root and summarize the file sizes found
    pub fn analyze_disk(&self) -> Result<DiskReport> {
        let config = self.settings.disk_scan_config();
        let root = config.root.clone();
        let mut sampler = DiskSizeSampler::new(config)
            .with_context(|| format!("Failed to start scan of {}", root.display()))?;

        let sizes = sampler.collect_sizes();
        let stats = sampler.stats();
        if stats.truncated {
            info!(
                "Disk scan of {} stopped after {} files",
                root.display(),
                stats.sampled
            );
        }

        let bins = self.settings.histogram.file_size_bins;
        let analysis = FileSizeAnalysis::from_sizes(&sizes, bins);
        Ok(DiskReport { analysis, stats })
    }

    pub fn report_traffic(&self, analysis: &TrafficAnalysis) -> Result<Vec<PathBuf>> {
        info!("Traffic summary:\n{}", print_traffic_summary(analysis));
        info!("Counter resets:\n{}", print_resets(analysis));

        if self.settings.output.print_only {
            return Ok(Vec::new());
        }
        self.exporter().export_traffic(analysis)
    }

    pub fn report_disk(&self, report: &DiskReport) -> Result<Vec<PathBuf>> {
        info!(
            "File size summary:\n{}",
            print_file_size_summary(&report.analysis, &report.stats)
        );

        if self.settings.output.print_only {
            return Ok(Vec::new());
        }
        self.exporter().export_file_sizes(&report.analysis)
    }

    pub fn run_traffic(&self) -> Result<Vec<PathBuf>> {
        let analysis = self.analyze_traffic()?;
        self.report_traffic(&analysis)
    }

    pub fn run_disk(&self) -> Result<Vec<PathBuf>> {
        let report = self.analyze_disk()?;
        self.report_disk(&report)
    }

    /// Run both pipelines concurrently. The counter file is loaded first so a
    /// bad input fails before any scanning starts. Each pipeline then gets its
    /// own blocking task and the combined report is written once both finish.
    pub async fn run_all(&self) -> Result<Vec<PathBuf>> {
        let records = {
            let orchestrator = self.clone();
            tokio::task::spawn_blocking(move || orchestrator.load_records())
                .await
                .context("Record loading task panicked")??
        };

        let traffic = {
            let orchestrator = self.clone();
            tokio::task::spawn_blocking(move || orchestrator.analyze_records(records))
        };
        let disk = {
            let orchestrator = self.clone();
            tokio::task::spawn_blocking(move || orchestrator.analyze_disk())
        };

        let (traffic, disk) = tokio::try_join!(traffic, disk).context("Analysis task panicked")?;

        // Traffic is reported even when the scan failed
        let mut written = self.report_traffic(&traffic?)?;
        written.extend(self.report_disk(&disk?)?);
        Ok(written)
    }

    fn exporter(&self) -> Exporter {
        Exporter::new(&self.settings.output)
    }
}
