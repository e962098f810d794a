use crate::cli::OutputArgs;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::info;
use traffic_analyzer::{orchestrator::Orchestrator, settings::Settings};

/// Scan a directory tree and summarize its file sizes
#[derive(Args, Debug, Clone)]
pub struct DiskArgs {
    /// Directory to scan
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Absolute path prefix to skip, may be repeated
    #[arg(short = 'x', long, value_name = "DIR")]
    pub exclude: Vec<PathBuf>,

    /// Stop after this many files
    #[arg(long, value_name = "N")]
    pub max_files: Option<usize>,

    /// Stop the scan after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl DiskArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(root) = &self.root {
            settings.disk.root = root.clone();
        }
        if !self.exclude.is_empty() {
            settings.disk.exclude = self.exclude.clone();
        }
        if self.max_files.is_some() {
            settings.disk.max_files = self.max_files;
        }
        if self.timeout.is_some() {
            settings.disk.timeout_seconds = self.timeout;
        }
        self.output.apply(settings);
    }
}

pub fn handle(orchestrator: &Orchestrator) -> Result<()> {
    let written = orchestrator.run_disk()?;
    info!("Disk analysis complete, {} files written", written.len());
    Ok(())
}
