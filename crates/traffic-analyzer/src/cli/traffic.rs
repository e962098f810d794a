use crate::cli::OutputArgs;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::info;
use traffic_analyzer::{orchestrator::Orchestrator, settings::Settings};

/// Analyze interface counter samples
#[derive(Args, Debug, Clone)]
pub struct TrafficArgs {
    /// Line-delimited JSON counter records
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Rolling median window in samples
    #[arg(short, long, value_name = "SAMPLES")]
    pub window: Option<usize>,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl TrafficArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(input) = &self.input {
            settings.input.path = input.clone();
        }
        if let Some(window) = self.window {
            settings.smoothing.window = window;
        }
        self.output.apply(settings);
    }
}

pub fn handle(orchestrator: &Orchestrator) -> Result<()> {
    let written = orchestrator.run_traffic()?;
    info!("Traffic analysis complete, {} files written", written.len());
    Ok(())
}
