use crate::cli::OutputArgs;
use anyhow::Result;
use clap::Args;
use tracing::info;
use traffic_analyzer::{orchestrator::Orchestrator, settings::Settings};

/// Run the traffic and disk analyses concurrently
#[derive(Args, Debug, Clone)]
pub struct AllArgs {
    #[command(flatten)]
    pub output: OutputArgs,
}

impl AllArgs {
    pub fn apply(&self, settings: &mut Settings) {
        self.output.apply(settings);
    }
}

pub async fn handle(orchestrator: &Orchestrator) -> Result<()> {
    let written = orchestrator.run_all().await?;
    info!("Analysis complete, {} files written", written.len());
    Ok(())
}
