mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::{all::AllArgs, disk::DiskArgs, traffic::TrafficArgs};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use traffic_analyzer::{
    orchestrator::Orchestrator,
    settings::{Settings, validation::validate_config},
};

#[derive(Parser, Debug)]
#[command(
    name = "traffic-analyzer",
    about = "Network interface traffic and file size distribution analysis",
    version,
    author,
    after_help = r#"Configuration:
    Configuration can be provided via:
    1. Environment variables with TA__ prefix (e.g., TA__SMOOTHING__WINDOW)
    2. .env file in the current directory
    3. Config file with -c option (TOML format)

Examples:
    # Analyze counter samples, exporting JSON summaries
    traffic-analyzer traffic --input net_samples.jsonl --format json -o ./out

    # File size distribution of /, skipping pseudo filesystems
    traffic-analyzer disk --root / -x /proc -x /sys --timeout 600

    # Both analyses concurrently
    traffic-analyzer -c analyzer.toml all"#
)]
pub struct Cli {
    /// Path to the configuration file (TOML format)
    ///
    /// If not provided, will attempt to load from environment variables
    #[clap(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Derive rates, smoothed series and distributions from counter samples
    Traffic(TrafficArgs),
    /// Summarize the file sizes under a directory
    Disk(DiskArgs),
    /// Run the traffic and disk analyses concurrently
    All(AllArgs),
}

impl Commands {
    fn apply(&self, settings: &mut Settings) {
        match self {
            Commands::Traffic(args) => args.apply(settings),
            Commands::Disk(args) => args.apply(settings),
            Commands::All(args) => args.apply(settings),
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut settings = if let Some(config_path) = &self.config {
            Settings::from_path(config_path)?
        } else {
            Settings::from_env()?
        };

        // Flags win over file and environment
        self.command.apply(&mut settings);
        validate_config(&settings)?;

        init_logging(&settings.log_level)?;
        debug!("{}", settings);

        let orchestrator = Orchestrator::new(&settings);

        // Route to module handlers
        match self.command {
            Commands::Traffic(_) => cli::traffic::handle(&orchestrator),
            Commands::Disk(_) => cli::disk::handle(&orchestrator),
            Commands::All(_) => cli::all::handle(&orchestrator).await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run().await
}

fn init_logging(log_level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}
