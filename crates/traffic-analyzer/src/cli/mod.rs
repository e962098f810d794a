pub mod all;
pub mod disk;
pub mod traffic;

use clap::Args;
use std::path::PathBuf;
use traffic_analyzer::{export::OutputFormat, settings::Settings};

/// Output flags shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Directory to export files
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format for the summary exports
    #[arg(short = 'f', long)]
    pub format: Option<OutputFormat>,

    /// Print the report without writing any file
    #[arg(long)]
    pub print_only: bool,
}

impl OutputArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(dir) = &self.output_dir {
            settings.output.dir = dir.clone();
        }
        if let Some(format) = self.format {
            settings.output.format = format;
        }
        if self.print_only {
            settings.output.print_only = true;
        }
    }
}
