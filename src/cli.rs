//! Command-line interface definition.

use std::path::PathBuf;

use clap::Parser;

use crate::runner::RunOptions;

/// Community leaderboard pipeline: import flat files, scrape activity
/// sources, aggregate points, export flat files.
#[derive(Debug, Parser)]
#[command(name = "leaderboard", version, about)]
pub struct Cli {
    /// Data directory holding config.yaml, the database, and the flat files
    #[arg(long, default_value = "./data")]
    pub data_dir: PathBuf,

    /// Skip the flat-file import stage
    #[arg(long)]
    pub skip_import: bool,

    /// Skip the scrape stage (aggregation still runs)
    #[arg(long)]
    pub skip_scrape: bool,

    /// Skip the flat-file export stage
    #[arg(long)]
    pub skip_export: bool,

    /// Verbose debug logging (RUST_LOG overrides)
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            data_dir: self.data_dir.clone(),
            skip_import: self.skip_import,
            skip_scrape: self.skip_scrape,
            skip_export: self.skip_export,
        }
    }
}
