//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::Path;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cabwalk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Harvest payload files from an update package
    Harvest(HarvestArgs),
    /// Download one update package from the catalog
    Fetch(FetchArgs),
    /// Crawl every update in the ledger
    Crawl(CrawlArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct HarvestArgs {
    /// Path to the update package (.msu or .cab)
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Content store root directory
    #[arg(long, default_value = "data", value_name = "DIR")]
    pub store: PathBuf,

    /// Payload extension to harvest (can be repeated)
    #[arg(long = "extension", short = 'e', value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Harvest the full Portable Executable extension family
    #[arg(long, conflicts_with = "extensions")]
    pub all_pe: bool,

    /// Cabinet expansion tool
    #[arg(long, default_value = "expand", value_name = "PROGRAM")]
    pub expand_tool: PathBuf,
}

impl HarvestArgs {
    /// Builds the harvest configuration these arguments describe.
    #[must_use]
    pub fn harvest_config(&self) -> cabwalk_core::HarvestConfig {
        build_harvest_config(
            self.all_pe,
            &self.extensions,
            &self.store,
            &self.expand_tool,
        )
    }
}

#[derive(clap::Args)]
pub struct FetchArgs {
    /// Windows version the update applies to (e.g. 1809)
    #[arg(value_name = "VERSION")]
    pub version: String,

    /// KB number of the update (e.g. KB4581482)
    #[arg(value_name = "KB")]
    pub kb: String,

    /// Root directory of the update package cache
    #[arg(long, default_value = "msus", value_name = "DIR")]
    pub msu_dir: PathBuf,

    /// External download tool
    #[arg(long, default_value = "aria2c", value_name = "PROGRAM")]
    pub downloader: PathBuf,
}

#[derive(clap::Args)]
pub struct CrawlArgs {
    /// Path to the update ledger JSON file
    #[arg(long, default_value = "updates.json", value_name = "FILE")]
    pub ledger: PathBuf,

    /// Content store root directory
    #[arg(long, default_value = "data", value_name = "DIR")]
    pub store: PathBuf,

    /// Root directory of the update package cache
    #[arg(long, default_value = "msus", value_name = "DIR")]
    pub msu_dir: PathBuf,

    /// Payload extension to harvest (can be repeated)
    #[arg(long = "extension", short = 'e', value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Harvest the full Portable Executable extension family
    #[arg(long, conflicts_with = "extensions")]
    pub all_pe: bool,

    /// Cabinet expansion tool
    #[arg(long, default_value = "expand", value_name = "PROGRAM")]
    pub expand_tool: PathBuf,

    /// External download tool
    #[arg(long, default_value = "aria2c", value_name = "PROGRAM")]
    pub downloader: PathBuf,

    /// Days before a missing update is pruned instead of reported
    #[arg(long, default_value = "90", value_name = "DAYS")]
    pub stale_after: i64,
}

impl CrawlArgs {
    /// Builds the harvest configuration these arguments describe.
    #[must_use]
    pub fn harvest_config(&self) -> cabwalk_core::HarvestConfig {
        build_harvest_config(
            self.all_pe,
            &self.extensions,
            &self.store,
            &self.expand_tool,
        )
    }
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

fn build_harvest_config(
    all_pe: bool,
    extensions: &[String],
    store: &Path,
    expand_tool: &Path,
) -> cabwalk_core::HarvestConfig {
    let mut config = if all_pe {
        cabwalk_core::HarvestConfig::portable_executables()
    } else {
        cabwalk_core::HarvestConfig::default()
    };
    if !extensions.is_empty() {
        config.target_extensions = extensions.to_vec();
    }
    config.store_root = store.to_path_buf();
    config.expand_program = expand_tool.to_path_buf();
    config
}
