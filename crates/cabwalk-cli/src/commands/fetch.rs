//! Fetch command implementation.

use crate::cli::FetchArgs;
use crate::error::add_update_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use cabwalk_core::FetchConfig;
use cabwalk_core::PackageSource;
use cabwalk_core::UpdateFetcher;

pub fn execute(args: &FetchArgs, formatter: &dyn OutputFormatter, verbose: bool) -> Result<()> {
    super::ensure_tool(&args.downloader, "Download tool")?;

    let config = FetchConfig {
        msu_root: args.msu_dir.clone(),
        downloader_program: args.downloader.clone(),
        verbose_downloads: verbose,
    };
    let fetcher = UpdateFetcher::with_default_tools(config)?;

    let fetched = add_update_context(
        fetcher.fetch(&args.version, &args.kb),
        &args.version,
        &args.kb,
    )?;
    formatter.format_fetch_result(&args.version, &args.kb, &fetched)?;

    Ok(())
}
