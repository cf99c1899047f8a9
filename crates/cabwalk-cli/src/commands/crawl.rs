//! Crawl command implementation.

use crate::cli::CrawlArgs;
use crate::output::OutputFormatter;
use crate::progress::CrawlProgress;
use anyhow::Context;
use anyhow::Result;
use cabwalk_core::CrawlRunner;
use cabwalk_core::FetchConfig;
use cabwalk_core::FrontierWalker;
use cabwalk_core::UpdateFetcher;
use cabwalk_core::UpdateLedger;

pub fn execute(
    args: &CrawlArgs,
    formatter: &dyn OutputFormatter,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    super::ensure_tool(&args.expand_tool, "Expansion tool")?;
    super::ensure_tool(&args.downloader, "Download tool")?;

    let mut ledger = UpdateLedger::load(&args.ledger)
        .with_context(|| format!("failed to load ledger '{}'", args.ledger.display()))?;

    let fetch_config = FetchConfig {
        msu_root: args.msu_dir.clone(),
        downloader_program: args.downloader.clone(),
        verbose_downloads: verbose,
    };
    let fetcher = UpdateFetcher::with_default_tools(fetch_config)?;
    let walker = FrontierWalker::with_expand_tool(args.harvest_config());
    let runner = CrawlRunner::new(fetcher, walker, args.stale_after);

    let today = chrono::Local::now().date_naive();
    let summary = if CrawlProgress::should_show(quiet) {
        let progress = CrawlProgress::new(ledger.len());
        runner.run(&mut ledger, today, |version, kb| {
            progress.on_update(version, kb);
        })?
    } else {
        runner.run(&mut ledger, today, |_, _| {})?
    };

    formatter.format_crawl_summary(&summary)?;

    Ok(())
}
