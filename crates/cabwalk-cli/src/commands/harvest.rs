//! Harvest command implementation.

use crate::cli::HarvestArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use cabwalk_core::FrontierWalker;

pub fn execute(args: &HarvestArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    super::ensure_tool(&args.expand_tool, "Expansion tool")?;

    let walker = FrontierWalker::with_expand_tool(args.harvest_config());
    let report = add_archive_context(walker.process_archive(&args.archive), &args.archive)?;

    for warning in &report.warnings {
        formatter.format_warning(warning);
    }
    formatter.format_harvest_result(&args.archive, &report)?;

    Ok(())
}
