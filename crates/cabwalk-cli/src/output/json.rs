//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use cabwalk_core::CrawlSummary;
use cabwalk_core::Fetched;
use cabwalk_core::HarvestReport;
use serde::Serialize;
use std::io;
use std::io::Write;
use std::path::Path;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_harvest_result(&self, archive: &Path, report: &HarvestReport) -> Result<()> {
        #[derive(Serialize)]
        struct HarvestOutput {
            archive: String,
            cabinets_processed: usize,
            files_stored: usize,
            duplicates_skipped: usize,
            duration_ms: u128,
            warnings: Vec<String>,
        }

        let data = HarvestOutput {
            archive: archive.display().to_string(),
            cabinets_processed: report.cabinets_processed,
            files_stored: report.files_stored,
            duplicates_skipped: report.duplicates_skipped,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        };

        let output = JsonOutput::success("harvest", data);
        Self::output(&output)
    }

    fn format_fetch_result(&self, version: &str, kb: &str, fetched: &Fetched) -> Result<()> {
        #[derive(Serialize)]
        struct FetchOutput {
            version: String,
            kb: String,
            path: String,
            from_cache: bool,
        }

        let data = FetchOutput {
            version: version.to_string(),
            kb: kb.to_string(),
            path: fetched.path().display().to_string(),
            from_cache: fetched.is_cached(),
        };

        let output = JsonOutput::success("fetch", data);
        Self::output(&output)
    }

    fn format_crawl_summary(&self, summary: &CrawlSummary) -> Result<()> {
        #[derive(Serialize)]
        struct CrawlOutput {
            updates_processed: usize,
            files_stored: usize,
            duplicates_skipped: usize,
            entries_pruned: usize,
            missing_recent: usize,
            failures: usize,
        }

        let data = CrawlOutput {
            updates_processed: summary.updates_processed,
            files_stored: summary.files_stored,
            duplicates_skipped: summary.duplicates_skipped,
            entries_pruned: summary.entries_pruned,
            missing_recent: summary.missing_recent,
            failures: summary.failures,
        };

        let output = JsonOutput::success("crawl", data);
        Self::output(&output)
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error("unknown", format!("{error:?}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
