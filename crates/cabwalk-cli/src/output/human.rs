//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use cabwalk_core::CrawlSummary;
use cabwalk_core::Fetched;
use cabwalk_core::HarvestReport;
use console::Term;
use console::style;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn write_headline(&self, message: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_harvest_result(&self, archive: &Path, report: &HarvestReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.write_headline(&format!("Harvest complete: {}", archive.display()));

        let _ = self.term.write_line(&format!(
            "  Cabinets processed: {}",
            Self::format_number(report.cabinets_processed)
        ));
        let _ = self.term.write_line(&format!(
            "  Files stored: {}",
            Self::format_number(report.files_stored)
        ));
        let _ = self.term.write_line(&format!(
            "  Duplicates skipped: {}",
            Self::format_number(report.duplicates_skipped)
        ));

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Warnings: {}", report.warnings.len()));
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }

        Ok(())
    }

    fn format_fetch_result(&self, version: &str, kb: &str, fetched: &Fetched) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if fetched.is_cached() {
            self.write_headline(&format!("Already cached: {}", fetched.path().display()));
        } else {
            self.write_headline(&format!("Downloaded: {}", fetched.path().display()));
        }
        let _ = self.term.write_line(&format!("  Update: {kb} ({version})"));

        Ok(())
    }

    fn format_crawl_summary(&self, summary: &CrawlSummary) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.write_headline("Crawl complete");

        let _ = self.term.write_line(&format!(
            "  Updates processed: {}",
            Self::format_number(summary.updates_processed)
        ));
        let _ = self.term.write_line(&format!(
            "  Files stored: {}",
            Self::format_number(summary.files_stored)
        ));
        let _ = self.term.write_line(&format!(
            "  Duplicates skipped: {}",
            Self::format_number(summary.duplicates_skipped)
        ));
        let _ = self.term.write_line(&format!(
            "  Entries pruned: {}",
            Self::format_number(summary.entries_pruned)
        ));

        if summary.missing_recent > 0 {
            let line = format!("  Missing recent updates: {}", summary.missing_recent);
            if self.use_colors {
                let _ = self.term.write_line(&format!("{}", style(line).red()));
            } else {
                let _ = self.term.write_line(&line);
            }
        }
        if summary.failures > 0 {
            let line = format!("  Failures: {}", summary.failures);
            if self.use_colors {
                let _ = self.term.write_line(&format!("{}", style(line).red()));
            } else {
                let _ = self.term.write_line(&line);
            }
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = self.term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(HumanFormatter::format_number(0), "0");
        assert_eq!(HumanFormatter::format_number(999), "999");
        assert_eq!(HumanFormatter::format_number(1000), "1,000");
        assert_eq!(HumanFormatter::format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_quiet_suppresses_output() {
        let formatter = HumanFormatter::new(false, true);
        let report = HarvestReport::new();
        assert!(
            formatter
                .format_harvest_result(Path::new("update.msu"), &report)
                .is_ok()
        );
    }
}
