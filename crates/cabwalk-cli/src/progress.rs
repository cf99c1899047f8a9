//! Progress bar for the ledger crawl.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;

/// Progress bar shown while crawling the update ledger.
///
/// Displays the update currently being processed and the position within
/// the ledger when running in a TTY. Automatically cleans up on drop.
pub struct CrawlProgress {
    bar: ProgressBar,
}

impl CrawlProgress {
    /// Creates a bar sized to the number of ledger entries.
    #[must_use]
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);

        // Template: "1809 KB4581482 [████████░░░░] 42/130 updates (3m10s)"
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} updates ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        bar.set_message("Crawling");

        Self { bar }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show(quiet: bool) -> bool {
        !quiet && Term::stdout().is_term()
    }

    /// Advances the bar to the next ledger entry.
    pub fn on_update(&self, version: &str, kb: &str) {
        self.bar.set_message(format!("{version} {kb}"));
        self.bar.inc(1);
    }
}

impl Drop for CrawlProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
