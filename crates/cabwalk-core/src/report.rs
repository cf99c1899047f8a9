//! Harvest and crawl operation reporting.

use std::time::Duration;

/// Report of a single archive harvest.
///
/// Contains statistics about the cabinet walk and the content store sweep.
#[derive(Debug, Clone, Default)]
pub struct HarvestReport {
    /// Number of cabinets popped from the work queue and processed.
    pub cabinets_processed: usize,

    /// Number of payload files moved into the content store.
    pub files_stored: usize,

    /// Number of payload files dropped because the destination already
    /// existed.
    pub duplicates_skipped: usize,

    /// Duration of the harvest.
    pub duration: Duration,

    /// Warnings generated during the walk and sweep.
    pub warnings: Vec<String>,
}

impl HarvestReport {
    /// Creates a new empty harvest report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Summary of a batch crawl over the update ledger.
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    /// Number of updates fetched and harvested successfully.
    pub updates_processed: usize,

    /// Total payload files moved into the content store.
    pub files_stored: usize,

    /// Total payload files dropped as already-present duplicates.
    pub duplicates_skipped: usize,

    /// Ledger entries pruned after a stale update went missing from the
    /// catalog.
    pub entries_pruned: usize,

    /// Updates missing from the catalog despite a recent release date.
    pub missing_recent: usize,

    /// Updates that failed for any other reason.
    pub failures: usize,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of ledger entries the crawl attempted.
    #[must_use]
    pub fn total_attempted(&self) -> usize {
        self.updates_processed + self.entries_pruned + self.missing_recent + self.failures
    }

    /// Returns whether any item failed in a way that needs attention.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.missing_recent > 0 || self.failures > 0
    }
}
