//! Batch crawling of the update ledger.
//!
//! Walks every (version, KB) pair in the ledger: fetch the package, harvest
//! its payloads, and reconcile catalog misses against the entry's age. One
//! bad update never stops the batch.

use chrono::NaiveDate;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::Result;
use crate::expand::Expander;
use crate::fetch::PackageSource;
use crate::ledger::UpdateLedger;
use crate::report::CrawlSummary;
use crate::report::HarvestReport;
use crate::store::ContentStore;
use crate::walker::FrontierWalker;

/// Default staleness window for missing updates, in days.
///
/// Updates older than this are expected to age out of the catalog, so a
/// miss prunes the ledger instead of counting as a failure.
pub const DEFAULT_STALE_AFTER_DAYS: i64 = 90;

/// Crawls the update ledger end to end.
pub struct CrawlRunner<S, E> {
    source: S,
    walker: FrontierWalker<E>,
    stale_after_days: i64,
}

impl<S: PackageSource, E: Expander> CrawlRunner<S, E> {
    /// Creates a runner over the given package source and walker.
    pub const fn new(source: S, walker: FrontierWalker<E>, stale_after_days: i64) -> Self {
        Self {
            source,
            walker,
            stale_after_days,
        }
    }

    /// Processes every update in the ledger.
    ///
    /// Entries are fetched and harvested independently; failures are
    /// counted and logged without stopping the batch. An update missing
    /// from the catalog is pruned from the ledger when its release date
    /// falls outside the staleness window, and the ledger file is
    /// rewritten immediately after each prune. A recent update going
    /// missing is counted as a failure and the entry is retained.
    ///
    /// `progress` is invoked with (version, KB) before each entry is
    /// processed.
    ///
    /// # Errors
    ///
    /// Returns an error only if the content store layout cannot be
    /// created.
    pub fn run(
        &self,
        ledger: &mut UpdateLedger,
        today: NaiveDate,
        mut progress: impl FnMut(&str, &str),
    ) -> Result<CrawlSummary> {
        let store = ContentStore::new(&self.walker.config().store_root);
        store.ensure_layout(&self.walker.config().target_extensions)?;

        let mut summary = CrawlSummary::new();
        for version in ledger.versions() {
            info!("Processing Windows version {version}");
            for (kb, entry) in ledger.updates_for(&version) {
                progress(&version, &kb);
                match self.process_update(&version, &kb) {
                    Ok(report) => {
                        summary.updates_processed += 1;
                        summary.files_stored += report.files_stored;
                        summary.duplicates_skipped += report.duplicates_skipped;
                    }
                    Err(err) if err.is_not_found() => {
                        if entry.released_within(self.stale_after_days, today) {
                            error!("[{kb}] update was not found in the catalog");
                            summary.missing_recent += 1;
                        } else {
                            warn!(
                                "[{kb}] update was not found, it was probably removed from the catalog"
                            );
                            ledger.remove(&version, &kb);
                            match ledger.save() {
                                Ok(()) => summary.entries_pruned += 1,
                                Err(save_err) => {
                                    warn!(
                                        "Failed to rewrite the ledger after pruning {kb}: {save_err}"
                                    );
                                    summary.failures += 1;
                                }
                            }
                        }
                    }
                    Err(err) => {
                        error!("[{kb}] failed to process update: {err}");
                        summary.failures += 1;
                    }
                }
            }
        }
        Ok(summary)
    }

    fn process_update(&self, version: &str, kb: &str) -> Result<HarvestReport> {
        info!("[{kb}] Downloading update");
        let fetched = self.source.fetch(version, kb)?;
        self.walker.process_archive(fetched.path())
    }
}
