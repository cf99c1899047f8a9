//! The archive frontier walker.
//!
//! Walks the nested-cabinet structure of one update package: the root
//! archive surfaces cabinets, every cabinet surfaces payloads and possibly
//! further cabinets, and the walk retires each cabinet exactly once. An
//! explicit work queue plus an ever-discovered set drive the traversal, so
//! correctness never depends on directory enumeration order or timing.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use tracing::info;
use tracing::warn;
use walkdir::WalkDir;

use crate::HarvestConfig;
use crate::HarvestReport;
use crate::Result;
use crate::config::normalize_extension;
use crate::expand::ExpandOutcome;
use crate::expand::ExpandTool;
use crate::expand::Expander;
use crate::staging::StagingArea;
use crate::store::ContentStore;

/// Glob matching cabinet members inside an archive.
const CABINET_PATTERN: &str = "*.cab";

/// Walks one update package and harvests its payloads into the content
/// store.
///
/// The walker is generic over the [`Expander`] doing the actual archive
/// expansion; production code drives the external tool, tests substitute a
/// fake.
///
/// # Examples
///
/// ```no_run
/// use cabwalk_core::FrontierWalker;
/// use cabwalk_core::HarvestConfig;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let walker = FrontierWalker::with_expand_tool(HarvestConfig::default());
/// let report = walker.process_archive(Path::new("update.msu"))?;
/// println!("stored {} payload files", report.files_stored);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FrontierWalker<E> {
    expander: E,
    config: HarvestConfig,
}

impl FrontierWalker<ExpandTool> {
    /// Creates a walker driving the expansion tool named in the
    /// configuration.
    #[must_use]
    pub fn with_expand_tool(config: HarvestConfig) -> Self {
        let expander = ExpandTool::new(config.expand_program.clone());
        Self::new(expander, config)
    }
}

impl<E: Expander> FrontierWalker<E> {
    /// Creates a walker around an explicit expander.
    pub fn new(expander: E, config: HarvestConfig) -> Self {
        Self { expander, config }
    }

    /// Harvest configuration the walker was built with.
    #[must_use]
    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Processes one root archive: walks every reachable cabinet, extracts
    /// tracked payloads, sweeps them into the content store, and cleans up
    /// the staging areas.
    ///
    /// Tool failures for individual cabinets are demoted to report warnings;
    /// the walk continues with the remaining work.
    ///
    /// # Errors
    ///
    /// Returns an error when the staging areas cannot be created or
    /// enumerated. Everything else is isolated per cabinet or per payload.
    pub fn process_archive(&self, root_archive: &Path) -> Result<HarvestReport> {
        let started = Instant::now();
        let mut report = HarvestReport::new();

        let archive_basename = root_archive.file_name().map_or_else(
            || root_archive.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        info!("Processing {archive_basename}");

        let staging = StagingArea::create(root_archive)?;
        self.run_expansion(root_archive, CABINET_PATTERN, staging.cabinet_dir(), &mut report);

        let mut queue = staging.list_cabinets()?;
        let mut discovered: HashSet<PathBuf> = queue.iter().cloned().collect();

        while let Some(cabinet) = queue.pop() {
            self.harvest_cabinet(&cabinet, &staging, &mut report);

            // Surface cabinets nested inside this one before retiring it.
            self.run_expansion(&cabinet, CABINET_PATTERN, staging.cabinet_dir(), &mut report);

            // The cabinet may be locked or already gone; leaving it behind
            // is harmless because it never re-enters the queue.
            let _ = fs::remove_file(&cabinet);

            for candidate in staging.list_cabinets()? {
                if discovered.insert(candidate.clone()) {
                    queue.push(candidate);
                }
            }
            report.cabinets_processed += 1;
        }

        self.sweep(&staging, &archive_basename, &mut report);
        staging.cleanup();

        report.duration = started.elapsed();
        info!(
            "Finished {archive_basename}: {} cabinet(s), {} file(s) stored, {} duplicate(s)",
            report.cabinets_processed, report.files_stored, report.duplicates_skipped
        );
        Ok(report)
    }

    /// Extracts every tracked extension from one cabinet into fresh payload
    /// subdirectories.
    fn harvest_cabinet(&self, cabinet: &Path, staging: &StagingArea, report: &mut HarvestReport) {
        let cabinet_name = cabinet
            .file_name()
            .map_or_else(String::new, |name| name.to_string_lossy().into_owned());

        for extension in &self.config.target_extensions {
            let ext = normalize_extension(extension);
            let pattern = format!("*.{ext}");

            let dest = match staging.payload_subdir(cabinet, &ext) {
                Ok(dir) => dir,
                Err(err) => {
                    let message =
                        format!("could not stage payloads for {cabinet_name} ({pattern}): {err}");
                    warn!("{message}");
                    report.add_warning(message);
                    continue;
                }
            };

            if let Some(outcome) = self.run_expansion(cabinet, &pattern, &dest, report) {
                let count = outcome
                    .file_count
                    .map_or_else(|| "?".to_string(), |c| c.to_string());
                info!("Extracted {count} {pattern} file(s) from {cabinet_name}");
            }
        }
    }

    /// Runs one expansion, downgrading any tool problem to a warning.
    ///
    /// Returns the outcome only for clean exits.
    fn run_expansion(
        &self,
        archive: &Path,
        pattern: &str,
        dest: &Path,
        report: &mut HarvestReport,
    ) -> Option<ExpandOutcome> {
        match self.expander.expand(archive, pattern, dest) {
            Ok(outcome) if outcome.success() => Some(outcome),
            Ok(outcome) => {
                let detail = outcome.exit_code.map_or_else(
                    || "terminated by signal".to_string(),
                    |code| format!("exit status {code}"),
                );
                let message =
                    format!("expansion of {} ({pattern}) failed: {detail}", archive.display());
                warn!("{message}");
                report.add_warning(message);
                None
            }
            Err(err) => {
                let message =
                    format!("expansion of {} ({pattern}) failed: {err}", archive.display());
                warn!("{message}");
                report.add_warning(message);
                None
            }
        }
    }

    /// Moves every tracked payload from the payload staging area into the
    /// content store, first write wins.
    fn sweep(&self, staging: &StagingArea, archive_basename: &str, report: &mut HarvestReport) {
        let store = ContentStore::new(&self.config.store_root);

        for entry in WalkDir::new(staging.payload_dir())
            .into_iter()
            .filter_map(std::result::Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(extension) = entry
                .path()
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
            else {
                continue;
            };
            if !self.config.is_target_extension(&extension) {
                continue;
            }

            match store.deposit(entry.path(), archive_basename, &extension) {
                Ok(deposit) if deposit.is_stored() => report.files_stored += 1,
                Ok(_) => report.duplicates_skipped += 1,
                Err(err) => {
                    let message =
                        format!("could not store {}: {err}", entry.path().display());
                    warn!("{message}");
                    report.add_warning(message);
                }
            }
        }
    }
}
