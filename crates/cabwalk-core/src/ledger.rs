//! Update ledger persistence.
//!
//! The ledger is a JSON document mapping Windows version to KB number to
//! update metadata. It is produced by an external update tracker, so fields
//! we do not interpret ride along untouched through a prune-and-rewrite
//! cycle.

use std::collections::BTreeMap;
use std::fs;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Metadata for one update in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEntry {
    /// Date the update was published.
    #[serde(rename = "releaseDate")]
    pub release_date: NaiveDate,

    /// Tracker fields we do not interpret, preserved across rewrites.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl UpdateEntry {
    /// Creates an entry with the given release date and no extra fields.
    #[must_use]
    pub const fn new(release_date: NaiveDate) -> Self {
        Self {
            release_date,
            extra: BTreeMap::new(),
        }
    }

    /// Returns `true` if the update was released within the last `days`
    /// days, counting back from `today`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cabwalk_core::ledger::UpdateEntry;
    /// use chrono::NaiveDate;
    ///
    /// let today = NaiveDate::from_ymd_opt(2020, 10, 1).unwrap();
    /// let entry = UpdateEntry::new(NaiveDate::from_ymd_opt(2020, 9, 8).unwrap());
    /// assert!(entry.released_within(90, today));
    /// assert!(!entry.released_within(7, today));
    /// ```
    #[must_use]
    pub fn released_within(&self, days: i64, today: NaiveDate) -> bool {
        self.release_date > today - chrono::Duration::days(days)
    }
}

/// The update ledger: Windows versions to KB numbers to update metadata.
///
/// The ledger remembers where it was loaded from so a prune can be written
/// straight back. Removing the last update of a version keeps the emptied
/// version group in place, preserving the document shape the tracker
/// emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateLedger {
    path: PathBuf,
    entries: BTreeMap<String, BTreeMap<String, UpdateEntry>>,
}

impl UpdateLedger {
    /// Creates an empty ledger that will save to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Loads the ledger from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid ledger
    /// JSON.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = fs::File::open(&path)?;
        let entries = serde_json::from_reader(BufReader::new(file))?;
        Ok(Self { path, entries })
    }

    /// Writes the ledger back to the file it was loaded from.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Path this ledger loads from and saves to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Windows versions in the ledger, in sorted order.
    #[must_use]
    pub fn versions(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Snapshot of the (KB, entry) pairs for one version, in sorted order.
    ///
    /// The snapshot is owned, so the ledger can be pruned while a caller
    /// iterates it.
    #[must_use]
    pub fn updates_for(&self, version: &str) -> Vec<(String, UpdateEntry)> {
        self.entries
            .get(version)
            .map(|kbs| {
                kbs.iter()
                    .map(|(kb, entry)| (kb.clone(), entry.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Looks up one update entry.
    #[must_use]
    pub fn get(&self, version: &str, kb: &str) -> Option<&UpdateEntry> {
        self.entries.get(version)?.get(kb)
    }

    /// Inserts or replaces one update entry.
    pub fn insert(&mut self, version: &str, kb: &str, entry: UpdateEntry) {
        self.entries
            .entry(version.to_string())
            .or_default()
            .insert(kb.to_string(), entry);
    }

    /// Removes one update entry, returning it if it was present.
    pub fn remove(&mut self, version: &str, kb: &str) -> Option<UpdateEntry> {
        self.entries.get_mut(version)?.remove(kb)
    }

    /// Total number of update entries across all versions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    /// Returns `true` if the ledger has no update entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const SAMPLE: &str = r#"{
        "1809": {
            "KB4581482": {
                "releaseDate": "2020-10-13",
                "heading": "October 13, 2020",
                "updateInfo": {"build": "17763.1554"}
            },
            "KB4577069": {
                "releaseDate": "2020-09-16"
            }
        },
        "1903": {
            "KB4577062": {
                "releaseDate": "2020-09-16"
            }
        }
    }"#;

    fn sample_ledger(temp: &TempDir) -> UpdateLedger {
        let path = temp.path().join("updates.json");
        fs::write(&path, SAMPLE).unwrap();
        UpdateLedger::load(&path).unwrap()
    }

    #[test]
    fn test_load_parses_entries_and_extra_fields() {
        let temp = TempDir::new().unwrap();
        let ledger = sample_ledger(&temp);

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.versions(), vec!["1809".to_string(), "1903".to_string()]);

        let entry = ledger.get("1809", "KB4581482").unwrap();
        assert_eq!(
            entry.release_date,
            NaiveDate::from_ymd_opt(2020, 10, 13).unwrap()
        );
        assert_eq!(
            entry.extra.get("heading"),
            Some(&serde_json::json!("October 13, 2020"))
        );
        assert_eq!(
            entry.extra.get("updateInfo"),
            Some(&serde_json::json!({"build": "17763.1554"}))
        );
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = UpdateLedger::load(temp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, crate::HarvestError::Io(_)));
    }

    #[test]
    fn test_remove_then_save_keeps_emptied_version_group() {
        let temp = TempDir::new().unwrap();
        let mut ledger = sample_ledger(&temp);

        assert!(ledger.remove("1903", "KB4577062").is_some());
        assert!(ledger.remove("1903", "KB4577062").is_none());
        ledger.save().unwrap();

        let reloaded = UpdateLedger::load(ledger.path()).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(
            reloaded.versions(),
            vec!["1809".to_string(), "1903".to_string()]
        );
        assert!(reloaded.updates_for("1903").is_empty());
        // Untouched entries survive the rewrite, extras included.
        assert_eq!(
            reloaded.get("1809", "KB4581482").unwrap().extra.len(),
            2
        );
    }

    #[test]
    fn test_updates_for_is_sorted_snapshot() {
        let temp = TempDir::new().unwrap();
        let ledger = sample_ledger(&temp);

        let kbs: Vec<String> = ledger
            .updates_for("1809")
            .into_iter()
            .map(|(kb, _)| kb)
            .collect();
        assert_eq!(kbs, vec!["KB4577069".to_string(), "KB4581482".to_string()]);
        assert!(ledger.updates_for("2004").is_empty());
    }

    #[test]
    fn test_released_within_boundary() {
        let today = NaiveDate::from_ymd_opt(2020, 10, 1).unwrap();

        let within = UpdateEntry::new(NaiveDate::from_ymd_opt(2020, 7, 4).unwrap());
        assert!(within.released_within(90, today));

        // Exactly 90 days old counts as stale.
        let boundary = UpdateEntry::new(NaiveDate::from_ymd_opt(2020, 7, 3).unwrap());
        assert!(!boundary.released_within(90, today));

        let stale = UpdateEntry::new(NaiveDate::from_ymd_opt(2020, 7, 2).unwrap());
        assert!(!stale.released_within(90, today));
    }

    #[test]
    fn test_new_insert_save_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fresh.json");

        let mut ledger = UpdateLedger::new(&path);
        assert!(ledger.is_empty());
        ledger.insert(
            "1809",
            "KB4581482",
            UpdateEntry::new(NaiveDate::from_ymd_opt(2020, 10, 13).unwrap()),
        );
        ledger.save().unwrap();

        let reloaded = UpdateLedger::load(&path).unwrap();
        assert_eq!(reloaded, ledger);
        assert_eq!(reloaded.len(), 1);
    }
}
