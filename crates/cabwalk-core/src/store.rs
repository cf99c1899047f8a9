//! Flat per-extension content store.
//!
//! Harvested payloads land under `{root}/{extension}/` with names that
//! encode their provenance: `{archive_basename}__{payload_basename}`. The
//! store is append-only from the walker's perspective; an existing
//! destination always wins over a newly extracted copy.

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

use crate::Result;
use crate::config::normalize_extension;

/// The content store rooted at a fixed directory.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

/// Result of offering one payload to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deposit {
    /// The payload was moved to the given destination.
    Stored(PathBuf),
    /// The destination already existed; the payload was left in place.
    Duplicate(PathBuf),
}

impl Deposit {
    /// Returns `true` if the payload was moved into the store.
    #[must_use]
    pub const fn is_stored(&self) -> bool {
        matches!(self, Self::Stored(_))
    }
}

impl ContentStore {
    /// Creates a store handle rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the per-extension subdirectories for the given extensions.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    pub fn ensure_layout(&self, extensions: &[String]) -> Result<()> {
        for extension in extensions {
            fs::create_dir_all(self.root.join(normalize_extension(extension)))?;
        }
        Ok(())
    }

    /// Computes the destination path for a payload.
    ///
    /// The extension directory is the dotless lowercase extension; the file
    /// name keeps the payload's original basename prefixed with the source
    /// archive's basename.
    ///
    /// # Examples
    ///
    /// ```
    /// use cabwalk_core::ContentStore;
    /// use std::path::PathBuf;
    ///
    /// let store = ContentStore::new("data");
    /// assert_eq!(
    ///     store.destination("bar.msu", "foo.cpl", "cpl"),
    ///     PathBuf::from("data/cpl/bar.msu__foo.cpl"),
    /// );
    /// ```
    #[must_use]
    pub fn destination(&self, archive_basename: &str, payload_name: &str, extension: &str) -> PathBuf {
        self.root
            .join(normalize_extension(extension))
            .join(format!("{archive_basename}__{payload_name}"))
    }

    /// Moves a payload into the store unless its destination already exists.
    ///
    /// Duplicates are left untouched at `source` for the staging cleanup to
    /// reclaim.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload has no file name, the extension
    /// directory cannot be created, or the rename fails.
    pub fn deposit(&self, source: &Path, archive_basename: &str, extension: &str) -> Result<Deposit> {
        let payload_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("payload has no file name: {}", source.display()),
                )
            })?;

        let dest = self.destination(archive_basename, &payload_name, extension);
        if dest.exists() {
            debug!("Skipping duplicate payload {}", dest.display());
            return Ok(Deposit::Duplicate(dest));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(source, &dest)?;
        debug!("Stored {}", dest.display());
        Ok(Deposit::Stored(dest))
    }
}
