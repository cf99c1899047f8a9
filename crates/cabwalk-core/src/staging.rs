//! Working directories scoped to one root archive.
//!
//! A harvest stages intermediate state in two sibling directories next to
//! the root archive: `cabs` for cabinets awaiting the walker and `workdir`
//! for extracted payloads awaiting the content store sweep.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::Result;
use crate::config::normalize_extension;

/// Directory name for cabinets discovered but not yet processed.
const CABINET_DIR_NAME: &str = "cabs";

/// Directory name for extracted payloads awaiting the sweep.
const PAYLOAD_DIR_NAME: &str = "workdir";

/// The two staging directories used while harvesting one root archive.
#[derive(Debug)]
pub struct StagingArea {
    cabinet_dir: PathBuf,
    payload_dir: PathBuf,
}

impl StagingArea {
    /// Creates the staging directories next to the root archive.
    ///
    /// Creation is idempotent; directories left over from an interrupted
    /// run are reused as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if either directory cannot be created.
    pub fn create(root_archive: &Path) -> Result<Self> {
        let base = match root_archive.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let cabinet_dir = base.join(CABINET_DIR_NAME);
        let payload_dir = base.join(PAYLOAD_DIR_NAME);
        fs::create_dir_all(&cabinet_dir)?;
        fs::create_dir_all(&payload_dir)?;

        Ok(Self {
            cabinet_dir,
            payload_dir,
        })
    }

    /// Directory holding cabinets awaiting the walker.
    #[must_use]
    pub fn cabinet_dir(&self) -> &Path {
        &self.cabinet_dir
    }

    /// Directory holding extracted payloads awaiting the sweep.
    #[must_use]
    pub fn payload_dir(&self) -> &Path {
        &self.payload_dir
    }

    /// Lists the cabinet files currently present in the cabinet staging
    /// directory, sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be enumerated.
    pub fn list_cabinets(&self) -> Result<Vec<PathBuf>> {
        let mut cabinets = Vec::new();
        for entry in fs::read_dir(&self.cabinet_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("cab"))
            {
                cabinets.push(path);
            }
        }
        cabinets.sort();
        Ok(cabinets)
    }

    /// Creates a uniquely named payload subdirectory for one
    /// (cabinet, extension) extraction.
    ///
    /// The name embeds the cabinet file name and the extension so collisions
    /// between sibling cabinets producing same-named payloads are
    /// impossible, and so leftover directories are attributable.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn payload_subdir(&self, cabinet: &Path, extension: &str) -> Result<PathBuf> {
        let cabinet_name = cabinet
            .file_name()
            .map_or_else(|| "cabinet".to_string(), |n| n.to_string_lossy().into_owned());
        let dir = tempfile::Builder::new()
            .prefix(&format!("{cabinet_name}."))
            .suffix(&format!(".{}", normalize_extension(extension)))
            .tempdir_in(&self.payload_dir)?;
        Ok(dir.keep())
    }

    /// Removes both staging directories, swallowing any failure.
    ///
    /// Locked files or permission problems leave the directories behind for
    /// the next run to reuse.
    pub fn cleanup(self) {
        let _ = fs::remove_dir_all(&self.cabinet_dir);
        let _ = fs::remove_dir_all(&self.payload_dir);
    }
}
