//! Test utilities for cabinet walking and update fetching.
//!
//! This module provides scripted stand-ins for the external expansion tool,
//! the update catalog, and the download tool so walker and fetch behavior
//! can be exercised hermetically, plus call recording for asserting
//! traversal properties.
//!
//! # Panics
//!
//! Helpers in this module may panic on I/O errors since they are designed
//! for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::HarvestError;
use crate::Result;
use crate::catalog::CatalogHit;
use crate::catalog::CatalogLookup;
use crate::download::Downloader;
use crate::expand::ExpandOutcome;
use crate::expand::Expander;

/// A scripted stand-in for the cabinet expansion tool.
///
/// Archives are described up front as a name-to-members table. An expand
/// call materializes the members matching the pattern as small files in the
/// destination directory, the way the real tool surfaces cabinet contents.
/// Invocations are recorded so tests can assert traversal properties.
///
/// # Examples
///
/// ```
/// use cabwalk_core::test_utils::FakeExpander;
///
/// let fake = FakeExpander::new()
///     .with_archive("bar.msu", &["outer.cab"])
///     .with_archive("outer.cab", &["inner.cab"])
///     .with_archive("inner.cab", &["x.cpl"]);
/// assert_eq!(fake.calls().len(), 0);
/// ```
#[derive(Debug, Default)]
pub struct FakeExpander {
    archives: HashMap<String, Vec<String>>,
    failures: HashSet<(String, String)>,
    calls: RefCell<Vec<(String, String)>>,
}

impl FakeExpander {
    /// Creates a fake with no known archives.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an archive and the member file names it contains.
    #[must_use]
    pub fn with_archive(mut self, name: &str, members: &[&str]) -> Self {
        self.archives.insert(
            name.to_string(),
            members.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// Scripts a non-zero tool exit for one (archive, pattern) pair.
    #[must_use]
    pub fn with_failure(mut self, name: &str, pattern: &str) -> Self {
        self.failures
            .insert((name.to_string(), pattern.to_string()));
        self
    }

    /// Returns the recorded (archive file name, pattern) invocations in
    /// order.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.borrow().clone()
    }

    /// Returns how many times the named archive was expanded with the given
    /// pattern.
    #[must_use]
    pub fn call_count(&self, name: &str, pattern: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(a, p)| a == name && p == pattern)
            .count()
    }
}

impl Expander for FakeExpander {
    fn expand(&self, archive: &Path, pattern: &str, dest: &Path) -> Result<ExpandOutcome> {
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.calls
            .borrow_mut()
            .push((name.clone(), pattern.to_string()));

        if self.failures.contains(&(name.clone(), pattern.to_string())) {
            return Ok(ExpandOutcome {
                exit_code: Some(8),
                file_count: None,
            });
        }

        let mut count = 0;
        if let Some(members) = self.archives.get(&name) {
            for member in members.iter().filter(|m| member_matches(m, pattern)) {
                fs::write(dest.join(member), member.as_bytes())?;
                count += 1;
            }
        }

        Ok(ExpandOutcome {
            exit_code: Some(0),
            file_count: Some(count),
        })
    }
}

/// A scripted catalog for exercising fetch flows offline.
///
/// Each registered update maps a (version, KB) pair to an update id and a
/// download URL; unregistered pairs resolve to `UpdateNotFound`, matching
/// what the real catalog reports for retired updates.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    updates: HashMap<(String, String), CatalogHit>,
    urls: HashMap<String, String>,
}

impl FakeCatalog {
    /// Creates a catalog with no known updates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an update for a (version, KB) pair.
    #[must_use]
    pub fn with_update(mut self, version: &str, kb: &str, uid: &str, url: &str) -> Self {
        self.updates.insert(
            (version.to_string(), kb.to_string()),
            CatalogHit {
                uid: uid.to_string(),
                title: format!(
                    "Cumulative Update for Windows 10 Version {version} for x64-based Systems ({kb})"
                ),
            },
        );
        self.urls.insert(uid.to_string(), url.to_string());
        self
    }
}

impl CatalogLookup for FakeCatalog {
    fn resolve(&self, version: &str, kb: &str) -> Result<CatalogHit> {
        self.updates
            .get(&(version.to_string(), kb.to_string()))
            .cloned()
            .ok_or_else(|| HarvestError::UpdateNotFound {
                version: version.to_string(),
                kb: kb.to_string(),
            })
    }

    fn download_url(&self, update_uid: &str) -> Result<String> {
        self.urls
            .get(update_uid)
            .cloned()
            .ok_or_else(|| {
                HarvestError::catalog_format(format!("no scripted URL for {update_uid}"))
            })
    }
}

/// A scripted stand-in for the download tool.
///
/// Successful downloads write the URL itself as the file content so tests
/// can trace which URL produced which file. Requests are recorded in order.
#[derive(Debug, Default)]
pub struct FakeDownloader {
    requests: RefCell<Vec<(String, PathBuf)>>,
    fail: bool,
}

impl FakeDownloader {
    /// Creates a downloader that succeeds on every request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a downloader that fails every request with a tool failure.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Returns the recorded (URL, destination) requests in order.
    #[must_use]
    pub fn requests(&self) -> Vec<(String, PathBuf)> {
        self.requests.borrow().clone()
    }
}

impl Downloader for FakeDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        self.requests
            .borrow_mut()
            .push((url.to_string(), dest.to_path_buf()));
        if self.fail {
            return Err(HarvestError::tool_failure(
                "fake-downloader",
                format!("scripted failure for {url}"),
            ));
        }
        fs::write(dest, url.as_bytes())?;
        Ok(())
    }
}

/// Matches a member name against a `*suffix` glob, case-insensitively.
fn member_matches(member: &str, pattern: &str) -> bool {
    pattern.strip_prefix('*').is_some_and(|suffix| {
        member
            .to_ascii_lowercase()
            .ends_with(&suffix.to_ascii_lowercase())
    })
}
