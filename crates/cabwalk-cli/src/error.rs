//! Error conversion utilities for CLI.
//!
//! Converts cabwalk-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use cabwalk_core::HarvestError;
use std::path::Path;

/// Converts a harvest failure into a contextual error with guidance
pub fn convert_harvest_error(err: HarvestError, archive: &Path) -> anyhow::Error {
    match err {
        HarvestError::ToolFailure { tool, detail } => {
            anyhow!(
                "Expansion tool '{tool}' failed while processing '{}': {detail}\n\
                 HINT: Install the 'expand' utility or point --expand-tool at a compatible program.",
                archive.display()
            )
        }
        HarvestError::Io(io_err) => {
            anyhow!(
                "I/O error while processing '{}': {io_err}",
                archive.display()
            )
        }
        other => anyhow::Error::from(other)
            .context(format!("Error processing archive '{}'", archive.display())),
    }
}

/// Converts a fetch or catalog failure into a contextual error with guidance
pub fn convert_fetch_error(err: HarvestError, version: &str, kb: &str) -> anyhow::Error {
    match err {
        HarvestError::UpdateNotFound { .. } => {
            anyhow!(
                "No catalog results for {kb} ({version})\n\
                 HINT: Old updates are removed from the catalog over time; check the KB number."
            )
        }
        HarvestError::AmbiguousResult { count, .. } => {
            anyhow!(
                "Expected one catalog result for {kb} ({version}), found {count}\n\
                 HINT: The KB may cover several products; check it against the release notes."
            )
        }
        HarvestError::CatalogFormat { reason } => {
            anyhow!(
                "Catalog response for {kb} ({version}) did not parse: {reason}\n\
                 HINT: The catalog page layout may have changed, or the service is degraded."
            )
        }
        HarvestError::Http(http_err) => {
            anyhow!(
                "Catalog request failed for {kb} ({version}): {http_err}\n\
                 HINT: Check network connectivity and proxy settings."
            )
        }
        HarvestError::ToolFailure { tool, detail } => {
            anyhow!(
                "Download tool '{tool}' failed: {detail}\n\
                 HINT: Install aria2c or point --downloader at a compatible program."
            )
        }
        other => {
            anyhow::Error::from(other).context(format!("Error fetching {kb} ({version})"))
        }
    }
}

/// Adds archive context to a harvest result
pub fn add_archive_context<T>(
    result: Result<T, HarvestError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_harvest_error(e, archive))
}

/// Adds update context to a fetch result
pub fn add_update_context<T>(
    result: Result<T, HarvestError>,
    version: &str,
    kb: &str,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_fetch_error(e, version, kb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_tool_failure_error() {
        let err = HarvestError::ToolFailure {
            tool: "expand".to_string(),
            detail: "exit status 8".to_string(),
        };
        let converted = convert_harvest_error(err, Path::new("update.msu"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("expand"));
        assert!(msg.contains("update.msu"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_not_found_error() {
        let err = HarvestError::UpdateNotFound {
            version: "1809".to_string(),
            kb: "KB4581482".to_string(),
        };
        let converted = convert_fetch_error(err, "1809", "KB4581482");
        let msg = format!("{converted:?}");
        assert!(msg.contains("KB4581482"));
        assert!(msg.contains("1809"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_ambiguous_error() {
        let err = HarvestError::AmbiguousResult {
            version: "1809".to_string(),
            kb: "KB4581482".to_string(),
            count: 3,
        };
        let converted = convert_fetch_error(err, "1809", "KB4581482");
        let msg = format!("{converted:?}");
        assert!(msg.contains("found 3"));
    }

    #[test]
    fn test_convert_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = HarvestError::Io(io_err);
        let converted = convert_harvest_error(err, Path::new("update.msu"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("I/O error"));
    }
}
