//! Error types for update fetching and cabinet harvesting.

use thiserror::Error;

/// Result type alias using `HarvestError`.
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Errors that can occur while fetching updates or harvesting cabinets.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request to the update catalog failed.
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON document could not be parsed or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catalog search yielded zero qualifying results.
    #[error("no catalog results for {kb} ({version})")]
    UpdateNotFound {
        /// Windows version the update was searched for.
        version: String,
        /// KB identifier of the missing update.
        kb: String,
    },

    /// Catalog search yielded more than one qualifying result.
    #[error("expected one catalog result for {kb} ({version}), found {count}")]
    AmbiguousResult {
        /// Windows version the update was searched for.
        version: String,
        /// KB identifier of the ambiguous update.
        kb: String,
        /// Number of qualifying results after filtering.
        count: usize,
    },

    /// Catalog response did not match the expected page structure.
    #[error("unexpected catalog response: {reason}")]
    CatalogFormat {
        /// Description of the structural mismatch.
        reason: String,
    },

    /// External tool exited unsuccessfully.
    #[error("{tool} failed: {detail}")]
    ToolFailure {
        /// Name of the external tool.
        tool: String,
        /// Exit status or failure description reported for the run.
        detail: String,
    },
}

impl HarvestError {
    /// Returns `true` if this error is the distinguished not-found
    /// condition.
    ///
    /// Callers use this to decide whether an absent update is an expected
    /// delisting (stale entry, prune it) or an unexpected failure (recent
    /// entry, report it).
    ///
    /// # Examples
    ///
    /// ```
    /// use cabwalk_core::HarvestError;
    ///
    /// let err = HarvestError::UpdateNotFound {
    ///     version: "1809".to_string(),
    ///     kb: "KB4581482".to_string(),
    /// };
    /// assert!(err.is_not_found());
    ///
    /// let err = HarvestError::CatalogFormat {
    ///     reason: "missing page marker".to_string(),
    /// };
    /// assert!(!err.is_not_found());
    /// ```
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::UpdateNotFound { .. })
    }

    /// Returns `true` if this error means the catalog answered but the
    /// answer cannot be acted on (ambiguous or structurally unexpected).
    ///
    /// # Examples
    ///
    /// ```
    /// use cabwalk_core::HarvestError;
    ///
    /// let err = HarvestError::AmbiguousResult {
    ///     version: "1809".to_string(),
    ///     kb: "KB4581482".to_string(),
    ///     count: 2,
    /// };
    /// assert!(err.is_catalog_mismatch());
    ///
    /// let err = HarvestError::UpdateNotFound {
    ///     version: "1809".to_string(),
    ///     kb: "KB4581482".to_string(),
    /// };
    /// assert!(!err.is_catalog_mismatch());
    /// ```
    #[must_use]
    pub const fn is_catalog_mismatch(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousResult { .. } | Self::CatalogFormat { .. }
        )
    }

    /// Builds a `CatalogFormat` error from any displayable reason.
    pub(crate) fn catalog_format(reason: impl Into<String>) -> Self {
        Self::CatalogFormat {
            reason: reason.into(),
        }
    }

    /// Builds a `ToolFailure` error for the named external tool.
    pub(crate) fn tool_failure(tool: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ToolFailure {
            tool: tool.into(),
            detail: detail.into(),
        }
    }
}
