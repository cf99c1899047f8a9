//! Update package fetching.
//!
//! Ties the catalog client and the download tool together: resolve a
//! (version, KB) pair to a download URL, then land the package in the local
//! cache unless it is already there.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tracing::info;

use crate::HarvestError;
use crate::Result;
use crate::catalog::CatalogClient;
use crate::catalog::CatalogLookup;
use crate::config::FetchConfig;
use crate::download::DownloadTool;
use crate::download::Downloader;

/// Result of fetching one update package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// The package was downloaded to this path.
    Downloaded(PathBuf),
    /// The package was already cached at this path; no download happened.
    Cached(PathBuf),
}

impl Fetched {
    /// Path of the package on disk, wherever it came from.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Downloaded(path) | Self::Cached(path) => path,
        }
    }

    /// Returns `true` if the package was served from the cache.
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        matches!(self, Self::Cached(_))
    }
}

/// Capability seam over package fetching, so the crawl can be tested
/// without catalog or downloader access.
pub trait PackageSource {
    /// Fetches the update package for a (version, KB) pair into the cache.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::UpdateNotFound`] when the catalog has no
    /// qualifying update, and other variants for catalog, filesystem, or
    /// downloader failures.
    fn fetch(&self, version: &str, kb: &str) -> Result<Fetched>;
}

/// Fetches update packages through a catalog and a downloader.
///
/// Cached packages are laid out as `{msu_root}/{version}/{kb}/{filename}`,
/// with the filename taken from the resolved download URL. An existing file
/// at that path short-circuits the download entirely.
pub struct UpdateFetcher<C, D> {
    catalog: C,
    downloader: D,
    config: FetchConfig,
}

impl UpdateFetcher<CatalogClient, DownloadTool> {
    /// Creates a fetcher backed by the real catalog and download tool.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_default_tools(config: FetchConfig) -> Result<Self> {
        let catalog = CatalogClient::new()?;
        let downloader =
            DownloadTool::new(&config.downloader_program, config.verbose_downloads);
        Ok(Self::new(catalog, downloader, config))
    }
}

impl<C, D> UpdateFetcher<C, D> {
    /// Creates a fetcher from explicit catalog and downloader capabilities.
    pub const fn new(catalog: C, downloader: D, config: FetchConfig) -> Self {
        Self {
            catalog,
            downloader,
            config,
        }
    }

    /// Returns the active configuration.
    pub const fn config(&self) -> &FetchConfig {
        &self.config
    }
}

impl<C: CatalogLookup, D: Downloader> PackageSource for UpdateFetcher<C, D> {
    fn fetch(&self, version: &str, kb: &str) -> Result<Fetched> {
        let hit = self.catalog.resolve(version, kb)?;
        let url = self.catalog.download_url(&hit.uid)?;
        let file_name = url_file_name(&url)?;

        let package_dir = self.config.msu_root.join(version).join(kb);
        let dest = package_dir.join(file_name);
        if dest.exists() {
            info!("{} already cached, skipping download", dest.display());
            return Ok(Fetched::Cached(dest));
        }

        fs::create_dir_all(&package_dir)?;
        info!("Downloading {file_name} for {version} {kb}");
        self.downloader.download(&url, &dest)?;
        Ok(Fetched::Downloaded(dest))
    }
}

/// Extracts the file name from a download URL (its last path segment).
fn url_file_name(url: &str) -> Result<&str> {
    let name = url.rsplit('/').next().unwrap_or(url);
    if name.is_empty() {
        return Err(HarvestError::catalog_format(format!(
            "download URL has no file name: {url}"
        )));
    }
    Ok(name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::test_utils::FakeCatalog;
    use crate::test_utils::FakeDownloader;

    fn fetcher_in(
        temp: &TempDir,
        catalog: FakeCatalog,
        downloader: FakeDownloader,
    ) -> UpdateFetcher<FakeCatalog, FakeDownloader> {
        let config = FetchConfig {
            msu_root: temp.path().join("msus"),
            ..Default::default()
        };
        UpdateFetcher::new(catalog, downloader, config)
    }

    #[test]
    fn test_url_file_name() {
        assert_eq!(
            url_file_name("https://dl.example.com/pkg/win10.msu").unwrap(),
            "win10.msu"
        );
        assert_eq!(url_file_name("bare.msu").unwrap(), "bare.msu");
        assert!(url_file_name("https://dl.example.com/pkg/").is_err());
    }

    #[test]
    fn test_fetch_downloads_into_cache_layout() {
        let temp = TempDir::new().unwrap();
        let catalog = FakeCatalog::new().with_update(
            "1809",
            "KB4581482",
            "abc-123",
            "https://dl.example.com/win10-1809.msu",
        );
        let fetcher = fetcher_in(&temp, catalog, FakeDownloader::new());

        let fetched = fetcher.fetch("1809", "KB4581482").unwrap();
        let expected = temp
            .path()
            .join("msus")
            .join("1809")
            .join("KB4581482")
            .join("win10-1809.msu");
        assert_eq!(fetched, Fetched::Downloaded(expected.clone()));
        assert!(!fetched.is_cached());
        assert!(expected.is_file());
    }

    #[test]
    fn test_fetch_short_circuits_on_cached_package() {
        let temp = TempDir::new().unwrap();
        let catalog = FakeCatalog::new().with_update(
            "1809",
            "KB4581482",
            "abc-123",
            "https://dl.example.com/win10-1809.msu",
        );
        let fetcher = fetcher_in(&temp, catalog, FakeDownloader::new());

        let cached = temp
            .path()
            .join("msus")
            .join("1809")
            .join("KB4581482")
            .join("win10-1809.msu");
        fs::create_dir_all(cached.parent().unwrap()).unwrap();
        fs::write(&cached, b"already here").unwrap();

        let fetched = fetcher.fetch("1809", "KB4581482").unwrap();
        assert_eq!(fetched, Fetched::Cached(cached.clone()));
        assert!(fetched.is_cached());
        assert_eq!(fetcher.downloader.requests().len(), 0);
        assert_eq!(fs::read(&cached).unwrap(), b"already here");
    }

    #[test]
    fn test_fetch_propagates_not_found() {
        let temp = TempDir::new().unwrap();
        let fetcher = fetcher_in(&temp, FakeCatalog::new(), FakeDownloader::new());

        let err = fetcher.fetch("1809", "KB4581482").unwrap_err();
        assert!(err.is_not_found());
        assert!(!temp.path().join("msus").exists());
    }

    #[test]
    fn test_fetch_propagates_downloader_failure() {
        let temp = TempDir::new().unwrap();
        let catalog = FakeCatalog::new().with_update(
            "1809",
            "KB4581482",
            "abc-123",
            "https://dl.example.com/win10-1809.msu",
        );
        let fetcher = fetcher_in(&temp, catalog, FakeDownloader::failing());

        let err = fetcher.fetch("1809", "KB4581482").unwrap_err();
        assert!(matches!(err, HarvestError::ToolFailure { .. }));
    }
}
