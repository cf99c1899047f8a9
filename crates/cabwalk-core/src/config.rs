//! Configuration for cabinet harvesting and update fetching.

use std::path::PathBuf;

/// Configuration for the archive frontier walker and the content store.
///
/// # Examples
///
/// ```
/// use cabwalk_core::HarvestConfig;
///
/// // Harvest Control Panel applets with the stock tool.
/// let config = HarvestConfig::default();
///
/// // Widen the net to every Portable Executable flavor.
/// let wide = HarvestConfig::portable_executables();
/// assert!(wide.target_extensions.len() > config.target_extensions.len());
/// ```
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// File extensions harvested from every visited cabinet.
    ///
    /// Extensions may be given with or without the leading dot; matching
    /// against payload filenames is case-insensitive.
    pub target_extensions: Vec<String>,

    /// Root directory of the content store.
    pub store_root: PathBuf,

    /// Program name or path of the cabinet expansion tool.
    pub expand_program: PathBuf,
}

impl Default for HarvestConfig {
    /// Creates a `HarvestConfig` with the stock deployment settings.
    ///
    /// Default values:
    /// - `target_extensions`: `["cpl"]`
    /// - `store_root`: `data`
    /// - `expand_program`: `expand`
    fn default() -> Self {
        Self {
            target_extensions: vec!["cpl".to_string()],
            store_root: PathBuf::from("data"),
            expand_program: PathBuf::from("expand"),
        }
    }
}

impl HarvestConfig {
    /// Creates a configuration tracking the full Portable Executable
    /// extension family instead of only Control Panel applets.
    #[must_use]
    pub fn portable_executables() -> Self {
        Self {
            target_extensions: [
                "acm", "ax", "cpl", "dll", "drv", "efi", "exe", "mui", "ocx", "scr", "sys", "tsp",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            ..Default::default()
        }
    }

    /// Returns `true` if a payload with the given extension is tracked.
    ///
    /// # Examples
    ///
    /// ```
    /// use cabwalk_core::HarvestConfig;
    ///
    /// let config = HarvestConfig::default();
    /// assert!(config.is_target_extension("cpl"));
    /// assert!(config.is_target_extension("CPL"));
    /// assert!(!config.is_target_extension("dll"));
    /// ```
    #[must_use]
    pub fn is_target_extension(&self, extension: &str) -> bool {
        let wanted = normalize_extension(extension);
        self.target_extensions
            .iter()
            .any(|ext| normalize_extension(ext) == wanted)
    }
}

/// Configuration for resolving and downloading update packages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Directory where downloaded update packages are cached, laid out as
    /// `{msu_root}/{version}/{kb}/{filename}`.
    pub msu_root: PathBuf,

    /// Program name or path of the external download tool.
    pub downloader_program: PathBuf,

    /// Let the download tool write to the console instead of silencing it.
    pub verbose_downloads: bool,
}

impl Default for FetchConfig {
    /// Creates a `FetchConfig` with the stock deployment settings.
    ///
    /// Default values:
    /// - `msu_root`: `msus`
    /// - `downloader_program`: `aria2c`
    /// - `verbose_downloads`: `false`
    fn default() -> Self {
        Self {
            msu_root: PathBuf::from("msus"),
            downloader_program: PathBuf::from("aria2c"),
            verbose_downloads: false,
        }
    }
}

/// Normalizes an extension to its dotless lowercase form.
///
/// # Examples
///
/// ```
/// use cabwalk_core::config::normalize_extension;
///
/// assert_eq!(normalize_extension(".CPL"), "cpl");
/// assert_eq!(normalize_extension("cpl"), "cpl");
/// ```
#[must_use]
pub fn normalize_extension(raw: &str) -> String {
    raw.trim_start_matches('.').to_ascii_lowercase()
}
