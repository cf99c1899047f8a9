//! External download tool wrapper.
//!
//! Large update packages are fetched by a segmented downloader rather than
//! through our own HTTP client. The tool is invoked per file and its exit
//! status decides success.

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;

use tracing::debug;

use crate::Result;
use crate::error::HarvestError;

/// Parallel connections opened per download.
const CONNECTIONS_PER_DOWNLOAD: u32 = 4;

/// Capability seam over the external downloader, so callers can be tested
/// without touching the network.
pub trait Downloader {
    /// Downloads `url` to exactly `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error when the tool cannot be spawned or exits unsuccessfully.
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Invokes an aria2c-style downloader as a subprocess.
pub struct DownloadTool {
    /// Program name or path, resolved through `PATH` when bare.
    program: PathBuf,
    /// When `false`, the tool's own output is suppressed.
    verbose: bool,
}

impl DownloadTool {
    /// Creates a wrapper around the given downloader program.
    pub fn new(program: impl Into<PathBuf>, verbose: bool) -> Self {
        Self {
            program: program.into(),
            verbose,
        }
    }
}

impl Downloader for DownloadTool {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        debug!("Downloading {url} to {}", dest.display());

        let mut command = Command::new(&self.program);
        command
            .arg(format!("-x{CONNECTIONS_PER_DOWNLOAD}"))
            .arg("-o")
            .arg(dest)
            .arg("--allow-overwrite=true")
            .arg(url);
        if !self.verbose {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let status = command.status()?;
        if !status.success() {
            let detail = status.code().map_or_else(
                || format!("terminated by signal while fetching {url}"),
                |code| format!("exit status {code} while fetching {url}"),
            );
            return Err(HarvestError::tool_failure(
                self.program.display().to_string(),
                detail,
            ));
        }
        Ok(())
    }
}
