//! Cabinet expansion behind a capability seam.
//!
//! The production implementation shells out to the platform `expand`
//! utility. The walker only depends on the [`Expander`] trait, so tests can
//! substitute an in-process fake.

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

use crate::Result;

/// Outcome of one expansion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandOutcome {
    /// Exit code reported by the tool, when it ran to completion.
    pub exit_code: Option<i32>,

    /// File count parsed from the tool's trailing summary line, when
    /// present. Informational only; success is judged by the exit code.
    pub file_count: Option<usize>,
}

impl ExpandOutcome {
    /// Returns `true` if the tool reported a clean exit.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }
}

/// Capability seam over an archive expansion tool.
pub trait Expander {
    /// Expands members of `archive` matching `pattern` into `dest`.
    ///
    /// A tool run that completes with a non-zero status is not an error
    /// here; it is reported through [`ExpandOutcome::exit_code`] so callers
    /// can decide how loudly to react.
    ///
    /// # Errors
    ///
    /// Returns an error only when the tool could not be run at all.
    fn expand(&self, archive: &Path, pattern: &str, dest: &Path) -> Result<ExpandOutcome>;
}

/// The platform cabinet expansion utility, invoked as
/// `expand -F:<pattern> <archive> <dest>`.
#[derive(Debug, Clone)]
pub struct ExpandTool {
    program: PathBuf,
}

impl ExpandTool {
    /// Creates an expander around the given program name or path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Expander for ExpandTool {
    fn expand(&self, archive: &Path, pattern: &str, dest: &Path) -> Result<ExpandOutcome> {
        debug!(
            "Running {} -F:{} {} {}",
            self.program.display(),
            pattern,
            archive.display(),
            dest.display()
        );

        let output = Command::new(&self.program)
            .arg(format!("-F:{pattern}"))
            .arg(archive)
            .arg(dest)
            .output()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let outcome = ExpandOutcome {
            exit_code: output.status.code(),
            file_count: parse_files_total(&stdout),
        };

        if !outcome.success() {
            debug!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(outcome)
    }
}

/// Parses the trailing `<n> files total.` summary line of the tool output.
///
/// Returns `None` when the output ends with anything else; the count is
/// only ever used for logging.
#[must_use]
pub fn parse_files_total(stdout: &str) -> Option<usize> {
    let line = stdout.lines().rev().find(|line| !line.trim().is_empty())?;
    line.trim().strip_suffix(" files total.")?.trim().parse().ok()
}
