//! Command implementations.

pub mod completion;
pub mod crawl;
pub mod fetch;
pub mod harvest;

use anyhow::Result;
use anyhow::anyhow;
use std::path::Path;

/// Verifies an external tool is reachable before starting long work.
///
/// Bare program names are resolved through `PATH`; explicit paths are
/// checked directly.
pub fn ensure_tool(program: &Path, role: &str) -> Result<()> {
    which::which(program).map(|_| ()).map_err(|_| {
        anyhow!(
            "{role} '{}' was not found\n\
             HINT: Install it or pass an explicit path.",
            program.display()
        )
    })
}
