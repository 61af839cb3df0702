use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use tracing::{debug, instrument};

/// Resolves the path of an external binary.
///
/// A configured value containing a path separator is used as is (it must exist),
/// anything else is looked up in `PATH`. Falls back to `default_name` when nothing is configured.
#[instrument(level = "debug", ret, err(level = "debug"))]
pub fn resolve_binary_path(configured: Option<&str>, default_name: &str) -> Result<PathBuf> {
    let name = configured.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(default_name);
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        ensure!(candidate.is_file(), "Binary not found at {}", candidate.display());
        return Ok(candidate.to_path_buf());
    }

    debug!(name, "Looking up binary in PATH");
    which::which(name).with_context(|| format!("'{name}' not found in PATH"))
}
