//! Locates the Gemini binary on the system.

use crate::error::GeminiError;
use std::path::{Path, PathBuf};
use which::which;

/// Binary name looked up on `$PATH` when nothing else is configured.
pub const DEFAULT_GEMINI_BIN: &str = "gemini";

/// Install instructions shown when discovery fails.
pub const INSTALL_HINT: &str = "Install: npm install -g @google/gemini-cli";

/// Locates the Gemini CLI executable.
///
/// Resolution order:
/// 1. `configured` as-is when it is a path and exists.
/// 2. `configured` resolved via `$PATH`.
/// 3. Common install location fallbacks for the default binary name.
///
/// # Errors
///
/// Returns `GeminiError::ExecutableNotFound` when no valid executable can be
/// located.
pub fn discover_gemini(configured: &Path) -> Result<PathBuf, GeminiError> {
    if configured.components().count() > 1 || configured.is_absolute() {
        if configured.is_file() {
            return Ok(configured.to_path_buf());
        }
        return Err(GeminiError::ExecutableNotFound(format!(
            "Configured path does not exist: {}",
            configured.display()
        )));
    }

    if let Ok(path) = which(configured) {
        return Ok(path);
    }

    if configured == Path::new(DEFAULT_GEMINI_BIN) {
        if let Some(location) = fallback_locations().into_iter().find(|l| l.is_file()) {
            return Ok(location);
        }
    }

    Err(GeminiError::ExecutableNotFound(format!(
        "{} not found. {INSTALL_HINT}",
        configured.display()
    )))
}

#[cfg(unix)]
fn fallback_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();
    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(".npm/bin/gemini"));
        locations.push(home.join(".local/bin/gemini"));
    }
    locations.push(PathBuf::from("/usr/local/bin/gemini"));
    locations
}

#[cfg(windows)]
fn fallback_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();
    if let Some(home) = dirs::home_dir() {
        locations.push(home.join("AppData/Roaming/npm/gemini.cmd"));
    }
    locations
}
