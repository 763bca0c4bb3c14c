//! Locates the Codex CLI binary on the host system.

use crate::error::CodexError;
use std::path::{Path, PathBuf};
use which::which;

/// Binary name looked up on `$PATH` when nothing else is configured.
pub const DEFAULT_CODEX_BIN: &str = "codex";

/// Install instructions shown when discovery fails.
pub const INSTALL_HINT: &str = "Install: npm install -g @openai/codex";

/// Locates the Codex CLI executable.
///
/// Resolution order:
/// 1. `configured` as-is when it contains a path separator and exists.
/// 2. `configured` resolved via `$PATH`.
/// 3. Common install location fallbacks (platform-specific), only when
///    `configured` is the default binary name.
/// 4. Helpful error with install instructions.
///
/// # Errors
///
/// Returns `CodexError::ExecutableNotFound` when no valid executable can be
/// located.
pub fn discover_codex(configured: &Path) -> Result<PathBuf, CodexError> {
    // 1. Explicit path
    if configured.components().count() > 1 || configured.is_absolute() {
        if configured.is_file() {
            return Ok(configured.to_path_buf());
        }
        return Err(CodexError::ExecutableNotFound(format!(
            "Configured path does not exist: {}",
            configured.display()
        )));
    }

    // 2. PATH lookup
    if let Ok(path) = which(configured) {
        return Ok(path);
    }

    // 3. Common install locations
    if configured == Path::new(DEFAULT_CODEX_BIN) {
        if let Some(location) = fallback_locations().into_iter().find(|l| l.is_file()) {
            return Ok(location);
        }
    }

    // 4. Helpful error
    Err(CodexError::ExecutableNotFound(format!(
        "{} not found. {INSTALL_HINT}\n\
         Searched: PATH, common npm install locations.",
        configured.display()
    )))
}

#[cfg(unix)]
fn fallback_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();
    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(".npm/bin/codex"));
        locations.push(home.join(".local/bin/codex"));
    }
    locations.push(PathBuf::from("/usr/local/bin/codex"));
    locations
}

#[cfg(windows)]
fn fallback_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();
    if let Some(home) = dirs::home_dir() {
        locations.push(home.join("AppData/Roaming/npm/codex.cmd"));
    }
    locations.push(PathBuf::from(r"C:\Program Files\nodejs\codex.cmd"));
    locations
}
