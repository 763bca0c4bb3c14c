use thiserror::Error;

/// Errors returned by Codex adapter operations.
#[derive(Debug, Error)]
pub enum CodexError {
    /// No usable Codex binary; the message carries the install hint.
    #[error("Codex executable not found: {0}")]
    ExecutableNotFound(String),
}
