use thiserror::Error;

/// Errors returned by Gemini adapter operations.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// No usable Gemini binary; the message says where discovery looked.
    #[error("Gemini executable not found: {0}")]
    ExecutableNotFound(String),
}
